//! 분석 시스템의 에러 타입.
//!
//! 이 모듈은 크레이트 경계에서 사용되는 공통 에러 타입을 정의합니다.
//! 개별 바 검증 실패는 [`crate::domain::InvalidBarError`]로 따로 표현되며,
//! 점수 계산 실패는 analytics 크레이트의 `ScoringError`가 담당합니다.

use thiserror::Error;

/// 핵심 분석기 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
