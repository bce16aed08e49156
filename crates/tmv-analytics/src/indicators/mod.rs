//! 기술적 지표 모듈.
//!
//! TMV 점수 계산에 쓰이는 기술적 지표를 제공합니다. 모든 지표는
//! Decimal 슬라이스를 입력으로 받아 시점별 값을 돌려주는 배치
//! 계산기이며, 워밍업 구간은 None으로 표시됩니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **EMA**: 지수 이동평균 (Exponential Moving Average)
//! - **MACD**: 이동평균 수렴/확산 (Moving Average Convergence Divergence)
//! - **SuperTrend**: ATR 기반 추세 추종 밴드
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Relative Strength Index)
//! - **ADX**: 평균 방향성 지수 (Average Directional Index)
//!
//! ## 거래량 지표 (Volume Indicators)
//! - **OBV**: 거래량 누적 합계 (On-Balance Volume)
//! - **MFI**: 자금 흐름 지수 (Money Flow Index)
//!
//! # 사용 예시
//!
//! ```ignore
//! use tmv_analytics::indicators::{EmaParams, IndicatorEngine, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//!
//! // EMA 계산
//! let ema = engine.ema(&closes, EmaParams { period: 8 })?;
//!
//! // RSI 계산
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 })?;
//! ```

pub mod momentum;
pub mod supertrend;
pub mod trend;
pub mod volume;

use rust_decimal::Decimal;
use thiserror::Error;

pub use momentum::{AdxParams, AdxResult, MomentumCalculator, RsiParams};
pub use supertrend::{SuperTrendIndicator, SuperTrendParams, SuperTrendResult};
pub use trend::{EmaParams, MacdParams, MacdResult, TrendIndicators};
pub use volume::{MfiParams, ObvParams, ObvResult, VolumeIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// TMV 점수에 필요한 모든 지표 계산을 위한 통합 인터페이스를
/// 제공합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volume: VolumeIndicators,
    supertrend: SuperTrendIndicator,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - EMA 파라미터 (기간)
    ///
    /// # 반환
    /// 계산된 EMA 값들의 벡터 (처음 period-1개는 None)
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// MACD (Moving Average Convergence Divergence) 계산.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - MACD 파라미터 (단기, 장기, 시그널 기간)
    ///
    /// # 반환
    /// MACD 라인, 시그널 라인, 히스토그램
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// SuperTrend 계산.
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `params` - SuperTrend 파라미터 (ATR 기간, 배수)
    ///
    /// # 반환
    /// 각 시점의 SuperTrend 밴드 값과 추세 방향
    pub fn supertrend(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: SuperTrendParams,
    ) -> IndicatorResult<Vec<SuperTrendResult>> {
        self.supertrend.calculate(high, low, close, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI (Relative Strength Index) 계산.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - RSI 파라미터 (기간, 기본값 14)
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들
    pub fn rsi(
        &self,
        prices: &[Decimal],
        params: RsiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }

    /// ADX (Average Directional Index) 계산.
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `params` - ADX 파라미터 (기간, 기본값 14)
    ///
    /// # 반환
    /// 각 시점의 ADX, +DI, -DI 값
    pub fn adx(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AdxParams,
    ) -> IndicatorResult<Vec<AdxResult>> {
        self.momentum.adx(high, low, close, params)
    }

    // ==================== 거래량 지표 ====================

    /// OBV (On-Balance Volume) 계산.
    ///
    /// # 인자
    /// * `close` - 종가 데이터
    /// * `volume` - 거래량 데이터
    /// * `params` - OBV 파라미터
    ///
    /// # 반환
    /// 각 시점의 OBV 값과 변화량
    pub fn obv(
        &self,
        close: &[Decimal],
        volume: &[Decimal],
        params: ObvParams,
    ) -> IndicatorResult<Vec<ObvResult>> {
        self.volume.obv(close, volume, params)
    }

    /// MFI (Money Flow Index) 계산.
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `volume` - 거래량 데이터
    /// * `params` - MFI 파라미터 (기간, 기본값 14)
    ///
    /// # 반환
    /// 0-100 사이의 MFI 값들
    pub fn mfi(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        volume: &[Decimal],
        params: MfiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.volume.mfi(high, low, close, volume, params)
    }
}
