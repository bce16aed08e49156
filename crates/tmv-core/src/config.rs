//! 설정 관리.
//!
//! 이 모듈은 분석기 설정을 정의하고 관리합니다. 파일에서 읽은 뒤
//! `TMV__` 접두사의 환경 변수로 덮어쓸 수 있습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 분석 대상 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 점수 계산 설정
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 분석 대상 설정.
///
/// 어떤 타임프레임을 점수화할지와 타임프레임별 조회 기간을 정합니다.
/// 캔들 조회 자체는 이 크레이트 밖(오케스트레이션 계층)의 책임입니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// 점수화할 타임프레임 (브로커리지 간격 문자열)
    pub timeframes: Vec<String>,
    /// 타임프레임별 조회 기간 (일 단위)
    pub lookback_days: HashMap<String, u32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut lookback_days = HashMap::new();
        lookback_days.insert("15minute".to_string(), 5);
        lookback_days.insert("day".to_string(), 90);

        Self {
            timeframes: vec!["15minute".to_string(), "day".to_string()],
            lookback_days,
        }
    }
}

/// 워밍업이 끝나지 않은 지표를 만났을 때의 정책.
///
/// 원본 스크립트 변형들은 이 지점에서 일관성이 없었습니다. 기본값은
/// 해당 시그널을 0으로 취급하는 것이며, 엄격한 호출자는 `Strict`로
/// 에러를 받을 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// 정의되지 않은 지표의 시그널을 0으로 취급
    TreatAsZero,
    /// 정의되지 않은 지표가 있으면 계산 전체를 실패 처리
    Strict,
}

impl Default for WarmupPolicy {
    fn default() -> Self {
        Self::TreatAsZero
    }
}

/// 점수 계산 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// 추세 점수 가중치 (기본: 0.40)
    pub trend_weight: Decimal,
    /// 모멘텀 점수 가중치 (기본: 0.35)
    pub momentum_weight: Decimal,
    /// 거래량 점수 가중치 (기본: 0.25)
    pub volume_weight: Decimal,
    /// 점수 계산에 필요한 최소 캔들 수 (기본: 26)
    ///
    /// EMA-21 워밍업(21개)에 반전 확률 관찰 구간(5개)을 더한 값입니다.
    /// 이보다 짧은 시리즈는 신뢰할 수 있는 점수를 낼 수 없습니다.
    pub min_bars: usize,
    /// 워밍업 미완료 지표 처리 정책
    pub warmup_policy: WarmupPolicy,
    /// 반전 확률 관찰 구간 (최근 N개 바의 RSI, 기본: 5)
    pub reversal_lookback: usize,
    /// RSI 과매도 기준 (기본: 30)
    pub rsi_oversold: Decimal,
    /// RSI 과매수 기준 (기본: 70)
    pub rsi_overbought: Decimal,
    /// ADX 추세 강도 기준 (기본: 20)
    pub adx_trend_threshold: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trend_weight: Decimal::new(40, 2),
            momentum_weight: Decimal::new(35, 2),
            volume_weight: Decimal::new(25, 2),
            min_bars: 26,
            warmup_policy: WarmupPolicy::default(),
            reversal_lookback: 5,
            rsi_oversold: Decimal::from(30),
            rsi_overbought: Decimal::from(70),
            adx_trend_threshold: Decimal::from(20),
        }
    }
}

impl ScoringConfig {
    /// 설정 값의 일관성을 검증합니다.
    ///
    /// 가중치는 음수일 수 없고 합이 정확히 1이어야 합니다. 합이 1이면
    /// 유효한 부분 점수에 대해 종합 점수가 항상 [0, 1] 안에 머뭅니다.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, weight) in [
            ("trend_weight", self.trend_weight),
            ("momentum_weight", self.momentum_weight),
            ("volume_weight", self.volume_weight),
        ] {
            if weight < Decimal::ZERO {
                return Err(CoreError::Config(format!(
                    "{name}은(는) 음수일 수 없습니다: {weight}"
                )));
            }
        }

        let sum = self.trend_weight + self.momentum_weight + self.volume_weight;
        if sum != Decimal::ONE {
            return Err(CoreError::Config(format!(
                "가중치 합이 1이어야 합니다: {sum}"
            )));
        }

        if self.min_bars == 0 {
            return Err(CoreError::Config(
                "min_bars는 0보다 커야 합니다".to_string(),
            ));
        }

        if self.reversal_lookback == 0 {
            return Err(CoreError::Config(
                "reversal_lookback은 0보다 커야 합니다".to_string(),
            ));
        }

        if self.rsi_oversold >= self.rsi_overbought {
            return Err(CoreError::Config(format!(
                "rsi_oversold({})는 rsi_overbought({})보다 작아야 합니다",
                self.rsi_oversold, self.rsi_overbought
            )));
        }

        Ok(())
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("TMV")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }
}
