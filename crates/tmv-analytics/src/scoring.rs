//! TMV 점수 계산기.
//!
//! 정제된 바 시리즈 하나를 받아 추세(Trend)/모멘텀(Momentum)/거래량
//! (Volume) 부분 점수와 종합 점수, 추세 방향, 반전 확률을 계산합니다.
//!
//! # 점수 구성
//!
//! - **추세** (가중치 0.40): EMA(8) > EMA(21), 종가 > SuperTrend 밴드
//! - **모멘텀** (가중치 0.35): MACD > 시그널, RSI > 50, ADX > 20
//! - **거래량** (가중치 0.25): OBV 증가, MFI > 50
//!
//! 각 부분 점수는 해당 시그널(0 또는 1)의 평균이며, 종합 점수는 부분
//! 점수의 가중 합입니다. 모든 값은 [0, 1] 범위의 분수입니다.
//!
//! # 결정성
//!
//! 계산은 순수 함수입니다. 같은 시리즈에 대해 항상 같은 결과를
//! 반환하며, 시계나 외부 상태를 참조하지 않습니다. 호출자는 서로 다른
//! 종목을 여러 스레드에서 동시에 점수화해도 됩니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use tmv_core::{BarSeries, DecimalExt, ScoringConfig, WarmupPolicy};

use crate::indicators::{
    AdxParams, EmaParams, IndicatorEngine, IndicatorError, MacdParams, MfiParams, ObvParams,
    RsiParams, SuperTrendParams,
};

/// 빠른 추세 EMA 기간.
const FAST_EMA_PERIOD: usize = 8;
/// 느린 추세 EMA 기간.
const SLOW_EMA_PERIOD: usize = 21;
/// RSI 강세/약세 기준선.
const RSI_MIDLINE: Decimal = dec!(50);
/// MFI 강세/약세 기준선.
const MFI_MIDLINE: Decimal = dec!(50);

/// 점수 계산 오류.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// 정제 후 시리즈가 최소 캔들 수에 미달.
    ///
    /// 이 경우 엔진은 절대 0으로 채운 번들을 만들어내지 않습니다.
    /// 0 대체 정책이 필요하면 호출자 쪽에서 명시적으로 선택해야
    /// 합니다 ([`crate::analysis::ScoreFallback`] 참고).
    #[error("데이터 부족: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// Strict 정책에서 워밍업이 끝나지 않은 지표를 만남
    #[error("지표가 아직 준비되지 않았습니다: {indicator}")]
    IndicatorNotReady { indicator: &'static str },

    /// 잘못된 점수 설정
    #[error("잘못된 점수 설정: {0}")]
    InvalidConfig(String),

    /// 지표 계산 실패 (데이터 부족 이외의 오류)
    #[error("지표 계산 실패: {0}")]
    Indicator(#[from] IndicatorError),
}

/// 점수 계산 결과 타입.
pub type ScoringResult<T> = Result<T, ScoringError>;

/// 추세 방향 분류.
///
/// 추세 부분 점수만으로 결정됩니다: 0.75 이상이면 Bullish, 0.25
/// 이하면 Bearish, 그 사이는 Neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    /// 상승 추세
    Bullish,
    /// 하락 추세
    Bearish,
    /// 중립
    Neutral,
}

impl TrendDirection {
    /// 추세 부분 점수로부터 방향을 분류합니다.
    pub fn from_score(trend_score: Decimal) -> Self {
        if trend_score >= dec!(0.75) {
            TrendDirection::Bullish
        } else if trend_score <= dec!(0.25) {
            TrendDirection::Bearish
        } else {
            TrendDirection::Neutral
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Bullish => write!(f, "Bullish"),
            TrendDirection::Bearish => write!(f, "Bearish"),
            TrendDirection::Neutral => write!(f, "Neutral"),
        }
    }
}

/// 한 시리즈에 대한 점수 번들.
///
/// 고정된 형태의 값 객체입니다. 생성 후 변경되지 않으며 입력 시리즈에
/// 대한 참조를 갖지 않습니다. 모든 수치는 [0, 1] 범위의 분수이고,
/// 퍼센트 표기는 호출자의 표시 단계에서만 적용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBundle {
    /// 종합 점수 (부분 점수의 가중 합)
    pub composite: Decimal,
    /// 추세 부분 점수 {0, 0.5, 1}
    pub trend: Decimal,
    /// 모멘텀 부분 점수 {0, 1/3, 2/3, 1}
    pub momentum: Decimal,
    /// 거래량 부분 점수 {0, 0.5, 1}
    pub volume: Decimal,
    /// 추세 방향
    pub direction: TrendDirection,
    /// 반전 확률 추정치
    ///
    /// 최근 구간의 RSI가 과매수/과매도 영역에 머문 비율을 임박한
    /// 반전의 대용 지표로 쓰는 휴리스틱이며, 통계적으로 보정된
    /// 확률이 아닙니다.
    pub reversal_probability: Decimal,
}

impl ScoreBundle {
    /// 중립 번들 (모든 점수 0, 방향 Neutral).
    ///
    /// 점수 계산 실패 시의 대체값으로 호출자 계층에서만 사용합니다.
    pub fn neutral() -> Self {
        Self {
            composite: Decimal::ZERO,
            trend: Decimal::ZERO,
            momentum: Decimal::ZERO,
            volume: Decimal::ZERO,
            direction: TrendDirection::Neutral,
            reversal_probability: Decimal::ZERO,
        }
    }
}

/// 최근 구간 RSI 기반 반전 확률 계산.
///
/// 마지막 `lookback`개 바의 RSI 중 정의된 값들을 보고, 과매도
/// (`oversold` 미만) 또는 과매수(`overbought` 초과)인 비율을
/// 반환합니다. 정의된 값이 하나도 없으면 0을 반환합니다.
pub fn reversal_probability(
    rsi: &[Option<Decimal>],
    lookback: usize,
    oversold: Decimal,
    overbought: Decimal,
) -> Decimal {
    let start = rsi.len().saturating_sub(lookback);
    let recent: Vec<Decimal> = rsi[start..].iter().filter_map(|v| *v).collect();

    if recent.is_empty() {
        return Decimal::ZERO;
    }

    let extreme = recent
        .iter()
        .filter(|&&value| value < oversold || value > overbought)
        .count();

    Decimal::from(extreme) / Decimal::from(recent.len())
}

/// TMV 점수 계산기.
///
/// 공유 가변 상태가 없는 순수 계산기입니다. 설정은 생성 시 한 번
/// 검증되며 이후 변경되지 않습니다.
#[derive(Debug, Default)]
pub struct TmvScorer {
    engine: IndicatorEngine,
    config: ScoringConfig,
}

impl TmvScorer {
    /// 주어진 설정으로 계산기를 생성합니다.
    ///
    /// # 에러
    ///
    /// 가중치 합이 1이 아니거나 범위가 잘못된 설정이면
    /// [`ScoringError::InvalidConfig`]를 반환합니다.
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        config
            .validate()
            .map_err(|e| ScoringError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            engine: IndicatorEngine::new(),
            config,
        })
    }

    /// 현재 설정.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 바 시리즈 하나를 점수화합니다.
    ///
    /// # 에러
    ///
    /// - 시리즈가 `min_bars` 미만이면 [`ScoringError::InsufficientData`]
    /// - Strict 정책에서 워밍업 미완료 지표를 만나면
    ///   [`ScoringError::IndicatorNotReady`]
    /// - 지표 계산 자체가 실패하면 [`ScoringError::Indicator`] (0으로
    ///   대체하지 않습니다)
    ///
    /// 성공 시 모든 필드가 채워진 번들을 반환합니다. 부분적으로만
    /// 채워진 번들은 존재하지 않습니다.
    pub fn score(&self, series: &BarSeries) -> ScoringResult<ScoreBundle> {
        let provided = series.len();
        let required = self.config.min_bars;

        if provided < required {
            return Err(ScoringError::InsufficientData { required, provided });
        }

        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let last_close = series
            .last()
            .map(|c| c.close)
            .ok_or(ScoringError::InsufficientData { required, provided })?;

        // 추세: EMA 교차 + SuperTrend 밴드 위치
        let fast_ema = self.latest(self.engine.ema(
            &closes,
            EmaParams {
                period: FAST_EMA_PERIOD,
            },
        ))?;
        let slow_ema = self.latest(self.engine.ema(
            &closes,
            EmaParams {
                period: SLOW_EMA_PERIOD,
            },
        ))?;
        let ema_cross = match (fast_ema, slow_ema) {
            (Some(fast), Some(slow)) => Some(fast > slow),
            _ => None,
        };

        let band = match self
            .engine
            .supertrend(&highs, &lows, &closes, SuperTrendParams::default())
        {
            Ok(values) => values.last().and_then(|r| r.value),
            Err(IndicatorError::InsufficientData { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        let above_band = band.map(|value| last_close > value);

        let trend = (self.signal(ema_cross, "EMA")? + self.signal(above_band, "SuperTrend")?)
            / dec!(2);

        // 모멘텀: MACD 교차 + RSI 기준선 + ADX 추세 강도
        let macd_cross = match self.engine.macd(&closes, MacdParams::default()) {
            Ok(values) => values
                .last()
                .and_then(|r| match (r.macd, r.signal) {
                    (Some(macd), Some(signal)) => Some(macd > signal),
                    _ => None,
                }),
            Err(IndicatorError::InsufficientData { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let rsi_series = match self.engine.rsi(&closes, RsiParams::default()) {
            Ok(values) => values,
            Err(IndicatorError::InsufficientData { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let rsi_bullish = rsi_series
            .last()
            .copied()
            .flatten()
            .map(|rsi| rsi > RSI_MIDLINE);

        let adx_trending = match self
            .engine
            .adx(&highs, &lows, &closes, AdxParams::default())
        {
            Ok(values) => values
                .last()
                .and_then(|r| r.adx)
                .map(|adx| adx > self.config.adx_trend_threshold),
            Err(IndicatorError::InsufficientData { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let momentum = (self.signal(macd_cross, "MACD")?
            + self.signal(rsi_bullish, "RSI")?
            + self.signal(adx_trending, "ADX")?)
            / dec!(3);

        // 거래량: OBV 증가 + MFI 기준선
        let obv_rising = match self.engine.obv(&closes, &volumes, ObvParams::default()) {
            Ok(values) => values.last().map(|r| r.change.is_positive_value()),
            Err(IndicatorError::InsufficientData { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let mfi_bullish = self
            .latest(
                self.engine
                    .mfi(&highs, &lows, &closes, &volumes, MfiParams::default()),
            )?
            .map(|mfi| mfi > MFI_MIDLINE);

        let volume = (self.signal(obv_rising, "OBV")? + self.signal(mfi_bullish, "MFI")?)
            / dec!(2);

        // 종합 점수 및 분류
        let composite = trend * self.config.trend_weight
            + momentum * self.config.momentum_weight
            + volume * self.config.volume_weight;

        let direction = TrendDirection::from_score(trend);

        let reversal = reversal_probability(
            &rsi_series,
            self.config.reversal_lookback,
            self.config.rsi_oversold,
            self.config.rsi_overbought,
        );

        Ok(ScoreBundle {
            composite,
            trend,
            momentum,
            volume,
            direction,
            reversal_probability: reversal,
        })
    }

    /// 지표 결과에서 가장 최근 값을 꺼냅니다.
    ///
    /// 데이터 부족으로 계산 자체가 거부된 경우는 워밍업 미완료와
    /// 동일하게 None으로 취급합니다. 그 외의 오류는 그대로
    /// 전파합니다.
    fn latest(
        &self,
        result: Result<Vec<Option<Decimal>>, IndicatorError>,
    ) -> ScoringResult<Option<Decimal>> {
        match result {
            Ok(values) => Ok(values.last().copied().flatten()),
            Err(IndicatorError::InsufficientData { .. }) => Ok(None),
            Err(e) => Err(ScoringError::Indicator(e)),
        }
    }

    /// 시그널 조건을 0/1 점수로 변환합니다.
    ///
    /// 조건이 미정(지표 워밍업 미완료)이면 설정된 정책을 따릅니다:
    /// `TreatAsZero`는 0점, `Strict`는 에러.
    fn signal(
        &self,
        condition: Option<bool>,
        indicator: &'static str,
    ) -> ScoringResult<Decimal> {
        match condition {
            Some(true) => Ok(Decimal::ONE),
            Some(false) => Ok(Decimal::ZERO),
            None => match self.config.warmup_policy {
                WarmupPolicy::TreatAsZero => Ok(Decimal::ZERO),
                WarmupPolicy::Strict => Err(ScoringError::IndicatorNotReady { indicator }),
            },
        }
    }
}
