//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간 (기본: 8, 빠른 추세선).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 8 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k))
    /// k = 2 / (period + 1)
    ///
    /// 첫 EMA는 처음 period개의 단순 평균으로 시작합니다.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - EMA 파라미터
    ///
    /// # 반환
    /// 각 시점의 EMA 값 (처음 period-1개는 None)
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let mut result = Vec::with_capacity(prices.len());
        let multiplier = dec!(2) / Decimal::from(period + 1);

        // 처음 period-1개는 None
        for _ in 0..period - 1 {
            result.push(None);
        }

        // 첫 EMA는 SMA로 시작
        let initial_sma: Decimal = prices[..period].iter().sum::<Decimal>() / Decimal::from(period);
        result.push(Some(initial_sma));

        // 이후 EMA 계산
        let mut prev_ema = initial_sma;
        for price in prices.iter().skip(period) {
            let ema = (*price * multiplier) + (prev_ema * (Decimal::ONE - multiplier));
            result.push(Some(ema));
            prev_ema = ema;
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - MACD 파라미터
    ///
    /// # 반환
    /// 각 시점의 MACD, 시그널, 히스토그램 값
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        let min_required = params.slow_period + params.signal_period;

        if prices.len() < min_required {
            return Err(IndicatorError::InsufficientData {
                required: min_required,
                provided: prices.len(),
            });
        }

        // 단기, 장기 EMA 계산
        let fast_ema = self.ema(
            prices,
            EmaParams {
                period: params.fast_period,
            },
        )?;
        let slow_ema = self.ema(
            prices,
            EmaParams {
                period: params.slow_period,
            },
        )?;

        // MACD 라인 계산
        let mut macd_line: Vec<Option<Decimal>> = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            match (fast_ema[i], slow_ema[i]) {
                (Some(fast), Some(slow)) => macd_line.push(Some(fast - slow)),
                _ => macd_line.push(None),
            }
        }

        // 시그널 라인 계산 (MACD 라인의 EMA)
        let macd_values: Vec<Decimal> = macd_line.iter().flatten().copied().collect();
        let signal_ema = if macd_values.len() >= params.signal_period {
            self.ema(
                &macd_values,
                EmaParams {
                    period: params.signal_period,
                },
            )?
        } else {
            vec![None; macd_values.len()]
        };

        // 결과 조합
        let mut result = Vec::with_capacity(prices.len());
        let mut signal_idx = 0;

        for macd_val in macd_line.iter() {
            if macd_val.is_some() {
                let signal = signal_ema.get(signal_idx).copied().flatten();
                let histogram = match (*macd_val, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                };

                result.push(MacdResult {
                    macd: *macd_val,
                    signal,
                    histogram,
                });
                signal_idx += 1;
            } else {
                result.push(MacdResult {
                    macd: None,
                    signal: None,
                    histogram: None,
                });
            }
        }

        Ok(result)
    }
}
