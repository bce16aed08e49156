//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 추세 강도를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index)
//! - ADX (Average Directional Index)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// ADX 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdxParams {
    /// ADX 기간 (기본: 14).
    pub period: usize,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// ADX 결과.
///
/// ADX 자체는 DI보다 한 번 더 평활화를 거치므로 워밍업이 깁니다.
/// DI는 period개 바 이후, ADX는 2×period-1개 바 이후부터 정의됩니다.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdxResult {
    /// ADX 값 (0~100, 추세 강도).
    pub adx: Option<Decimal>,
    /// +DI (상승 방향 지표).
    pub di_plus: Option<Decimal>,
    /// -DI (하락 방향 지표).
    pub di_minus: Option<Decimal>,
}

impl AdxResult {
    fn warming_up() -> Self {
        Self {
            adx: None,
            di_plus: None,
            di_minus: None,
        }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 평균에는 EWM (지수 가중 이동평균, alpha = 1/period) 방식을
    /// 사용합니다.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터 (종가)
    /// * `params` - RSI 파라미터
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (처음 period-1개는 None)
    pub fn rsi(
        &self,
        prices: &[Decimal],
        params: RsiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        // 가격 변화 계산
        let mut deltas = Vec::with_capacity(prices.len());
        deltas.push(Decimal::ZERO); // 첫 번째는 변화 없음
        for i in 1..prices.len() {
            deltas.push(prices[i] - prices[i - 1]);
        }

        // 상승/하락 분리
        let gains: Vec<Decimal> = deltas
            .iter()
            .map(|&d| if d > Decimal::ZERO { d } else { Decimal::ZERO })
            .collect();
        let losses: Vec<Decimal> = deltas
            .iter()
            .map(|&d| if d < Decimal::ZERO { d.abs() } else { Decimal::ZERO })
            .collect();

        let alpha = Decimal::ONE / Decimal::from(period);
        let one_minus_alpha = Decimal::ONE - alpha;

        let avg_gains = self.ewm(&gains, alpha, one_minus_alpha, period);
        let avg_losses = self.ewm(&losses, alpha, one_minus_alpha, period);

        // RSI 계산
        let mut result = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            match (avg_gains[i], avg_losses[i]) {
                (Some(gain), Some(loss)) => {
                    if loss == Decimal::ZERO {
                        result.push(Some(dec!(100)));
                    } else {
                        let rs = gain / loss;
                        let rsi = dec!(100) - (dec!(100) / (Decimal::ONE + rs));
                        result.push(Some(rsi));
                    }
                }
                _ => result.push(None),
            }
        }

        Ok(result)
    }

    /// EWM (Exponential Weighted Mean) 계산.
    fn ewm(
        &self,
        values: &[Decimal],
        alpha: Decimal,
        one_minus_alpha: Decimal,
        min_periods: usize,
    ) -> Vec<Option<Decimal>> {
        let mut result = Vec::with_capacity(values.len());

        if values.is_empty() {
            return result;
        }

        let mut ewm_value = values[0];

        for i in 0..values.len() {
            if i < min_periods - 1 {
                result.push(None);
                if i > 0 {
                    ewm_value = (values[i] * alpha) + (ewm_value * one_minus_alpha);
                }
            } else if i == min_periods - 1 {
                // 초기 EWM은 단순 평균으로 시작
                let sum: Decimal = values[..=i].iter().sum();
                ewm_value = sum / Decimal::from(i + 1);
                result.push(Some(ewm_value));
            } else {
                ewm_value = (values[i] * alpha) + (ewm_value * one_minus_alpha);
                result.push(Some(ewm_value));
            }
        }

        result
    }

    /// ADX (Average Directional Index) 계산.
    ///
    /// Wilder 평활화 방식:
    /// 1. 연속된 바에서 +DM, -DM, TR 계산
    /// 2. +DM, -DM, TR을 period 기간으로 Wilder 평활화
    /// 3. +DI = 평활화 +DM / 평활화 TR × 100, -DI도 동일
    /// 4. DX = |+DI - -DI| / (+DI + -DI) × 100
    /// 5. ADX = DX의 Wilder 평활화
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `params` - ADX 파라미터
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
        let period = params.period;

        if high.len() != low.len() || high.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(
                "고가, 저가, 종가 데이터의 길이가 일치하지 않습니다".to_string(),
            ));
        }

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if high.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: high.len(),
            });
        }

        let len = high.len();
        let period_dec = Decimal::from(period);

        // +DM, -DM, TR 계산 (i >= 1)
        let mut plus_dm = vec![Decimal::ZERO; len];
        let mut minus_dm = vec![Decimal::ZERO; len];
        let mut tr = vec![Decimal::ZERO; len];

        for i in 1..len {
            let up_move = high[i] - high[i - 1];
            let down_move = low[i - 1] - low[i];

            if up_move > down_move && up_move > Decimal::ZERO {
                plus_dm[i] = up_move;
            }
            if down_move > up_move && down_move > Decimal::ZERO {
                minus_dm[i] = down_move;
            }

            let hl = high[i] - low[i];
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            tr[i] = hl.max(hc).max(lc);
        }

        let mut result = Vec::with_capacity(len);
        result.push(AdxResult::warming_up());

        let mut smoothed_plus = Decimal::ZERO;
        let mut smoothed_minus = Decimal::ZERO;
        let mut smoothed_tr = Decimal::ZERO;
        let mut adx_value: Option<Decimal> = None;
        let mut dx_sum = Decimal::ZERO;
        let mut dx_count = 0usize;

        for i in 1..len {
            if i <= period {
                // 초기 구간은 단순 합산
                smoothed_plus += plus_dm[i];
                smoothed_minus += minus_dm[i];
                smoothed_tr += tr[i];

                if i < period {
                    result.push(AdxResult::warming_up());
                    continue;
                }
            } else {
                // Wilder 평활화: new = prev - prev/N + current
                smoothed_plus = smoothed_plus - smoothed_plus / period_dec + plus_dm[i];
                smoothed_minus = smoothed_minus - smoothed_minus / period_dec + minus_dm[i];
                smoothed_tr = smoothed_tr - smoothed_tr / period_dec + tr[i];
            }

            let (di_plus, di_minus, dx) = if smoothed_tr > Decimal::ZERO {
                let di_p = smoothed_plus / smoothed_tr * dec!(100);
                let di_m = smoothed_minus / smoothed_tr * dec!(100);
                let di_sum = di_p + di_m;
                let dx = if di_sum > Decimal::ZERO {
                    (di_p - di_m).abs() / di_sum * dec!(100)
                } else {
                    Decimal::ZERO
                };
                (di_p, di_m, dx)
            } else {
                (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
            };

            let adx = match adx_value {
                Some(prev) => {
                    // ADX 자체도 Wilder 평활화
                    let next = (prev * (period_dec - Decimal::ONE) + dx) / period_dec;
                    adx_value = Some(next);
                    Some(next)
                }
                None => {
                    // 첫 ADX는 period개 DX의 단순 평균
                    dx_sum += dx;
                    dx_count += 1;
                    if dx_count == period {
                        let first = dx_sum / period_dec;
                        adx_value = Some(first);
                        Some(first)
                    } else {
                        None
                    }
                }
            };

            result.push(AdxResult {
                adx,
                di_plus: Some(di_plus),
                di_minus: Some(di_minus),
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(109.0),
            dec!(111.0),
            dec!(110.0),
            dec!(112.0),
            dec!(114.0),
            dec!(113.0),
            dec!(115.0),
        ]
    }

    fn rising_ohlc(count: usize) -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let high: Vec<Decimal> = (0..count).map(|i| Decimal::from(102 + i)).collect();
        let low: Vec<Decimal> = (0..count).map(|i| Decimal::from(98 + i)).collect();
        let close: Vec<Decimal> = (0..count).map(|i| Decimal::from(100 + i)).collect();
        (high, low, close)
    }

    #[test]
    fn test_rsi_range() {
        let momentum = MomentumCalculator::new();
        let prices = sample_prices();

        let rsi = momentum.rsi(&prices, RsiParams { period: 14 }).unwrap();

        // RSI 값이 0-100 범위
        for value in rsi.iter().flatten() {
            assert!(*value >= Decimal::ZERO);
            assert!(*value <= dec!(100));
        }
    }

    #[test]
    fn test_rsi_warmup_is_none() {
        let momentum = MomentumCalculator::new();
        let prices = sample_prices();

        let rsi = momentum.rsi(&prices, RsiParams { period: 14 }).unwrap();

        assert_eq!(rsi.len(), prices.len());
        assert!(rsi[0].is_none());
        assert!(rsi[12].is_none());
        assert!(rsi[13].is_some());
    }

    #[test]
    fn test_rsi_bullish_market() {
        let momentum = MomentumCalculator::new();

        // 계속 상승하는 시장
        let prices: Vec<Decimal> = (0..20).map(|i| Decimal::from(100 + i)).collect();

        let rsi = momentum.rsi(&prices, RsiParams { period: 14 }).unwrap();

        // 하락이 전혀 없으면 RSI는 100
        assert_eq!(rsi.last().copied().flatten(), Some(dec!(100)));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let momentum = MomentumCalculator::new();
        let prices = vec![dec!(100.0), dec!(101.0)];

        let result = momentum.rsi(&prices, RsiParams { period: 14 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 15, .. })
        ));
    }

    #[test]
    fn test_adx_warmup_boundaries() {
        let momentum = MomentumCalculator::new();
        let (high, low, close) = rising_ohlc(40);

        let adx = momentum
            .adx(&high, &low, &close, AdxParams { period: 14 })
            .unwrap();

        assert_eq!(adx.len(), 40);

        // DI는 period번째 바부터
        assert!(adx[13].di_plus.is_none());
        assert!(adx[14].di_plus.is_some());

        // ADX는 2×period-1번째 바부터
        assert!(adx[26].adx.is_none());
        assert!(adx[27].adx.is_some());
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let momentum = MomentumCalculator::new();
        let (high, low, close) = rising_ohlc(60);

        let adx = momentum
            .adx(&high, &low, &close, AdxParams { period: 14 })
            .unwrap();

        let last = adx.last().unwrap();

        // 일방향 추세에서는 -DM이 없어 DX = 100, ADX도 높음
        assert!(last.adx.unwrap() > dec!(20));
        assert!(last.di_plus.unwrap() > last.di_minus.unwrap());
    }

    #[test]
    fn test_adx_range() {
        let momentum = MomentumCalculator::new();
        let (high, low, close) = rising_ohlc(60);

        let adx = momentum
            .adx(&high, &low, &close, AdxParams::default())
            .unwrap();

        for entry in adx.iter() {
            if let Some(value) = entry.adx {
                assert!(value >= Decimal::ZERO && value <= dec!(100));
            }
        }
    }

    #[test]
    fn test_adx_mismatched_length() {
        let momentum = MomentumCalculator::new();
        let high = vec![dec!(100.0), dec!(101.0)];
        let low = vec![dec!(99.0)];
        let close = vec![dec!(100.0), dec!(101.0)];

        let result = momentum.adx(&high, &low, &close, AdxParams::default());
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }

    #[test]
    fn test_adx_insufficient_data() {
        let momentum = MomentumCalculator::new();
        let (high, low, close) = rising_ohlc(10);

        let result = momentum.adx(&high, &low, &close, AdxParams { period: 14 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 15, .. })
        ));
    }
}
