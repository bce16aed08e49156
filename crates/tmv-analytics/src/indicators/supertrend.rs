//! SuperTrend 지표.
//!
//! ATR 기반 추세 추종 밴드입니다. 가격이 밴드 위에 있으면 상승 추세,
//! 아래에 있으면 하락 추세로 봅니다.
//!
//! ## 계산 방식
//! 1. 기본 밴드 = (고가 + 저가) / 2 ± (배수 × ATR)
//! 2. 직전 밴드와 종가를 기준으로 상단/하단 밴드 확정
//! 3. 추세 방향에 따라 하단(상승) 또는 상단(하락) 밴드를 출력

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SuperTrend 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuperTrendParams {
    /// ATR 기간 (기본: 7).
    pub atr_period: usize,
    /// ATR 배수 (기본: 3.0).
    pub multiplier: Decimal,
}

impl Default for SuperTrendParams {
    fn default() -> Self {
        Self {
            atr_period: 7,
            multiplier: dec!(3.0),
        }
    }
}

/// SuperTrend 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuperTrendResult {
    /// SuperTrend 밴드 값 (ATR 워밍업 전에는 None).
    pub value: Option<Decimal>,
    /// 추세 방향 (true: 상승, false: 하락).
    pub is_uptrend: bool,
}

/// SuperTrend 계산기.
#[derive(Debug, Default)]
pub struct SuperTrendIndicator;

impl SuperTrendIndicator {
    /// 새로운 SuperTrend 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// SuperTrend 지표 계산.
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `params` - SuperTrend 파라미터
    ///
    /// # 반환
    /// 각 시점의 SuperTrend 밴드 값과 추세 방향
    pub fn calculate(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: SuperTrendParams,
    ) -> IndicatorResult<Vec<SuperTrendResult>> {
        if high.len() != low.len() || high.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(
                "고가, 저가, 종가 데이터의 길이가 일치하지 않습니다".to_string(),
            ));
        }

        if high.len() < params.atr_period {
            return Err(IndicatorError::InsufficientData {
                required: params.atr_period,
                provided: high.len(),
            });
        }

        if params.multiplier <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(
                "배수는 0보다 커야 합니다".to_string(),
            ));
        }

        let atr = self.calculate_atr(high, low, close, params.atr_period)?;

        let mut result = Vec::with_capacity(high.len());
        let mut prev_upper_band = Decimal::ZERO;
        let mut prev_lower_band = Decimal::ZERO;
        let mut prev_supertrend = Decimal::ZERO;
        let mut seen_first = false;

        for i in 0..high.len() {
            let atr_val = match atr[i] {
                Some(v) => v,
                None => {
                    result.push(SuperTrendResult {
                        value: None,
                        is_uptrend: true,
                    });
                    continue;
                }
            };

            let hl_avg = (high[i] + low[i]) / dec!(2);

            // 기본 밴드 계산
            let basic_upper = hl_avg + params.multiplier * atr_val;
            let basic_lower = hl_avg - params.multiplier * atr_val;

            // 최종 밴드 계산 (직전 종가 기준 조정)
            let final_upper = if !seen_first
                || basic_upper < prev_upper_band
                || (i > 0 && close[i - 1] > prev_upper_band)
            {
                basic_upper
            } else {
                prev_upper_band
            };

            let final_lower = if !seen_first
                || basic_lower > prev_lower_band
                || (i > 0 && close[i - 1] < prev_lower_band)
            {
                basic_lower
            } else {
                prev_lower_band
            };

            // 추세 방향 결정
            let is_uptrend = if !seen_first {
                close[i] > hl_avg
            } else if prev_supertrend == prev_upper_band {
                close[i] <= final_upper
            } else {
                close[i] >= final_lower
            };

            let supertrend = if is_uptrend { final_lower } else { final_upper };

            result.push(SuperTrendResult {
                value: Some(supertrend),
                is_uptrend,
            });

            // 다음 반복을 위한 상태 저장
            prev_upper_band = final_upper;
            prev_lower_band = final_lower;
            prev_supertrend = supertrend;
            seen_first = true;
        }

        Ok(result)
    }

    /// ATR (Average True Range) 계산.
    ///
    /// 첫 ATR은 처음 period개 TR의 단순 평균이고 이후는 EMA 방식으로
    /// 이어갑니다.
    fn calculate_atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        period: usize,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let mut tr_values = Vec::with_capacity(high.len());

        // True Range 계산
        for i in 0..high.len() {
            let tr = if i == 0 {
                high[i] - low[i]
            } else {
                let hl = high[i] - low[i];
                let hc = (high[i] - close[i - 1]).abs();
                let lc = (low[i] - close[i - 1]).abs();
                hl.max(hc).max(lc)
            };
            tr_values.push(tr);
        }

        let mut atr_values = Vec::with_capacity(high.len());
        let multiplier = dec!(2) / Decimal::from(period + 1);
        let mut prev_atr: Option<Decimal> = None;

        for (i, &tr) in tr_values.iter().enumerate() {
            if i + 1 < period {
                atr_values.push(None);
            } else if i + 1 == period {
                // 첫 ATR은 단순 평균
                let sum: Decimal = tr_values[0..period].iter().sum();
                let first = sum / Decimal::from(period);
                prev_atr = Some(first);
                atr_values.push(Some(first));
            } else if let Some(prev) = prev_atr {
                let next = (tr - prev) * multiplier + prev;
                prev_atr = Some(next);
                atr_values.push(Some(next));
            }
        }

        Ok(atr_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_data() -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let high = vec![
            dec!(102.0),
            dec!(104.0),
            dec!(103.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(110.0),
            dec!(112.0),
            dec!(111.0),
            dec!(114.0),
            dec!(116.0),
            dec!(115.0),
        ];

        let low = vec![
            dec!(98.0),
            dec!(100.0),
            dec!(99.0),
            dec!(102.0),
            dec!(104.0),
            dec!(103.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(110.0),
            dec!(112.0),
            dec!(111.0),
        ];

        let close = vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(104.0),
            dec!(106.0),
            dec!(105.0),
            dec!(108.0),
            dec!(110.0),
            dec!(109.0),
            dec!(112.0),
            dec!(114.0),
            dec!(113.0),
        ];

        (high, low, close)
    }

    #[test]
    fn test_supertrend_calculation() {
        let indicator = SuperTrendIndicator::new();
        let (high, low, close) = sample_data();

        let result = indicator
            .calculate(&high, &low, &close, SuperTrendParams::default())
            .unwrap();

        assert_eq!(result.len(), high.len());

        // 처음 몇 개는 ATR 워밍업으로 None
        assert!(result[0].value.is_none());
        assert!(result[5].value.is_none());

        // 워밍업 이후에는 값이 계산됨
        assert!(result[6].value.is_some());
        assert!(result[result.len() - 1].value.is_some());
    }

    #[test]
    fn test_supertrend_uptrend_band_below_price() {
        let indicator = SuperTrendIndicator::new();
        let (high, low, close) = sample_data();

        let result = indicator
            .calculate(&high, &low, &close, SuperTrendParams::default())
            .unwrap();

        // 꾸준한 상승장에서는 밴드가 종가 아래에 위치
        let last = result.last().unwrap();
        assert!(last.is_uptrend);
        assert!(last.value.unwrap() < *close.last().unwrap());
    }

    #[test]
    fn test_supertrend_mostly_uptrend() {
        let indicator = SuperTrendIndicator::new();
        let (high, low, close) = sample_data();

        let result = indicator
            .calculate(&high, &low, &close, SuperTrendParams::default())
            .unwrap();

        let uptrend_count = result.iter().filter(|r| r.is_uptrend).count();
        assert!(uptrend_count > result.len() / 2);
    }

    #[test]
    fn test_atr_calculation() {
        let indicator = SuperTrendIndicator::new();
        let (high, low, close) = sample_data();

        let atr = indicator.calculate_atr(&high, &low, &close, 7).unwrap();

        assert_eq!(atr.len(), high.len());

        // 처음 6개는 None
        for value in atr.iter().take(6) {
            assert!(value.is_none());
        }

        // 7번째부터 값이 있어야 함
        assert!(atr[6].is_some());

        // ATR은 양수여야 함
        for value in atr.iter().flatten() {
            assert!(*value > Decimal::ZERO);
        }
    }

    #[test]
    fn test_mismatched_length_error() {
        let indicator = SuperTrendIndicator::new();
        let high = vec![dec!(100.0), dec!(101.0)];
        let low = vec![dec!(99.0)];
        let close = vec![dec!(100.0), dec!(101.0)];

        let result = indicator.calculate(&high, &low, &close, SuperTrendParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_insufficient_data_error() {
        let indicator = SuperTrendIndicator::new();
        let high = vec![dec!(100.0)];
        let low = vec![dec!(99.0)];
        let close = vec![dec!(100.0)];

        let result = indicator.calculate(&high, &low, &close, SuperTrendParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 7, .. })
        ));
    }

    #[test]
    fn test_invalid_multiplier_error() {
        let indicator = SuperTrendIndicator::new();
        let (high, low, close) = sample_data();

        let result = indicator.calculate(
            &high,
            &low,
            &close,
            SuperTrendParams {
                atr_period: 7,
                multiplier: dec!(-1.0),
            },
        );
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }
}
