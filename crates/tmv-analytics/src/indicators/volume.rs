//! 거래량 기반 지표 (Volume-Based Indicators).
//!
//! ## OBV (On-Balance Volume)
//!
//! 거래량 누적 합계로 자금 흐름의 방향을 추적합니다.
//! - 종가 상승: OBV += 거래량
//! - 종가 하락: OBV -= 거래량
//! - 종가 동일: OBV 변화 없음
//!
//! ## MFI (Money Flow Index)
//!
//! 거래량으로 가중한 RSI 변형으로, 0~100 범위에서 매수/매도 압력을
//! 측정합니다.
//! - 대표가 = (고가 + 저가 + 종가) / 3
//! - 자금 흐름 = 대표가 × 거래량
//! - MFI = 100 × 양의 흐름 / (양의 흐름 + 음의 흐름)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// OBV 파라미터.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ObvParams {
    /// 초기값 (기본: 0).
    pub initial_value: Decimal,
}

/// OBV 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObvResult {
    /// OBV 값.
    pub obv: Decimal,
    /// OBV 변화량 (직전 바 대비).
    pub change: Decimal,
}

/// MFI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MfiParams {
    /// MFI 기간 (기본: 14).
    pub period: usize,
}

impl Default for MfiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 거래량 지표 계산기.
#[derive(Debug, Default)]
pub struct VolumeIndicators;

impl VolumeIndicators {
    /// 새로운 거래량 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

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
        if close.len() != volume.len() {
            return Err(IndicatorError::InvalidParameter(
                "종가와 거래량 데이터의 길이가 일치하지 않습니다".to_string(),
            ));
        }

        if close.is_empty() {
            return Err(IndicatorError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let mut result = Vec::with_capacity(close.len());
        let mut current_obv = params.initial_value;

        for i in 0..close.len() {
            let change = if i == 0 {
                // 첫 번째 바는 변화 없음
                Decimal::ZERO
            } else {
                let price_change = close[i] - close[i - 1];

                if price_change > Decimal::ZERO {
                    volume[i]
                } else if price_change < Decimal::ZERO {
                    -volume[i]
                } else {
                    Decimal::ZERO
                }
            };

            current_obv += change;

            result.push(ObvResult {
                obv: current_obv,
                change,
            });
        }

        Ok(result)
    }

    /// MFI (Money Flow Index) 계산.
    ///
    /// 대표가가 직전 바보다 오르면 그 바의 자금 흐름을 양으로, 내리면
    /// 음으로 분류한 뒤 period 구간의 비율을 취합니다. 대표가가 같은
    /// 바는 어느 쪽에도 더하지 않습니다.
    ///
    /// # 인자
    /// * `high` - 고가 데이터
    /// * `low` - 저가 데이터
    /// * `close` - 종가 데이터
    /// * `volume` - 거래량 데이터
    /// * `params` - MFI 파라미터
    ///
    /// # 반환
    /// 0-100 사이의 MFI 값들 (처음 period개는 None)
    pub fn mfi(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        volume: &[Decimal],
        params: MfiParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if high.len() != low.len() || high.len() != close.len() || high.len() != volume.len() {
            return Err(IndicatorError::InvalidParameter(
                "고가, 저가, 종가, 거래량 데이터의 길이가 일치하지 않습니다".to_string(),
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

        // 대표가 및 부호별 자금 흐름 (i >= 1)
        let mut positive_flow = vec![Decimal::ZERO; len];
        let mut negative_flow = vec![Decimal::ZERO; len];

        let typical = |i: usize| (high[i] + low[i] + close[i]) / dec!(3);

        for i in 1..len {
            let tp = typical(i);
            let prev_tp = typical(i - 1);
            let flow = tp * volume[i];

            if tp > prev_tp {
                positive_flow[i] = flow;
            } else if tp < prev_tp {
                negative_flow[i] = flow;
            }
        }

        let mut result = Vec::with_capacity(len);

        for i in 0..len {
            if i < period {
                result.push(None);
                continue;
            }

            let start = i + 1 - period;
            let positive: Decimal = positive_flow[start..=i].iter().sum();
            let negative: Decimal = negative_flow[start..=i].iter().sum();
            let total = positive + negative;

            if total == Decimal::ZERO {
                // 구간 내 대표가 변동이 전혀 없으면 중립값
                result.push(Some(dec!(50)));
            } else {
                result.push(Some(dec!(100) * positive / total));
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_close_volume() -> (Vec<Decimal>, Vec<Decimal>) {
        let close = vec![
            dec!(100.0),
            dec!(102.0), // 상승
            dec!(101.0), // 하락
            dec!(103.0), // 상승
            dec!(103.0), // 동일
            dec!(102.0), // 하락
            dec!(104.0), // 상승
        ];

        let volume = vec![
            dec!(1000.0),
            dec!(1500.0),
            dec!(1200.0),
            dec!(1800.0),
            dec!(1000.0),
            dec!(1300.0),
            dec!(2000.0),
        ];

        (close, volume)
    }

    #[test]
    fn test_obv_calculation() {
        let indicator = VolumeIndicators::new();
        let (close, volume) = sample_close_volume();

        let obv = indicator.obv(&close, &volume, ObvParams::default()).unwrap();

        assert_eq!(obv.len(), close.len());

        // 첫 번째는 변화 없음
        assert_eq!(obv[0].change, Decimal::ZERO);

        // 두 번째는 가격 상승 -> 거래량 추가
        assert_eq!(obv[1].change, dec!(1500));
        assert_eq!(obv[1].obv, dec!(1500));

        // 세 번째는 가격 하락 -> 거래량 차감
        assert_eq!(obv[2].change, dec!(-1200));
        assert_eq!(obv[2].obv, dec!(300));

        // 다섯 번째는 가격 동일 -> 변화 없음
        assert_eq!(obv[4].change, Decimal::ZERO);
        assert_eq!(obv[4].obv, dec!(2100));
    }

    #[test]
    fn test_obv_with_custom_initial() {
        let indicator = VolumeIndicators::new();
        let (close, volume) = sample_close_volume();

        let obv = indicator
            .obv(
                &close,
                &volume,
                ObvParams {
                    initial_value: dec!(10000),
                },
            )
            .unwrap();

        // 초기값이 반영되어야 함
        assert_eq!(obv[0].obv, dec!(10000));
        assert_eq!(obv[1].obv, dec!(11500));
    }

    #[test]
    fn test_obv_empty_data() {
        let indicator = VolumeIndicators::new();
        let close: Vec<Decimal> = vec![];
        let volume: Vec<Decimal> = vec![];

        let result = indicator.obv(&close, &volume, ObvParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_obv_mismatched_length() {
        let indicator = VolumeIndicators::new();
        let close = vec![dec!(100.0), dec!(101.0)];
        let volume = vec![dec!(1000.0)];

        let result = indicator.obv(&close, &volume, ObvParams::default());
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }

    fn rising_ohlcv(count: usize) -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let high: Vec<Decimal> = (0..count).map(|i| Decimal::from(102 + i)).collect();
        let low: Vec<Decimal> = (0..count).map(|i| Decimal::from(98 + i)).collect();
        let close: Vec<Decimal> = (0..count).map(|i| Decimal::from(100 + i)).collect();
        let volume: Vec<Decimal> = (0..count).map(|i| Decimal::from(1000 + 10 * i)).collect();
        (high, low, close, volume)
    }

    #[test]
    fn test_mfi_warmup_is_none() {
        let indicator = VolumeIndicators::new();
        let (high, low, close, volume) = rising_ohlcv(20);

        let mfi = indicator
            .mfi(&high, &low, &close, &volume, MfiParams { period: 14 })
            .unwrap();

        assert_eq!(mfi.len(), 20);
        assert!(mfi[13].is_none());
        assert!(mfi[14].is_some());
    }

    #[test]
    fn test_mfi_all_buying_pressure() {
        let indicator = VolumeIndicators::new();
        let (high, low, close, volume) = rising_ohlcv(20);

        let mfi = indicator
            .mfi(&high, &low, &close, &volume, MfiParams::default())
            .unwrap();

        // 대표가가 계속 오르면 음의 흐름이 없어 MFI = 100
        assert_eq!(mfi.last().copied().flatten(), Some(dec!(100)));
    }

    #[test]
    fn test_mfi_flat_market_is_neutral() {
        let indicator = VolumeIndicators::new();
        let count = 20;
        let high = vec![dec!(101); count];
        let low = vec![dec!(99); count];
        let close = vec![dec!(100); count];
        let volume = vec![dec!(1000); count];

        let mfi = indicator
            .mfi(&high, &low, &close, &volume, MfiParams::default())
            .unwrap();

        // 대표가 변동이 없으면 중립값 50
        assert_eq!(mfi.last().copied().flatten(), Some(dec!(50)));
    }

    #[test]
    fn test_mfi_range() {
        let indicator = VolumeIndicators::new();
        let (high, low, close, volume) = rising_ohlcv(30);

        let mfi = indicator
            .mfi(&high, &low, &close, &volume, MfiParams::default())
            .unwrap();

        for value in mfi.iter().flatten() {
            assert!(*value >= Decimal::ZERO);
            assert!(*value <= dec!(100));
        }
    }

    #[test]
    fn test_mfi_insufficient_data() {
        let indicator = VolumeIndicators::new();
        let (high, low, close, volume) = rising_ohlcv(10);

        let result = indicator.mfi(&high, &low, &close, &volume, MfiParams { period: 14 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 15, .. })
        ));
    }
}
