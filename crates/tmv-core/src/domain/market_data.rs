//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 점수 계산의 입력이 되는 시장 데이터 타입을 정의합니다:
//! - `Candle` - 정제된 OHLCV 캔들
//! - `RawCandle` - 브로커리지 응답 그대로의 느슨한 형식 캔들
//! - `BarSeries` - 한 종목/한 타임프레임의 정렬된 캔들 시리즈
//!
//! 브로커리지 과거 캔들 API는 필드 타입이 일정하지 않은 JSON 행을
//! 반환할 수 있으므로, `RawCandle` → `Candle` 변환 단계에서 숫자 강제
//! 변환과 타임스탬프 파싱을 수행하고 실패한 바는 통째로 제외합니다.
//! 기본값으로 대체하지 않습니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::{Price, Quantity, Symbol, Timeframe};

/// 개별 바 검증 실패.
///
/// 국소적이고 복구 가능한 에러입니다. 해당 바만 제외하고 계속 진행합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBarError {
    /// 타임스탬프를 시점으로 해석할 수 없음
    #[error("타임스탬프를 해석할 수 없습니다: {0}")]
    Timestamp(String),

    /// 필수 필드를 숫자로 변환할 수 없음
    #[error("{field} 필드를 숫자로 변환할 수 없습니다")]
    NonNumeric { field: &'static str },

    /// 필드 값이 유효 범위를 벗어남 (가격은 양수, 거래량은 0 이상)
    #[error("{field} 값이 유효 범위를 벗어났습니다: {value}")]
    OutOfRange { field: &'static str, value: Decimal },
}

/// 정제된 OHLCV 캔들.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시간
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 캔들 몸통 크기(절대값)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 대표가((고가 + 저가 + 종가) / 3)를 반환합니다. MFI 계산에 사용됩니다.
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }
}

/// 브로커리지 응답 그대로의 느슨한 형식 캔들.
///
/// 필드 타입을 보장하지 않습니다. 숫자가 문자열로 오거나 null이 섞여
/// 있을 수 있으며, [`RawCandle::parse`]가 강제 변환을 시도합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandle {
    /// 캔들 시작 시간 (문자열)
    pub date: String,
    /// 시가
    pub open: Value,
    /// 고가
    pub high: Value,
    /// 저가
    pub low: Value,
    /// 종가
    pub close: Value,
    /// 거래량
    pub volume: Value,
}

impl RawCandle {
    /// 느슨한 형식의 바를 검증하고 `Candle`로 변환합니다.
    ///
    /// # 에러
    ///
    /// 타임스탬프 파싱 실패, 숫자 변환 실패, 범위 위반 시
    /// [`InvalidBarError`]를 반환합니다. 호출자는 해당 바를 제외하고
    /// 계속 진행해야 합니다.
    pub fn parse(&self) -> Result<Candle, InvalidBarError> {
        let timestamp = parse_timestamp(&self.date)?;

        let open = coerce_price(&self.open, "open")?;
        let high = coerce_price(&self.high, "high")?;
        let low = coerce_price(&self.low, "low")?;
        let close = coerce_price(&self.close, "close")?;
        let volume = coerce_decimal(&self.volume, "volume")?;

        if volume < Decimal::ZERO {
            return Err(InvalidBarError::OutOfRange {
                field: "volume",
                value: volume,
            });
        }

        Ok(Candle::new(timestamp, open, high, low, close, volume))
    }
}

/// JSON 값을 Decimal로 강제 변환합니다.
fn coerce_decimal(value: &Value, field: &'static str) -> Result<Decimal, InvalidBarError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Decimal::from(u))
            } else if let Some(f) = n.as_f64() {
                Decimal::from_f64_retain(f).ok_or(InvalidBarError::NonNumeric { field })
            } else {
                Err(InvalidBarError::NonNumeric { field })
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| InvalidBarError::NonNumeric { field }),
        _ => Err(InvalidBarError::NonNumeric { field }),
    }
}

/// 가격 필드를 강제 변환하고 양수인지 확인합니다.
fn coerce_price(value: &Value, field: &'static str) -> Result<Decimal, InvalidBarError> {
    let price = coerce_decimal(value, field)?;
    if price <= Decimal::ZERO {
        return Err(InvalidBarError::OutOfRange {
            field,
            value: price,
        });
    }
    Ok(price)
}

/// 브로커리지가 쓰는 몇 가지 타임스탬프 표기를 순서대로 시도합니다.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, InvalidBarError> {
    let s = s.trim();

    // RFC3339 (예: 2024-01-01T09:15:00+05:30)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // 콜론 없는 오프셋 (예: 2024-01-01T09:15:00+0530)
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    // 오프셋 없는 일시는 UTC로 간주
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    // 날짜만 있는 일봉 표기
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    Err(InvalidBarError::Timestamp(s.to_string()))
}

/// 한 종목/한 타임프레임의 정렬된 캔들 시리즈.
///
/// 불변식: 생성 후 캔들은 타임스탬프 오름차순이며(동일 시각은 입력 순서
/// 유지), 모든 필드는 유효한 숫자입니다. 이를 보장하기 위해 캔들 목록은
/// 생성자를 통해서만 설정됩니다.
#[derive(Debug, Clone, Serialize)]
pub struct BarSeries {
    symbol: Symbol,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl BarSeries {
    /// 정제된 캔들로부터 시리즈를 생성합니다. 타임스탬프 기준으로
    /// 안정 정렬합니다.
    pub fn new(symbol: Symbol, timeframe: Timeframe, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        Self {
            symbol,
            timeframe,
            candles,
        }
    }

    /// 느슨한 형식의 바 목록을 정제하여 시리즈를 생성합니다.
    ///
    /// 검증에 실패한 바는 제외하고 계속 진행합니다. 제외된 바는
    /// debug 레벨로 기록됩니다.
    pub fn from_raw(symbol: Symbol, timeframe: Timeframe, raw: &[RawCandle]) -> Self {
        let mut candles = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;

        for bar in raw {
            match bar.parse() {
                Ok(candle) => candles.push(candle),
                Err(error) => {
                    dropped += 1;
                    tracing::debug!(%symbol, %timeframe, %error, "유효하지 않은 바 제외");
                }
            }
        }

        if dropped > 0 {
            tracing::debug!(%symbol, %timeframe, dropped, total = raw.len(), "바 정제 완료");
        }

        Self::new(symbol, timeframe, candles)
    }

    /// 종목 심볼.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// 타임프레임.
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// 캔들 개수.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// 시리즈가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// 전체 캔들 슬라이스.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// 가장 최근 캔들.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// 종가 열.
    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// 고가 열.
    pub fn highs(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.high).collect()
    }

    /// 저가 열.
    pub fn lows(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.low).collect()
    }

    /// 거래량 열.
    pub fn volumes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}
