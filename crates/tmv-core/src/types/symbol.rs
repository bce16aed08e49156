//! 심볼 및 거래소 정의.
//!
//! 이 모듈은 분석 대상 종목 관련 타입을 정의합니다:
//! - `Exchange` - 거래소 (NSE, BSE)
//! - `Symbol` - 거래소에 상장된 종목을 나타내는 심볼

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 거래소 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exchange {
    /// National Stock Exchange
    Nse,
    /// Bombay Stock Exchange
    Bse,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::Nse
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exchange::Nse => write!(f, "NSE"),
            Exchange::Bse => write!(f, "BSE"),
        }
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            _ => Err(format!("Unknown exchange: {}", s)),
        }
    }
}

/// 거래소에 상장된 종목을 나타내는 심볼.
///
/// 표준 표기는 `거래소:티커` 형식입니다. 예: `NSE:RELIANCE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// 티커 (예: RELIANCE, HDFCBANK)
    pub ticker: String,
    /// 거래소
    pub exchange: Exchange,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(ticker: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            exchange,
        }
    }

    /// NSE 심볼을 생성합니다.
    pub fn nse(ticker: impl Into<String>) -> Self {
        Self::new(ticker, Exchange::Nse)
    }

    /// BSE 심볼을 생성합니다.
    pub fn bse(ticker: impl Into<String>) -> Self {
        Self::new(ticker, Exchange::Bse)
    }

    /// `거래소:티커` 형식의 표준 문자열을 반환합니다.
    pub fn to_standard_string(&self) -> String {
        format!("{}:{}", self.exchange, self.ticker)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.ticker)
    }
}

impl FromStr for Symbol {
    type Err = String;

    /// `NSE:RELIANCE` 또는 거래소가 생략된 `RELIANCE`(NSE로 간주)를 파싱합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty symbol".to_string());
        }

        match s.split_once(':') {
            Some((exchange, ticker)) => {
                let exchange = exchange.parse::<Exchange>()?;
                if ticker.is_empty() {
                    return Err("Empty ticker".to_string());
                }
                Ok(Symbol::new(ticker, exchange))
            }
            None => Ok(Symbol::nse(s)),
        }
    }
}
