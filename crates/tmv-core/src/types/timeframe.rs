//! 캔들 데이터를 위한 타임프레임 정의.
//!
//! 브로커리지 과거 캔들 API가 사용하는 간격 문자열(`15minute`, `day` 등)과
//! 1:1로 대응하는 타임프레임 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 3분봉
    M3,
    /// 5분봉
    M5,
    /// 10분봉
    M10,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 60분봉
    H1,
    /// 일봉
    D1,
}

impl Timeframe {
    /// 이 타임프레임의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::from_secs(60),
            Timeframe::M3 => Duration::from_secs(3 * 60),
            Timeframe::M5 => Duration::from_secs(5 * 60),
            Timeframe::M10 => Duration::from_secs(10 * 60),
            Timeframe::M15 => Duration::from_secs(15 * 60),
            Timeframe::M30 => Duration::from_secs(30 * 60),
            Timeframe::H1 => Duration::from_secs(60 * 60),
            Timeframe::D1 => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// 이 타임프레임의 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }

    /// 이 타임프레임의 분 단위 값을 반환합니다.
    pub fn as_minutes(&self) -> u64 {
        self.as_secs() / 60
    }

    /// 일중(intraday) 타임프레임인지 확인합니다.
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Timeframe::D1)
    }

    /// 브로커리지 간격 문자열로 변환합니다.
    pub fn to_interval(&self) -> &'static str {
        match self {
            Timeframe::M1 => "minute",
            Timeframe::M3 => "3minute",
            Timeframe::M5 => "5minute",
            Timeframe::M10 => "10minute",
            Timeframe::M15 => "15minute",
            Timeframe::M30 => "30minute",
            Timeframe::H1 => "60minute",
            Timeframe::D1 => "day",
        }
    }

    /// 브로커리지 간격 문자열에서 파싱합니다.
    pub fn from_interval(s: &str) -> Option<Self> {
        match s {
            "minute" => Some(Timeframe::M1),
            "3minute" => Some(Timeframe::M3),
            "5minute" => Some(Timeframe::M5),
            "10minute" => Some(Timeframe::M10),
            "15minute" => Some(Timeframe::M15),
            "30minute" => Some(Timeframe::M30),
            "60minute" => Some(Timeframe::H1),
            "day" => Some(Timeframe::D1),
            _ => None,
        }
    }

    /// 스프레드시트 열 이름에 쓰이는 짧은 라벨을 반환합니다 (예: "15m", "1d").
    pub fn short_label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M10 => "10m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_interval())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_interval(s).ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}
