//! 종목 일괄 분석.
//!
//! 오케스트레이션 계층이 미리 조회해 둔 타임프레임별 바 시리즈를 받아
//! 종목별 결과 행을 만듭니다. 행의 형태는 저장소(스프레드시트)의 열
//! 구성과 같습니다: 심볼, 최근 체결가, 등락률, 타임프레임별 TMV
//! 점수/추세 방향/반전 확률. 저장소에 쓰는 일 자체는 이 크레이트의
//! 책임이 아닙니다.
//!
//! 점수 계산에 실패한 종목은 로그를 남기고 건너뛰며, 나머지 종목의
//! 처리를 중단시키지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tmv_core::{BarSeries, DecimalExt, Price, ScoringConfig, Symbol, Timeframe};

use crate::scoring::{ScoreBundle, ScoringResult, TmvScorer};

/// 점수 계산 실패 시의 대체 정책.
///
/// 원본 스크립트 변형들은 실패를 조용히 0점으로 바꾸거나 종목을
/// 건너뛰는 식으로 제각각이었습니다. 여기서는 정책을 호출자가
/// 명시적으로 선택합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFallback {
    /// 실패한 타임프레임을 결과에서 제외 (기본)
    Skip,
    /// 중립 번들(점수 0, 방향 Neutral)로 대체
    Neutral,
}

impl Default for ScoreFallback {
    fn default() -> Self {
        Self::Skip
    }
}

/// 한 종목에 대한 입력: 타임프레임별 바 시리즈 묶음.
#[derive(Debug, Clone)]
pub struct SymbolFrames {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 타임프레임별 시리즈 (조회는 호출자 책임)
    pub frames: Vec<BarSeries>,
}

impl SymbolFrames {
    /// 새 입력 묶음을 생성합니다.
    pub fn new(symbol: Symbol, frames: Vec<BarSeries>) -> Self {
        Self { symbol, frames }
    }
}

/// 타임프레임 하나의 점수.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameScore {
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 점수 번들
    pub bundle: ScoreBundle,
}

/// 한 종목의 분석 결과 행.
///
/// 열 이름 드리프트를 막기 위해 열린 맵이 아니라 고정 필드 구조체로
/// 표현합니다.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRow {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 최근 체결가 (기준 시리즈의 마지막 종가)
    pub last_price: Price,
    /// 직전 바 대비 등락률 (분수, 바가 하나뿐이면 None)
    pub change: Option<Decimal>,
    /// 타임프레임별 점수
    pub frames: Vec<FrameScore>,
}

impl AnalysisRow {
    /// 표시용 등락률 문자열 (예: "1.27%").
    ///
    /// 엔진 경계의 값은 분수이고, 퍼센트 표기는 여기서만 적용합니다.
    pub fn change_display(&self) -> Option<String> {
        self.change.map(|c| c.to_percentage_string())
    }
}

/// 종목 일괄 분석기.
pub struct BatchAnalyzer {
    scorer: TmvScorer,
    fallback: ScoreFallback,
}

impl BatchAnalyzer {
    /// 주어진 설정과 대체 정책으로 분석기를 생성합니다.
    pub fn new(config: ScoringConfig, fallback: ScoreFallback) -> ScoringResult<Self> {
        Ok(Self {
            scorer: TmvScorer::new(config)?,
            fallback,
        })
    }

    /// 기본 설정(Skip 정책)으로 분석기를 생성합니다.
    pub fn with_defaults() -> Self {
        Self {
            scorer: TmvScorer::default(),
            fallback: ScoreFallback::default(),
        }
    }

    /// 여러 종목을 일괄 분석합니다.
    ///
    /// 한 종목의 실패가 나머지 종목의 처리를 중단시키지 않습니다.
    pub fn analyze(&self, items: &[SymbolFrames]) -> Vec<AnalysisRow> {
        items
            .iter()
            .filter_map(|item| self.analyze_symbol(item))
            .collect()
    }

    /// 한 종목을 분석합니다.
    ///
    /// 기준 시리즈(일봉이 있으면 일봉, 없으면 첫 시리즈)에서 최근
    /// 체결가와 등락률을 구하고, 각 타임프레임을 점수화합니다.
    /// 행을 만들 수 없으면(시리즈가 없거나 전부 실패) None을
    /// 반환합니다.
    pub fn analyze_symbol(&self, item: &SymbolFrames) -> Option<AnalysisRow> {
        let span = tmv_core::analysis_span!("analyze_symbol", item.symbol);
        let _guard = span.enter();

        let reference = item
            .frames
            .iter()
            .find(|s| s.timeframe() == Timeframe::D1)
            .or_else(|| item.frames.first());

        let reference = match reference {
            Some(series) if !series.is_empty() => series,
            _ => {
                tracing::warn!(symbol = %item.symbol, "기준 시리즈가 비어 있어 종목 제외");
                return None;
            }
        };

        let candles = reference.candles();
        let last_price = candles[candles.len() - 1].close;
        let change = if candles.len() >= 2 {
            let prev_close = candles[candles.len() - 2].close;
            Some((last_price - prev_close) / prev_close)
        } else {
            None
        };

        let mut frames = Vec::with_capacity(item.frames.len());

        for series in &item.frames {
            match self.scorer.score(series) {
                Ok(bundle) => frames.push(FrameScore {
                    timeframe: series.timeframe(),
                    bundle,
                }),
                Err(error) => match self.fallback {
                    ScoreFallback::Skip => {
                        tracing::warn!(
                            symbol = %item.symbol,
                            timeframe = %series.timeframe(),
                            %error,
                            "점수 계산 실패, 타임프레임 제외"
                        );
                    }
                    ScoreFallback::Neutral => {
                        tracing::warn!(
                            symbol = %item.symbol,
                            timeframe = %series.timeframe(),
                            %error,
                            "점수 계산 실패, 중립값 대체"
                        );
                        frames.push(FrameScore {
                            timeframe: series.timeframe(),
                            bundle: ScoreBundle::neutral(),
                        });
                    }
                },
            }
        }

        if frames.is_empty() {
            tracing::warn!(symbol = %item.symbol, "점수화된 타임프레임이 없어 종목 제외");
            return None;
        }

        Some(AnalysisRow {
            symbol: item.symbol.clone(),
            last_price,
            change,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::TrendDirection;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tmv_core::Candle;

    fn rising_series(symbol: &Symbol, timeframe: Timeframe, count: usize) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let step = Duration::seconds(timeframe.as_secs() as i64);
        let candles: Vec<Candle> = (0..count)
            .map(|i| {
                let close = Decimal::from(100 + i);
                Candle::new(
                    start + step * i as i32,
                    close - dec!(1),
                    close + dec!(2),
                    close - dec!(2),
                    close,
                    Decimal::from(1000 + 10 * i),
                )
            })
            .collect();

        BarSeries::new(symbol.clone(), timeframe, candles)
    }

    fn good_input(ticker: &str) -> SymbolFrames {
        let symbol = Symbol::nse(ticker);
        let frames = vec![
            rising_series(&symbol, Timeframe::M15, 60),
            rising_series(&symbol, Timeframe::D1, 60),
        ];
        SymbolFrames::new(symbol, frames)
    }

    fn short_input(ticker: &str) -> SymbolFrames {
        let symbol = Symbol::nse(ticker);
        let frames = vec![rising_series(&symbol, Timeframe::D1, 5)];
        SymbolFrames::new(symbol, frames)
    }

    #[test]
    fn test_analyze_builds_rows() {
        let analyzer = BatchAnalyzer::with_defaults();
        let rows = analyzer.analyze(&[good_input("RELIANCE"), good_input("HDFCBANK")]);

        assert_eq!(rows.len(), 2);

        let row = &rows[0];
        assert_eq!(row.symbol.ticker, "RELIANCE");
        assert_eq!(row.frames.len(), 2);

        // 일봉 기준: 마지막 종가 159, 직전 158
        assert_eq!(row.last_price, dec!(159));
        assert_eq!(row.change, Some(dec!(1) / dec!(158)));
        assert_eq!(row.change_display(), Some("0.63%".to_string()));
    }

    #[test]
    fn test_failed_symbol_is_skipped_not_fatal() {
        let analyzer = BatchAnalyzer::with_defaults();
        let rows = analyzer.analyze(&[short_input("BAD"), good_input("GOOD")]);

        // 실패 종목은 제외되고 나머지는 정상 처리
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol.ticker, "GOOD");
    }

    #[test]
    fn test_neutral_fallback_substitutes() {
        let analyzer =
            BatchAnalyzer::new(ScoringConfig::default(), ScoreFallback::Neutral).unwrap();
        let rows = analyzer.analyze(&[short_input("BAD")]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].frames.len(), 1);

        let bundle = rows[0].frames[0].bundle;
        assert_eq!(bundle.composite, Decimal::ZERO);
        assert_eq!(bundle.direction, TrendDirection::Neutral);
    }

    #[test]
    fn test_partial_frame_failure_keeps_row() {
        let symbol = Symbol::nse("MIXED");
        let input = SymbolFrames::new(
            symbol.clone(),
            vec![
                rising_series(&symbol, Timeframe::M15, 5), // 너무 짧음
                rising_series(&symbol, Timeframe::D1, 60),
            ],
        );

        let analyzer = BatchAnalyzer::with_defaults();
        let rows = analyzer.analyze(&[input]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].frames.len(), 1);
        assert_eq!(rows[0].frames[0].timeframe, Timeframe::D1);
    }

    #[test]
    fn test_empty_frames_dropped() {
        let analyzer = BatchAnalyzer::with_defaults();
        let input = SymbolFrames::new(Symbol::nse("EMPTY"), vec![]);

        assert!(analyzer.analyze_symbol(&input).is_none());
    }
}
