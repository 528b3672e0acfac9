//! 기술적 지표 세트.
//!
//! 일봉 시퀀스 하나로 EMA(20, 50), RSI(14), MACD(12, 26, 9), 볼린저 밴드(20, 2σ),
//! 추세 라벨, 지지/저항, 변동성 국면을 계산합니다.
//!
//! 데이터가 부족해도 실패하지 않습니다. 계산할 수 없는 항목은 빈 배열,
//! `None`, `Unknown`으로 채워집니다.

use serde::{Deserialize, Serialize};
use signal_core::{closes, highs, lows, round_f64, PriceBar, TechnicalConfig};
use tracing::debug;

use crate::indicators::{
    BollingerBandsParams, BollingerBandsResult, EmaParams, IndicatorEngine, MacdParams,
    MacdResult, RsiParams, TrendLabel, VolatilityRegime,
};

/// 단기 EMA 기간.
pub const SHORT_EMA_PERIOD: usize = 20;
/// 장기 EMA 기간. 추세 판단의 최소 데이터 수이기도 합니다.
pub const LONG_EMA_PERIOD: usize = 50;
/// 변동성 국면 윈도우 (거래일).
pub const VOLATILITY_WINDOW: usize = 20;

/// MACD 라인과 시그널 라인의 관계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

impl MacdSignal {
    fn from_last(point: Option<&MacdResult>) -> Self {
        match point {
            Some(p) if p.macd > p.signal => MacdSignal::Bullish,
            Some(p) if p.macd < p.signal => MacdSignal::Bearish,
            Some(_) => MacdSignal::Neutral,
            None => MacdSignal::Unknown,
        }
    }
}

/// 지표 요약.
///
/// 필드 이름은 스네이크 케이스 그대로 직렬화됩니다 (`macd_signal`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    /// 추세 라벨
    pub trend: TrendLabel,
    /// 마지막 RSI (소수점 2자리)
    pub rsi: Option<f64>,
    /// MACD 시그널
    pub macd_signal: MacdSignal,
    /// 변동성 국면
    pub volatility: VolatilityRegime,
}

/// 원시 지표 시계열 (각각 최근 N개).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub ema20: Vec<f64>,
    pub ema50: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<MacdResult>,
    pub bollinger: Vec<BollingerBandsResult>,
}

/// 지지/저항 수준.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// 최근 저가 최저값
    pub support: Option<f64>,
    /// 최근 고가 최고값
    pub resistance: Option<f64>,
}

/// 기술적 지표 세트 (와이어 타입).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicatorSet {
    pub summary: TechnicalSummary,
    #[serde(flatten)]
    pub series: IndicatorSeries,
    pub support_resistance: SupportResistance,
}

/// 기술적 지표 분석기.
#[derive(Debug, Default)]
pub struct TechnicalAnalyzer {
    config: TechnicalConfig,
    engine: IndicatorEngine,
}

impl TechnicalAnalyzer {
    /// 설정으로 분석기를 생성합니다.
    pub fn new(config: TechnicalConfig) -> Self {
        Self {
            config,
            engine: IndicatorEngine::new(),
        }
    }

    /// 일봉 시퀀스를 분석합니다. 절대 실패하지 않습니다.
    pub fn analyze(&self, bars: &[PriceBar]) -> TechnicalIndicatorSet {
        let prices = closes(bars);
        let tail = self.config.series_tail;

        let ema20 = self
            .engine
            .ema(&prices, EmaParams { period: SHORT_EMA_PERIOD })
            .unwrap_or_default();
        let ema50 = self
            .engine
            .ema(&prices, EmaParams { period: LONG_EMA_PERIOD })
            .unwrap_or_default();
        let rsi = self.engine.rsi(&prices, RsiParams::default()).unwrap_or_default();
        let macd = self.engine.macd(&prices, MacdParams::default()).unwrap_or_default();
        let bollinger = self
            .engine
            .bollinger_bands(&prices, BollingerBandsParams::default())
            .unwrap_or_default();

        let summary = TechnicalSummary {
            trend: self
                .engine
                .trend_label(&prices, SHORT_EMA_PERIOD, LONG_EMA_PERIOD),
            rsi: rsi.last().map(|v| round_f64(*v, 2)),
            macd_signal: MacdSignal::from_last(macd.last()),
            volatility: self.engine.volatility_regime(&prices, VOLATILITY_WINDOW),
        };

        debug!(
            bars = bars.len(),
            trend = ?summary.trend,
            rsi = ?summary.rsi,
            macd_signal = ?summary.macd_signal,
            volatility = ?summary.volatility,
            "기술적 지표 계산 완료"
        );

        TechnicalIndicatorSet {
            summary,
            series: IndicatorSeries {
                ema20: last_n(&ema20, tail),
                ema50: last_n(&ema50, tail),
                rsi: last_n(&rsi, tail),
                macd: last_n(&macd, tail),
                bollinger: last_n(&bollinger, tail),
            },
            support_resistance: self.support_resistance(bars),
        }
    }

    /// 최근 N봉의 최저 저가 / 최고 고가.
    pub fn support_resistance(&self, bars: &[PriceBar]) -> SupportResistance {
        let start = bars.len().saturating_sub(self.config.support_resistance_lookback);
        let recent = &bars[start..];

        SupportResistance {
            support: lows(recent).into_iter().reduce(f64::min),
            resistance: highs(recent).into_iter().reduce(f64::max),
        }
    }
}

/// 마지막 `n`개 원소를 복사합니다.
fn last_n<T: Clone>(values: &[T], n: usize) -> Vec<T> {
    values[values.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from(prices: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PriceBar::new(start + chrono::Duration::days(i as i64), *p, p + 1.0, p - 1.0, *p)
            })
            .collect()
    }

    #[test]
    fn test_empty_input_is_fully_populated() {
        let set = TechnicalAnalyzer::default().analyze(&[]);

        assert_eq!(set.summary.trend, TrendLabel::Unknown);
        assert_eq!(set.summary.rsi, None);
        assert_eq!(set.summary.macd_signal, MacdSignal::Unknown);
        assert_eq!(set.summary.volatility, VolatilityRegime::Unknown);
        assert!(set.series.ema20.is_empty());
        assert!(set.series.bollinger.is_empty());
        assert_eq!(set.support_resistance.support, None);
    }

    #[test]
    fn test_uptrend_series() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let set = TechnicalAnalyzer::default().analyze(&bars_from(&prices));

        assert_eq!(set.summary.trend, TrendLabel::Uptrend);
        assert_eq!(set.summary.rsi, Some(100.0));
        assert_eq!(set.summary.macd_signal, MacdSignal::Bullish);
        assert_eq!(set.summary.volatility, VolatilityRegime::Low);
        assert_eq!(set.series.ema20.len(), 30);
        assert_eq!(set.series.rsi.len(), 30);
        assert_eq!(set.series.macd.len(), 30);
    }

    #[test]
    fn test_support_resistance_uses_last_60_bars() {
        let mut prices: Vec<f64> = vec![10.0; 10];
        prices.extend(std::iter::repeat(100.0).take(60));
        let set = TechnicalAnalyzer::default().analyze(&bars_from(&prices));

        assert_eq!(set.support_resistance.support, Some(99.0));
        assert_eq!(set.support_resistance.resistance, Some(101.0));
    }

    #[test]
    fn test_short_series_unknown_trend() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let set = TechnicalAnalyzer::default().analyze(&bars_from(&prices));

        assert_eq!(set.summary.trend, TrendLabel::Unknown);
        assert!(set.summary.rsi.is_some());
        assert_eq!(set.summary.macd_signal, MacdSignal::Unknown);
    }

    #[test]
    fn test_wire_field_names() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i % 5) as f64).collect();
        let set = TechnicalAnalyzer::default().analyze(&bars_from(&prices));
        let json = serde_json::to_value(&set).unwrap();

        assert!(json["summary"]["macd_signal"].is_string());
        assert!(json["summary"].get("macdSignal").is_none());
        let mut keys: Vec<&str> = json["summary"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["macd_signal", "rsi", "trend", "volatility"]);
        assert!(json["supportResistance"]["support"].is_number());
        assert!(json["ema20"].is_array());
        assert!(json["bollinger"].is_array());
    }
}
