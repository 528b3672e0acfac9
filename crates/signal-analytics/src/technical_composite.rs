//! 기술적 종합 시그널.
//!
//! 추세, 모멘텀, 거래량, 캔들 패턴 네 항목을 각각 0~100으로 점수화한 뒤
//! 가중 평균(0.35 / 0.35 / 0.20 / 0.10)으로 하나의 `CompositeSignal`을 만듭니다.
//!
//! | 점수 | 라벨 |
//! |------|------|
//! | ≥ 65 | Bullish |
//! | ≥ 55 | Mildly Bullish |
//! | ≤ 35 | Bearish |
//! | ≤ 45 | Mildly Bearish |
//! | 그 외 | Neutral |

use serde::{Deserialize, Serialize};
use signal_core::{clamp_score, closes, CompositeSignal, ConfidenceLabel, PriceBar, SignalLabel};
use tracing::debug;

use crate::indicators::{
    CandlePatternType, EmaParams, IndicatorEngine, MacdParams, RsiParams, TrendLabel,
};
use crate::technical::{LONG_EMA_PERIOD, SHORT_EMA_PERIOD};

/// 거래량 평균 윈도우.
const VOLUME_WINDOW: usize = 20;

/// 항목별 가중치.
#[derive(Debug, Clone, Copy)]
struct ComponentWeights {
    trend: f64,
    momentum: f64,
    volume: f64,
    pattern: f64,
}

const WEIGHTS: ComponentWeights = ComponentWeights {
    trend: 0.35,
    momentum: 0.35,
    volume: 0.20,
    pattern: 0.10,
};

/// 항목별 점수.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalComponents {
    pub trend: f64,
    pub momentum: f64,
    pub volume: f64,
    pub pattern: f64,
}

/// 기술적 종합 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalComposite {
    /// 항목별 점수
    pub components: TechnicalComponents,
    /// 종합 시그널
    #[serde(flatten)]
    pub signal: CompositeSignal,
}

/// 기술적 종합 점수 계산기.
#[derive(Debug, Default)]
pub struct TechnicalCompositeScorer {
    engine: IndicatorEngine,
}

impl TechnicalCompositeScorer {
    /// 새 계산기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 일봉 시퀀스로 종합 시그널을 계산합니다.
    pub fn score(&self, bars: &[PriceBar]) -> TechnicalComposite {
        let prices = closes(bars);
        let mut reasoning = Vec::with_capacity(4);

        let trend = self.trend_score(&prices, &mut reasoning);
        let momentum = self.momentum_score(&prices, &mut reasoning);
        let volume = self.volume_score(bars, &mut reasoning);
        let pattern = self.pattern_score(bars, &mut reasoning);

        let raw = WEIGHTS.trend * trend
            + WEIGHTS.momentum * momentum
            + WEIGHTS.volume * volume
            + WEIGHTS.pattern * pattern;
        let score = clamp_score(raw).round();
        let (signal, confidence) = classify(score);

        debug!(trend, momentum, volume, pattern, score, %signal, "기술적 종합 점수");

        TechnicalComposite {
            components: TechnicalComponents {
                trend,
                momentum,
                volume,
                pattern,
            },
            signal: CompositeSignal::new(score, signal, confidence, reasoning),
        }
    }

    /// 50 ±25 (EMA20 vs EMA50), ±15 (종가 vs EMA50).
    fn trend_score(&self, prices: &[f64], reasoning: &mut Vec<String>) -> f64 {
        let mut score = 50.0;

        match self
            .engine
            .trend_label(prices, SHORT_EMA_PERIOD, LONG_EMA_PERIOD)
        {
            TrendLabel::Uptrend => {
                score += 25.0;
                reasoning.push("Trend: EMA20 above EMA50 (uptrend)".to_string());
            }
            TrendLabel::Downtrend => {
                score -= 25.0;
                reasoning.push("Trend: EMA20 below EMA50 (downtrend)".to_string());
            }
            TrendLabel::Sideways => {
                reasoning.push("Trend: EMA20 and EMA50 flat (sideways)".to_string());
            }
            TrendLabel::Unknown => {
                reasoning.push("Trend: not enough history for EMA crossover".to_string());
                return clamp_score(score);
            }
        }

        let ema50 = self
            .engine
            .ema(prices, EmaParams { period: LONG_EMA_PERIOD })
            .ok()
            .and_then(|v| v.last().copied());
        if let (Some(ema), Some(last)) = (ema50, prices.last()) {
            if *last > ema {
                score += 15.0;
            } else if *last < ema {
                score -= 15.0;
            }
        }

        clamp_score(score)
    }

    /// RSI 구간 점수 ±15 (MACD 히스토그램 부호).
    fn momentum_score(&self, prices: &[f64], reasoning: &mut Vec<String>) -> f64 {
        let rsi = self
            .engine
            .rsi(prices, RsiParams::default())
            .ok()
            .and_then(|v| v.last().copied());

        let mut score = match rsi {
            Some(r) if r < 30.0 => 70.0,
            Some(r) if r > 70.0 => 30.0,
            Some(r) => 50.0 + (r - 50.0) * 0.5,
            None => 50.0,
        };

        let histogram = self
            .engine
            .macd(prices, MacdParams::default())
            .ok()
            .and_then(|v| v.last().map(|p| p.histogram));
        match histogram {
            Some(h) if h > 0.0 => score += 15.0,
            Some(h) if h < 0.0 => score -= 15.0,
            _ => {}
        }

        reasoning.push(match (rsi, histogram) {
            (Some(r), Some(h)) => format!(
                "Momentum: RSI {:.1}, MACD histogram {}",
                r,
                if h >= 0.0 { "positive" } else { "negative" }
            ),
            (Some(r), None) => format!("Momentum: RSI {:.1}", r),
            _ => "Momentum: not enough history for RSI".to_string(),
        });

        clamp_score(score)
    }

    /// 마지막 거래량 / 20봉 평균 거래량.
    fn volume_score(&self, bars: &[PriceBar], reasoning: &mut Vec<String>) -> f64 {
        let start = bars.len().saturating_sub(VOLUME_WINDOW);
        let volumes: Vec<f64> = bars[start..].iter().filter_map(|b| b.volume).collect();
        let last = bars.last().and_then(|b| b.volume);
        let average = if volumes.is_empty() {
            0.0
        } else {
            volumes.iter().sum::<f64>() / volumes.len() as f64
        };

        let (Some(last_volume), true) = (last, average > 0.0) else {
            reasoning.push("Volume: no volume data".to_string());
            return 50.0;
        };

        let ratio = last_volume / average;
        let up_day = bars.len() >= 2 && bars[bars.len() - 1].close > bars[bars.len() - 2].close;

        let score = if ratio > 1.5 {
            if up_day {
                75.0
            } else {
                25.0
            }
        } else if ratio < 0.5 {
            45.0
        } else {
            50.0
        };

        reasoning.push(format!(
            "Volume: {:.2}x the {}-day average{}",
            ratio,
            VOLUME_WINDOW,
            if ratio > 1.5 {
                if up_day {
                    " on an up day"
                } else {
                    " on a down day"
                }
            } else {
                ""
            }
        ));
        score
    }

    /// 50 ± 40·신뢰도 (패턴 방향).
    fn pattern_score(&self, bars: &[PriceBar], reasoning: &mut Vec<String>) -> f64 {
        let detected = self.engine.last_candle_pattern(bars);

        if detected.pattern == CandlePatternType::None {
            reasoning.push("Pattern: no candlestick pattern on the last bar".to_string());
            return 50.0;
        }

        reasoning.push(format!(
            "Pattern: {} ({:.0}% confidence)",
            detected.pattern.name(),
            detected.confidence * 100.0
        ));
        clamp_score(50.0 + 40.0 * detected.confidence * f64::from(detected.pattern.bias()))
    }
}

/// 반올림된 점수를 라벨/신뢰도로 변환합니다.
fn classify(score: f64) -> (SignalLabel, ConfidenceLabel) {
    let label = if score >= 65.0 {
        SignalLabel::Bullish
    } else if score >= 55.0 {
        SignalLabel::MildlyBullish
    } else if score <= 35.0 {
        SignalLabel::Bearish
    } else if score <= 45.0 {
        SignalLabel::MildlyBearish
    } else {
        SignalLabel::Neutral
    };

    let confidence = if label == SignalLabel::Neutral {
        ConfidenceLabel::Low
    } else if score >= 75.0 || score <= 25.0 {
        ConfidenceLabel::High
    } else {
        ConfidenceLabel::Moderate
    };

    (label, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn bars_from(prices: &[f64], volume: f64) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PriceBar::from_close(start + chrono::Duration::days(i as i64), *p).with_volume(volume)
            })
            .collect()
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(80.0), (SignalLabel::Bullish, ConfidenceLabel::High));
        assert_eq!(classify(65.0), (SignalLabel::Bullish, ConfidenceLabel::Moderate));
        assert_eq!(classify(55.0), (SignalLabel::MildlyBullish, ConfidenceLabel::Moderate));
        assert_eq!(classify(50.0), (SignalLabel::Neutral, ConfidenceLabel::Low));
        assert_eq!(classify(45.0), (SignalLabel::MildlyBearish, ConfidenceLabel::Moderate));
        assert_eq!(classify(35.0), (SignalLabel::Bearish, ConfidenceLabel::Moderate));
        assert_eq!(classify(20.0), (SignalLabel::Bearish, ConfidenceLabel::High));
    }

    #[test]
    fn test_empty_bars_neutral() {
        let result = TechnicalCompositeScorer::new().score(&[]);
        assert_eq!(result.signal.score, 50);
        assert_eq!(result.signal.signal, SignalLabel::Neutral);
        assert_eq!(result.signal.reasoning.len(), 4);
    }

    #[test]
    fn test_steady_uptrend_is_bullish() {
        let prices: Vec<f64> = (0..100).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let result = TechnicalCompositeScorer::new().score(&bars_from(&prices, 1_000.0));

        // 추세 90, 모멘텀 30 + 15 = 45, 거래량 50, 패턴 50 → 62.25
        assert_eq!(result.components.trend, 90.0);
        assert_eq!(result.components.momentum, 45.0);
        assert_eq!(result.components.volume, 50.0);
        assert_eq!(result.signal.score, 62);
        assert_eq!(result.signal.signal, SignalLabel::MildlyBullish);
    }

    #[test]
    fn test_volume_spike_on_down_day() {
        let mut bars = bars_from(&[100.0; 30], 1_000.0);
        let last = bars.len() - 1;
        bars[last].close = 95.0;
        bars[last].low = 95.0;
        bars[last].volume = Some(10_000.0);

        let mut reasoning = Vec::new();
        let score = TechnicalCompositeScorer::new().volume_score(&bars, &mut reasoning);
        assert_eq!(score, 25.0);
        assert!(reasoning[0].contains("down day"));
    }

    proptest! {
        #[test]
        fn prop_score_clamped(prices in prop::collection::vec(1.0f64..500.0, 0..120)) {
            let result = TechnicalCompositeScorer::new().score(&bars_from(&prices, 500.0));
            prop_assert!(result.signal.score <= 100);
            for s in [result.components.trend, result.components.momentum,
                      result.components.volume, result.components.pattern] {
                prop_assert!((0.0..=100.0).contains(&s));
            }
        }
    }
}
