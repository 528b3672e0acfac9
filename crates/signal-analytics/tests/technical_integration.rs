//! 기술적 지표 및 종합 시그널 통합 테스트.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use signal_analytics::indicators::{IndicatorEngine, RsiParams};
use signal_analytics::{TechnicalAnalyzer, TechnicalCompositeScorer, TrendLabel};
use signal_core::{PriceBar, TechnicalConfig};

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            PriceBar::from_close(start + Duration::days(i as i64), c)
                .with_volume(1_000.0 + (i % 7) as f64 * 50.0)
        })
        .collect()
}

#[test]
fn rsi_extremes() {
    let engine = IndicatorEngine::new();

    let rising: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
    let rsi = engine.rsi(&rising, RsiParams::default()).unwrap();
    assert!(rsi.iter().all(|v| (*v - 100.0).abs() < 1e-9));

    let flat = vec![42.0; 40];
    let rsi = engine.rsi(&flat, RsiParams::default()).unwrap();
    assert!(rsi.iter().all(|v| (*v - 50.0).abs() < 1e-9));
}

#[test]
fn falling_market_scores_weak_trend() {
    let closes: Vec<f64> = (0..120).map(|i| 200.0 * 0.99f64.powi(i)).collect();
    let data = bars(&closes);

    let set = TechnicalAnalyzer::new(TechnicalConfig::default()).analyze(&data);
    assert_eq!(set.summary.trend, TrendLabel::Downtrend);
    assert_eq!(set.series.ema20.len(), 30);

    let composite = TechnicalCompositeScorer::new().score(&data);
    assert_eq!(composite.components.trend, 10.0);
    assert_eq!(composite.components.pattern, 50.0);
    assert!(!composite.signal.signal.is_bullish());
    assert_eq!(composite.signal.reasoning.len(), 4);
}

#[test]
fn empty_input_never_fails() {
    let set = TechnicalAnalyzer::default().analyze(&[]);
    assert_eq!(set.summary.trend, TrendLabel::Unknown);
    assert!(set.summary.rsi.is_none());
    assert!(set.support_resistance.support.is_none());

    let composite = TechnicalCompositeScorer::new().score(&[]);
    assert_eq!(composite.signal.score, 50);
}

proptest! {
    #[test]
    fn rsi_is_bounded(prices in prop::collection::vec(1.0f64..1_000.0, 15..120)) {
        let rsi = IndicatorEngine::new().rsi(&prices, RsiParams::default()).unwrap();
        prop_assert!(rsi.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn technical_composite_is_clamped(prices in prop::collection::vec(10.0f64..1_000.0, 0..150)) {
        let composite = TechnicalCompositeScorer::new().score(&bars(&prices));
        prop_assert!(composite.signal.score <= 100);
    }
}
