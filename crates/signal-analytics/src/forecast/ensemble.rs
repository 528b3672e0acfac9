//! 앙상블 수익률 예측.
//!
//! 몬테카를로(0.50), 추세 회귀(0.25), ARIMA(0.25) 세 모델의 구간을
//! 하단/상단별로 가중 합산하고, 모델 간 불일치와 변동성으로 신뢰도를 계산합니다.
//!
//! 종가가 최소 개수(기본 50)보다 적으면 센티넬 예측을 반환합니다.

use serde::{Deserialize, Serialize};
use signal_core::{
    EnsembleForecast, EnsembleWeights, ForecastConfig, ForecastHorizon, ModelProjection,
    PercentValue, Probability, RandomSource, ReturnRange, RiskLevel, SeriesStatistics,
};
use tracing::debug;

use super::arima::{ArimaForecaster, ArimaOutcome};
use super::monte_carlo::{MonteCarloOutcome, MonteCarloSimulator};
use super::regression::TrendRegressor;

/// 불일치 정규화 기준 (30%).
const DISAGREEMENT_SCALE: f64 = 0.30;
/// 연율 변동성 정규화 기준 (50%).
const VOLATILITY_SCALE: f64 = 0.50;

/// 모델별 중간 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelBreakdown {
    pub monte_carlo: MonteCarloOutcome,
    pub regression: ModelProjection,
    pub arima: ArimaOutcome,
    pub combined: ModelProjection,
    pub disagreement: f64,
    pub annualized_volatility: f64,
}

/// 예측 결과와 모델별 중간 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    pub forecast: EnsembleForecast,
    /// 센티넬이면 `None`
    pub breakdown: Option<ModelBreakdown>,
}

/// 앙상블 예측 엔진.
#[derive(Debug, Clone)]
pub struct EnsembleForecastEngine {
    min_points: usize,
    weights: EnsembleWeights,
    monte_carlo: MonteCarloSimulator,
    regressor: TrendRegressor,
    arima: ArimaForecaster,
}

impl Default for EnsembleForecastEngine {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

impl EnsembleForecastEngine {
    /// 설정으로 엔진을 생성합니다.
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            min_points: config.min_points,
            weights: config.weights,
            monte_carlo: MonteCarloSimulator::new(config.simulations),
            regressor: TrendRegressor::new(config.regression_lookback),
            arima: ArimaForecaster::new(config.arima_lookback, config.arima_min_points),
        }
    }

    /// 예측에 필요한 최소 종가 수.
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// 앙상블 예측.
    pub fn forecast<R: RandomSource + ?Sized>(
        &self,
        closes: &[f64],
        horizon: ForecastHorizon,
        rng: &mut R,
    ) -> EnsembleForecast {
        self.analyze(closes, horizon, rng).forecast
    }

    /// 앙상블 예측과 모델별 중간 결과.
    pub fn analyze<R: RandomSource + ?Sized>(
        &self,
        closes: &[f64],
        horizon: ForecastHorizon,
        rng: &mut R,
    ) -> EnsembleReport {
        if closes.len() < self.min_points {
            debug!(
                required = self.min_points,
                provided = closes.len(),
                "종가 부족, 센티넬 예측 반환"
            );
            return EnsembleReport {
                forecast: EnsembleForecast::insufficient(self.min_points, closes.len()),
                breakdown: None,
            };
        }

        let Some(stats) = SeriesStatistics::from_closes(closes) else {
            return EnsembleReport {
                forecast: EnsembleForecast::insufficient(self.min_points, closes.len()),
                breakdown: None,
            };
        };
        let h = horizon.steps();

        let mc = self.monte_carlo.simulate(&stats, h, rng);
        let lr = self.regressor.project(closes, h);
        let arima = self.arima.forecast(closes, h, stats.volatility);
        let ar = arima.projection();

        let w = self.weights;
        let combined = ModelProjection::new(
            w.monte_carlo * mc.range.lower + w.regression * lr.lower + w.arima * ar.lower,
            w.monte_carlo * mc.range.upper + w.regression * lr.upper + w.arima * ar.upper,
        );

        if !combined.is_finite() || !mc.probability_positive.is_finite() {
            return EnsembleReport {
                forecast: EnsembleForecast::unavailable(
                    "Forecast unavailable: models produced non-finite values",
                ),
                breakdown: None,
            };
        }

        let disagreement =
            (mc.range.upper - lr.upper).abs() + (mc.range.lower - lr.lower).abs();
        let annualized_volatility = stats.annualized_volatility();
        let confidence = confidence_score(disagreement, annualized_volatility);
        let risk_level = RiskLevel::from_horizon_volatility(stats.horizon_volatility(h));

        debug!(
            horizon = h,
            mc_lower = mc.range.lower,
            mc_upper = mc.range.upper,
            lr_lower = lr.lower,
            lr_upper = lr.upper,
            arima_lower = ar.lower,
            arima_upper = ar.upper,
            arima_fallback = arima.is_fallback(),
            confidence,
            "앙상블 예측 완료"
        );

        let explanation = self.explain(&mc, &lr, &arima, annualized_volatility, disagreement);
        let forecast = EnsembleForecast {
            expected_return_range: ReturnRange {
                lower: PercentValue::from(combined.lower),
                upper: PercentValue::from(combined.upper),
            },
            probability: Probability {
                positive: PercentValue::from(mc.probability_positive),
                negative: PercentValue::from(1.0 - mc.probability_positive),
            },
            confidence,
            risk_level,
            explanation,
        };

        EnsembleReport {
            forecast,
            breakdown: Some(ModelBreakdown {
                monte_carlo: mc,
                regression: lr,
                arima,
                combined,
                disagreement,
                annualized_volatility,
            }),
        }
    }

    fn explain(
        &self,
        mc: &MonteCarloOutcome,
        lr: &ModelProjection,
        arima: &ArimaOutcome,
        annualized_volatility: f64,
        disagreement: f64,
    ) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Monte Carlo ({} simulations): {}",
                mc.simulations, mc.range
            ),
            format!("Trend regression: {}", lr),
            format!("ARIMA(2,1,2): {}", arima.projection()),
        ];

        if let ArimaOutcome::Fallback { reason, .. } = arima {
            lines.push(format!(
                "ARIMA fallback used (volatility-scaled band): {}",
                reason
            ));
        }

        lines.push(format!(
            "Annualized volatility: {:.2}%",
            annualized_volatility * 100.0
        ));

        let agreement = if disagreement < 0.10 {
            "high"
        } else if disagreement < 0.20 {
            "moderate"
        } else {
            "low"
        };
        lines.push(format!(
            "Model agreement: {} (disagreement {:.2}%)",
            agreement,
            disagreement * 100.0
        ));

        lines
    }
}

/// `clamp(100·(1 − 0.4·min(d/0.30, 1) − 0.3·min(annVol/0.50, 1)), 5, 95)`를 정수로 반올림.
pub fn confidence_score(disagreement: f64, annualized_volatility: f64) -> u8 {
    let d = (disagreement / DISAGREEMENT_SCALE).min(1.0);
    let v = (annualized_volatility / VOLATILITY_SCALE).min(1.0);
    let raw = 100.0 * (1.0 - 0.4 * d - 0.3 * v);
    if raw.is_nan() {
        return 5;
    }
    raw.clamp(5.0, 95.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::StdRandom;

    fn zigzag(n: usize) -> Vec<f64> {
        [100.0, 101.0, 99.0, 102.0, 98.0]
            .iter()
            .cycle()
            .take(n)
            .copied()
            .collect()
    }

    fn engine(simulations: usize) -> EnsembleForecastEngine {
        let config = ForecastConfig {
            simulations,
            ..ForecastConfig::default()
        };
        EnsembleForecastEngine::new(&config)
    }

    #[test]
    fn test_confidence_formula() {
        assert_eq!(confidence_score(0.0, 0.0), 95);
        assert_eq!(confidence_score(0.30, 0.50), 30);
        assert_eq!(confidence_score(10.0, 10.0), 30);
        assert_eq!(confidence_score(0.15, 0.25), 65);
        assert_eq!(confidence_score(f64::NAN, 0.1), 5);
    }

    #[test]
    fn test_sentinel_below_min_points() {
        let mut rng = StdRandom::seeded(1);
        let forecast = engine(100).forecast(&zigzag(49), ForecastHorizon::WEEK, &mut rng);

        assert!(forecast.is_sentinel());
        assert_eq!(forecast.risk_level, RiskLevel::Unknown);
        assert_eq!(forecast.confidence, 0);
    }

    #[test]
    fn test_flat_zigzag_scenario() {
        let mut rng = StdRandom::seeded(42);
        let report = engine(10_000).analyze(&zigzag(60), ForecastHorizon::WEEK, &mut rng);
        let forecast = &report.forecast;

        assert!((5..=95).contains(&forecast.confidence));
        assert!(matches!(forecast.risk_level, RiskLevel::Low | RiskLevel::Medium));

        let positive = forecast.probability.positive.ratio().unwrap();
        let negative = forecast.probability.negative.ratio().unwrap();
        assert!((positive + negative - 1.0).abs() < 1e-12);

        let lower = forecast.expected_return_range.lower.ratio().unwrap();
        let upper = forecast.expected_return_range.upper.ratio().unwrap();
        assert!(lower < upper);

        let breakdown = report.breakdown.unwrap();
        let w = EnsembleWeights::default();
        let expected_lower = w.monte_carlo * breakdown.monte_carlo.range.lower
            + w.regression * breakdown.regression.lower
            + w.arima * breakdown.arima.projection().lower;
        assert!((lower - expected_lower).abs() < 1e-12);
    }

    #[test]
    fn test_explanation_order() {
        let mut rng = StdRandom::seeded(7);
        let forecast = engine(500).forecast(&zigzag(80), ForecastHorizon::MONTH, &mut rng);

        assert!(forecast.explanation[0].starts_with("Monte Carlo"));
        assert!(forecast.explanation[1].starts_with("Trend regression"));
        assert!(forecast.explanation[2].starts_with("ARIMA"));
        assert!(forecast
            .explanation
            .iter()
            .any(|l| l.starts_with("Annualized volatility")));
        assert!(forecast
            .explanation
            .last()
            .unwrap()
            .starts_with("Model agreement"));
    }
}
