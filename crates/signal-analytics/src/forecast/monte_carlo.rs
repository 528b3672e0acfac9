//! 몬테카를로 가격 경로 시뮬레이션.
//!
//! 각 스텝마다 `price *= exp(drift + volatility·Z)` (Z ~ N(0, 1))로 경로를 만들고,
//! 만기 수익률 분포의 평균 ± 표본 표준편차를 구간으로 사용합니다.

use serde::{Deserialize, Serialize};
use signal_core::{mean, sample_std, ModelProjection, RandomSource, SeriesStatistics};

/// 기본 시뮬레이션 경로 수.
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// 시뮬레이션 결과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloOutcome {
    /// 평균 ± 표준편차 수익률 구간
    pub range: ModelProjection,
    /// 만기 가격이 현재가를 넘는 경로 비율
    pub probability_positive: f64,
    /// 시뮬레이션 경로 수
    pub simulations: usize,
}

/// 몬테카를로 시뮬레이터.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    simulations: usize,
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATIONS)
    }
}

impl MonteCarloSimulator {
    /// 경로 수를 지정하여 생성합니다 (최소 1).
    pub fn new(simulations: usize) -> Self {
        Self {
            simulations: simulations.max(1),
        }
    }

    /// 경로 수.
    pub fn simulations(&self) -> usize {
        self.simulations
    }

    /// 만기 가격만 계산하여 요약합니다.
    pub fn simulate<R: RandomSource + ?Sized>(
        &self,
        stats: &SeriesStatistics,
        horizon: usize,
        rng: &mut R,
    ) -> MonteCarloOutcome {
        let last = stats.last_price;
        let mut terminal_returns = Vec::with_capacity(self.simulations);
        let mut positive = 0usize;

        for _ in 0..self.simulations {
            let terminal = step_path(last, stats, horizon, rng, |_| {});
            if terminal > last {
                positive += 1;
            }
            terminal_returns.push(if last == 0.0 { 0.0 } else { (terminal - last) / last });
        }

        let center = mean(&terminal_returns).unwrap_or(0.0);
        let spread = sample_std(&terminal_returns).unwrap_or(0.0);

        MonteCarloOutcome {
            range: ModelProjection::around(center, spread),
            probability_positive: positive as f64 / self.simulations as f64,
            simulations: self.simulations,
        }
    }

    /// 모든 경로를 저장합니다. 각 경로는 시작 가격을 포함해 `horizon + 1`개 가격입니다.
    pub fn simulate_paths<R: RandomSource + ?Sized>(
        &self,
        stats: &SeriesStatistics,
        horizon: usize,
        rng: &mut R,
    ) -> Vec<Vec<f64>> {
        (0..self.simulations)
            .map(|_| {
                let mut path = Vec::with_capacity(horizon + 1);
                path.push(stats.last_price);
                step_path(stats.last_price, stats, horizon, rng, |p| path.push(p));
                path
            })
            .collect()
    }
}

/// 한 경로를 진행하고 만기 가격을 반환합니다. 각 스텝 가격은 `on_step`에 전달됩니다.
fn step_path<R: RandomSource + ?Sized>(
    start: f64,
    stats: &SeriesStatistics,
    horizon: usize,
    rng: &mut R,
    mut on_step: impl FnMut(f64),
) -> f64 {
    let mut price = start;
    for _ in 0..horizon {
        let z = rng.standard_normal();
        price *= (stats.drift + stats.volatility * z).exp();
        on_step(price);
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::StdRandom;

    fn stats(drift: f64, volatility: f64) -> SeriesStatistics {
        SeriesStatistics {
            returns: vec![drift; 10],
            drift,
            volatility,
            last_price: 100.0,
        }
    }

    #[test]
    fn test_paths_have_horizon_plus_one_prices() {
        let sim = MonteCarloSimulator::new(10_000);
        let mut rng = StdRandom::seeded(1);
        let paths = sim.simulate_paths(&stats(0.0005, 0.01), 5, &mut rng);

        assert_eq!(paths.len(), 10_000);
        assert!(paths.iter().all(|p| p.len() == 6 && p[0] == 100.0));
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let sim = MonteCarloSimulator::new(500);
        let mut rng = StdRandom::seeded(3);
        let outcome = sim.simulate(&stats(0.01, 0.0), 10, &mut rng);

        let expected = (0.1f64).exp() - 1.0;
        assert!((outcome.range.lower - expected).abs() < 1e-9);
        assert!((outcome.range.upper - expected).abs() < 1e-9);
        assert_eq!(outcome.probability_positive, 1.0);
    }

    #[test]
    fn test_statistical_range() {
        let sim = MonteCarloSimulator::default();
        let mut rng = StdRandom::seeded(11);
        let outcome = sim.simulate(&stats(0.0, 0.02), 22, &mut rng);

        // 22일 로그수익률 표준편차 ≈ 0.02·√22 ≈ 0.094
        let width = outcome.range.upper - outcome.range.lower;
        assert!(width > 0.15 && width < 0.22, "width = {}", width);
        assert!((outcome.probability_positive - 0.5).abs() < 0.03);
    }
}
