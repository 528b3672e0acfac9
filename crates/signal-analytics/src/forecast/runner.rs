//! 여러 예측 기간의 비동기 실행.
//!
//! 몬테카를로 시뮬레이션은 CPU 집약적이므로 각 기간의 앙상블 예측을
//! `tokio::task::spawn_blocking`으로 blocking thread pool에서 실행하고
//! `join_all`로 동시에 기다립니다.
//!
//! 태스크가 패닉하거나 취소되면 해당 기간은 센티넬 예측으로 대체됩니다.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use signal_core::{EnsembleForecast, ForecastHorizon, StdRandom};
use tracing::{debug, warn};

use super::ensemble::EnsembleForecastEngine;

/// 기간별 예측 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    /// 예측 기간 (거래일)
    pub horizon: ForecastHorizon,
    #[serde(flatten)]
    pub forecast: EnsembleForecast,
}

/// 비동기 예측 실행기.
#[derive(Debug, Clone)]
pub struct ForecastRunner {
    engine: Arc<EnsembleForecastEngine>,
    seed: Option<u64>,
}

impl ForecastRunner {
    /// 엔진을 감싸 실행기를 생성합니다. 호출마다 새 난수열을 사용합니다.
    pub fn new(engine: EnsembleForecastEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            seed: None,
        }
    }

    /// 고정 시드를 사용합니다. 기간별 시드는 `seed + horizon`입니다.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 모든 기간을 동시에 예측합니다. 결과는 입력 기간 순서를 따릅니다.
    pub async fn run(&self, closes: Vec<f64>, horizons: &[ForecastHorizon]) -> Vec<HorizonForecast> {
        let closes: Arc<[f64]> = Arc::from(closes);

        let tasks: Vec<_> = horizons
            .iter()
            .map(|&horizon| {
                let engine = Arc::clone(&self.engine);
                let closes = Arc::clone(&closes);
                let seed = self.seed.map(|s| s.wrapping_add(horizon.steps() as u64));

                async move {
                    let result = tokio::task::spawn_blocking(move || {
                        let mut rng = StdRandom::from_seed_option(seed);
                        engine.forecast(&closes, horizon, &mut rng)
                    })
                    .await;
                    (horizon, result)
                }
            })
            .collect();

        join_all(tasks)
            .await
            .into_iter()
            .map(|(horizon, result)| {
                let forecast = match result {
                    Ok(forecast) => {
                        debug!(%horizon, confidence = forecast.confidence, "기간 예측 완료");
                        forecast
                    }
                    Err(e) => {
                        warn!(%horizon, error = %e, "예측 태스크 실패, 센티넬로 대체");
                        EnsembleForecast::unavailable(format!("Forecast task failed: {}", e))
                    }
                };
                HorizonForecast { horizon, forecast }
            })
            .collect()
    }
}
