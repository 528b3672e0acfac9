//! 앙상블 예측 명령.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use signal_analytics::forecast::{EnsembleForecastEngine, ForecastRunner, HorizonForecast};
use signal_core::{closes, ForecastConfig, ForecastHorizon};
use signal_data::MarketDataProvider;
use tracing::info;

/// 예측 명령 설정.
#[derive(Debug)]
pub struct ForecastCommand {
    /// 종목 심볼
    pub symbol: String,
    /// 예측 기간 (비어 있으면 설정의 기본 기간)
    pub horizons: Vec<ForecastHorizon>,
    /// 난수 시드
    pub seed: Option<u64>,
}

/// 예측 결과 출력.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastOutput {
    pub symbol: String,
    pub as_of: Option<NaiveDate>,
    pub last_close: Option<f64>,
    pub observations: usize,
    pub forecasts: Vec<HorizonForecast>,
}

/// 일봉을 불러와 모든 기간을 예측합니다.
pub async fn run_forecast(
    provider: &dyn MarketDataProvider,
    config: &ForecastConfig,
    command: ForecastCommand,
) -> Result<ForecastOutput> {
    let bars = provider
        .daily_bars(&command.symbol)
        .await
        .with_context(|| format!("failed to load daily bars for {}", command.symbol))?;

    let horizons = if command.horizons.is_empty() {
        config
            .default_horizons
            .iter()
            .map(|&h| ForecastHorizon::new(h))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        command.horizons
    };

    let mut runner = ForecastRunner::new(EnsembleForecastEngine::new(config));
    if let Some(seed) = command.seed {
        runner = runner.with_seed(seed);
    }

    let prices = closes(&bars);
    info!(symbol = %command.symbol, bars = prices.len(), horizons = horizons.len(), "Running forecast");
    let forecasts = runner.run(prices, &horizons).await;

    Ok(ForecastOutput {
        symbol: command.symbol.to_uppercase(),
        as_of: bars.last().map(|b| b.date),
        last_close: bars.last().map(|b| b.close),
        observations: bars.len(),
        forecasts,
    })
}
