//! 기술적 분석 명령.

use anyhow::{Context, Result};
use serde::Serialize;
use signal_analytics::{
    TechnicalAnalyzer, TechnicalComposite, TechnicalCompositeScorer, TechnicalIndicatorSet,
};
use signal_core::TechnicalConfig;
use signal_data::MarketDataProvider;

/// 기술적 분석 결과 출력.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalOutput {
    pub symbol: String,
    pub indicators: TechnicalIndicatorSet,
    pub composite: TechnicalComposite,
}

/// 지표 세트와 기술적 종합 시그널을 계산합니다.
pub async fn run_technical(
    provider: &dyn MarketDataProvider,
    config: &TechnicalConfig,
    symbol: &str,
) -> Result<TechnicalOutput> {
    let bars = provider
        .daily_bars(symbol)
        .await
        .with_context(|| format!("failed to load daily bars for {}", symbol))?;

    let indicators = TechnicalAnalyzer::new(config.clone()).analyze(&bars);
    let composite = TechnicalCompositeScorer::new().score(&bars);

    Ok(TechnicalOutput {
        symbol: symbol.to_uppercase(),
        indicators,
        composite,
    })
}
