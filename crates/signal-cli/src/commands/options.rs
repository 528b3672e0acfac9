//! 옵션 체인 분석 명령.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use signal_analytics::{OptionsAnalyzer, OptionsReport};
use signal_core::OptionsConfig;
use signal_data::MarketDataProvider;
use tracing::info;

/// 옵션 분석 결과 출력.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsOutput {
    pub symbol: String,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub report: OptionsReport,
}

/// 옵션 체인을 불러와 분석합니다.
///
/// # 인자
/// * `expiry` - 분석할 만기 (없으면 프로바이더가 가장 가까운 만기 선택)
/// * `as_of` - 만기까지 일수 계산 기준일
pub async fn run_options(
    provider: &dyn MarketDataProvider,
    config: &OptionsConfig,
    symbol: &str,
    expiry: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Result<OptionsOutput> {
    let chain = provider
        .option_chain(symbol, expiry)
        .await
        .with_context(|| format!("failed to load option chain for {}", symbol))?;

    info!(symbol, expiry = %chain.expiry, strikes = chain.strikes().len(), "Analyzing option chain");
    let report = OptionsAnalyzer::new(config).report(chain, as_of);

    Ok(OptionsOutput {
        symbol: symbol.to_uppercase(),
        as_of,
        report,
    })
}
