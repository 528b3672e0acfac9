//! 옵션 분석 모듈.
//!
//! - `pricing` - Black–Scholes 가격과 그릭스
//! - `chain` - 옵션 체인 집계 (PCR, Max Pain, OI 빌드업, 지지/저항)
//! - `synthesizer` - 하위 시그널과 종합 시그널
//!
//! [`OptionsAnalyzer`]는 세 단계를 묶어 스냅샷 하나를 분석합니다.

pub mod chain;
pub mod pricing;
pub mod synthesizer;

pub use chain::*;
pub use pricing::*;
pub use synthesizer::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use signal_core::{CompositeSignal, OptionChainSnapshot, OptionsConfig, QuantSubSignal};
use tracing::debug;

/// 옵션 분석 결과 (와이어 형식).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsAnalysis {
    pub pcr: QuantSubSignal,
    pub max_pain: QuantSubSignal,
    pub oi: QuantSubSignal,
    pub iv: QuantSubSignal,
    pub levels: OptionLevels,
    /// score, signal, confidence, reasoning
    #[serde(flatten)]
    pub composite: CompositeSignal,
}

/// 분석 결과와 집계 지표, 그릭스가 채워진 체인.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsReport {
    pub analysis: OptionsAnalysis,
    pub metrics: AggregateMetrics,
    pub chain: OptionChainSnapshot,
}

/// 옵션 체인 분석기.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsAnalyzer {
    pricing: OptionsPricingEngine,
    aggregator: OptionChainAggregator,
    synthesizer: OptionsSignalSynthesizer,
}

impl OptionsAnalyzer {
    /// 설정으로 분석기를 생성합니다.
    pub fn new(config: &OptionsConfig) -> Self {
        Self {
            pricing: OptionsPricingEngine::new(config.risk_free_rate),
            aggregator: OptionChainAggregator::new(config.top_strikes),
            synthesizer: OptionsSignalSynthesizer::new(config.otm_band),
        }
    }

    /// 가격 엔진.
    pub fn pricing(&self) -> &OptionsPricingEngine {
        &self.pricing
    }

    /// 스냅샷에서 옵션 시그널을 계산합니다.
    pub fn analyze(&self, chain: &OptionChainSnapshot, as_of: NaiveDate) -> OptionsAnalysis {
        let metrics = self.aggregator.aggregate(chain, as_of);
        self.analyze_with_metrics(chain, &metrics)
    }

    /// 그릭스를 채운 체인과 집계 지표까지 포함한 전체 보고서를 만듭니다.
    pub fn report(&self, mut chain: OptionChainSnapshot, as_of: NaiveDate) -> OptionsReport {
        self.enrich_greeks(&mut chain, as_of);
        let metrics = self.aggregator.aggregate(&chain, as_of);
        let analysis = self.analyze_with_metrics(&chain, &metrics);

        OptionsReport {
            analysis,
            metrics,
            chain,
        }
    }

    /// 체인의 모든 계약에 그릭스를 채웁니다.
    ///
    /// 만기까지 기간은 `일수 / 365`, IV는 퍼센트 값을 100으로 나눠 사용합니다.
    pub fn enrich_greeks(&self, chain: &mut OptionChainSnapshot, as_of: NaiveDate) {
        let spot = chain.spot;
        let time_years = chain.days_to_expiry(as_of) as f64 / 365.0;

        for contract in chain.contracts_mut() {
            let quote = self.pricing.quote(
                spot,
                contract.strike,
                time_years,
                contract.implied_volatility / 100.0,
                contract.option_type,
            );
            contract.greeks = quote.greeks.rounded();
        }
    }

    fn analyze_with_metrics(
        &self,
        chain: &OptionChainSnapshot,
        metrics: &AggregateMetrics,
    ) -> OptionsAnalysis {
        let signals = self.synthesizer.sub_signals(chain, metrics);
        let composite = self.synthesizer.composite(&signals);
        let levels = self.aggregator.levels(chain, metrics.max_pain);

        debug!(
            score = composite.score,
            signal = %composite.signal,
            expiry = %chain.expiry,
            "Options analysis complete"
        );

        OptionsAnalysis {
            pcr: signals.pcr,
            max_pain: signals.max_pain,
            oi: signals.oi,
            iv: signals.iv,
            levels,
            composite,
        }
    }
}
