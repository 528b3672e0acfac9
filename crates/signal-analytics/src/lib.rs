//! 시그널 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 앙상블 가격 예측 (몬테카를로, 추세 회귀, ARIMA(2,1,2))
//! - 기술적 지표와 기술적 종합 시그널
//! - Black–Scholes 옵션 가격/그릭스
//! - 옵션 체인 집계와 옵션 포지셔닝 시그널
//!
//! 공개 진입점은 데이터가 부족해도 에러 대신 센티넬 값을 반환합니다.
//!
//! # Re-exports
//!
//! - [`forecast`]: 예측 모델과 비동기 러너
//! - [`indicators`]: 지표 엔진 (SMA, EMA, MACD, RSI, 볼린저 밴드, 캔들 패턴)
//! - [`options`]: 옵션 가격/집계/시그널

pub mod forecast;
pub mod indicators;
pub mod options;
pub mod technical;
pub mod technical_composite;

// Forecast 모듈 re-exports
pub use forecast::{
    ArimaForecaster, ArimaOutcome, EnsembleForecastEngine, EnsembleReport, ForecastRunner,
    HorizonForecast, ModelBreakdown, MonteCarloSimulator, TrendRegressor,
};

// Indicators 모듈 re-exports
pub use indicators::{
    BollingerBandsParams, BollingerBandsResult, CandlePatternType, EmaParams, IndicatorEngine,
    IndicatorError, IndicatorResult, MacdParams, MacdResult, RsiParams, SmaParams, TrendLabel,
    VolatilityRegime,
};

// Options 모듈 re-exports
pub use options::{
    AggregateMetrics, OptionChainAggregator, OptionLevels, OptionQuote, OptionsAnalysis,
    OptionsAnalyzer, OptionsPricingEngine, OptionsReport, OptionsSignalSynthesizer,
};

// Technical 모듈 re-exports
pub use technical::{MacdSignal, TechnicalAnalyzer, TechnicalIndicatorSet, TechnicalSummary};
pub use technical_composite::{TechnicalComposite, TechnicalCompositeScorer};
