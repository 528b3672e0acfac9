//! 기술적 지표 모듈.
//!
//! 종가 시계열에 대한 표준 기술적 지표를 `f64`로 계산합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균 (처음 `min(period, n)`개 평균으로 시드)
//! - **MACD**: 이동평균 수렴/확산 (12, 26, 9)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder 평활)
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드 (20, 2σ)
//! - **변동성 국면**: 최근 20일 수익률의 연율화 표준편차
//!
//! ## 캔들 패턴
//! - 망치형, 역망치형, 교수형, 유성형, 장악형, 도지
//!
//! # 사용 예시
//!
//! ```
//! use signal_analytics::indicators::{IndicatorEngine, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
//! let rsi = engine.rsi(&prices, RsiParams { period: 14 }).unwrap();
//! assert_eq!(rsi.last().copied(), Some(100.0));
//! ```

pub mod candle_patterns;
pub mod momentum;
pub mod trend;
pub mod volatility;

use signal_core::PriceBar;
use thiserror::Error;

pub use candle_patterns::{
    CandlePatternDetector, CandlePatternParams, CandlePatternResult, CandlePatternType,
};
pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators, TrendLabel};
pub use volatility::{
    BollingerBandsParams, BollingerBandsResult, VolatilityIndicators, VolatilityRegime,
};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    candles: CandlePatternDetector,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<f64>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// # 반환
    /// 시드 시점부터의 EMA 값들
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        self.trend.ema(prices, params)
    }

    /// MACD 계산.
    ///
    /// # 반환
    /// 시그널 라인이 존재하는 시점의 MACD 라인, 시그널 라인, 히스토그램
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// EMA 교차 기반 추세 라벨.
    pub fn trend_label(&self, prices: &[f64], short: usize, long: usize) -> TrendLabel {
        self.trend.classify(prices, short, long, long)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI (Relative Strength Index) 계산.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<f64>> {
        self.momentum.rsi(prices, params)
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// 최근 `window`일 수익률의 연율화 변동성.
    pub fn annualized_volatility(&self, prices: &[f64], window: usize) -> IndicatorResult<f64> {
        self.volatility.annualized_volatility(prices, window)
    }

    /// 변동성 국면 분류.
    pub fn volatility_regime(&self, prices: &[f64], window: usize) -> VolatilityRegime {
        self.volatility.regime(prices, window)
    }

    // ==================== 캔들 패턴 ====================

    /// 마지막 봉의 캔들 패턴.
    pub fn last_candle_pattern(&self, bars: &[PriceBar]) -> CandlePatternResult {
        self.candles.last_pattern(bars, CandlePatternParams::default())
    }
}
