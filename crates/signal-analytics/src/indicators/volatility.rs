//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands (모표준편차)
//! - 연율화 변동성 및 변동성 국면

use serde::{Deserialize, Serialize};
use signal_core::{population_std, sample_std, simple_returns, TRADING_DAYS_PER_YEAR};

use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드.
    pub upper: f64,
    /// 중간 밴드 (SMA).
    pub middle: f64,
    /// 하단 밴드.
    pub lower: f64,
}

/// 변동성 국면.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    High,
    Medium,
    Low,
    Unknown,
}

impl VolatilityRegime {
    /// 연율화 변동성으로 국면을 분류합니다 (40% 초과 High, 20% 초과 Medium).
    pub fn from_annualized(vol: f64) -> Self {
        if !vol.is_finite() {
            VolatilityRegime::Unknown
        } else if vol > 0.40 {
            VolatilityRegime::High
        } else if vol > 0.20 {
            VolatilityRegime::Medium
        } else {
            VolatilityRegime::Low
        }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = SMA(period), 상/하단 = 중간 ± 배수 × 모표준편차
    ///
    /// # 반환
    /// 완전한 윈도우가 있는 시점의 밴드 값 (길이 n - period + 1)
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        prices
            .windows(period)
            .map(|w| {
                let middle = w.iter().sum::<f64>() / period as f64;
                let std = population_std(w).ok_or_else(|| {
                    IndicatorError::CalculationError("표준편차 계산 실패".to_string())
                })?;
                let band = params.std_dev_multiplier * std;
                Ok(BollingerBandsResult {
                    upper: middle + band,
                    middle,
                    lower: middle - band,
                })
            })
            .collect()
    }

    /// 최근 `window`개 일간 수익률의 연율화 표본 표준편차.
    ///
    /// 종가가 `window`개 미만이면 데이터 부족입니다. 종가가 충분하면
    /// 마지막 `window + 1`개 종가에서 수익률 `window`개를 사용합니다.
    pub fn annualized_volatility(&self, prices: &[f64], window: usize) -> IndicatorResult<f64> {
        if window < 2 {
            return Err(IndicatorError::InvalidParameter(
                "변동성 윈도우는 2 이상이어야 합니다".to_string(),
            ));
        }

        if prices.len() < window {
            return Err(IndicatorError::InsufficientData {
                required: window,
                provided: prices.len(),
            });
        }

        let start = prices.len().saturating_sub(window + 1);
        let returns = simple_returns(&prices[start..]);
        let std = sample_std(&returns).ok_or(IndicatorError::InsufficientData {
            required: window,
            provided: prices.len(),
        })?;

        Ok(std * TRADING_DAYS_PER_YEAR.sqrt())
    }

    /// 변동성 국면 분류. 데이터가 부족하면 `Unknown`.
    pub fn regime(&self, prices: &[f64], window: usize) -> VolatilityRegime {
        self.annualized_volatility(prices, window)
            .map(VolatilityRegime::from_annualized)
            .unwrap_or(VolatilityRegime::Unknown)
    }
}
