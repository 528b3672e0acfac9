//! 선형 추세 회귀.
//!
//! 최근 N개 종가에 가격 = a + b·index를 최소제곱으로 적합하고
//! `horizon` 스텝 뒤로 외삽합니다. 오차 폭은 잔차 표준편차의 2배(가격 대비)이며
//! 최소 1%입니다.

use signal_core::{population_std, ModelProjection};

/// 기본 회귀 구간 (관측치 수).
pub const DEFAULT_LOOKBACK: usize = 100;

/// 데이터가 2개 미만일 때의 고정 구간 (±5%).
const FALLBACK_BAND: f64 = 0.05;

/// 최소 오차 폭 (1%).
const MIN_ERROR_MARGIN: f64 = 0.01;

/// OLS 적합 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// 절편
    pub intercept: f64,
    /// 기울기
    pub slope: f64,
}

impl LinearFit {
    /// `x` 위치의 예측값.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// 인덱스(0, 1, ..)에 대한 OLS 적합. 2개 미만이면 `None`.
pub fn fit_linear(values: &[f64]) -> Option<LinearFit> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x_diff = i as f64 - x_mean;
        numerator += x_diff * (y - y_mean);
        denominator += x_diff * x_diff;
    }

    let slope = numerator / denominator;
    Some(LinearFit {
        intercept: y_mean - slope * x_mean,
        slope,
    })
}

/// 추세 회귀 예측기.
#[derive(Debug, Clone)]
pub struct TrendRegressor {
    lookback: usize,
}

impl Default for TrendRegressor {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK)
    }
}

impl TrendRegressor {
    /// 회귀 구간을 지정하여 생성합니다 (최소 2).
    pub fn new(lookback: usize) -> Self {
        Self {
            lookback: lookback.max(2),
        }
    }

    /// `horizon` 스텝 뒤의 수익률 구간을 추정합니다.
    pub fn project(&self, closes: &[f64], horizon: usize) -> ModelProjection {
        let window = &closes[closes.len().saturating_sub(self.lookback)..];
        let last = window.last().copied().unwrap_or(0.0);

        let Some(fit) = fit_linear(window) else {
            return ModelProjection::around(0.0, FALLBACK_BAND);
        };
        if last == 0.0 {
            return ModelProjection::around(0.0, FALLBACK_BAND);
        }

        let target_index = (window.len() - 1 + horizon) as f64;
        let predicted_return = (fit.predict(target_index) - last) / last;

        let residuals: Vec<f64> = window
            .iter()
            .enumerate()
            .map(|(i, y)| y - fit.predict(i as f64))
            .collect();
        let residual_std = population_std(&residuals).unwrap_or(0.0);
        let margin = (2.0 * residual_std / last.abs()).max(MIN_ERROR_MARGIN);

        ModelProjection::around(predicted_return, margin)
    }
}
