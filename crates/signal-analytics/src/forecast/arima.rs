//! ARIMA(2,1,2) 예측.
//!
//! 1차 차분 시계열에 대해:
//! - **AR**: Yule–Walker 방정식을 Levinson–Durbin 재귀로 풀어 계수 추정
//! - **MA**: AR 잔차의 자기상관으로 계수 추정 (±0.99로 제한)
//! - **I**: 차분 예측을 누적합하여 가격 수준으로 복원
//!
//! 예측 오차는 적분 과정의 ψ-가중치로 계산한 h-스텝 예측 표준오차
//! `σ·sqrt(Σ_j (Σ_{i≤j} ψ_i)²)`입니다.
//!
//! 적합이 불가능하거나 결과가 유한하지 않으면 `±volatility·√h` 대체 구간을 사용합니다.

use serde::{Deserialize, Serialize};
use signal_core::ModelProjection;
use tracing::warn;

use crate::indicators::{IndicatorError, IndicatorResult};

/// AR 차수.
const P: usize = 2;
/// MA 차수.
const Q: usize = 2;
/// MA 계수 제한.
const MA_BOUND: f64 = 0.99;
/// 분산이 0으로 간주되는 임계값.
const VARIANCE_EPSILON: f64 = 1e-12;

/// 기본 적합 구간 (관측치 수).
pub const DEFAULT_LOOKBACK: usize = 100;
/// 적합에 필요한 최소 관측치 수.
pub const DEFAULT_MIN_POINTS: usize = 30;

/// ARIMA 예측 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ArimaOutcome {
    /// 모델 적합 성공
    Fitted {
        projection: ModelProjection,
        /// h-스텝 가격 예측
        point_forecast: f64,
        /// 예측 표준오차 (가격 단위)
        std_error: f64,
    },
    /// 변동성 기반 대체 구간
    Fallback {
        projection: ModelProjection,
        reason: String,
    },
}

impl ArimaOutcome {
    /// 수익률 구간.
    pub fn projection(&self) -> ModelProjection {
        match self {
            ArimaOutcome::Fitted { projection, .. } | ArimaOutcome::Fallback { projection, .. } => {
                *projection
            }
        }
    }

    /// 대체 구간 사용 여부.
    pub fn is_fallback(&self) -> bool {
        matches!(self, ArimaOutcome::Fallback { .. })
    }
}

/// 적합된 ARIMA(2,1,2) 모델.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaModel {
    /// AR 계수 (φ1, φ2)
    pub ar: [f64; P],
    /// MA 계수 (θ1, θ2)
    pub ma: [f64; Q],
    /// 차분 평균 (드리프트)
    pub mean: f64,
    /// 혁신(innovation) 분산
    pub sigma2: f64,
    centered: Vec<f64>,
    residuals: Vec<f64>,
    last_level: f64,
}

impl ArimaModel {
    /// 가격 시계열에 모델을 적합합니다.
    pub fn fit(levels: &[f64]) -> IndicatorResult<Self> {
        // 차분 후 AR/MA 항을 추정하려면 최소 p + q + 2개 차분이 필요
        let required = P + Q + 3;
        if levels.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                provided: levels.len(),
            });
        }
        if levels.iter().any(|x| !x.is_finite()) {
            return Err(IndicatorError::CalculationError(
                "입력에 NaN 또는 무한대 값이 있습니다".to_string(),
            ));
        }

        let diffs: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();
        let n = diffs.len();
        let mean = diffs.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = diffs.iter().map(|d| d - mean).collect();

        let gamma = autocovariance(&centered, P);
        let ar = levinson_durbin(&gamma);

        // 1단계: AR 잔차
        let ar_residuals: Vec<f64> = (0..n)
            .map(|t| {
                if t < P {
                    0.0
                } else {
                    centered[t] - ar[0] * centered[t - 1] - ar[1] * centered[t - 2]
                }
            })
            .collect();

        // 2단계: 잔차 자기상관 → MA 계수
        let resid_gamma = autocovariance(&ar_residuals[P..], Q);
        let mut ma = [0.0; Q];
        if resid_gamma[0] > VARIANCE_EPSILON {
            for k in 0..Q {
                ma[k] = (resid_gamma[k + 1] / resid_gamma[0]).clamp(-MA_BOUND, MA_BOUND);
            }
        }

        // 3단계: ARMA 혁신 재계산
        let mut residuals = vec![0.0; n];
        for t in P..n {
            let mut e = centered[t];
            for i in 0..P {
                e -= ar[i] * centered[t - 1 - i];
            }
            for k in 0..Q {
                e -= ma[k] * residuals[t - 1 - k];
            }
            residuals[t] = e;
        }

        let effective = (n - P) as f64;
        let sigma2 = residuals[P..].iter().map(|e| e * e).sum::<f64>() / effective;

        if !sigma2.is_finite() || residuals.iter().any(|e| !e.is_finite()) {
            return Err(IndicatorError::CalculationError(
                "잔차가 발산했습니다".to_string(),
            ));
        }

        Ok(Self {
            ar,
            ma,
            mean,
            sigma2,
            centered,
            residuals,
            last_level: levels[levels.len() - 1],
        })
    }

    /// `horizon` 스텝 가격 예측 경로.
    pub fn forecast_levels(&self, horizon: usize) -> Vec<f64> {
        let mut centered = self.centered.clone();
        let mut residuals = self.residuals.clone();
        let mut level = self.last_level;
        let mut path = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let t = centered.len();
            let mut next = 0.0;
            for i in 0..P {
                next += self.ar[i] * centered[t - 1 - i];
            }
            for k in 0..Q {
                next += self.ma[k] * residuals[t - 1 - k];
            }
            centered.push(next);
            // 미래 혁신의 기대값은 0
            residuals.push(0.0);

            level += self.mean + next;
            path.push(level);
        }

        path
    }

    /// ARMA 부분의 ψ-가중치 (ψ0 = 1).
    pub fn psi_weights(&self, count: usize) -> Vec<f64> {
        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            let mut value = if j == 0 { 1.0 } else { 0.0 };
            if (1..=Q).contains(&j) {
                value += self.ma[j - 1];
            }
            for i in 1..=P.min(j) {
                value += self.ar[i - 1] * psi[j - i];
            }
            psi.push(value);
        }
        psi
    }

    /// 가격 수준 h-스텝 예측의 표준오차.
    pub fn forecast_std_error(&self, horizon: usize) -> f64 {
        let mut cumulative = 0.0;
        let variance_factor: f64 = self
            .psi_weights(horizon)
            .into_iter()
            .map(|psi| {
                cumulative += psi;
                cumulative * cumulative
            })
            .sum();
        (self.sigma2 * variance_factor).sqrt()
    }
}

/// 시차 0..=max_lag 자기공분산 (분모 n).
fn autocovariance(centered: &[f64], max_lag: usize) -> Vec<f64> {
    let n = centered.len();
    (0..=max_lag)
        .map(|k| {
            if n <= k {
                return 0.0;
            }
            centered[k..]
                .iter()
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

/// Levinson–Durbin 재귀로 AR(2) Yule–Walker 방정식을 풉니다.
///
/// 분산이 0이면 계수는 0입니다.
fn levinson_durbin(gamma: &[f64]) -> [f64; P] {
    if gamma[0] <= VARIANCE_EPSILON {
        return [0.0; P];
    }

    let phi11 = gamma[1] / gamma[0];
    let v1 = gamma[0] * (1.0 - phi11 * phi11);
    if v1 <= VARIANCE_EPSILON {
        return [phi11, 0.0];
    }

    let phi22 = (gamma[2] - phi11 * gamma[1]) / v1;
    let phi21 = phi11 - phi22 * phi11;
    [phi21, phi22]
}

/// ARIMA 예측기.
#[derive(Debug, Clone)]
pub struct ArimaForecaster {
    lookback: usize,
    min_points: usize,
}

impl Default for ArimaForecaster {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK, DEFAULT_MIN_POINTS)
    }
}

impl ArimaForecaster {
    /// 적합 구간과 최소 관측치 수로 생성합니다.
    pub fn new(lookback: usize, min_points: usize) -> Self {
        Self {
            lookback,
            min_points: min_points.max(P + Q + 3),
        }
    }

    /// `horizon` 스텝 수익률 구간을 예측합니다.
    ///
    /// 실패하면 `±volatility·√horizon` 대체 구간을 반환합니다.
    pub fn forecast(&self, closes: &[f64], horizon: usize, volatility: f64) -> ArimaOutcome {
        match self.try_forecast(closes, horizon) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, horizon, "ARIMA 적합 실패, 변동성 대체 구간 사용");
                let band = volatility * (horizon as f64).sqrt();
                ArimaOutcome::Fallback {
                    projection: ModelProjection::around(0.0, band),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_forecast(&self, closes: &[f64], horizon: usize) -> IndicatorResult<ArimaOutcome> {
        let window = &closes[closes.len().saturating_sub(self.lookback)..];
        if window.len() < self.min_points {
            return Err(IndicatorError::InsufficientData {
                required: self.min_points,
                provided: window.len(),
            });
        }
        if horizon == 0 {
            return Err(IndicatorError::InvalidParameter(
                "예측 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let last = window[window.len() - 1];
        if last <= 0.0 || !last.is_finite() {
            return Err(IndicatorError::CalculationError(format!(
                "마지막 가격이 유효하지 않습니다: {}",
                last
            )));
        }

        let model = ArimaModel::fit(window)?;
        let point_forecast = model
            .forecast_levels(horizon)
            .last()
            .copied()
            .ok_or_else(|| IndicatorError::CalculationError("빈 예측 경로".to_string()))?;
        let std_error = model.forecast_std_error(horizon);

        let projection = ModelProjection::new(
            (point_forecast - std_error - last) / last,
            (point_forecast + std_error - last) / last,
        );
        if !projection.is_finite() || !std_error.is_finite() {
            return Err(IndicatorError::CalculationError(
                "예측 결과가 유한하지 않습니다".to_string(),
            ));
        }

        Ok(ArimaOutcome::Fitted {
            projection,
            point_forecast,
            std_error,
        })
    }
}
