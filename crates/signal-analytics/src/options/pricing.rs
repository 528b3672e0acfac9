//! Black–Scholes 가격 및 그릭스.
//!
//! 유럽형 옵션, 고정 무위험 이자율, 배당 없음.
//! 정규분포 CDF는 Abramowitz–Stegun 7.1.26 다항식 erf 근사를 사용합니다.
//!
//! - Theta: 연율 값을 365로 나눈 1일 기준
//! - Vega: IV 1%p 변화 기준 (100으로 나눔)

use serde::{Deserialize, Serialize};
use signal_core::{round_f64, Greeks, OptionType};
use std::f64::consts::{PI, SQRT_2};

/// 기본 무위험 이자율 (연 6.5%).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.065;

/// 표준정규분포 누적분포함수 (A&S 7.1.26).
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// 표준정규분포 확률밀도함수.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Abramowitz–Stegun 7.1.26 erf 근사 (최대 오차 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// 옵션 가격과 그릭스.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// 이론가
    pub price: f64,
    /// 그릭스
    #[serde(flatten)]
    pub greeks: Greeks,
}

impl OptionQuote {
    /// 와이어 표기 자릿수로 반올림 (가격 2자리).
    pub fn rounded(&self) -> Self {
        Self {
            price: round_f64(self.price, 2),
            greeks: self.greeks.rounded(),
        }
    }
}

/// Black–Scholes 가격 엔진.
#[derive(Debug, Clone, Copy)]
pub struct OptionsPricingEngine {
    risk_free_rate: f64,
}

impl Default for OptionsPricingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE)
    }
}

impl OptionsPricingEngine {
    /// 무위험 이자율을 지정하여 생성합니다.
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    /// 무위험 이자율.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// 가격과 그릭스를 계산합니다.
    ///
    /// # 인자
    /// * `spot` - 현물 가격
    /// * `strike` - 행사가
    /// * `time_years` - 만기까지 기간 (년)
    /// * `iv` - 내재변동성 (소수, 0.20 = 20%)
    /// * `option_type` - 콜/풋
    ///
    /// # 반환
    /// `time ≤ 0` 또는 `iv ≤ 0`이면 내재가치와 0 그릭스
    pub fn quote(
        &self,
        spot: f64,
        strike: f64,
        time_years: f64,
        iv: f64,
        option_type: OptionType,
    ) -> OptionQuote {
        // ln(S/K)가 정의되지 않는 입력도 내재가치로 처리
        if time_years <= 0.0 || iv <= 0.0 || spot <= 0.0 || strike <= 0.0 {
            return OptionQuote {
                price: intrinsic_value(spot, strike, option_type),
                greeks: Greeks::default(),
            };
        }

        let r = self.risk_free_rate;
        let sqrt_t = time_years.sqrt();
        let d1 = ((spot / strike).ln() + (r + iv * iv / 2.0) * time_years) / (iv * sqrt_t);
        let d2 = d1 - iv * sqrt_t;
        let discount = (-r * time_years).exp();
        let pdf_d1 = norm_pdf(d1);

        let gamma = pdf_d1 / (spot * iv * sqrt_t);
        let vega = spot * pdf_d1 * sqrt_t / 100.0;
        let decay = -spot * pdf_d1 * iv / (2.0 * sqrt_t);

        let (price, delta, theta_annual) = match option_type {
            OptionType::CE => (
                spot * norm_cdf(d1) - strike * discount * norm_cdf(d2),
                norm_cdf(d1),
                decay - r * strike * discount * norm_cdf(d2),
            ),
            OptionType::PE => (
                strike * discount * norm_cdf(-d2) - spot * norm_cdf(-d1),
                norm_cdf(d1) - 1.0,
                decay + r * strike * discount * norm_cdf(-d2),
            ),
        };

        OptionQuote {
            price,
            greeks: Greeks {
                delta,
                gamma,
                theta: theta_annual / 365.0,
                vega,
            },
        }
    }
}

/// 내재가치.
pub fn intrinsic_value(spot: f64, strike: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::CE => (spot - strike).max(0.0),
        OptionType::PE => (strike - spot).max(0.0),
    }
}
