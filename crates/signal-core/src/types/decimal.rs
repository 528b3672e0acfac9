//! 출력용 반올림 및 퍼센트 포맷 유틸리티.
//!
//! 모델 계산은 `f64`로 수행하고, 와이어로 나가는 값만 `Decimal`을 거쳐
//! 소수점 자릿수를 고정합니다. 이진 부동소수점의 반올림 오차(예: 2.675 → 2.67)를
//! 피하기 위해 십진 표현에서 반올림합니다.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// 퍼센트 타입 (0.01 = 1%).
pub type Percentage = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 비율을 퍼센트 문자열로 변환합니다 (예: 0.0235 → "2.35%").
    fn to_percentage_string(&self) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 먼 쪽으로).
    fn round_dp(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_percentage_string(&self) -> String {
        let pct = DecimalExt::round_dp(&(*self * Decimal::ONE_HUNDRED), 2);
        format!("{:.2}%", pct)
    }

    fn round_dp(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// `f64` 값을 소수점 `dp`자리로 반올림합니다.
///
/// NaN/무한대나 Decimal 범위를 벗어난 값은 입력을 그대로 반환합니다.
pub fn round_f64(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    Decimal::from_f64_retain(value)
        .map(|d| DecimalExt::round_dp(&d, dp))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// 비율(`f64`)을 퍼센트 문자열로 변환합니다.
///
/// 표현할 수 없는 값은 `None`을 반환합니다.
pub fn format_ratio_percent(ratio: f64) -> Option<String> {
    if !ratio.is_finite() {
        return None;
    }

    Decimal::from_f64(ratio).map(|d| d.to_percentage_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_ext() {
        let d = dec!(0.0525);
        assert_eq!(d.to_percentage_string(), "5.25%");
        assert_eq!(dec!(-0.01234).to_percentage_string(), "-1.23%");
        assert_eq!(dec!(0).to_percentage_string(), "0.00%");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(DecimalExt::round_dp(&dec!(2.665), 2), dec!(2.67));
        assert_eq!(DecimalExt::round_dp(&dec!(-2.665), 2), dec!(-2.67));
        assert!((round_f64(0.53983, 4) - 0.5398).abs() < 1e-12);
        assert!((round_f64(-0.125, 2) + 0.13).abs() < 1e-12);
    }

    #[test]
    fn test_round_non_finite_passthrough() {
        assert!(round_f64(f64::NAN, 2).is_nan());
        assert_eq!(round_f64(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_format_ratio_percent() {
        assert_eq!(format_ratio_percent(0.0235).as_deref(), Some("2.35%"));
        assert_eq!(format_ratio_percent(f64::NAN), None);
    }
}
