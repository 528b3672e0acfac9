//! 앙상블 예측 결과 타입.
//!
//! - `ForecastHorizon` - 예측 기간 (거래일 수, 0 불가)
//! - `ModelProjection` - 개별 모델의 수익률 구간
//! - `PercentValue` - 퍼센트 문자열 또는 "N/A"
//! - `EnsembleForecast` - 호출자에게 전달되는 와이어 타입

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SignalError, SignalResult};
use crate::types::format_ratio_percent;

/// 데이터 부족 시 "N/A"로 표시되는 값.
pub const NOT_AVAILABLE: &str = "N/A";

/// 예측 기간 (거래일 단위 스텝 수).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ForecastHorizon(usize);

impl ForecastHorizon {
    /// 1주 (5 거래일)
    pub const WEEK: ForecastHorizon = ForecastHorizon(5);
    /// 1개월 (22 거래일)
    pub const MONTH: ForecastHorizon = ForecastHorizon(22);
    /// 6개월 (126 거래일)
    pub const HALF_YEAR: ForecastHorizon = ForecastHorizon(126);

    /// 새 예측 기간을 생성합니다. 0은 거부됩니다.
    pub fn new(steps: usize) -> SignalResult<Self> {
        if steps == 0 {
            return Err(SignalError::InvalidInput(
                "예측 기간은 1 거래일 이상이어야 합니다".to_string(),
            ));
        }
        Ok(Self(steps))
    }

    /// 스텝 수.
    pub fn steps(&self) -> usize {
        self.0
    }

    /// 표준 예측 기간 목록 (5, 22, 126).
    pub fn canonical() -> [ForecastHorizon; 3] {
        [Self::WEEK, Self::MONTH, Self::HALF_YEAR]
    }
}

impl TryFrom<usize> for ForecastHorizon {
    type Error = SignalError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ForecastHorizon> for usize {
    fn from(h: ForecastHorizon) -> Self {
        h.0
    }
}

impl fmt::Display for ForecastHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.0)
    }
}

/// 개별 모델의 수익률 구간 (비율, 0.02 = 2%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelProjection {
    /// 하단
    pub lower: f64,
    /// 상단
    pub upper: f64,
}

impl ModelProjection {
    /// 새 구간을 생성합니다.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// 중심 ± 폭 구간.
    pub fn around(center: f64, margin: f64) -> Self {
        Self {
            lower: center - margin,
            upper: center + margin,
        }
    }

    /// 구간 중앙값.
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// 두 경계가 모두 유한한지 확인합니다.
    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }
}

impl fmt::Display for ModelProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% to {:.2}%",
            self.lower * 100.0,
            self.upper * 100.0
        )
    }
}

/// 퍼센트 값 또는 "N/A".
///
/// 내부적으로는 비율(0.0235)을 보관하고 직렬화할 때 `"2.35%"`로 변환합니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentValue {
    /// 비율 값
    Value(f64),
    /// 계산 불가
    NotAvailable,
}

impl PercentValue {
    /// 비율 값을 반환합니다.
    pub fn ratio(&self) -> Option<f64> {
        match self {
            PercentValue::Value(v) => Some(*v),
            PercentValue::NotAvailable => None,
        }
    }

    /// "N/A" 여부.
    pub fn is_available(&self) -> bool {
        matches!(self, PercentValue::Value(_))
    }
}

impl From<f64> for PercentValue {
    fn from(ratio: f64) -> Self {
        if ratio.is_finite() {
            PercentValue::Value(ratio)
        } else {
            PercentValue::NotAvailable
        }
    }
}

impl fmt::Display for PercentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio().and_then(format_ratio_percent) {
            Some(s) => f.write_str(&s),
            None => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for PercentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PercentValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed == NOT_AVAILABLE {
            return Ok(PercentValue::NotAvailable);
        }

        let number = trimmed
            .strip_suffix('%')
            .ok_or_else(|| de::Error::custom(format!("퍼센트 형식이 아닙니다: {}", raw)))?;
        let pct: f64 = number.trim().parse().map_err(de::Error::custom)?;
        Ok(PercentValue::Value(pct / 100.0))
    }
}

/// 예상 수익률 구간 (와이어 타입).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRange {
    /// 하단
    pub lower: PercentValue,
    /// 상단
    pub upper: PercentValue,
}

/// 상승/하락 확률 (와이어 타입).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    /// 상승 확률
    pub positive: PercentValue,
    /// 하락 확률
    pub negative: PercentValue,
}

/// 리스크 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    /// 기간 변동성(`volatility·√h`)으로 리스크 수준을 분류합니다.
    ///
    /// 0.15 초과 High, 0.08 초과 Medium, 그 외 Low.
    pub fn from_horizon_volatility(horizon_vol: f64) -> Self {
        if !horizon_vol.is_finite() {
            RiskLevel::Unknown
        } else if horizon_vol > 0.15 {
            RiskLevel::High
        } else if horizon_vol > 0.08 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// 앙상블 예측 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleForecast {
    /// 예상 수익률 구간
    pub expected_return_range: ReturnRange,
    /// 상승/하락 확률
    pub probability: Probability,
    /// 신뢰도 (5~95, 데이터 부족 시 0)
    pub confidence: u8,
    /// 리스크 수준
    pub risk_level: RiskLevel,
    /// 설명 문장 목록
    pub explanation: Vec<String>,
}

impl EnsembleForecast {
    /// 데이터 부족 시 반환되는 센티넬 예측.
    pub fn insufficient(required: usize, provided: usize) -> Self {
        Self::unavailable(format!(
            "Insufficient data: at least {} closing prices required, {} provided",
            required, provided
        ))
    }

    /// 모든 값이 "N/A"인 센티넬 예측.
    pub fn unavailable(note: impl Into<String>) -> Self {
        Self {
            expected_return_range: ReturnRange {
                lower: PercentValue::NotAvailable,
                upper: PercentValue::NotAvailable,
            },
            probability: Probability {
                positive: PercentValue::NotAvailable,
                negative: PercentValue::NotAvailable,
            },
            confidence: 0,
            risk_level: RiskLevel::Unknown,
            explanation: vec![note.into()],
        }
    }

    /// 센티넬 예측인지 확인합니다.
    pub fn is_sentinel(&self) -> bool {
        self.confidence == 0 && !self.expected_return_range.lower.is_available()
    }
}
