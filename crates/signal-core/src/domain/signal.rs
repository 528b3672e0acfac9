//! 방향성 시그널 타입.
//!
//! - `SignalLabel` - 방향 라벨 (Bullish ~ Bearish)
//! - `ConfidenceLabel` - 신뢰도/강도 라벨
//! - `QuantSubSignal` - 개별 지표의 0~100 점수
//! - `CompositeSignal` - 가중 합성된 최종 시그널

use serde::{Deserialize, Serialize};
use std::fmt;

/// 방향 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalLabel {
    #[serde(rename = "Bullish")]
    Bullish,
    #[serde(rename = "Mildly Bullish")]
    MildlyBullish,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Mildly Bearish")]
    MildlyBearish,
    #[serde(rename = "Bearish")]
    Bearish,
}

impl SignalLabel {
    /// 상승 방향 여부.
    pub fn is_bullish(&self) -> bool {
        matches!(self, SignalLabel::Bullish | SignalLabel::MildlyBullish)
    }

    /// 하락 방향 여부.
    pub fn is_bearish(&self) -> bool {
        matches!(self, SignalLabel::Bearish | SignalLabel::MildlyBearish)
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalLabel::Bullish => "Bullish",
            SignalLabel::MildlyBullish => "Mildly Bullish",
            SignalLabel::Neutral => "Neutral",
            SignalLabel::MildlyBearish => "Mildly Bearish",
            SignalLabel::Bearish => "Bearish",
        };
        f.write_str(s)
    }
}

/// 신뢰도(또는 강도) 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    High,
    Moderate,
    Low,
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLabel::High => "High",
            ConfidenceLabel::Moderate => "Moderate",
            ConfidenceLabel::Low => "Low",
        };
        f.write_str(s)
    }
}

/// 0~100 범위로 클램프합니다. NaN은 중립값 50으로 처리합니다.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        50.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// 개별 지표 시그널.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantSubSignal {
    /// 점수 (0~100)
    pub score: f64,
    /// 방향 라벨
    pub signal: SignalLabel,
    /// 강도
    pub strength: ConfidenceLabel,
    /// 해석 문장
    pub interpretation: String,
}

impl QuantSubSignal {
    /// 새 시그널을 생성합니다. 점수는 0~100으로 클램프됩니다.
    pub fn new(
        score: f64,
        signal: SignalLabel,
        strength: ConfidenceLabel,
        interpretation: impl Into<String>,
    ) -> Self {
        Self {
            score: clamp_score(score),
            signal,
            strength,
            interpretation: interpretation.into(),
        }
    }

    /// 중립 시그널.
    pub fn neutral(interpretation: impl Into<String>) -> Self {
        Self::new(50.0, SignalLabel::Neutral, ConfidenceLabel::Low, interpretation)
    }
}

/// 가중 합성된 최종 시그널.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSignal {
    /// 점수 (0~100 정수)
    pub score: u8,
    /// 방향 라벨
    pub signal: SignalLabel,
    /// 신뢰도
    pub confidence: ConfidenceLabel,
    /// 근거 목록 (하위 시그널 순서)
    pub reasoning: Vec<String>,
}

impl CompositeSignal {
    /// 실수 점수를 반올림/클램프하여 생성합니다.
    pub fn new(
        raw_score: f64,
        signal: SignalLabel,
        confidence: ConfidenceLabel,
        reasoning: Vec<String>,
    ) -> Self {
        Self {
            score: clamp_score(raw_score).round() as u8,
            signal,
            confidence,
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_wire_names() {
        assert_eq!(
            serde_json::to_string(&SignalLabel::MildlyBullish).unwrap(),
            "\"Mildly Bullish\""
        );
        assert_eq!(SignalLabel::MildlyBearish.to_string(), "Mildly Bearish");
        assert!(SignalLabel::Bullish.is_bullish());
        assert!(!SignalLabel::Neutral.is_bearish());
    }

    #[test]
    fn test_scores_are_clamped() {
        let sub = QuantSubSignal::new(130.0, SignalLabel::Bullish, ConfidenceLabel::High, "x");
        assert_eq!(sub.score, 100.0);

        let composite = CompositeSignal::new(-4.0, SignalLabel::Bearish, ConfidenceLabel::High, vec![]);
        assert_eq!(composite.score, 0);

        assert_eq!(clamp_score(f64::NAN), 50.0);
        assert_eq!(CompositeSignal::new(69.5, SignalLabel::Bullish, ConfidenceLabel::Moderate, vec![]).score, 70);
    }
}
