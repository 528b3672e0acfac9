//! 옵션 포지셔닝 시그널 합성.
//!
//! 집계 지표에서 네 개의 하위 시그널(PCR, Max Pain, OI, IV)을 만들고
//! 0.30 / 0.25 / 0.30 / 0.15 가중치로 종합 점수를 계산합니다.
//!
//! | 점수 | 라벨 | 신뢰도 |
//! |------|------|--------|
//! | ≥ 70 | Bullish | ≥ 80 High, 그 외 Moderate |
//! | ≥ 55 | Mildly Bullish | Moderate |
//! | ≤ 30 | Bearish | ≤ 20 High, 그 외 Moderate |
//! | ≤ 45 | Mildly Bearish | Moderate |
//! | 그 외 | Neutral | Low |

use serde::{Deserialize, Serialize};
use signal_core::{
    clamp_score, CompositeSignal, ConfidenceLabel, OptionChainSnapshot, QuantSubSignal,
    SignalLabel,
};
use tracing::debug;

use super::chain::AggregateMetrics;

/// ATM IV가 이 값(퍼센트 포인트)을 넘으면 고변동성으로 봅니다.
pub const HIGH_ATM_IV: f64 = 25.0;

/// 스큐 판정 임계값 (퍼센트 포인트).
const SKEW_THRESHOLD: f64 = 2.0;

const PCR_WEIGHT: f64 = 0.30;
const MAX_PAIN_WEIGHT: f64 = 0.25;
const OI_WEIGHT: f64 = 0.30;
const IV_WEIGHT: f64 = 0.15;

/// 하위 시그널 묶음.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSubSignals {
    pub pcr: QuantSubSignal,
    pub max_pain: QuantSubSignal,
    pub oi: QuantSubSignal,
    pub iv: QuantSubSignal,
}

/// IV 스큐 측정값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvSkew {
    /// OTM 풋 평균 IV
    pub put_iv: f64,
    /// OTM 콜 평균 IV
    pub call_iv: f64,
    /// ATM IV
    pub atm_iv: f64,
}

impl IvSkew {
    /// 풋 IV − 콜 IV.
    pub fn skew(&self) -> f64 {
        self.put_iv - self.call_iv
    }
}

/// 옵션 시그널 합성기.
#[derive(Debug, Clone, Copy)]
pub struct OptionsSignalSynthesizer {
    otm_band: f64,
}

impl Default for OptionsSignalSynthesizer {
    fn default() -> Self {
        Self::new(0.03)
    }
}

impl OptionsSignalSynthesizer {
    /// OTM 판정 밴드(현물 대비 비율)를 지정하여 생성합니다.
    pub fn new(otm_band: f64) -> Self {
        Self { otm_band }
    }

    /// 네 개의 하위 시그널을 계산합니다.
    pub fn sub_signals(
        &self,
        chain: &OptionChainSnapshot,
        metrics: &AggregateMetrics,
    ) -> OptionsSubSignals {
        OptionsSubSignals {
            pcr: pcr_signal(metrics),
            max_pain: max_pain_signal(chain.spot, metrics.max_pain),
            oi: oi_signal(metrics),
            iv: iv_signal(&self.skew(chain, metrics)),
        }
    }

    /// 하위 시그널을 가중 합성합니다.
    ///
    /// 근거 목록은 PCR, Max Pain, OI, IV 순서의 해석 문장입니다.
    pub fn composite(&self, signals: &OptionsSubSignals) -> CompositeSignal {
        let raw = PCR_WEIGHT * signals.pcr.score
            + MAX_PAIN_WEIGHT * signals.max_pain.score
            + OI_WEIGHT * signals.oi.score
            + IV_WEIGHT * signals.iv.score;
        let score = clamp_score(raw).round();
        let (signal, confidence) = classify(score);

        debug!(raw_score = raw, score, signal = %signal, "Options composite scored");

        let reasoning = [&signals.pcr, &signals.max_pain, &signals.oi, &signals.iv]
            .iter()
            .map(|s| s.interpretation.clone())
            .collect();

        CompositeSignal::new(score, signal, confidence, reasoning)
    }

    /// OTM 스큐와 ATM IV를 측정합니다.
    ///
    /// OTM 호가가 없는 쪽은 OI 가중 평균 IV로 대체하고,
    /// ATM IV는 ATM 행사가의 양수 IV 평균 또는 양쪽 평균 IV의 평균입니다.
    pub fn skew(&self, chain: &OptionChainSnapshot, metrics: &AggregateMetrics) -> IvSkew {
        let spot = chain.spot;
        let lower = spot * (1.0 - self.otm_band);
        let upper = spot * (1.0 + self.otm_band);

        let otm_puts = chain
            .strikes()
            .iter()
            .filter(|r| r.strike < lower)
            .filter_map(|r| r.put.as_ref())
            .map(|c| c.implied_volatility);
        let otm_calls = chain
            .strikes()
            .iter()
            .filter(|r| r.strike > upper)
            .filter_map(|r| r.call.as_ref())
            .map(|c| c.implied_volatility);

        let put_iv = positive_mean(otm_puts).unwrap_or(metrics.avg_iv.put);
        let call_iv = positive_mean(otm_calls).unwrap_or(metrics.avg_iv.call);

        let atm_iv = chain
            .atm_row()
            .and_then(|row| positive_mean(row.contracts().map(|c| c.implied_volatility)))
            .unwrap_or((metrics.avg_iv.call + metrics.avg_iv.put) / 2.0);

        IvSkew {
            put_iv,
            call_iv,
            atm_iv,
        }
    }
}

/// PCR 시그널: `[0.5, 1.5] → [0, 100]` 선형 변환.
fn pcr_signal(metrics: &AggregateMetrics) -> QuantSubSignal {
    if metrics.total_oi.call <= 0.0 {
        return QuantSubSignal::neutral("PCR unavailable: no call open interest");
    }

    let pcr = metrics.pcr.oi;
    let score = (pcr - 0.5) * 100.0;
    let sentiment = metrics.sentiment;
    let reading = if pcr >= 1.0 {
        "put writing dominates, supportive for the underlying"
    } else {
        "call writing dominates, capping the upside"
    };

    QuantSubSignal::new(
        score,
        sentiment.signal,
        sentiment.strength,
        format!("PCR (OI) at {:.2}: {}", pcr, reading),
    )
}

/// Max Pain 시그널: 현물이 Max Pain 아래면 상승 쪽으로 끌림.
fn max_pain_signal(spot: f64, max_pain: Option<f64>) -> QuantSubSignal {
    let Some(max_pain) = max_pain.filter(|_| spot > 0.0) else {
        return QuantSubSignal::neutral("Max pain unavailable");
    };

    let distance_pct = (spot - max_pain) / spot * 100.0;
    let pull = (distance_pct.abs() * 10.0).min(50.0);
    let score = if spot < max_pain {
        50.0 + pull
    } else {
        50.0 - pull
    };
    let (signal, strength) = classify(score);

    let interpretation = if distance_pct == 0.0 {
        format!("Spot is pinned at max pain {:.2}", max_pain)
    } else {
        format!(
            "Spot {:.2}% {} max pain {:.2}, expiry pull points {}",
            distance_pct.abs(),
            if spot < max_pain { "below" } else { "above" },
            max_pain,
            if spot < max_pain { "higher" } else { "lower" },
        )
    };

    QuantSubSignal::new(score, signal, strength, interpretation)
}

/// OI 시그널: 최빈 빌드업 ±25, 순 OI 변화 부호 ±10.
fn oi_signal(metrics: &AggregateMetrics) -> QuantSubSignal {
    let mut score: f64 = 50.0;
    let mut parts = Vec::with_capacity(2);

    if let Some(kind) = metrics.buildup.dominant {
        score += if kind.is_bullish() { 25.0 } else { -25.0 };
        parts.push(format!("dominant {}", kind.name()));
    } else {
        parts.push("no clear buildup".to_string());
    }

    let net = metrics.oi_change.net;
    if net > 0.0 {
        score += 10.0;
        parts.push(format!("put OI added faster than call OI (net {:+.0})", net));
    } else if net < 0.0 {
        score -= 10.0;
        parts.push(format!("call OI added faster than put OI (net {:+.0})", net));
    }

    let (signal, strength) = classify(score);
    QuantSubSignal::new(score, signal, strength, format!("OI: {}", parts.join(", ")))
}

/// IV 시그널: 스큐 ±15, 높은 ATM IV +5.
fn iv_signal(skew: &IvSkew) -> QuantSubSignal {
    let mut score: f64 = 50.0;
    let value = skew.skew();

    let skew_reading = if value < -SKEW_THRESHOLD {
        score += 15.0;
        "calls bid over puts"
    } else if value > SKEW_THRESHOLD {
        score -= 15.0;
        "puts bid over calls"
    } else {
        "balanced skew"
    };

    if skew.atm_iv > HIGH_ATM_IV {
        score += 5.0;
    }

    let (signal, strength) = classify(score);
    QuantSubSignal::new(
        score,
        signal,
        strength,
        format!(
            "IV skew {:+.2} ({}), ATM IV {:.2}{}",
            value,
            skew_reading,
            skew.atm_iv,
            if skew.atm_iv > HIGH_ATM_IV { " (elevated)" } else { "" },
        ),
    )
}

/// 점수를 라벨과 신뢰도로 분류합니다.
pub fn classify(score: f64) -> (SignalLabel, ConfidenceLabel) {
    if score >= 70.0 {
        let confidence = if score >= 80.0 {
            ConfidenceLabel::High
        } else {
            ConfidenceLabel::Moderate
        };
        (SignalLabel::Bullish, confidence)
    } else if score >= 55.0 {
        (SignalLabel::MildlyBullish, ConfidenceLabel::Moderate)
    } else if score <= 30.0 {
        let confidence = if score <= 20.0 {
            ConfidenceLabel::High
        } else {
            ConfidenceLabel::Moderate
        };
        (SignalLabel::Bearish, confidence)
    } else if score <= 45.0 {
        (SignalLabel::MildlyBearish, ConfidenceLabel::Moderate)
    } else {
        (SignalLabel::Neutral, ConfidenceLabel::Low)
    }
}

/// 양수 값들의 평균 (없으면 `None`).
fn positive_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| *v > 0.0)
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::chain::OptionChainAggregator;
    use chrono::NaiveDate;
    use signal_core::{OptionContract, OptionType, StrikeRow};

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 28).unwrap()
    }

    fn contract(strike: f64, t: OptionType, oi: f64, iv: f64) -> OptionContract {
        OptionContract::new(strike, t)
            .with_open_interest(oi, 0.0)
            .with_iv(iv)
    }

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(85.0), (SignalLabel::Bullish, ConfidenceLabel::High));
        assert_eq!(classify(72.0), (SignalLabel::Bullish, ConfidenceLabel::Moderate));
        assert_eq!(classify(60.0), (SignalLabel::MildlyBullish, ConfidenceLabel::Moderate));
        assert_eq!(classify(50.0), (SignalLabel::Neutral, ConfidenceLabel::Low));
        assert_eq!(classify(40.0), (SignalLabel::MildlyBearish, ConfidenceLabel::Moderate));
        assert_eq!(classify(25.0), (SignalLabel::Bearish, ConfidenceLabel::Moderate));
        assert_eq!(classify(15.0), (SignalLabel::Bearish, ConfidenceLabel::High));
    }

    #[test]
    fn test_pcr_signal_without_puts_scores_zero() {
        let aggregator = OptionChainAggregator::default();
        let chain_with_puts = |put_oi: f64| {
            OptionChainSnapshot::new(
                100.0,
                expiry(),
                vec![StrikeRow::new(
                    100.0,
                    Some(contract(100.0, OptionType::CE, 1000.0, 0.0)),
                    Some(contract(100.0, OptionType::PE, put_oi, 0.0)),
                )],
            )
        };

        let empty = chain_with_puts(0.0);
        let no_puts = pcr_signal(&aggregator.aggregate(&empty, expiry()));
        assert_eq!(no_puts.score, 0.0);
        assert_eq!(no_puts.signal, SignalLabel::Bearish);
        assert_eq!(no_puts.strength, ConfidenceLabel::High);

        let light = chain_with_puts(300.0);
        let light_puts = pcr_signal(&aggregator.aggregate(&light, expiry()));
        assert!(no_puts.score <= light_puts.score);

        let no_calls = OptionChainSnapshot::new(
            100.0,
            expiry(),
            vec![StrikeRow::new(100.0, None, Some(contract(100.0, OptionType::PE, 500.0, 0.0)))],
        );
        let undefined = pcr_signal(&aggregator.aggregate(&no_calls, expiry()));
        assert_eq!(undefined.score, 50.0);
        assert_eq!(undefined.signal, SignalLabel::Neutral);
    }

    #[test]
    fn test_max_pain_signal_direction() {
        // 현물 98, Max Pain 100 → 거리 2.04% → +20.4
        let below = max_pain_signal(98.0, Some(100.0));
        assert!((below.score - (50.0 + 2.0 / 98.0 * 1000.0)).abs() < 1e-9);
        assert!(below.signal.is_bullish());

        let far_above = max_pain_signal(120.0, Some(100.0));
        assert_eq!(far_above.score, 0.0);
        assert_eq!(far_above.signal, SignalLabel::Bearish);

        let missing = max_pain_signal(100.0, None);
        assert_eq!(missing.score, 50.0);
    }

    #[test]
    fn test_skew_falls_back_to_side_average() {
        let chain = OptionChainSnapshot::new(
            100.0,
            expiry(),
            vec![StrikeRow::new(
                100.0,
                Some(contract(100.0, OptionType::CE, 100.0, 0.0)),
                Some(contract(100.0, OptionType::PE, 100.0, 0.0)),
            )],
        );
        let metrics = OptionChainAggregator::default().aggregate(&chain, expiry());
        let skew = OptionsSignalSynthesizer::default().skew(&chain, &metrics);

        assert_eq!(skew.put_iv, 0.0);
        assert_eq!(skew.call_iv, 0.0);
        assert_eq!(skew.atm_iv, 0.0);
    }

    #[test]
    fn test_put_skew_is_bearish() {
        let chain = OptionChainSnapshot::new(
            100.0,
            expiry(),
            vec![
                StrikeRow::new(90.0, None, Some(contract(90.0, OptionType::PE, 500.0, 24.0))),
                StrikeRow::new(
                    100.0,
                    Some(contract(100.0, OptionType::CE, 500.0, 18.0)),
                    Some(contract(100.0, OptionType::PE, 500.0, 20.0)),
                ),
                StrikeRow::new(110.0, Some(contract(110.0, OptionType::CE, 500.0, 16.0)), None),
            ],
        );
        let synthesizer = OptionsSignalSynthesizer::default();
        let metrics = OptionChainAggregator::default().aggregate(&chain, expiry());

        let skew = synthesizer.skew(&chain, &metrics);
        assert_eq!(skew.skew(), 8.0);
        assert_eq!(skew.atm_iv, 19.0);

        let signals = synthesizer.sub_signals(&chain, &metrics);
        assert_eq!(signals.iv.score, 35.0);
        assert_eq!(signals.iv.signal, SignalLabel::MildlyBearish);
    }

    #[test]
    fn test_composite_reasoning_order() {
        let neutral = QuantSubSignal::neutral("n");
        let signals = OptionsSubSignals {
            pcr: QuantSubSignal::new(100.0, SignalLabel::Bullish, ConfidenceLabel::High, "pcr"),
            max_pain: QuantSubSignal { interpretation: "pain".into(), ..neutral.clone() },
            oi: QuantSubSignal { interpretation: "oi".into(), ..neutral.clone() },
            iv: QuantSubSignal { interpretation: "iv".into(), ..neutral },
        };
        let composite = OptionsSignalSynthesizer::default().composite(&signals);

        // 0.30·100 + 0.70·50 = 65
        assert_eq!(composite.score, 65);
        assert_eq!(composite.signal, SignalLabel::MildlyBullish);
        assert_eq!(composite.reasoning, vec!["pcr", "pain", "oi", "iv"]);
    }
}
