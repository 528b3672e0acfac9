//! 옵션 체인 집계.
//!
//! 하나의 만기 스냅샷에서 PCR, 미결제약정 합계/변화, OI 가중 평균 IV,
//! Max Pain, 상위 OI 행사가(지지/저항), OI 빌드업 분포를 계산합니다.
//! 모든 나눗셈은 분모가 0이면 0을 반환합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use signal_core::{ConfidenceLabel, OptionChainSnapshot, OptionContract, SignalLabel};
use tracing::debug;

/// Put-Call Ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PcrMetrics {
    /// 풋 OI / 콜 OI
    pub oi: f64,
    /// 풋 거래량 / 콜 거래량
    pub volume: f64,
}

/// 미결제약정 합계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenInterestTotals {
    pub call: f64,
    pub put: f64,
    pub total: f64,
}

/// 미결제약정 변화량. `net = put − call`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenInterestChange {
    pub call: f64,
    pub put: f64,
    pub net: f64,
}

/// OI 가중 평균 IV (퍼센트 포인트).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageIv {
    pub call: f64,
    pub put: f64,
}

/// PCR 기반 시장 심리.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub signal: SignalLabel,
    pub strength: ConfidenceLabel,
}

impl MarketSentiment {
    /// PCR(oi)로 심리를 판정합니다.
    ///
    /// | PCR | 라벨 |
    /// |-----|------|
    /// | > 1.5 | Bullish / High |
    /// | > 1.3 | Bullish / Moderate |
    /// | ≥ 1.0 | Mildly Bullish |
    /// | ≥ 0.7 | Mildly Bearish |
    /// | ≥ 0.5 | Bearish / Moderate |
    /// | < 0.5 | Bearish / High |
    pub fn from_pcr(pcr: f64) -> Self {
        let (signal, strength) = if pcr > 1.5 {
            (SignalLabel::Bullish, ConfidenceLabel::High)
        } else if pcr > 1.3 {
            (SignalLabel::Bullish, ConfidenceLabel::Moderate)
        } else if pcr >= 1.0 {
            (SignalLabel::MildlyBullish, ConfidenceLabel::Moderate)
        } else if pcr >= 0.7 {
            (SignalLabel::MildlyBearish, ConfidenceLabel::Moderate)
        } else if pcr >= 0.5 {
            (SignalLabel::Bearish, ConfidenceLabel::Moderate)
        } else {
            (SignalLabel::Bearish, ConfidenceLabel::High)
        };
        Self { signal, strength }
    }

    /// 중립 심리.
    pub fn neutral() -> Self {
        Self {
            signal: SignalLabel::Neutral,
            strength: ConfidenceLabel::Low,
        }
    }
}

/// OI 빌드업 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildupKind {
    /// OI 증가 + 가격 상승
    LongBuildup,
    /// OI 증가 + 가격 하락
    ShortBuildup,
    /// OI 감소 + 가격 상승
    ShortCovering,
    /// OI 감소 + 가격 하락
    LongUnwinding,
}

impl BuildupKind {
    /// 동률 해소 순서와 같은 순서의 전체 목록.
    pub const ALL: [BuildupKind; 4] = [
        BuildupKind::LongBuildup,
        BuildupKind::ShortBuildup,
        BuildupKind::ShortCovering,
        BuildupKind::LongUnwinding,
    ];

    /// (OI 변화, 가격 변화) 부호로 분류합니다. 어느 한쪽이 0이면 `None`.
    pub fn classify(oi_change: f64, price_change: f64) -> Option<Self> {
        if oi_change == 0.0 || price_change == 0.0 || oi_change.is_nan() || price_change.is_nan() {
            return None;
        }
        Some(match (oi_change > 0.0, price_change > 0.0) {
            (true, true) => BuildupKind::LongBuildup,
            (true, false) => BuildupKind::ShortBuildup,
            (false, true) => BuildupKind::ShortCovering,
            (false, false) => BuildupKind::LongUnwinding,
        })
    }

    /// 계약 하나를 분류합니다.
    pub fn of_contract(contract: &OptionContract) -> Option<Self> {
        Self::classify(contract.open_interest_change, contract.change)
    }

    /// 상승 해석 여부 (롱 빌드업, 숏 커버링).
    pub fn is_bullish(&self) -> bool {
        matches!(self, BuildupKind::LongBuildup | BuildupKind::ShortCovering)
    }

    /// 표시 이름.
    pub fn name(&self) -> &'static str {
        match self {
            BuildupKind::LongBuildup => "long buildup",
            BuildupKind::ShortBuildup => "short buildup",
            BuildupKind::ShortCovering => "short covering",
            BuildupKind::LongUnwinding => "long unwinding",
        }
    }
}

/// 빌드업 유형별 관측 수.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildupSummary {
    pub long_buildup: usize,
    pub short_buildup: usize,
    pub short_covering: usize,
    pub long_unwinding: usize,
    /// 최빈 유형 (관측 없음 → `None`)
    pub dominant: Option<BuildupKind>,
}

impl BuildupSummary {
    /// 유형별 관측 수.
    pub fn count(&self, kind: BuildupKind) -> usize {
        match kind {
            BuildupKind::LongBuildup => self.long_buildup,
            BuildupKind::ShortBuildup => self.short_buildup,
            BuildupKind::ShortCovering => self.short_covering,
            BuildupKind::LongUnwinding => self.long_unwinding,
        }
    }

    fn record(&mut self, kind: BuildupKind) {
        match kind {
            BuildupKind::LongBuildup => self.long_buildup += 1,
            BuildupKind::ShortBuildup => self.short_buildup += 1,
            BuildupKind::ShortCovering => self.short_covering += 1,
            BuildupKind::LongUnwinding => self.long_unwinding += 1,
        }
    }

    fn resolve_dominant(&mut self) {
        let mut dominant: Option<(BuildupKind, usize)> = None;
        for kind in BuildupKind::ALL {
            let count = self.count(kind);
            if count == 0 {
                continue;
            }
            // 동률이면 먼저 나온 유형 유지
            match dominant {
                Some((_, best)) if count <= best => {}
                _ => dominant = Some((kind, count)),
            }
        }
        self.dominant = dominant.map(|(kind, _)| kind);
    }
}

/// 집계 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub pcr: PcrMetrics,
    #[serde(rename = "totalOI")]
    pub total_oi: OpenInterestTotals,
    pub oi_change: OpenInterestChange,
    #[serde(rename = "avgIV")]
    pub avg_iv: AverageIv,
    /// Max Pain 행사가 (행사가 없음 → `None`)
    pub max_pain: Option<f64>,
    pub sentiment: MarketSentiment,
    pub atm_strike: Option<f64>,
    pub days_to_expiry: i64,
    pub buildup: BuildupSummary,
}

/// 지지/저항 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    Support,
    Resistance,
}

/// OI 기준 주요 행사가.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyLevel {
    pub strike: f64,
    pub open_interest: f64,
    pub kind: LevelKind,
}

/// 옵션 체인에서 추출한 가격 레벨.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLevels {
    /// 콜 OI 상위 행사가
    pub resistance: Vec<KeyLevel>,
    /// 풋 OI 상위 행사가
    pub support: Vec<KeyLevel>,
    /// 현물 위 콜 OI 최대 행사가
    pub immediate_resistance: Option<f64>,
    /// 현물 아래 풋 OI 최대 행사가
    pub immediate_support: Option<f64>,
    pub max_pain: Option<f64>,
}

/// 옵션 체인 집계기.
#[derive(Debug, Clone, Copy)]
pub struct OptionChainAggregator {
    top_strikes: usize,
}

impl Default for OptionChainAggregator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl OptionChainAggregator {
    /// 상위 OI 행사가 개수를 지정하여 생성합니다.
    pub fn new(top_strikes: usize) -> Self {
        Self { top_strikes }
    }

    /// 스냅샷을 집계합니다.
    ///
    /// # 인자
    /// * `chain` - 단일 만기 스냅샷
    /// * `as_of` - 만기까지 일수 계산 기준일
    pub fn aggregate(&self, chain: &OptionChainSnapshot, as_of: NaiveDate) -> AggregateMetrics {
        let mut total_oi = OpenInterestTotals::default();
        let mut oi_change = OpenInterestChange::default();
        let mut call_volume = 0.0;
        let mut put_volume = 0.0;
        let mut buildup = BuildupSummary::default();

        for row in chain.strikes() {
            if let Some(call) = &row.call {
                total_oi.call += call.open_interest;
                oi_change.call += call.open_interest_change;
                call_volume += call.volume;
            }
            if let Some(put) = &row.put {
                total_oi.put += put.open_interest;
                oi_change.put += put.open_interest_change;
                put_volume += put.volume;
            }
            for kind in row.contracts().filter_map(BuildupKind::of_contract) {
                buildup.record(kind);
            }
        }
        total_oi.total = total_oi.call + total_oi.put;
        oi_change.net = oi_change.put - oi_change.call;
        buildup.resolve_dominant();

        let pcr = PcrMetrics {
            oi: safe_ratio(total_oi.put, total_oi.call),
            volume: safe_ratio(put_volume, call_volume),
        };

        let sentiment = if total_oi.call > 0.0 {
            MarketSentiment::from_pcr(pcr.oi)
        } else {
            MarketSentiment::neutral()
        };

        let avg_iv = AverageIv {
            call: weighted_iv(chain.strikes().iter().filter_map(|r| r.call.as_ref())),
            put: weighted_iv(chain.strikes().iter().filter_map(|r| r.put.as_ref())),
        };

        let max_pain = max_pain(chain);

        debug!(
            pcr_oi = pcr.oi,
            total_oi = total_oi.total,
            max_pain = ?max_pain,
            strikes = chain.strikes().len(),
            "Option chain aggregated"
        );

        AggregateMetrics {
            pcr,
            total_oi,
            oi_change,
            avg_iv,
            max_pain,
            sentiment,
            atm_strike: chain.atm_strike(),
            days_to_expiry: chain.days_to_expiry(as_of),
            buildup,
        }
    }

    /// 지지/저항 레벨을 추출합니다.
    ///
    /// OI가 0인 계약은 제외하며, 같은 OI는 낮은 행사가가 먼저입니다.
    pub fn levels(&self, chain: &OptionChainSnapshot, max_pain: Option<f64>) -> OptionLevels {
        let calls: Vec<(f64, f64)> = chain
            .strikes()
            .iter()
            .filter(|r| r.call_oi() > 0.0)
            .map(|r| (r.strike, r.call_oi()))
            .collect();
        let puts: Vec<(f64, f64)> = chain
            .strikes()
            .iter()
            .filter(|r| r.put_oi() > 0.0)
            .map(|r| (r.strike, r.put_oi()))
            .collect();

        let spot = chain.spot;
        let immediate_resistance =
            highest_oi(calls.iter().copied().filter(|(strike, _)| *strike > spot));
        let immediate_support =
            highest_oi(puts.iter().copied().filter(|(strike, _)| *strike < spot));

        OptionLevels {
            resistance: self.top_by_oi(calls, LevelKind::Resistance),
            support: self.top_by_oi(puts, LevelKind::Support),
            immediate_resistance,
            immediate_support,
            max_pain,
        }
    }

    fn top_by_oi(&self, mut entries: Vec<(f64, f64)>, kind: LevelKind) -> Vec<KeyLevel> {
        // 입력은 행사가 오름차순이므로 안정 정렬이 동률 순서를 보존
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
            .into_iter()
            .take(self.top_strikes)
            .map(|(strike, open_interest)| KeyLevel {
                strike,
                open_interest,
                kind,
            })
            .collect()
    }
}

/// Max Pain 행사가.
///
/// `pain(X) = Σ max(0, X−k)·callOI[k] + Σ max(0, k−X)·putOI[k]`가 최소인
/// 행사가이며, 동률이면 낮은 행사가입니다.
pub fn max_pain(chain: &OptionChainSnapshot) -> Option<f64> {
    let rows = chain.strikes();
    let mut best: Option<(f64, f64)> = None;

    for candidate in rows.iter().map(|r| r.strike) {
        let pain: f64 = rows
            .iter()
            .map(|r| {
                (candidate - r.strike).max(0.0) * r.call_oi()
                    + (r.strike - candidate).max(0.0) * r.put_oi()
            })
            .sum();
        match best {
            Some((_, lowest)) if pain >= lowest => {}
            _ => best = Some((candidate, pain)),
        }
    }

    best.map(|(strike, _)| strike)
}

/// 분모가 0이면 0을 반환하는 비율.
fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// OI가 양수인 계약들의 OI 가중 평균 IV.
fn weighted_iv<'a>(contracts: impl Iterator<Item = &'a OptionContract>) -> f64 {
    let (weighted, weight) = contracts
        .filter(|c| c.open_interest > 0.0)
        .fold((0.0, 0.0), |(sum, w), c| {
            (sum + c.implied_volatility * c.open_interest, w + c.open_interest)
        });
    safe_ratio(weighted, weight)
}

/// OI 최대 행사가 (동률이면 먼저 나온 낮은 행사가).
fn highest_oi(entries: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for (strike, oi) in entries {
        match best {
            Some((_, top)) if oi <= top => {}
            _ => best = Some((strike, oi)),
        }
    }
    best.map(|(strike, _)| strike)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::{OptionType, StrikeRow};

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 28).unwrap()
    }

    fn row(strike: f64, call_oi: f64, put_oi: f64) -> StrikeRow {
        StrikeRow::new(
            strike,
            Some(OptionContract::new(strike, OptionType::CE).with_open_interest(call_oi, 0.0)),
            Some(OptionContract::new(strike, OptionType::PE).with_open_interest(put_oi, 0.0)),
        )
    }

    #[test]
    fn test_pcr_and_totals() {
        let chain = OptionChainSnapshot::new(
            100.0,
            expiry(),
            vec![row(95.0, 100.0, 300.0), row(100.0, 200.0, 200.0), row(105.0, 300.0, 100.0)],
        );
        let metrics = OptionChainAggregator::default().aggregate(&chain, expiry());

        assert_eq!(metrics.total_oi.call, 600.0);
        assert_eq!(metrics.total_oi.put, 600.0);
        assert_eq!(metrics.total_oi.total, 1200.0);
        assert!((metrics.pcr.oi - 1.0).abs() < 1e-12);
        assert_eq!(metrics.pcr.volume, 0.0);
        assert_eq!(metrics.sentiment.signal, SignalLabel::MildlyBullish);
        assert_eq!(metrics.atm_strike, Some(100.0));
        assert_eq!(metrics.days_to_expiry, 0);
    }

    #[test]
    fn test_no_call_oi_is_neutral() {
        let chain = OptionChainSnapshot::new(100.0, expiry(), vec![row(100.0, 0.0, 500.0)]);
        let metrics = OptionChainAggregator::default().aggregate(&chain, expiry());

        assert_eq!(metrics.pcr.oi, 0.0);
        assert_eq!(metrics.sentiment, MarketSentiment::neutral());
    }

    #[test]
    fn test_no_put_oi_is_strongly_bearish() {
        let chain = OptionChainSnapshot::new(100.0, expiry(), vec![row(100.0, 1000.0, 0.0)]);
        let metrics = OptionChainAggregator::default().aggregate(&chain, expiry());

        assert_eq!(metrics.pcr.oi, 0.0);
        assert_eq!(metrics.sentiment.signal, SignalLabel::Bearish);
        assert_eq!(metrics.sentiment.strength, ConfidenceLabel::High);
    }

    #[test]
    fn test_max_pain_single_heavy_strike() {
        let chain = OptionChainSnapshot::new(
            98.0,
            expiry(),
            vec![row(90.0, 0.0, 0.0), row(100.0, 1_000_000.0, 1_000_000.0), row(110.0, 0.0, 0.0)],
        );
        assert_eq!(max_pain(&chain), Some(100.0));
    }

    #[test]
    fn test_max_pain_tie_takes_lowest_strike() {
        let chain = OptionChainSnapshot::new(
            100.0,
            expiry(),
            vec![row(95.0, 0.0, 0.0), row(100.0, 0.0, 0.0), row(105.0, 0.0, 0.0)],
        );
        assert_eq!(max_pain(&chain), Some(95.0));

        let empty = OptionChainSnapshot::new(100.0, expiry(), vec![]);
        assert_eq!(max_pain(&empty), None);
    }

    #[test]
    fn test_weighted_iv_ignores_zero_oi() {
        let contracts = [
            OptionContract::new(100.0, OptionType::CE).with_open_interest(100.0, 0.0).with_iv(10.0),
            OptionContract::new(105.0, OptionType::CE).with_open_interest(300.0, 0.0).with_iv(20.0),
            OptionContract::new(110.0, OptionType::CE).with_iv(90.0),
        ];
        assert!((weighted_iv(contracts.iter()) - 17.5).abs() < 1e-12);
        assert_eq!(weighted_iv(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_buildup_classification_and_dominant() {
        assert_eq!(BuildupKind::classify(10.0, 1.0), Some(BuildupKind::LongBuildup));
        assert_eq!(BuildupKind::classify(10.0, -1.0), Some(BuildupKind::ShortBuildup));
        assert_eq!(BuildupKind::classify(-10.0, 1.0), Some(BuildupKind::ShortCovering));
        assert_eq!(BuildupKind::classify(-10.0, -1.0), Some(BuildupKind::LongUnwinding));
        assert_eq!(BuildupKind::classify(0.0, 1.0), None);
        assert_eq!(BuildupKind::classify(5.0, 0.0), None);

        let mut summary = BuildupSummary::default();
        summary.record(BuildupKind::ShortCovering);
        summary.record(BuildupKind::ShortBuildup);
        summary.resolve_dominant();
        assert_eq!(summary.dominant, Some(BuildupKind::ShortBuildup));

        let mut empty = BuildupSummary::default();
        empty.resolve_dominant();
        assert_eq!(empty.dominant, None);
    }

    #[test]
    fn test_levels_top_and_immediate() {
        let chain = OptionChainSnapshot::new(
            101.0,
            expiry(),
            vec![
                row(95.0, 50.0, 900.0),
                row(100.0, 400.0, 700.0),
                row(105.0, 800.0, 100.0),
                row(110.0, 800.0, 0.0),
            ],
        );
        let levels = OptionChainAggregator::new(2).levels(&chain, Some(100.0));

        let resistance: Vec<f64> = levels.resistance.iter().map(|l| l.strike).collect();
        assert_eq!(resistance, vec![105.0, 110.0]);
        let support: Vec<f64> = levels.support.iter().map(|l| l.strike).collect();
        assert_eq!(support, vec![95.0, 100.0]);
        assert_eq!(levels.immediate_resistance, Some(105.0));
        assert_eq!(levels.immediate_support, Some(95.0));
        assert_eq!(levels.max_pain, Some(100.0));
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(MarketSentiment::from_pcr(1.6).strength, ConfidenceLabel::High);
        assert_eq!(MarketSentiment::from_pcr(1.4).signal, SignalLabel::Bullish);
        assert_eq!(MarketSentiment::from_pcr(0.8).signal, SignalLabel::MildlyBearish);
        assert_eq!(MarketSentiment::from_pcr(0.6).strength, ConfidenceLabel::Moderate);
        assert_eq!(MarketSentiment::from_pcr(0.3).strength, ConfidenceLabel::High);
    }
}
