//! 마지막 봉의 캔들스틱 패턴.
//!
//! 기술적 종합 점수의 패턴 항목은 방향과 신뢰도만 사용하므로 마지막 봉 하나만
//! 판정합니다. 꼬리 모양(망치/역망치)은 직전 흐름에 따라 이름이 갈립니다:
//! 상승 뒤의 아래꼬리는 교수형, 위꼬리는 유성형입니다.
//!
//! 시가가 없는 봉은 판정하지 않습니다.

use serde::{Deserialize, Serialize};
use signal_core::PriceBar;

/// 캔들 패턴 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandlePatternType {
    Hammer,
    InvertedHammer,
    HangingMan,
    ShootingStar,
    BullishEngulfing,
    BearishEngulfing,
    Doji,
    None,
}

impl CandlePatternType {
    /// 패턴 방향: 강세 +1, 약세 -1, 중립/없음 0.
    pub fn bias(&self) -> i8 {
        match self {
            CandlePatternType::Hammer
            | CandlePatternType::InvertedHammer
            | CandlePatternType::BullishEngulfing => 1,
            CandlePatternType::HangingMan
            | CandlePatternType::ShootingStar
            | CandlePatternType::BearishEngulfing => -1,
            CandlePatternType::Doji | CandlePatternType::None => 0,
        }
    }

    /// 표시용 이름.
    pub fn name(&self) -> &'static str {
        match self {
            CandlePatternType::Hammer => "hammer",
            CandlePatternType::InvertedHammer => "inverted hammer",
            CandlePatternType::HangingMan => "hanging man",
            CandlePatternType::ShootingStar => "shooting star",
            CandlePatternType::BullishEngulfing => "bullish engulfing",
            CandlePatternType::BearishEngulfing => "bearish engulfing",
            CandlePatternType::Doji => "doji",
            CandlePatternType::None => "none",
        }
    }

    /// (기본 신뢰도, 반대 방향 흐름 뒤에 나왔을 때 가산치).
    fn confidence_profile(&self) -> (f64, f64) {
        match self {
            CandlePatternType::BullishEngulfing | CandlePatternType::BearishEngulfing => (0.8, 0.15),
            CandlePatternType::Hammer | CandlePatternType::HangingMan => (0.7, 0.2),
            CandlePatternType::InvertedHammer | CandlePatternType::ShootingStar => (0.6, 0.2),
            CandlePatternType::Doji | CandlePatternType::None => (0.0, 0.0),
        }
    }
}

/// 캔들 패턴 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CandlePatternParams {
    /// 몸통/전체 범위가 이 값 미만이면 도지 (기본: 0.1).
    pub doji_body_ratio: f64,
    /// 꼬리가 몸통의 이 배수 이상이면 긴 꼬리 (기본: 2.0).
    pub wick_body_multiple: f64,
    /// 직전 흐름 판단 기간 (기본: 5).
    pub lookback: usize,
}

impl Default for CandlePatternParams {
    fn default() -> Self {
        Self {
            doji_body_ratio: 0.1,
            wick_body_multiple: 2.0,
            lookback: 5,
        }
    }
}

/// 캔들 패턴 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePatternResult {
    pub pattern: CandlePatternType,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
}

impl CandlePatternResult {
    fn none() -> Self {
        Self {
            pattern: CandlePatternType::None,
            confidence: 0.0,
        }
    }
}

/// `lookback`봉 전 종가 대비 ±2% 이상 움직였는지.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriorMove {
    Rising,
    Falling,
    Flat,
}

impl PriorMove {
    fn of(bars: &[PriceBar], lookback: usize) -> Self {
        let n = bars.len();
        if lookback == 0 || n <= lookback {
            return PriorMove::Flat;
        }
        let (past, current) = (bars[n - 1 - lookback].close, bars[n - 1].close);
        if current > past * 1.02 {
            PriorMove::Rising
        } else if current < past * 0.98 {
            PriorMove::Falling
        } else {
            PriorMove::Flat
        }
    }

    fn sign(&self) -> i8 {
        match self {
            PriorMove::Rising => 1,
            PriorMove::Falling => -1,
            PriorMove::Flat => 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Wick {
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy)]
struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Candle {
    fn from_bar(bar: &PriceBar) -> Option<Self> {
        bar.open.map(|open| Self {
            open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
    }

    fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    fn is_up(&self) -> bool {
        self.close > self.open
    }

    /// 도지면 `1 - ratio/threshold` 신뢰도.
    fn doji_confidence(&self, threshold: f64) -> Option<f64> {
        let range = self.high - self.low;
        let ratio = if range > 0.0 { self.body() / range } else { 0.0 };
        (ratio < threshold).then(|| (1.0 - ratio / threshold).min(1.0))
    }

    /// 한쪽 꼬리만 길면 (꼬리 방향, 꼬리/몸통 배율).
    ///
    /// 반대쪽 꼬리는 몸통의 절반 미만이어야 합니다.
    fn long_wick(&self, multiple: f64) -> Option<(Wick, f64)> {
        let body = self.body();
        if body <= 0.0 {
            return None;
        }
        let (upper, lower) = (self.upper_wick(), self.lower_wick());
        if lower >= body * multiple && upper < body * 0.5 {
            Some((Wick::Lower, lower / body))
        } else if upper >= body * multiple && lower < body * 0.5 {
            Some((Wick::Upper, upper / body))
        } else {
            None
        }
    }

    /// 직전 봉 몸통을 반대 방향으로 감싸면 장악형과 몸통 배율.
    fn engulfing(&self, prev: &Candle) -> Option<(CandlePatternType, f64)> {
        let pattern = if self.is_up()
            && !prev.is_up()
            && self.open < prev.close
            && self.close > prev.open
        {
            CandlePatternType::BullishEngulfing
        } else if !self.is_up()
            && prev.is_up()
            && self.open > prev.close
            && self.close < prev.open
        {
            CandlePatternType::BearishEngulfing
        } else {
            return None;
        };
        let ratio = if prev.body() > 0.0 { self.body() / prev.body() } else { 0.0 };
        Some((pattern, ratio))
    }
}

/// 반전 패턴 신뢰도: 기본값에, 직전 흐름이 패턴 방향과 반대면 가산하고
/// 모양이 뚜렷하면 `shape_bonus`를 더합니다.
fn reversal(pattern: CandlePatternType, prior: PriorMove, shape_bonus: f64) -> CandlePatternResult {
    let (base, context_bonus) = pattern.confidence_profile();
    let against_prior = prior.sign() != 0 && prior.sign() == -pattern.bias();
    let context = if against_prior { context_bonus } else { 0.0 };
    let confidence = base + context + shape_bonus;
    CandlePatternResult {
        pattern,
        confidence: confidence.min(1.0),
    }
}

/// 캔들 패턴 감지기.
#[derive(Debug, Default)]
pub struct CandlePatternDetector;

impl CandlePatternDetector {
    pub fn new() -> Self {
        Self
    }

    /// 마지막 봉의 패턴을 감지합니다.
    ///
    /// 우선순위: 도지, 장악형, 긴 꼬리.
    pub fn last_pattern(&self, bars: &[PriceBar], params: CandlePatternParams) -> CandlePatternResult {
        let Some((last, earlier)) = bars.split_last() else {
            return CandlePatternResult::none();
        };
        let Some(candle) = Candle::from_bar(last) else {
            return CandlePatternResult::none();
        };

        if let Some(confidence) = candle.doji_confidence(params.doji_body_ratio) {
            return CandlePatternResult {
                pattern: CandlePatternType::Doji,
                confidence,
            };
        }

        let prior = PriorMove::of(bars, params.lookback);

        if let Some((pattern, ratio)) = earlier
            .last()
            .and_then(Candle::from_bar)
            .and_then(|prev| candle.engulfing(&prev))
        {
            return reversal(pattern, prior, if ratio > 1.5 { 0.05 } else { 0.0 });
        }

        match candle.long_wick(params.wick_body_multiple) {
            Some((wick, ratio)) => {
                let pattern = match (wick, prior) {
                    (Wick::Lower, PriorMove::Rising) => CandlePatternType::HangingMan,
                    (Wick::Lower, _) => CandlePatternType::Hammer,
                    (Wick::Upper, PriorMove::Rising) => CandlePatternType::ShootingStar,
                    (Wick::Upper, _) => CandlePatternType::InvertedHammer,
                };
                reversal(pattern, prior, if ratio > 3.0 { 0.1 } else { 0.0 })
            }
            None => CandlePatternResult::none(),
        }
    }
}
