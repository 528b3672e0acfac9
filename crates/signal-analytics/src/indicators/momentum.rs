//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index, Wilder 평활)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 첫 평균은 처음 `period`개 변화량의 단순 평균이고, 이후
    /// `avg = (avg·(period-1) + 현재값) / period`로 갱신합니다.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (길이 n - period)
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<f64>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let p = period as f64;

        let mut avg_gain = deltas[..period].iter().map(|d| d.max(0.0)).sum::<f64>() / p;
        let mut avg_loss = deltas[..period].iter().map(|d| (-d).max(0.0)).sum::<f64>() / p;

        let mut result = Vec::with_capacity(deltas.len() - period + 1);
        result.push(rsi_value(avg_gain, avg_loss));

        for d in &deltas[period..] {
            avg_gain = (avg_gain * (p - 1.0) + d.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-d).max(0.0)) / p;
            result.push(rsi_value(avg_gain, avg_loss));
        }

        Ok(result)
    }
}

/// 평균 상승/하락폭으로 RSI 값을 계산합니다.
///
/// 하락이 없으면 100, 상승도 없으면(보합) 50.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_prices() -> Vec<f64> {
        vec![
            100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0, 108.0, 107.0, 109.0, 111.0, 110.0,
            112.0, 114.0, 113.0, 115.0,
        ]
    }

    #[test]
    fn test_rsi_calculation() {
        let momentum = MomentumCalculator::new();
        let rsi = momentum.rsi(&sample_prices(), RsiParams { period: 14 }).unwrap();

        assert_eq!(rsi.len(), 2);
        for value in &rsi {
            assert!((0.0..=100.0).contains(value));
        }
        // 상승 우위 시장
        assert!(rsi[0] > 50.0);
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let momentum = MomentumCalculator::new();
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = momentum.rsi(&prices, RsiParams::default()).unwrap();
        assert!(rsi.iter().all(|v| *v == 100.0));
    }

    #[test]
    fn test_rsi_flat_is_50() {
        let momentum = MomentumCalculator::new();
        let rsi = momentum.rsi(&[42.0; 30], RsiParams::default()).unwrap();
        assert!(rsi.iter().all(|v| *v == 50.0));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let momentum = MomentumCalculator::new();
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let rsi = momentum.rsi(&prices, RsiParams::default()).unwrap();
        assert!(rsi.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_rsi_insufficient() {
        let momentum = MomentumCalculator::new();
        assert!(matches!(
            momentum.rsi(&[1.0; 14], RsiParams::default()),
            Err(IndicatorError::InsufficientData { required: 15, provided: 14 })
        ));
    }

    proptest! {
        #[test]
        fn prop_rsi_bounded(prices in prop::collection::vec(0.01f64..10_000.0, 15..120)) {
            let rsi = MomentumCalculator::new().rsi(&prices, RsiParams::default()).unwrap();
            for v in rsi {
                prop_assert!((0.0..=100.0).contains(&v));
            }
        }
    }
}
