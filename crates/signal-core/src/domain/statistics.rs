//! 종가 시계열 통계.
//!
//! 단순 수익률, 드리프트(평균 수익률), 변동성(표본 표준편차)을 계산합니다.
//! 모든 예측 모델이 같은 통계를 공유하도록 한 곳에서 계산합니다.

use serde::{Deserialize, Serialize};

/// 연간 거래일 수.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 가격 시계열을 단순 수익률로 변환.
///
/// # 인자
///
/// * `prices` - 가격 시계열 (시간순)
///
/// # 반환
///
/// 일간 수익률 벡터 (길이: prices.len() - 1). 이전 가격이 0이면 수익률 0.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return Vec::new();
    }

    prices
        .windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                0.0
            } else {
                (w[1] - w[0]) / w[0]
            }
        })
        .collect()
}

/// 산술 평균. 빈 입력이면 `None`.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 표본 표준편차 (`n-1` 분모). 2개 미만이면 `None`.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// 모표준편차 (`n` 분모). 빈 입력이면 `None`.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / values.len() as f64).sqrt())
}

/// 종가 시계열에서 유도한 수익률 통계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    /// 단순 수익률 (길이 n-1)
    pub returns: Vec<f64>,
    /// 드리프트 (평균 일간 수익률)
    pub drift: f64,
    /// 변동성 (일간 수익률의 표본 표준편차)
    pub volatility: f64,
    /// 마지막 종가
    pub last_price: f64,
}

impl SeriesStatistics {
    /// 종가 시퀀스에서 통계를 계산합니다.
    ///
    /// 종가가 2개 미만이면 `None`을 반환합니다. 수익률이 하나뿐이면
    /// 변동성은 0입니다.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        if closes.len() < 2 {
            return None;
        }

        let returns = simple_returns(closes);
        let drift = mean(&returns)?;
        let volatility = sample_std(&returns).unwrap_or(0.0);
        let last_price = *closes.last()?;

        Some(Self {
            returns,
            drift,
            volatility,
            last_price,
        })
    }

    /// 연율화 변동성 (`volatility·√252`).
    pub fn annualized_volatility(&self) -> f64 {
        self.volatility * TRADING_DAYS_PER_YEAR.sqrt()
    }

    /// `horizon` 거래일에 걸친 변동성 (`volatility·√h`).
    pub fn horizon_volatility(&self, horizon: usize) -> f64 {
        self.volatility * (horizon as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_zero_previous_close_guard() {
        let returns = simple_returns(&[0.0, 10.0, 11.0]);
        assert_eq!(returns[0], 0.0);
        assert!((returns[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_requires_two_closes() {
        assert!(SeriesStatistics::from_closes(&[]).is_none());
        assert!(SeriesStatistics::from_closes(&[100.0]).is_none());

        let stats = SeriesStatistics::from_closes(&[100.0, 101.0]).unwrap();
        assert_eq!(stats.returns.len(), 1);
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.last_price, 101.0);
    }

    #[test]
    fn test_sample_vs_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&values).unwrap() - 2.0).abs() < 1e-12);
        let sample = sample_std(&values).unwrap();
        assert!((sample - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_flat_series_has_zero_volatility() {
        let stats = SeriesStatistics::from_closes(&[50.0; 20]).unwrap();
        assert_eq!(stats.drift, 0.0);
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.annualized_volatility(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_returns_length(prices in prop::collection::vec(1.0f64..1000.0, 2..200)) {
            let stats = SeriesStatistics::from_closes(&prices).unwrap();
            prop_assert_eq!(stats.returns.len(), prices.len() - 1);
            prop_assert!(stats.volatility >= 0.0);
            prop_assert_eq!(stats.last_price, *prices.last().unwrap());
        }
    }
}
