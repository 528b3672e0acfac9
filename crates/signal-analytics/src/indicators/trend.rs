//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)
//! - 추세 라벨 (EMA20 vs EMA50)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 시그널 라인까지 계산하는 데 필요한 최소 데이터 수.
    pub fn min_required(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }
}

/// MACD 결과 (시그널 라인이 존재하는 시점만).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: f64,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: f64,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: f64,
}

/// 추세 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Uptrend,
    Downtrend,
    Sideways,
    Unknown,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 완전한 윈도우가 있는 시점의 SMA 값 (길이 n - period + 1)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<f64>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        Ok(prices
            .windows(period)
            .map(|w| w.iter().sum::<f64>() / period as f64)
            .collect())
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1)
    ///
    /// 첫 값은 처음 `min(period, n)`개의 단순 평균입니다. 데이터가 기간보다
    /// 짧으면 전체 평균 하나만 반환합니다.
    ///
    /// # 반환
    /// 시드 시점부터의 EMA 값 (길이 n - min(period, n) + 1)
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.is_empty() {
            return Err(IndicatorError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let seed_len = period.min(prices.len());
        let k = 2.0 / (period as f64 + 1.0);

        // 첫 EMA는 SMA로 시작
        let seed = prices[..seed_len].iter().sum::<f64>() / seed_len as f64;
        let mut result = Vec::with_capacity(prices.len() - seed_len + 1);
        result.push(seed);

        let mut prev = seed;
        for price in &prices[seed_len..] {
            let ema = prev + k * (price - prev);
            result.push(ema);
            prev = ema;
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    ///
    /// 두 EMA는 마지막 시점을 기준으로 정렬합니다.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        if params.fast_period == 0 || params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 0보다 크고 장기 기간({})보다 작아야 합니다",
                params.fast_period, params.slow_period
            )));
        }

        let min_required = params.min_required();
        if prices.len() < min_required {
            return Err(IndicatorError::InsufficientData {
                required: min_required,
                provided: prices.len(),
            });
        }

        let fast = self.ema(prices, EmaParams { period: params.fast_period })?;
        let slow = self.ema(prices, EmaParams { period: params.slow_period })?;

        // fast가 더 길므로 앞부분을 건너뛰어 끝을 맞춤
        let offset = fast.len() - slow.len();
        let macd_line: Vec<f64> = slow
            .iter()
            .enumerate()
            .map(|(i, s)| fast[i + offset] - s)
            .collect();

        let signal = self.ema(&macd_line, EmaParams { period: params.signal_period })?;
        let offset = macd_line.len() - signal.len();

        Ok(signal
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let macd = macd_line[i + offset];
                MacdResult {
                    macd,
                    signal: *s,
                    histogram: macd - s,
                }
            })
            .collect())
    }

    /// 단기/장기 EMA 마지막 값으로 추세를 분류합니다.
    ///
    /// 데이터가 `min_points`보다 적으면 `Unknown`.
    pub fn classify(&self, prices: &[f64], short: usize, long: usize, min_points: usize) -> TrendLabel {
        if prices.len() < min_points {
            return TrendLabel::Unknown;
        }

        let short_ema = self.ema(prices, EmaParams { period: short });
        let long_ema = self.ema(prices, EmaParams { period: long });

        match (
            short_ema.ok().and_then(|v| v.last().copied()),
            long_ema.ok().and_then(|v| v.last().copied()),
        ) {
            (Some(s), Some(l)) if s > l => TrendLabel::Uptrend,
            (Some(s), Some(l)) if s < l => TrendLabel::Downtrend,
            (Some(_), Some(_)) => TrendLabel::Sideways,
            _ => TrendLabel::Unknown,
        }
    }
}
