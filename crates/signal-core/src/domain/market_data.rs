//! 일봉 가격 데이터 타입.
//!
//! - `PriceBar` - 하루치 OHLCV 바 (시가/거래량은 선택)
//! - `closes` / `lows` / `highs` - 시계열 추출 헬퍼

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 일봉 가격 바.
///
/// 엔진은 바 시퀀스를 날짜 오름차순으로 받으며 절대 수정하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PriceBar {
    /// 종가만으로 바를 생성합니다 (고가/저가 = 종가).
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }

    /// OHLC 바를 생성합니다.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open: Some(open),
            high,
            low,
            close,
            volume: None,
        }
    }

    /// 거래량을 설정합니다.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// 양봉 여부. 시가가 없으면 `None`.
    pub fn is_bullish(&self) -> Option<bool> {
        self.open.map(|open| self.close > open)
    }

    /// 캔들 몸통 크기(절대값). 시가가 없으면 `None`.
    pub fn body_size(&self) -> Option<f64> {
        self.open.map(|open| (self.close - open).abs())
    }

    /// 캔들 범위(고가 - 저가).
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// 종가 시퀀스를 추출합니다.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// 고가 시퀀스를 추출합니다.
pub fn highs(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

/// 저가 시퀀스를 추출합니다.
pub fn lows(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}
