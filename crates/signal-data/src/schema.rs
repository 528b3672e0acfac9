//! 원시 데이터 스키마와 검증.
//!
//! 외부 소스의 JSON 레코드를 serde로 역직렬화한 뒤,
//! 검증을 거쳐 완전히 채워진 도메인 타입으로 변환합니다.
//!
//! - 종가/행사가가 유한한 양수가 아닌 레코드는 버립니다 (`warn!` 로그)
//! - 옵션 레그의 누락된 수치 필드는 0으로 채웁니다
//! - 봉은 날짜 오름차순, 같은 날짜는 마지막 레코드만 유지합니다
//! - 행사가는 오름차순, 같은 행사가는 레그 단위로 병합합니다

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use signal_core::{OptionChainSnapshot, OptionContract, OptionType, PriceBar, StrikeRow};
use tracing::{debug, warn};

use crate::error::{DataError, Result};

/// 만기일 문자열 형식 (ISO, `28-Mar-2024`).
const EXPIRY_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%b-%Y"];

/// 원시 일봉 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// 원시 옵션 레그 (CE 또는 PE).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptionLeg {
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub p_change: Option<f64>,
    #[serde(default)]
    pub total_traded_volume: Option<f64>,
    #[serde(default)]
    pub open_interest: Option<f64>,
    #[serde(default, rename = "changeinOpenInterest")]
    pub change_in_open_interest: Option<f64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
}

/// 원시 옵션 체인 레코드 (행사가 × 만기 하나).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChainRecord {
    pub strike_price: f64,
    pub expiry_date: String,
    #[serde(default, rename = "CE")]
    pub ce: Option<RawOptionLeg>,
    #[serde(default, rename = "PE")]
    pub pe: Option<RawOptionLeg>,
}

/// 원시 옵션 체인 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptionChain {
    /// 기초자산 현재가
    pub underlying_value: f64,
    pub records: Vec<RawChainRecord>,
}

/// 원시 봉을 검증합니다.
///
/// 잘못된 레코드는 버리고, 결과는 날짜 오름차순입니다.
/// 고가/저가가 없으면 시가와 종가로 채웁니다.
pub fn validate_bars(raw: Vec<RawBar>) -> Vec<PriceBar> {
    let total = raw.len();
    let mut bars: Vec<PriceBar> = raw.into_iter().filter_map(validate_bar).collect();

    // 안정 정렬 후 같은 날짜는 마지막 레코드 유지
    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }

    if deduped.len() != total {
        debug!(total, kept = deduped.len(), "Bars filtered during validation");
    }
    deduped
}

fn validate_bar(raw: RawBar) -> Option<PriceBar> {
    if !is_positive(raw.close) {
        warn!(date = %raw.date, close = raw.close, "Dropping bar with invalid close");
        return None;
    }

    let open = match raw.open {
        Some(o) if !is_positive(o) => {
            warn!(date = %raw.date, open = o, "Dropping bar with invalid open");
            return None;
        }
        other => other,
    };

    let body_high = open.map_or(raw.close, |o| o.max(raw.close));
    let body_low = open.map_or(raw.close, |o| o.min(raw.close));
    let high = raw.high.unwrap_or(body_high);
    let low = raw.low.unwrap_or(body_low);
    if !high.is_finite() || !low.is_finite() || high < low {
        warn!(date = %raw.date, high, low, "Dropping bar with invalid range");
        return None;
    }

    Some(PriceBar {
        date: raw.date,
        open,
        high,
        low,
        close: raw.close,
        volume: raw.volume.filter(|v| v.is_finite() && *v >= 0.0),
    })
}

/// 만기일 문자열을 파싱합니다.
pub fn parse_expiry(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    EXPIRY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| DataError::invalid(format!("unrecognized expiry date: {}", value)))
}

/// 체인에 등장하는 만기일 (오름차순, 중복 제거).
pub fn listed_expiries(raw: &RawOptionChain) -> Vec<NaiveDate> {
    let mut expiries: Vec<NaiveDate> = raw
        .records
        .iter()
        .filter_map(|r| match parse_expiry(&r.expiry_date) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(error = %e, "Skipping record with bad expiry");
                None
            }
        })
        .collect();
    expiries.sort();
    expiries.dedup();
    expiries
}

/// 분석할 만기를 선택합니다.
///
/// 요청한 만기가 있으면 목록에 있어야 하고, 없으면 기준일 이후 가장 가까운 만기,
/// 그것도 없으면 마지막 만기를 사용합니다.
pub fn select_expiry(
    expiries: &[NaiveDate],
    requested: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Result<NaiveDate> {
    match requested {
        Some(date) if expiries.contains(&date) => Ok(date),
        Some(date) => Err(DataError::not_found(format!("expiry {} is not listed", date))),
        None => expiries
            .iter()
            .copied()
            .find(|d| *d >= as_of)
            .or_else(|| expiries.last().copied())
            .ok_or_else(|| DataError::not_found("option chain lists no expiries")),
    }
}

/// 원시 체인을 단일 만기 스냅샷으로 검증합니다.
pub fn validate_chain(
    raw: RawOptionChain,
    requested: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Result<OptionChainSnapshot> {
    if !is_positive(raw.underlying_value) {
        return Err(DataError::invalid(format!(
            "underlying value must be a positive number, got {}",
            raw.underlying_value
        )));
    }

    let expiry = select_expiry(&listed_expiries(&raw), requested, as_of)?;

    let mut rows: Vec<StrikeRow> = raw
        .records
        .into_iter()
        .filter(|r| parse_expiry(&r.expiry_date).ok() == Some(expiry))
        .filter_map(|r| {
            let strike = r.strike_price;
            if !is_positive(strike) {
                warn!(strike, "Dropping record with invalid strike");
                return None;
            }
            let call = r.ce.and_then(|leg| validate_leg(&leg, strike, OptionType::CE));
            let put = r.pe.and_then(|leg| validate_leg(&leg, strike, OptionType::PE));
            Some(StrikeRow::new(strike, call, put))
        })
        .collect();

    rows.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    let mut merged: Vec<StrikeRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match merged.last_mut() {
            Some(last) if last.strike == row.strike => {
                if row.call.is_some() {
                    last.call = row.call;
                }
                if row.put.is_some() {
                    last.put = row.put;
                }
            }
            _ => merged.push(row),
        }
    }

    debug!(expiry = %expiry, strikes = merged.len(), "Option chain validated");
    Ok(OptionChainSnapshot::new(raw.underlying_value, expiry, merged))
}

/// 레그를 검증합니다. 존재하는 값은 유한해야 하며 OI/거래량은 음수일 수 없습니다.
fn validate_leg(leg: &RawOptionLeg, strike: f64, option_type: OptionType) -> Option<OptionContract> {
    let values = [
        leg.last_price,
        leg.change,
        leg.p_change,
        leg.total_traded_volume,
        leg.open_interest,
        leg.change_in_open_interest,
        leg.implied_volatility,
    ];
    if values.iter().flatten().any(|v| !v.is_finite()) {
        warn!(strike, %option_type, "Dropping leg with non-finite values");
        return None;
    }

    let open_interest = leg.open_interest.unwrap_or(0.0);
    let volume = leg.total_traded_volume.unwrap_or(0.0);
    if open_interest < 0.0 || volume < 0.0 {
        warn!(strike, %option_type, "Dropping leg with negative open interest or volume");
        return None;
    }

    Some(
        OptionContract::new(strike, option_type)
            .with_price(leg.last_price.unwrap_or(0.0), leg.change.unwrap_or(0.0))
            .with_volume(volume)
            .with_open_interest(open_interest, leg.change_in_open_interest.unwrap_or(0.0))
            .with_iv(leg.implied_volatility.unwrap_or(0.0).max(0.0)),
    )
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
