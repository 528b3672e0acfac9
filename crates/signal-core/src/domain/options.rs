//! 옵션 체인 도메인 타입.
//!
//! - `OptionType` - 콜(CE) / 풋(PE)
//! - `Greeks` - 델타, 감마, 세타, 베가
//! - `OptionContract` - 단일 옵션 계약 시세
//! - `StrikeRow` - 행사가별 CE/PE 쌍
//! - `OptionChainSnapshot` - 특정 만기의 체인 스냅샷

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::round_f64;

/// 옵션 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// 콜 옵션
    CE,
    /// 풋 옵션
    PE,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::CE => write!(f, "CE"),
            OptionType::PE => write!(f, "PE"),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CE" | "CALL" | "C" => Ok(OptionType::CE),
            "PE" | "PUT" | "P" => Ok(OptionType::PE),
            _ => Err(format!("Unknown option type: {}", s)),
        }
    }
}

/// 옵션 그릭스.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// 현물 가격 민감도
    pub delta: f64,
    /// 델타의 현물 가격 민감도
    pub gamma: f64,
    /// 1일 시간가치 감소
    pub theta: f64,
    /// IV 1%p 변화당 가격 변화
    pub vega: f64,
}

impl Greeks {
    /// 와이어 표기 자릿수로 반올림 (delta/gamma 4자리, theta/vega 2자리).
    pub fn rounded(&self) -> Self {
        Self {
            delta: round_f64(self.delta, 4),
            gamma: round_f64(self.gamma, 4),
            theta: round_f64(self.theta, 2),
            vega: round_f64(self.vega, 2),
        }
    }
}

/// 단일 옵션 계약.
///
/// `implied_volatility`는 퍼센트 포인트 단위입니다 (15.3 = 15.3%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    /// 행사가
    pub strike: f64,
    /// 옵션 유형
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// 최종 체결가
    pub last_price: f64,
    /// 전일 대비 가격 변화
    pub change: f64,
    /// 거래량
    pub volume: f64,
    /// 미결제약정
    pub open_interest: f64,
    /// 미결제약정 변화
    pub open_interest_change: f64,
    /// 내재변동성 (%)
    pub implied_volatility: f64,
    /// 그릭스
    #[serde(default)]
    pub greeks: Greeks,
}

impl OptionContract {
    /// 시세가 비어 있는 계약을 생성합니다.
    pub fn new(strike: f64, option_type: OptionType) -> Self {
        Self {
            strike,
            option_type,
            last_price: 0.0,
            change: 0.0,
            volume: 0.0,
            open_interest: 0.0,
            open_interest_change: 0.0,
            implied_volatility: 0.0,
            greeks: Greeks::default(),
        }
    }

    /// 미결제약정을 설정합니다.
    pub fn with_open_interest(mut self, oi: f64, change: f64) -> Self {
        self.open_interest = oi;
        self.open_interest_change = change;
        self
    }

    /// 가격 정보를 설정합니다.
    pub fn with_price(mut self, last_price: f64, change: f64) -> Self {
        self.last_price = last_price;
        self.change = change;
        self
    }

    /// 거래량을 설정합니다.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// 내재변동성(%)을 설정합니다.
    pub fn with_iv(mut self, iv_pct: f64) -> Self {
        self.implied_volatility = iv_pct;
        self
    }
}

/// 행사가별 콜/풋 쌍.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeRow {
    /// 행사가
    pub strike: f64,
    /// 콜 계약
    #[serde(rename = "CE", default, skip_serializing_if = "Option::is_none")]
    pub call: Option<OptionContract>,
    /// 풋 계약
    #[serde(rename = "PE", default, skip_serializing_if = "Option::is_none")]
    pub put: Option<OptionContract>,
}

impl StrikeRow {
    /// 새 행을 생성합니다.
    pub fn new(strike: f64, call: Option<OptionContract>, put: Option<OptionContract>) -> Self {
        Self { strike, call, put }
    }

    /// 콜 미결제약정 (계약 없으면 0).
    pub fn call_oi(&self) -> f64 {
        self.call.as_ref().map_or(0.0, |c| c.open_interest)
    }

    /// 풋 미결제약정 (계약 없으면 0).
    pub fn put_oi(&self) -> f64 {
        self.put.as_ref().map_or(0.0, |p| p.open_interest)
    }

    /// 존재하는 계약을 순회합니다 (콜 먼저).
    pub fn contracts(&self) -> impl Iterator<Item = &OptionContract> {
        self.call.iter().chain(self.put.iter())
    }
}

/// 특정 만기의 옵션 체인 스냅샷.
///
/// 행사가는 항상 오름차순이며, ATM 행사가는 현물과 가장 가까운 행사가입니다
/// (동률이면 낮은 행사가).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainSnapshot {
    /// 현물 가격
    pub spot: f64,
    /// 만기일
    pub expiry: NaiveDate,
    /// 행사가 행 (오름차순)
    strikes: Vec<StrikeRow>,
    /// ATM 행 인덱스
    #[serde(skip)]
    atm_index: Option<usize>,
}

impl OptionChainSnapshot {
    /// 스냅샷을 생성합니다. 행은 행사가 오름차순으로 정렬됩니다.
    pub fn new(spot: f64, expiry: NaiveDate, mut strikes: Vec<StrikeRow>) -> Self {
        strikes.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        let atm_index = nearest_strike_index(&strikes, spot);

        Self {
            spot,
            expiry,
            strikes,
            atm_index,
        }
    }

    /// 행사가 행 (오름차순).
    pub fn strikes(&self) -> &[StrikeRow] {
        &self.strikes
    }

    /// 행사가가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    /// ATM 행.
    pub fn atm_row(&self) -> Option<&StrikeRow> {
        self.atm_index.and_then(|i| self.strikes.get(i))
    }

    /// ATM 행사가.
    pub fn atm_strike(&self) -> Option<f64> {
        self.atm_row().map(|r| r.strike)
    }

    /// 기준일로부터 만기까지 남은 일수 (만기가 지났으면 0).
    pub fn days_to_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.expiry - as_of).num_days().max(0)
    }

    /// 그릭스 갱신 등을 위해 행을 가변 참조로 순회합니다.
    ///
    /// 행사가 자체는 변경하지 않아야 합니다.
    pub fn contracts_mut(&mut self) -> impl Iterator<Item = &mut OptionContract> {
        self.strikes
            .iter_mut()
            .flat_map(|row| row.call.iter_mut().chain(row.put.iter_mut()))
    }
}

/// 오름차순 행 중 `spot`과 가장 가까운 행의 인덱스 (동률이면 먼저 나온 행).
fn nearest_strike_index(strikes: &[StrikeRow], spot: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, row) in strikes.iter().enumerate() {
        let distance = (row.strike - spot).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}
