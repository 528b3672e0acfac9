//! 시장 데이터 프로바이더 트레이트.

use async_trait::async_trait;
use chrono::NaiveDate;
use signal_core::{OptionChainSnapshot, PriceBar};

use crate::error::{DataError, Result};

/// 분석 엔진에 일봉과 옵션 체인을 공급하는 소스.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 일봉을 날짜 오름차순으로 가져옵니다.
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<PriceBar>>;

    /// 옵션 체인 스냅샷을 가져옵니다.
    ///
    /// `expiry`가 `None`이면 가장 가까운 만기를 선택합니다.
    async fn option_chain(
        &self,
        symbol: &str,
        expiry: Option<NaiveDate>,
    ) -> Result<OptionChainSnapshot>;
}

/// 심볼을 정규화합니다 (대문자, 공백 제거).
///
/// 영숫자와 `-`, `_`, `&`, `.` 이외의 문자가 있으면 `InvalidData`입니다.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(DataError::invalid("symbol is empty"));
    }
    if trimmed.starts_with('.')
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '&' | '.'))
    {
        return Err(DataError::invalid(format!("invalid symbol: {}", symbol)));
    }
    Ok(trimmed.to_ascii_uppercase())
}
