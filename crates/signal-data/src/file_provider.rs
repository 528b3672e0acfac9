//! JSON 파일 기반 프로바이더.
//!
//! 디렉터리 구조:
//!
//! ```text
//! <dir>/<SYMBOL>.bars.json    # [RawBar, ...]
//! <dir>/<SYMBOL>.chain.json   # RawOptionChain
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use signal_core::{OptionChainSnapshot, PriceBar};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DataError, DataErrorKind, Result};
use crate::provider::{normalize_symbol, MarketDataProvider};
use crate::schema::{validate_bars, validate_chain, RawBar, RawOptionChain};
use crate::session::ProviderSession;

/// 로컬 JSON 파일에서 데이터를 읽는 프로바이더.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    dir: PathBuf,
    session: Option<ProviderSession>,
    as_of: Option<NaiveDate>,
}

impl JsonFileProvider {
    /// 데이터 디렉터리로 생성합니다.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            session: None,
            as_of: None,
        }
    }

    /// 세션을 주입합니다. 세션이 있으면 모든 요청 전에 유효성을 확인합니다.
    pub fn with_session(mut self, session: ProviderSession) -> Self {
        self.session = Some(session);
        self
    }

    /// 가장 가까운 만기 선택 기준일을 고정합니다 (기본: 오늘, UTC).
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// 데이터 디렉터리.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.json", symbol, suffix))
    }

    fn check_session(&self) -> Result<()> {
        match &self.session {
            Some(session) => session.ensure_valid(),
            None => Ok(()),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path, symbol: &str) -> Result<T> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            let err = DataError::from(e);
            if err.kind() == DataErrorKind::NotFound {
                DataError::not_found(format!("no data for {} at {}", symbol, path.display()))
            } else {
                err
            }
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DataError::invalid(format!("{}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn daily_bars(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        self.check_session()?;
        let symbol = normalize_symbol(symbol)?;
        let path = self.path_for(&symbol, "bars");

        let raw: Vec<RawBar> = self.read_json(&path, &symbol).await?;
        let bars = validate_bars(raw);

        debug!(symbol = %symbol, bars = bars.len(), "Loaded daily bars");
        Ok(bars)
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiry: Option<NaiveDate>,
    ) -> Result<OptionChainSnapshot> {
        self.check_session()?;
        let symbol = normalize_symbol(symbol)?;
        let path = self.path_for(&symbol, "chain");

        let raw: RawOptionChain = self.read_json(&path, &symbol).await?;
        let as_of = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let chain = validate_chain(raw, expiry, as_of)?;

        debug!(
            symbol = %symbol,
            expiry = %chain.expiry,
            strikes = chain.strikes().len(),
            "Loaded option chain"
        );
        Ok(chain)
    }
}
