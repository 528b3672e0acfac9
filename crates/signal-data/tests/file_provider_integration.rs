//! JSON 파일 프로바이더 통합 테스트.

use chrono::{Duration, NaiveDate, Utc};
use signal_data::{DataErrorKind, JsonFileProvider, MarketDataProvider, ProviderSession};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn loads_sorted_daily_bars() {
    let provider = JsonFileProvider::new(fixtures());
    let bars = provider.daily_bars("nifty").await.unwrap();

    assert_eq!(bars.len(), 90);
    assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    assert!(bars.iter().all(|b| b.open.is_some() && b.volume.is_some()));
    assert!(bars.iter().all(|b| b.low <= b.close && b.close <= b.high));
}

#[tokio::test]
async fn selects_nearest_expiry() {
    let provider = JsonFileProvider::new(fixtures()).with_as_of(date(2024, 4, 15));
    let chain = provider.option_chain("NIFTY", None).await.unwrap();

    assert_eq!(chain.expiry, date(2024, 4, 25));
    assert_eq!(chain.strikes().len(), 11);
    assert_eq!(chain.atm_strike(), Some(22200.0));
    assert!(chain.strikes().iter().all(|r| r.call.is_some() && r.put.is_some()));
}

#[tokio::test]
async fn explicit_expiry_must_be_listed() {
    let provider = JsonFileProvider::new(fixtures());

    let may = provider
        .option_chain("NIFTY", Some(date(2024, 5, 30)))
        .await
        .unwrap();
    assert_eq!(may.expiry, date(2024, 5, 30));

    let err = provider
        .option_chain("NIFTY", Some(date(2024, 6, 27)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::NotFound);
}

#[tokio::test]
async fn missing_symbol_is_not_found() {
    let provider = JsonFileProvider::new(fixtures());
    let err = provider.daily_bars("BANKNIFTY").await.unwrap_err();

    assert_eq!(err.kind(), DataErrorKind::NotFound);
    assert_eq!(err.kind().http_status(), 404);
}

#[tokio::test]
async fn expired_session_blocks_requests() {
    let stale = ProviderSession::new("nsit=stale", Utc::now() - Duration::hours(2), Duration::hours(1));
    let provider = JsonFileProvider::new(fixtures()).with_session(stale);

    let err = provider.daily_bars("NIFTY").await.unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::SessionExpired);

    let fresh = ProviderSession::issue("nsit=fresh", Duration::minutes(10));
    let provider = JsonFileProvider::new(fixtures()).with_session(fresh);
    assert!(provider.daily_bars("NIFTY").await.is_ok());
}

#[tokio::test]
async fn provider_is_object_safe() {
    let provider: Box<dyn MarketDataProvider> = Box::new(JsonFileProvider::new(fixtures()));
    assert_eq!(provider.name(), "json-file");
    assert!(provider.daily_bars("../secrets").await.is_err());
}
