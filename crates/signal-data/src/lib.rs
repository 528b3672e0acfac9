//! 시장 데이터 수집 경계.
//!
//! 이 crate는 다음을 제공합니다:
//! - 원시 일봉/옵션 체인 스키마와 검증 (`schema`)
//! - 타입화된 데이터 오류 분류와 HTTP 상태 매핑 (`error`)
//! - 비동기 프로바이더 트레이트와 JSON 파일 구현
//! - 주입 가능한 프로바이더 세션

pub mod error;
pub mod file_provider;
pub mod provider;
pub mod schema;
pub mod session;

pub use error::{DataError, DataErrorKind, ErrorResponse, Result};
pub use file_provider::JsonFileProvider;
pub use provider::{normalize_symbol, MarketDataProvider};
pub use schema::{
    listed_expiries, parse_expiry, select_expiry, validate_bars, validate_chain, RawBar,
    RawChainRecord, RawOptionChain, RawOptionLeg,
};
pub use session::ProviderSession;
