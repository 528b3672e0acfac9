//! CLI 도구 모음.
//!
//! 이 crate는 `signal` 바이너리의 명령을 제공합니다:
//! - 앙상블 예측 (`forecast`)
//! - 기술적 지표와 종합 시그널 (`technical`)
//! - 옵션 체인 분석 (`options`)
//! - 단일 옵션 그릭스 (`greeks`)

pub mod commands;

pub use commands::*;
