//! # Signal Core
//!
//! 시그널 분석 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 데이터와 수익률 통계
//! - 예측 결과(EnsembleForecast) 와이어 타입
//! - 옵션 체인 스냅샷 및 계약 타입
//! - 퀀트 시그널/종합 시그널 타입
//! - 주입 가능한 난수 소스
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
