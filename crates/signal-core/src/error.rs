//! 분석 엔진의 에러 타입.
//!
//! 데이터 부족이나 수치 불안정은 에러가 아니라 센티넬 값으로 표현됩니다.
//! 이 모듈의 에러는 잘못된 입력이나 설정처럼 호출자가 고쳐야 하는 경우에만 사용됩니다.

use thiserror::Error;

/// 핵심 분석 에러.
#[derive(Debug, Error)]
pub enum SignalError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 데이터 부족
    #[error("데이터 부족: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 수치 계산 에러
    #[error("계산 에러: {0}")]
    Numeric(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 분석 작업을 위한 Result 타입.
pub type SignalResult<T> = Result<T, SignalError>;

impl SignalError {
    /// 센티넬 값으로 대체 가능한 에러인지 확인합니다.
    ///
    /// 데이터 부족과 수치 에러는 공개 진입점에서 기본값으로 흡수됩니다.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            SignalError::InsufficientData { .. } | SignalError::Numeric(_)
        )
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(err: serde_json::Error) -> Self {
        SignalError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SignalError {
    fn from(err: config::ConfigError) -> Self {
        SignalError::Config(err.to_string())
    }
}
