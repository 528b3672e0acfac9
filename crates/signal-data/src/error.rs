//! 데이터 모듈 오류 타입.
//!
//! 호출자는 메시지 문자열이 아니라 [`DataErrorKind`]로 분기합니다.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 데이터 오류 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataErrorKind {
    /// 심볼/만기/파일 없음
    NotFound,
    /// 스키마 검증 실패
    InvalidData,
    /// 요청 한도 초과
    RateLimited,
    /// 세션 만료
    SessionExpired,
    /// 외부 소스 오류
    Upstream,
    /// 로컬 I/O 오류
    Io,
}

impl DataErrorKind {
    /// 라우트 계층에서 사용할 HTTP 상태 코드.
    pub fn http_status(&self) -> u16 {
        match self {
            DataErrorKind::NotFound => 404,
            DataErrorKind::InvalidData => 422,
            DataErrorKind::RateLimited => 429,
            DataErrorKind::SessionExpired => 401,
            DataErrorKind::Upstream => 502,
            DataErrorKind::Io => 500,
        }
    }

    /// 에러 코드 문자열.
    pub fn code(&self) -> &'static str {
        match self {
            DataErrorKind::NotFound => "NOT_FOUND",
            DataErrorKind::InvalidData => "INVALID_DATA",
            DataErrorKind::RateLimited => "RATE_LIMITED",
            DataErrorKind::SessionExpired => "SESSION_EXPIRED",
            DataErrorKind::Upstream => "UPSTREAM_ERROR",
            DataErrorKind::Io => "IO_ERROR",
        }
    }

    /// 재시도로 해결될 수 있는지 여부.
    pub fn is_transient(&self) -> bool {
        matches!(self, DataErrorKind::RateLimited | DataErrorKind::Upstream)
    }
}

impl fmt::Display for DataErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 데이터 관련 오류.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct DataError {
    kind: DataErrorKind,
    message: String,
}

impl DataError {
    /// 새 오류를 생성합니다.
    pub fn new(kind: DataErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DataErrorKind::NotFound, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(DataErrorKind::InvalidData, message)
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(DataErrorKind::SessionExpired, message)
    }

    /// 오류 분류.
    pub fn kind(&self) -> DataErrorKind {
        self.kind
    }

    /// 상세 메시지.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 직렬화 가능한 응답 본문으로 변환합니다.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.kind.code(),
            status: self.kind.http_status(),
            message: self.message.clone(),
        }
    }
}

/// 에러 응답 본문.
///
/// ```json
/// { "code": "NOT_FOUND", "status": 404, "message": "no bars for NIFTY" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub status: u16,
    pub message: String,
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => DataErrorKind::NotFound,
            _ => DataErrorKind::Io,
        };
        DataError::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::invalid(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
