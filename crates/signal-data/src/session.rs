//! 데이터 소스 세션.
//!
//! 쿠키 기반 소스의 세션을 명시적인 값으로 표현합니다.
//! 프로바이더는 전역 상태 대신 주입받은 세션을 사용하며,
//! 만료 여부는 발급/만료 시각으로 판정합니다.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{DataError, Result};

/// 프로바이더 세션.
///
/// 쿠키 값은 `Debug` 출력에 노출되지 않습니다.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    cookie: SecretString,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl ProviderSession {
    /// 새 세션을 생성합니다.
    ///
    /// # 인자
    /// * `cookie` - `Cookie` 헤더 값
    /// * `issued_at` - 발급 시각
    /// * `ttl` - 유효 기간
    pub fn new(cookie: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            cookie: SecretString::from(cookie.into()),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// 지금 발급된 세션을 생성합니다.
    pub fn issue(cookie: impl Into<String>, ttl: Duration) -> Self {
        Self::new(cookie, Utc::now(), ttl)
    }

    /// `Cookie` 헤더 값.
    pub fn cookie_header(&self) -> &str {
        self.cookie.expose_secret()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// 주어진 시각에 만료되었는지 확인합니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// 현재 만료되었는지 확인합니다.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// 만료까지 `margin` 이내로 남았는지 확인합니다 (주어진 시각 기준).
    pub fn needs_refresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now + margin >= self.expires_at
    }

    /// 만료까지 `margin` 이내로 남았는지 확인합니다.
    pub fn needs_refresh(&self, margin: Duration) -> bool {
        self.needs_refresh_at(Utc::now(), margin)
    }

    /// 유효하지 않으면 `SessionExpired` 오류를 반환합니다.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.is_expired() {
            return Err(DataError::session_expired(format!(
                "session expired at {}",
                self.expires_at.to_rfc3339()
            )));
        }
        Ok(())
    }
}
