//! Session cookie construction and extraction.

use crate::config::SESSION_COOKIE_NAME;
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

/// Builds `Set-Cookie` values for the admin session and reads it back.
///
/// `max_age_secs` must be the same value the token codec uses as its
/// validity window.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    max_age_secs: u64,
    secure: bool,
}

impl SessionCookies {
    pub fn new(max_age_secs: u64, secure: bool) -> Self {
        Self {
            max_age_secs,
            secure,
        }
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    pub fn attach(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    /// `Set-Cookie` value deleting the session cookie. Safe to send when no
    /// cookie is present.
    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Read the session token from the request's `Cookie` headers.
///
/// Returns `None` when the cookie is absent or empty.
pub fn extract(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
