//! Login, logout and per-request authorization for administrators.
//!
//! There is no server-side session registry: every request re-verifies the
//! signed cookie, logout only clears the cookie, and a token stays valid until
//! it ages out. All failure reasons collapse into [`Denied`] for callers;
//! [`Authenticator::check_at`] keeps the reason for diagnostics.

use super::cookie::{self, SessionCookies};
use super::password::{hash_password, verify_password};
use super::token::{SessionClaims, SessionCodec, TokenError};
use crate::config::Config;
use crate::models::{unix_now, Administrator};
use axum::http::{HeaderMap, HeaderValue};
use std::future::Future;
use std::sync::OnceLock;
use zeroize::Zeroizing;

/// Lookup of administrator credentials by username.
pub trait CredentialStore {
    fn find_administrator_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Administrator>, redis::RedisError>> + Send;
}

/// The authenticated administrator attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub admin_id: u64,
    pub username: String,
}

impl From<SessionClaims> for AdminIdentity {
    fn from(claims: SessionClaims) -> Self {
        AdminIdentity {
            admin_id: claims.admin_id,
            username: claims.username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username, inactive administrator or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session token signature mismatch")]
    BadSignature,

    #[error("Session token expired")]
    Expired,

    #[error("Session token issued in the future")]
    NotYetValid,

    #[error("No session cookie")]
    MissingSession,

    #[error("Credential store error: {0}")]
    Storage(String),

    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::BadSignature => AuthError::BadSignature,
            TokenError::Expired => AuthError::Expired,
            TokenError::NotYetValid => AuthError::NotYetValid,
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

/// Uniform outcome of a failed authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Not authenticated")]
pub struct Denied;

/// Result of a successful login: identity plus the `Set-Cookie` to send.
#[derive(Debug, Clone)]
pub struct SessionAttachment {
    pub identity: AdminIdentity,
    pub token: String,
    pub set_cookie: HeaderValue,
}

/// `Set-Cookie` instruction removing the session.
#[derive(Debug, Clone)]
pub struct SessionClear {
    pub set_cookie: HeaderValue,
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    codec: SessionCodec,
    cookies: SessionCookies,
}

impl Authenticator {
    /// Codec validity window and cookie `Max-Age` come from the same value.
    pub fn new(secret: &[u8], max_age_secs: u64, secure_cookie: bool) -> Self {
        Self {
            codec: SessionCodec::new(secret, max_age_secs),
            cookies: SessionCookies::new(max_age_secs, secure_cookie),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.secret_key.as_bytes(),
            config.session_max_age_secs,
            config.cookie_secure,
        )
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Check credentials and issue a session.
    ///
    /// Unknown users and inactive administrators still pay for a password
    /// verification so the three failure cases take comparable time.
    pub async fn login<S>(
        &self,
        store: &mut S,
        username: &str,
        password: &str,
    ) -> Result<SessionAttachment, AuthError>
    where
        S: CredentialStore,
    {
        let admin = store
            .find_administrator_by_username(username)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let (stored_hash, candidate) = match admin {
            Some(admin) if admin.is_active => (Some(admin.password_hash.clone()), Some(admin)),
            _ => (None, None),
        };

        let password = Zeroizing::new(password.to_string());
        let matches = tokio::task::spawn_blocking(move || {
            let hash = stored_hash.as_deref().unwrap_or_else(|| dummy_hash());
            verify_password(&password, hash)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password check aborted: {}", e)))?;

        let admin = match candidate {
            Some(admin) if matches => admin,
            _ => {
                tracing::warn!(action = "login_failed", username = %username, "Invalid admin credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.codec.issue(admin.id, &admin.username)?;
        let set_cookie = self
            .cookies
            .attach(&token)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(action = "login", admin_id = admin.id, username = %admin.username, "Admin logged in");

        Ok(SessionAttachment {
            identity: AdminIdentity {
                admin_id: admin.id,
                username: admin.username,
            },
            token,
            set_cookie,
        })
    }

    pub fn logout(&self) -> Result<SessionClear, AuthError> {
        let set_cookie = self
            .cookies
            .clear()
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(SessionClear { set_cookie })
    }

    /// Decide whether the request carries a valid admin session.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AdminIdentity, Denied> {
        self.authorize_at(headers, unix_now())
    }

    pub fn authorize_at(&self, headers: &HeaderMap, now: u64) -> Result<AdminIdentity, Denied> {
        self.check_at(headers, now).map_err(|err| {
            tracing::debug!(reason = %err, "Admin session rejected");
            Denied
        })
    }

    /// Like [`authorize_at`](Self::authorize_at) but keeps the failure reason.
    pub fn check_at(&self, headers: &HeaderMap, now: u64) -> Result<AdminIdentity, AuthError> {
        let token = cookie::extract(headers).ok_or(AuthError::MissingSession)?;
        let claims = self.codec.verify_at(&token, now)?;
        Ok(claims.into())
    }
}

/// Hash checked against when the username has no usable account.
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| hash_password("kiosque-no-such-admin").unwrap_or_default())
}
