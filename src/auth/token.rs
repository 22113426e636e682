//! Signed, time-limited session tokens.
//!
//! Wire format: `base64url(json claims) "." base64url(hmac_sha256)`.
//! The MAC covers a fixed context string plus the encoded claims, and is
//! checked before the claims are decoded. Nothing in the payload, including
//! `issued_at`, is trusted until the signature matches.

use crate::models::unix_now;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime: 8 hours.
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 8 * 60 * 60;

const SIGNING_CONTEXT: &[u8] = b"kiosque.admin-session.v1:";

/// How far in the future `issued_at` may lie before a token is refused.
pub const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Claims carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub admin_id: u64,
    pub username: String,
    pub issued_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Corrupted, forged or structurally invalid token.
    #[error("Token signature mismatch")]
    BadSignature,

    /// Signature valid but older than the configured maximum age.
    #[error("Token expired")]
    Expired,

    /// Signature valid but issued later than `now` plus the allowed skew,
    /// as happens after the server clock steps backwards.
    #[error("Token issued in the future")]
    NotYetValid,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and verifies session tokens with a server-held secret.
///
/// Immutable after construction; share it behind an `Arc` or clone it.
#[derive(Clone)]
pub struct SessionCodec {
    key: Zeroizing<Vec<u8>>,
    max_age_secs: u64,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("key", &"[REDACTED]")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl SessionCodec {
    pub fn new(secret: &[u8], max_age_secs: u64) -> Self {
        Self {
            key: Zeroizing::new(secret.to_vec()),
            max_age_secs,
        }
    }

    /// Validity window in seconds. Also used as the cookie `Max-Age`.
    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// Issue a token stamped with the current time.
    pub fn issue(&self, admin_id: u64, username: &str) -> Result<String, TokenError> {
        self.issue_at(admin_id, username, unix_now())
    }

    /// Issue a token stamped with `now` (seconds since the Unix epoch).
    pub fn issue_at(&self, admin_id: u64, username: &str, now: u64) -> Result<String, TokenError> {
        let claims = SessionClaims {
            admin_id,
            username: username.to_string(),
            issued_at: now,
        };
        let json =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token against `now`.
    ///
    /// The boundary is inclusive: a token aged exactly `max_age_secs` is still
    /// valid, one second more is `Expired`. A token stamped more than
    /// [`MAX_CLOCK_SKEW_SECS`] ahead of `now` is `NotYetValid`.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<SessionClaims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::BadSignature)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::BadSignature)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::BadSignature)?;
        let claims: SessionClaims =
            serde_json::from_slice(&json).map_err(|_| TokenError::BadSignature)?;

        if claims.issued_at > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return Err(TokenError::NotYetValid);
        }
        if now.saturating_sub(claims.issued_at) > self.max_age_secs {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        mac.update(SIGNING_CONTEXT);
        Ok(mac)
    }
}
