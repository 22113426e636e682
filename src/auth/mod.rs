//! Administrator authentication: password hashing, signed session cookies and
//! the request guard protecting `/admin`.

pub mod cookie;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

pub use cookie::SessionCookies;
pub use guard::{
    AdminIdentity, AuthError, Authenticator, CredentialStore, Denied, SessionAttachment,
    SessionClear,
};
pub use middleware::{AdminSession, AppState};
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{SessionClaims, SessionCodec, TokenError};
