use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Name of the cookie carrying the signed admin session token.
pub const SESSION_COOKIE_NAME: &str = "kdp_admin_session";

/// Minimum accepted length of `SECRET_KEY`, in bytes.
pub const MIN_SECRET_KEY_BYTES: usize = 32;

#[derive(Clone)]
pub struct Config {
    // Redis
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,

    // Session signing
    pub secret_key: String,
    pub session_max_age_secs: u64,
    pub cookie_secure: bool,

    // First-run bootstrap
    pub admin_username: String,
    pub admin_password: String,
    pub seed_demo_data: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("static_dir", &self.static_dir)
            .field("secret_key", &"[REDACTED]")
            .field("session_max_age_secs", &self.session_max_age_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .field("seed_demo_data", &self.seed_demo_data)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        let _ = dotenvy::dotenv();

        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        let static_dir = PathBuf::from(env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));

        // Changing the key invalidates every outstanding session, so there is no default.
        let secret_key =
            env::var("SECRET_KEY").map_err(|_| ConfigError::MissingVar("SECRET_KEY".to_string()))?;
        if secret_key.len() < MIN_SECRET_KEY_BYTES {
            return Err(ConfigError::InvalidValue(
                "SECRET_KEY".to_string(),
                format!("must be at least {} bytes", MIN_SECRET_KEY_BYTES),
            ));
        }

        let session_max_age_secs: u64 = parse_env_or_default("SESSION_MAX_AGE_SECS", 28_800)?;
        if session_max_age_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_MAX_AGE_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let cookie_secure = parse_env_or_default("COOKIE_SECURE", false)?;

        let admin_username = env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        if !is_valid_username(&admin_username) {
            return Err(ConfigError::InvalidValue(
                "ADMIN_USER".to_string(),
                "must be 1-50 characters without whitespace".to_string(),
            ));
        }
        let admin_password = env::var("ADMIN_PASS").unwrap_or_else(|_| "admin123".to_string());
        if admin_password.is_empty() {
            return Err(ConfigError::InvalidValue(
                "ADMIN_PASS".to_string(),
                "cannot be empty".to_string(),
            ));
        }
        let seed_demo_data = parse_env_or_default("SEED_DEMO_DATA", true)?;

        Ok(Config {
            redis_url,
            bind_addr,
            static_dir,
            secret_key,
            session_max_age_secs,
            cookie_secure,
            admin_username,
            admin_password,
            seed_demo_data,
        })
    }
}

/// Only the Redis URL, for maintenance commands that do not serve HTTP.
pub fn redis_url_from_env() -> Result<String, ConfigError> {
    let _ = dotenvy::dotenv();
    env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))
}

/// Administrator usernames: 1-50 characters, no whitespace.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (1..=50).contains(&len) && !username.chars().any(char::is_whitespace)
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
