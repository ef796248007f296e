use actix_web::cookie::Key;
use std::env;
use thiserror::Error;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Hex-encoded key (at least 64 bytes) used to seal the session cookie.
    /// When unset a fresh key is generated at startup, which logs everyone out
    /// on every restart.
    pub const SECRET_KEY: &str = "SECRET_KEY";
    pub const SESSION_TTL_HOURS: &str = "SESSION_TTL_HOURS";
    /// Set to "true" or "1" when served over HTTPS.
    pub const COOKIE_SECURE: &str = "COOKIE_SECURE";
    pub const STATIC_DIR: &str = "STATIC_DIR";
    pub const PBKDF2_ITERATIONS: &str = "PBKDF2_ITERATIONS";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const BIND_ADDRESS: &str = "127.0.0.1";
    pub const DATABASE_URL: &str = "./.db/memo.db";
    pub const SESSION_TTL_HOURS: i64 = 24;
    /// Longest accepted session lifetime (one year).
    pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
    pub const PBKDF2_ITERATIONS: u32 = 600_000;
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("SESSION_TTL_HOURS must be between 1 and {max}, got {0}", max = defaults::MAX_SESSION_TTL_HOURS)]
    SessionTtlOutOfRange(i64),
    #[error("SECRET_KEY must be hex encoded")]
    SecretKeyNotHex,
    #[error("SECRET_KEY must decode to at least 64 bytes, got {0}")]
    SecretKeyTooShort(usize),
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_url: String,
    pub secret_key: Option<Key>,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub static_dir: Option<String>,
    pub pbkdf2_iterations: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret_key = match var(env_vars::SECRET_KEY) {
            Some(encoded) => Some(parse_secret_key(encoded.trim())?),
            None => None,
        };

        let session_ttl_hours = parse_number(
            env_vars::SESSION_TTL_HOURS,
            var(env_vars::SESSION_TTL_HOURS),
            defaults::SESSION_TTL_HOURS,
        )?;
        if !(1..=defaults::MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(ConfigError::SessionTtlOutOfRange(session_ttl_hours));
        }

        Ok(Self {
            port: parse_number(env_vars::PORT, var(env_vars::PORT), defaults::PORT)?,
            bind_address: var(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|| defaults::BIND_ADDRESS.to_string()),
            database_url: var(env_vars::DATABASE_URL)
                .unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            secret_key,
            session_ttl_hours,
            cookie_secure: var(env_vars::COOKIE_SECURE)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
            static_dir: var(env_vars::STATIC_DIR),
            pbkdf2_iterations: parse_number(
                env_vars::PBKDF2_ITERATIONS,
                var(env_vars::PBKDF2_ITERATIONS),
                defaults::PBKDF2_ITERATIONS,
            )?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        None => Ok(default),
    }
}

fn parse_secret_key(encoded: &str) -> Result<Key, ConfigError> {
    let bytes = hex::decode(encoded).map_err(|_| ConfigError::SecretKeyNotHex)?;
    Key::try_from(bytes.as_slice()).map_err(|_| ConfigError::SecretKeyTooShort(bytes.len()))
}
