//! Gateway configuration parsed from environment variables.
//!
//! Everything is read once at startup. Plaid settings live in
//! [`crate::plaid::PlaidConfig`] and are parsed separately.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_SECRET: &str = "change-me";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub session_secret: String,
    /// Operator password. Empty disables login entirely.
    pub app_password: String,
    pub cookie_secure: bool,
    pub session_ttl: Duration,
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `SESSION_SECRET`: default `change-me`
    /// - `APP_PASSWORD`: unset means nobody can log in
    /// - `APP_ENV`: `production` turns on secure cookies
    /// - `COOKIE_SECURE`: explicit override for the secure cookie flag
    /// - `SESSION_TTL_SECS`: idle session lifetime, default one week
    /// - `PUBLIC_DIR`: static site root, default `public`
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `SESSION_TTL_SECS` is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `SESSION_TTL_SECS` is not a number.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };
        let session_ttl_secs = match non_empty("SESSION_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { var: "SESSION_TTL_SECS", value: raw })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let production = var("APP_ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("production"));
        let cookie_secure = var("COOKIE_SECURE")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(production);

        Ok(Self {
            port,
            session_secret: non_empty("SESSION_SECRET").unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_owned()),
            app_password: var("APP_PASSWORD").unwrap_or_default(),
            cookie_secure,
            session_ttl: Duration::from_secs(session_ttl_secs),
            public_dir: non_empty("PUBLIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR), PathBuf::from),
        })
    }

    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
