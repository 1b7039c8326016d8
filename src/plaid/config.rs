//! Plaid configuration parsed from environment variables.

use super::types::PlaidError;

pub const DEFAULT_PLAID_PRODUCTS: &str = "transactions,investments";
pub const DEFAULT_PLAID_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PLAID_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    /// Lowercase name reported by `/api/status`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Development => "https://development.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaidTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaidConfig {
    pub environment: PlaidEnvironment,
    pub products: Vec<String>,
    pub client_id: String,
    pub secret: String,
    pub timeouts: PlaidTimeouts,
}

impl PlaidConfig {
    /// Build typed Plaid config from environment variables.
    ///
    /// All optional:
    /// - `PLAID_ENV`: `sandbox` (default), `development` or `production`
    /// - `PLAID_PRODUCTS`: comma-separated, default `transactions,investments`
    /// - `PLAID_CLIENT_ID` / `PLAID_SECRET`: empty means link tokens are refused
    /// - `PLAID_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PLAID_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`PlaidError::ConfigParse`] for an unknown `PLAID_ENV` or a
    /// timeout that is not a positive number of seconds.
    pub fn from_env() -> Result<Self, PlaidError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`PlaidError::ConfigParse`] for an unknown `PLAID_ENV` or a
    /// timeout that is not a positive number of seconds.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, PlaidError> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let environment = parse_environment(non_empty("PLAID_ENV").as_deref())?;
        let products = parse_products(non_empty("PLAID_PRODUCTS").as_deref().unwrap_or(DEFAULT_PLAID_PRODUCTS));
        let client_id = var("PLAID_CLIENT_ID").unwrap_or_default();
        let secret = var("PLAID_SECRET").unwrap_or_default();
        let parse_secs = |key: &str, default: u64| match non_empty(key) {
            Some(raw) => parse_timeout(key, &raw),
            None => Ok(default),
        };
        let timeouts = PlaidTimeouts {
            request_secs: parse_secs("PLAID_REQUEST_TIMEOUT_SECS", DEFAULT_PLAID_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs("PLAID_CONNECT_TIMEOUT_SECS", DEFAULT_PLAID_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { environment, products, client_id, secret, timeouts })
    }

    /// Both API credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.secret.is_empty()
    }
}

fn parse_environment(raw: Option<&str>) -> Result<PlaidEnvironment, PlaidError> {
    match raw.unwrap_or("sandbox").trim().to_ascii_lowercase().as_str() {
        "sandbox" => Ok(PlaidEnvironment::Sandbox),
        "development" => Ok(PlaidEnvironment::Development),
        "production" => Ok(PlaidEnvironment::Production),
        other => Err(PlaidError::ConfigParse(format!("unknown PLAID_ENV: {other}"))),
    }
}

/// Whole seconds, at least one.
fn parse_timeout(key: &str, raw: &str) -> Result<u64, PlaidError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(PlaidError::ConfigParse(format!("invalid {key}: {raw:?}"))),
    }
}

pub(crate) fn parse_products(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
