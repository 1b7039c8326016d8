//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the parsed configuration, the session store, the bank link, the
//! Plaid client, and the cookie signing key. Everything lives in memory and
//! is gone on restart.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::config::AppConfig;
use crate::plaid::{PlaidApi, PlaidConfig};
use crate::services::link::BankLink;
use crate::services::session::SessionStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub plaid_config: Arc<PlaidConfig>,
    pub plaid: Arc<dyn PlaidApi>,
    pub link: BankLink,
    pub sessions: SessionStore,
    pub cookie_key: Key,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, plaid_config: PlaidConfig, plaid: Arc<dyn PlaidApi>) -> Self {
        let cookie_key = cookie_key(&config.session_secret);
        let sessions = SessionStore::new(config.session_ttl);
        Self {
            config: Arc::new(config),
            plaid_config: Arc::new(plaid_config),
            plaid,
            link: BankLink::new(),
            sessions,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the 64-byte cookie signing key from a secret of any length.
#[must_use]
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

// =============================================================================
// TEST HELPERS
// =============================================================================
