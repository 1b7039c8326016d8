//! Bank link: the single linked Plaid item and the operations on it.
//!
//! DESIGN
//! ======
//! The gateway links at most one bank item. Its access token lives in a
//! [`BankLink`] held by `AppState`: empty at startup, filled by the first
//! successful exchange, overwritten by any later one. There is no unlink.
//!
//! TRADE-OFFS
//! ==========
//! A superseded access token is dropped locally but never removed on the
//! Plaid side. Concurrent exchanges race and the last writer wins.

use std::sync::Arc;

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};
use tokio::sync::RwLock;

use crate::plaid::PlaidError;
use crate::plaid::types::{LinkTokenRequest, PersonalFinanceCategory, RemoteTransaction, TransactionsRequest};
use crate::state::AppState;

pub const LINK_CLIENT_USER_ID: &str = "moneyhub-user";
pub const LINK_CLIENT_NAME: &str = "My Money Hub";
const LINK_COUNTRY_CODES: &[&str] = &["US"];
const LINK_LANGUAGE: &str = "en";

pub const TRANSACTION_WINDOW_DAYS: i64 = 30;
/// Only the first page is fetched.
pub const TRANSACTION_PAGE_SIZE: u32 = 250;

pub const FALLBACK_CATEGORY: &str = "Other";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("plaid credentials not configured")]
    NotConfigured,
    #[error("missing public_token")]
    MissingPublicToken,
    #[error("no bank linked yet")]
    NotLinked,
    #[error("plaid request failed: {0}")]
    Upstream(#[from] PlaidError),
}

// =============================================================================
// LINK STATE
// =============================================================================

/// Holder for the access token of the one linked item.
#[derive(Clone, Default)]
pub struct BankLink {
    access_token: Arc<RwLock<Option<String>>>,
}

impl BankLink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_linked(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Replace whatever token was held before.
    pub async fn set_access_token(&self, token: String) {
        *self.access_token.write().await = Some(token);
    }
}

// =============================================================================
// VIEW MODEL
// =============================================================================

/// Transaction as returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub name: String,
    /// Positive = outflow, negative = inflow.
    pub amount: f64,
    pub account_id: String,
    pub category: String,
}

impl From<RemoteTransaction> for Transaction {
    fn from(remote: RemoteTransaction) -> Self {
        let category = resolve_category(remote.personal_finance_category.as_ref(), remote.category.as_deref());
        Self {
            id: remote.transaction_id,
            date: remote.date,
            name: remote.name,
            amount: remote.amount,
            account_id: remote.account_id,
            category,
        }
    }
}

/// Personal-finance primary category, else first legacy category, else `"Other"`.
/// Empty strings are skipped.
#[must_use]
pub fn resolve_category(personal: Option<&PersonalFinanceCategory>, legacy: Option<&[String]>) -> String {
    personal
        .and_then(|c| c.primary.as_deref())
        .filter(|s| !s.is_empty())
        .or_else(|| legacy.and_then(<[String]>::first).map(String::as_str).filter(|s| !s.is_empty()))
        .unwrap_or(FALLBACK_CATEGORY)
        .to_owned()
}

// =============================================================================
// DATE WINDOW
// =============================================================================

/// `(start, end)` covering the trailing window that ends on `today`.
#[must_use]
pub fn trailing_window(today: Date) -> (Date, Date) {
    (today - Duration::days(TRANSACTION_WINDOW_DAYS), today)
}

/// `YYYY-MM-DD`, the ISO-8601 calendar date `Date` displays as.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.to_string()
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Snapshot served by `/api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub env: &'static str,
    pub products: Vec<String>,
    pub linked: bool,
}

pub async fn status(state: &AppState) -> LinkStatus {
    LinkStatus {
        env: state.plaid_config.environment.as_str(),
        products: state.plaid_config.products.clone(),
        linked: state.link.is_linked().await,
    }
}

/// Ask Plaid for a link token for `client_user_id`.
///
/// # Errors
///
/// [`LinkError::NotConfigured`] without credentials (no call is made),
/// [`LinkError::Upstream`] when Plaid fails.
pub async fn create_link_token(state: &AppState, client_user_id: &str) -> Result<String, LinkError> {
    if !state.plaid_config.is_configured() {
        return Err(LinkError::NotConfigured);
    }

    let request = LinkTokenRequest {
        client_user_id: client_user_id.to_owned(),
        client_name: LINK_CLIENT_NAME.to_owned(),
        products: state.plaid_config.products.clone(),
        country_codes: LINK_COUNTRY_CODES.iter().map(|c| (*c).to_owned()).collect(),
        language: LINK_LANGUAGE.to_owned(),
    };
    Ok(state.plaid.create_link_token(&request).await?)
}

/// Exchange a public token and keep the resulting access token.
///
/// # Errors
///
/// [`LinkError::MissingPublicToken`] for an empty/absent token,
/// [`LinkError::Upstream`] when Plaid fails. A failed exchange leaves the
/// previously held token in place.
pub async fn exchange_public_token(state: &AppState, public_token: Option<&str>) -> Result<(), LinkError> {
    let public_token = public_token
        .filter(|t| !t.is_empty())
        .ok_or(LinkError::MissingPublicToken)?;

    let access_token = state.plaid.exchange_public_token(public_token).await?;
    state.link.set_access_token(access_token).await;
    tracing::info!("bank item linked");
    Ok(())
}

/// Fetch the last 30 days of transactions, ending today (UTC).
///
/// # Errors
///
/// [`LinkError::NotLinked`] before any successful exchange,
/// [`LinkError::Upstream`] when Plaid fails.
pub async fn fetch_transactions(state: &AppState) -> Result<Vec<Transaction>, LinkError> {
    fetch_transactions_ending(state, OffsetDateTime::now_utc().date()).await
}

pub(crate) async fn fetch_transactions_ending(state: &AppState, today: Date) -> Result<Vec<Transaction>, LinkError> {
    let access_token = state.link.access_token().await.ok_or(LinkError::NotLinked)?;

    let (start, end) = trailing_window(today);
    let request = TransactionsRequest {
        start_date: format_date(start),
        end_date: format_date(end),
        count: TRANSACTION_PAGE_SIZE,
        offset: 0,
    };
    let remote = state.plaid.get_transactions(&access_token, &request).await?;
    Ok(remote.into_iter().map(Transaction::from).collect())
}

#[cfg(test)]
#[path = "link_test.rs"]
mod tests;
