//! Plaid types: wire records, errors, and the client trait.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by Plaid client operations.
#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The HTTP request to Plaid failed before a response arrived.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Plaid returned a non-success HTTP status.
    #[error("API response error: status {status} ({error_code}): {message} [request_id={request_id:?}]")]
    ApiResponse { status: u16, error_code: String, message: String, request_id: Option<String> },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// LINK TOKEN
// =============================================================================

/// Parameters for `/link/token/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTokenRequest {
    pub client_user_id: String,
    pub client_name: String,
    pub products: Vec<String>,
    pub country_codes: Vec<String>,
    pub language: String,
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Parameters for `/transactions/get`. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsRequest {
    pub start_date: String,
    pub end_date: String,
    pub count: u32,
    pub offset: u32,
}

/// Fine-grained personal-finance category attached to a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalFinanceCategory {
    #[serde(default)]
    pub primary: Option<String>,
}

/// A transaction record as returned by Plaid. Only the fields this
/// gateway reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub date: String,
    pub name: String,
    /// Positive for money leaving the account, negative for money arriving.
    pub amount: f64,
    #[serde(default)]
    pub personal_finance_category: Option<PersonalFinanceCategory>,
    /// Legacy coarse-to-fine category hierarchy.
    #[serde(default)]
    pub category: Option<Vec<String>>,
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================

/// The three Plaid operations the gateway brokers.
///
/// Implemented by [`super::PlaidClient`] in production and by mocks in tests.
#[async_trait::async_trait]
pub trait PlaidApi: Send + Sync {
    /// Create a short-lived link token for the client-side widget.
    async fn create_link_token(&self, request: &LinkTokenRequest) -> Result<String, PlaidError>;

    /// Exchange a public token for a durable access token.
    async fn exchange_public_token(&self, public_token: &str) -> Result<String, PlaidError>;

    /// Fetch one page of transactions for the item behind `access_token`.
    async fn get_transactions(
        &self,
        access_token: &str,
        request: &TransactionsRequest,
    ) -> Result<Vec<RemoteTransaction>, PlaidError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
