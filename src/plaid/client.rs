//! Plaid HTTP client.
//!
//! Thin `reqwest` wrapper over the three endpoints the gateway uses. Parsing
//! lives in pure `parse_*` functions so it can be tested without a network.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::config::{PlaidConfig, PlaidTimeouts};
use super::types::{LinkTokenRequest, PlaidApi, PlaidError, RemoteTransaction, TransactionsRequest};

const API_VERSION: &str = "2020-09-14";
const MAX_ERROR_BODY_LENGTH: usize = 500;

// =============================================================================
// CLIENT
// =============================================================================

pub struct PlaidClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    secret: String,
}

impl PlaidClient {
    /// Build a client for the configured environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &PlaidConfig) -> Result<Self, PlaidError> {
        Self::with_base_url(config, config.environment.base_url().to_owned())
    }

    /// Build a client against an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn with_base_url(config: &PlaidConfig, base_url: String) -> Result<Self, PlaidError> {
        let PlaidTimeouts { request_secs, connect_secs } = config.timeouts;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_secs))
            .connect_timeout(Duration::from_secs(connect_secs))
            .build()
            .map_err(|e| PlaidError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            client_id: config.client_id.clone(),
            secret: config.secret.clone(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> Result<T, PlaidError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("PLAID-CLIENT-ID", &self.client_id)
            .header("PLAID-SECRET", &self.secret)
            .header("Plaid-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| PlaidError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PlaidError::ApiRequest(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| PlaidError::ApiParse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PlaidApi for PlaidClient {
    async fn create_link_token(&self, request: &LinkTokenRequest) -> Result<String, PlaidError> {
        let body = serde_json::json!({
            "user": { "client_user_id": request.client_user_id },
            "client_name": request.client_name,
            "products": request.products,
            "country_codes": request.country_codes,
            "language": request.language,
        });
        let resp: LinkTokenResponse = self.post("/link/token/create", &body).await?;
        Ok(resp.link_token)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<String, PlaidError> {
        let body = serde_json::json!({ "public_token": public_token });
        let resp: ExchangeResponse = self.post("/item/public_token/exchange", &body).await?;
        Ok(resp.access_token)
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        request: &TransactionsRequest,
    ) -> Result<Vec<RemoteTransaction>, PlaidError> {
        let body = serde_json::json!({
            "access_token": access_token,
            "start_date": request.start_date,
            "end_date": request.end_date,
            "options": { "count": request.count, "offset": request.offset },
        });
        let resp: TransactionsResponse = self.post("/transactions/get", &body).await?;
        Ok(resp.transactions)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Deserialize)]
pub(crate) struct LinkTokenResponse {
    pub(crate) link_token: String,
}

#[derive(serde::Deserialize)]
pub(crate) struct ExchangeResponse {
    pub(crate) access_token: String,
}

#[derive(serde::Deserialize)]
pub(crate) struct TransactionsResponse {
    pub(crate) transactions: Vec<RemoteTransaction>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Convert a non-success response into a [`PlaidError::ApiResponse`].
///
/// Plaid error bodies carry `error_type`, `error_code` and `error_message`;
/// anything else is kept as truncated raw text.
pub(crate) fn parse_error(status: u16, body: &str) -> PlaidError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if parsed.error_code.is_some() || parsed.error_message.is_some() => {
            let error_code = match (parsed.error_type, parsed.error_code) {
                (Some(kind), Some(code)) => format!("{kind}/{code}"),
                (None, Some(code)) => code,
                (Some(kind), None) => kind,
                (None, None) => "UNKNOWN".to_owned(),
            };
            PlaidError::ApiResponse {
                status,
                error_code,
                message: parsed.error_message.unwrap_or_default(),
                request_id: parsed.request_id,
            }
        }
        _ => PlaidError::ApiResponse {
            status,
            error_code: "UNKNOWN".to_owned(),
            message: truncate_body(body),
            request_id: None,
        },
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_owned();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
