//! Plaid routes: status, link token, token exchange and transactions.
//!
//! Every handler takes [`RequireAuth`] first, so an unauthenticated request
//! is redirected before any Plaid call can happen.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::auth::RequireAuth;
use super::extract::{FormOrJson, scalar_string};
use crate::services::link::{self, LINK_CLIENT_USER_ID, LinkError};
use crate::state::AppState;

pub(crate) const NOT_CONFIGURED_MESSAGE: &str = "Plaid not configured. Add PLAID_CLIENT_ID and PLAID_SECRET.";
pub(crate) const LINK_TOKEN_FAILED: &str = "link_token failed";
pub(crate) const EXCHANGE_FAILED: &str = "exchange failed";
pub(crate) const TRANSACTIONS_FAILED: &str = "transactions fetch failed";

pub(crate) fn link_error_to_status(err: &LinkError) -> StatusCode {
    match err {
        LinkError::NotConfigured => StatusCode::NOT_IMPLEMENTED,
        LinkError::MissingPublicToken | LinkError::NotLinked => StatusCode::BAD_REQUEST,
        LinkError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert a [`LinkError`] into `{ "error": ... }`. Upstream detail is logged
/// here and replaced by `upstream_message` in the response.
pub(crate) fn link_error_response(err: LinkError, upstream_message: &'static str) -> Response {
    let message = match &err {
        LinkError::NotConfigured => NOT_CONFIGURED_MESSAGE,
        LinkError::MissingPublicToken => "Missing public_token",
        LinkError::NotLinked => "No bank linked yet.",
        LinkError::Upstream(e) => {
            tracing::error!(error = %e, operation = upstream_message, "plaid call failed");
            upstream_message
        }
    };
    (link_error_to_status(&err), Json(serde_json::json!({ "error": message }))).into_response()
}

/// `GET /api/status`
pub async fn status(_auth: RequireAuth, State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = link::status(&state).await;
    Json(serde_json::json!({ "plaid": status }))
}

/// `POST /plaid/create_link_token`
pub async fn create_link_token(_auth: RequireAuth, State(state): State<AppState>) -> Response {
    match link::create_link_token(&state, LINK_CLIENT_USER_ID).await {
        Ok(link_token) => Json(serde_json::json!({ "link_token": link_token })).into_response(),
        Err(e) => link_error_response(e, LINK_TOKEN_FAILED),
    }
}

#[derive(Deserialize)]
pub struct ExchangeBody {
    #[serde(default, deserialize_with = "scalar_string")]
    public_token: Option<String>,
}

/// `POST /plaid/exchange_public_token`
pub async fn exchange_public_token(
    _auth: RequireAuth,
    State(state): State<AppState>,
    FormOrJson(body): FormOrJson<ExchangeBody>,
) -> Response {
    let public_token = body.and_then(|b| b.public_token);
    match link::exchange_public_token(&state, public_token.as_deref()).await {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(e) => link_error_response(e, EXCHANGE_FAILED),
    }
}

/// `GET /api/transactions`
pub async fn transactions(_auth: RequireAuth, State(state): State<AppState>) -> Response {
    match link::fetch_transactions(&state).await {
        Ok(transactions) => Json(serde_json::json!({ "transactions": transactions })).into_response(),
        Err(e) => link_error_response(e, TRANSACTIONS_FAILED),
    }
}

#[cfg(test)]
#[path = "plaid_test.rs"]
mod tests;
