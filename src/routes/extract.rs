//! Body extractor accepting either a URL-encoded form or JSON.

use std::convert::Infallible;

use axum::Json;
use axum::extract::{Form, FromRequest, Request};
use axum::http::header;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};

/// Parsed request body, or `None` when it was missing or malformed.
///
/// JSON is used when the `Content-Type` says so, a form otherwise. Never
/// rejects: handlers decide what an absent body means.
pub struct FormOrJson<T>(pub Option<T>);

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

        let parsed = if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|e| e.body_text())
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .map_err(|e| e.body_text())
        };

        match parsed {
            Ok(value) => Ok(Self(Some(value))),
            Err(reason) => {
                tracing::debug!(%reason, "request body not usable");
                Ok(Self(None))
            }
        }
    }
}

// =============================================================================
// SCALAR FIELDS
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

/// `deserialize_with` for text fields that should also take JSON numbers and
/// booleans. Falsy values (`""`, `0`, `false`, `null`) and arrays or objects
/// come out as `None`; other scalars are rendered as text.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => Some(s),
        Scalar::Bool(true) => Some("true".to_owned()),
        Scalar::Int(n) if n != 0 => Some(n.to_string()),
        Scalar::Float(n) if n.abs() > 0.0 => Some(n.to_string()),
        Scalar::Bool(false) | Scalar::Int(_) | Scalar::Float(_) | Scalar::Other(_) => None,
    };
    Ok(text.filter(|s| !s.is_empty()))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
