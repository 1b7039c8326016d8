//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the login/logout pages, the Plaid JSON API, and the protected static
//! site under a single Axum router. Only `/login` and `/healthz` are reachable
//! without a session; everything else goes through [`auth::RequireAuth`].

pub mod auth;
pub mod extract;
pub mod plaid;
pub mod site;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::routing::{MethodRouter, get, post};
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Headers added to every response unless a handler already set them.
/// No Content-Security-Policy: the site loads the Plaid Link script.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Methods a route does not define fall through to the static site, which
/// applies the session gate and redirects.
fn with_site_fallback(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(site::serve)
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/login", with_site_fallback(get(auth::login_page).post(auth::login)))
        .route("/logout", with_site_fallback(post(auth::logout)))
        .route("/healthz", get(healthz))
        .route("/api/status", with_site_fallback(get(plaid::status)))
        .route("/plaid/create_link_token", with_site_fallback(post(plaid::create_link_token)))
        .route("/plaid/exchange_public_token", with_site_fallback(post(plaid::exchange_public_token)))
        .route("/api/transactions", with_site_fallback(get(plaid::transactions)))
        .fallback(site::serve);

    SECURITY_HEADERS
        .iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(*name),
                HeaderValue::from_static(*value),
            ))
        })
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
