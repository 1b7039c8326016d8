//! Auth routes: password login and logout plus the session gate extractor.

use axum::extract::{FromRef, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Deserialize;
use time::Duration;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::extract::{FormOrJson, scalar_string};
use crate::services::session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "moneyhub_session";
pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const LOGIN_PAGE_FILE: &str = "login.html";

const LOGIN_FAILED_HTML: &str = r#"<html><body style="font-family:system-ui;background:#0b1220;color:#e9eef7;">
<div style="max-width:420px;margin:5rem auto;background:#132235;padding:20px;border-radius:12px;">
  <h3>Login failed</h3>
  <p>Wrong password. <a style="color:#8db6ff" href="/login">Try again</a>.</p>
</div></body></html>
"#;

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Proof that the request carries a live operator session.
/// Use as the first handler parameter on every protected route; without a
/// session the request is redirected to `/login` before the handler runs.
pub struct RequireAuth {
    pub session_id: String,
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = SignedCookieJar::from_headers(&parts.headers, app_state.cookie_key.clone());
        let session_id = jar
            .get(COOKIE_NAME)
            .map(|c| c.value().to_owned())
            .unwrap_or_default();
        if session_id.is_empty() || !app_state.sessions.touch(&session_id).await {
            return Err(found(LOGIN_PATH));
        }

        Ok(Self { session_id })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /login` serves the login form. Never gated.
pub async fn login_page(State(state): State<AppState>, request: Request) -> Response {
    let path = state.config.public_dir.join(LOGIN_PAGE_FILE);
    let Ok(response) = ServeFile::new(path).oneshot(request).await;
    response.into_response()
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default, deserialize_with = "scalar_string")]
    password: Option<String>,
}

/// `POST /login` starts a session when the password matches.
pub async fn login(State(state): State<AppState>, jar: SignedCookieJar, FormOrJson(form): FormOrJson<LoginForm>) -> Response {
    let submitted = form.and_then(|f| f.password).unwrap_or_default();
    if !session::check_password(&submitted, &state.config.app_password) {
        tracing::warn!(password_configured = !state.config.app_password.is_empty(), "login failed");
        return (StatusCode::UNAUTHORIZED, Html(LOGIN_FAILED_HTML)).into_response();
    }

    // Never reuse a session id that predates authentication.
    if let Some(previous) = jar.get(COOKIE_NAME) {
        state.sessions.destroy(previous.value()).await;
    }
    let session_id = state.sessions.create().await;
    let active_sessions = state.sessions.active_count().await;
    tracing::info!(active_sessions, "operator logged in");

    let jar = jar.add(session_cookie(session_id, state.config.cookie_secure));
    (jar, found("/")).into_response()
}

/// `POST /logout` ends the session and returns to `/login`.
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        state.sessions.destroy(cookie.value()).await;
    }

    let mut cleared = session_cookie(String::new(), state.config.cookie_secure);
    cleared.set_max_age(Duration::ZERO);
    let jar = jar.add(cleared);
    (jar, found(LOGIN_PATH)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
