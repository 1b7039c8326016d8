//! Protected static site.
//!
//! Catch-all behind the session gate. Files come from the public directory;
//! directories serve `index.html` and extensionless paths fall back to
//! `<path>.html`. Dotfiles are never served. Anything that does not resolve
//! redirects to `/`.

use std::path::Path;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use super::auth::{RequireAuth, found};
use crate::state::AppState;

pub(crate) const CACHE_CONTROL: &str = "public, max-age=3600";

/// Fallback for every path no other route claims.
pub async fn serve(_auth: RequireAuth, State(state): State<AppState>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return found("/");
    }

    let dir = state.config.public_dir.as_path();
    let path = uri.path();
    if let Some(response) = serve_path(dir, &method, path, &headers).await {
        return response;
    }
    if !path.ends_with('/') {
        if let Some(response) = serve_path(dir, &method, &format!("{path}.html"), &headers).await {
            return response;
        }
    }

    found("/")
}

/// Serve `path` from `dir`, or `None` when nothing is there.
async fn serve_path(dir: &Path, method: &Method, path: &str, headers: &HeaderMap) -> Option<Response> {
    if is_hidden(path) {
        return None;
    }

    let mut request = Request::builder()
        .method(method.clone())
        .uri(path)
        .body(Body::empty())
        .ok()?;
    *request.headers_mut() = headers.clone();

    let Ok(response) = ServeDir::new(dir)
        .append_index_html_on_directories(true)
        .oneshot(request)
        .await;
    if response.status() == StatusCode::NOT_FOUND {
        return None;
    }

    let mut response = response.into_response();
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    }
    Some(response)
}

/// Any segment naming a dotfile or dot-directory, encoded or not.
fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}

#[cfg(test)]
#[path = "site_test.rs"]
mod tests;
