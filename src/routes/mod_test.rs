use super::*;
use crate::state::test_helpers::{MockPlaid, TEST_PASSWORD, authed_cookie, test_app_state_with_site};
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn site_state(mock: &Arc<MockPlaid>) -> AppState {
    test_app_state_with_site(mock.clone())
}

async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    let Ok(response) = app(state.clone()).oneshot(request).await;
    response
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

fn empty(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(method, uri, cookie).body(Body::empty()).unwrap()
}

fn json_request(uri: &str, cookie: &str, body: &Value) -> Request<Body> {
    request("POST", uri, Some(cookie))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_login(password: &str) -> Request<Body> {
    let body = format!("password={}", password.replace(' ', "+"));
    request("POST", "/login", None)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn login_request(body: &Value) -> Request<Body> {
    request("POST", "/login", None)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn cookie_from(response: &Response<Body>) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

// =============================================================================
// OPEN ROUTES
// =============================================================================

#[tokio::test]
async fn healthz_is_open() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let response = send(&state, empty("GET", "/healthz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_page_is_open() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let response = send(&state, empty("GET", "/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("login page"));
}

#[tokio::test]
async fn security_headers_are_set() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let response = send(&state, empty("GET", "/healthz", None)).await;
    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert!(headers.get("content-security-policy").is_none());
}

// =============================================================================
// GATE
// =============================================================================

#[tokio::test]
async fn protected_routes_redirect_without_session() {
    let mock = Arc::new(MockPlaid::default());
    let state = site_state(&mock);
    for (method, uri) in [
        ("GET", "/"),
        ("GET", "/index.html"),
        ("GET", "/about"),
        ("GET", "/api/status"),
        ("POST", "/plaid/create_link_token"),
        ("POST", "/plaid/exchange_public_token"),
        ("GET", "/api/transactions"),
        ("GET", "/logout"),
        ("DELETE", "/anything"),
    ] {
        let response = send(&state, empty(method, uri, None)).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{method} {uri}");
        assert_eq!(location(&response), "/login", "{method} {uri}");
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn wrong_method_on_api_route_redirects_home_when_authed() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let cookie = authed_cookie(&state).await;
    let response = send(&state, empty("GET", "/plaid/create_link_token", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn wrong_password_is_401() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let response = send(&state, form_login("nope")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn json_login_is_accepted() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let response = send(&state, login_request(&json!({ "password": TEST_PASSWORD }))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn login_link_fetch_logout_flow() {
    let mock = Arc::new(MockPlaid::with_transactions(vec![
        crate::state::test_helpers::remote_tx("t1", 12.5),
    ]));
    let state = site_state(&mock);

    let response = send(&state, form_login(TEST_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    let cookie = cookie_from(&response);

    let response = send(&state, empty("GET", "/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&state, empty("GET", "/api/status", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["plaid"]["linked"], json!(false));

    let response = send(&state, empty("POST", "/plaid/create_link_token", Some(&cookie))).await;
    assert_eq!(json_body(response).await, json!({ "link_token": "link-sandbox-mock" }));

    let response = send(
        &state,
        json_request("/plaid/exchange_public_token", &cookie, &json!({ "public_token": "pub-1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "ok": true }));

    let response = send(&state, empty("GET", "/api/status", Some(&cookie))).await;
    assert_eq!(json_body(response).await["plaid"]["linked"], json!(true));

    let response = send(&state, empty("GET", "/api/transactions", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transactions"][0]["id"], "t1");
    assert_eq!(body["transactions"][0]["category"], "Other");

    let response = send(&state, empty("POST", "/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");

    let response = send(&state, empty("GET", "/api/status", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn second_exchange_replaces_access_token() {
    let mock = Arc::new(MockPlaid::default());
    let state = site_state(&mock);
    let cookie = authed_cookie(&state).await;

    for public_token in ["pub-1", "pub-2"] {
        let body = json!({ "public_token": public_token });
        let response = send(&state, json_request("/plaid/exchange_public_token", &cookie, &body)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = send(&state, empty("GET", "/api/transactions", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let requests = mock.transaction_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "access-for-pub-2");
}

#[tokio::test]
async fn form_encoded_exchange_is_accepted() {
    let state = site_state(&Arc::new(MockPlaid::default()));
    let cookie = authed_cookie(&state).await;
    let request = request("POST", "/plaid/exchange_public_token", Some(&cookie))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("public_token=pub-form"))
        .unwrap();
    let response = send(&state, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.link.is_linked().await);
}

#[tokio::test]
async fn numeric_json_password_is_compared_as_text() {
    let base = site_state(&Arc::new(MockPlaid::default()));
    let config = crate::config::AppConfig { app_password: "12345".into(), ..(*base.config).clone() };
    let state = AppState { config: Arc::new(config), ..base };

    let response = send(&state, login_request(&json!({ "password": 12345 }))).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn numeric_public_token_is_forwarded() {
    let mock = Arc::new(MockPlaid::default());
    let state = site_state(&mock);
    let cookie = authed_cookie(&state).await;

    let body = json!({ "public_token": 987 });
    let response = send(&state, json_request("/plaid/exchange_public_token", &cookie, &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(state.link.access_token().await.as_deref(), Some("access-for-987"));
}

#[tokio::test]
async fn falsy_public_token_is_missing() {
    let mock = Arc::new(MockPlaid::default());
    let state = site_state(&mock);
    let cookie = authed_cookie(&state).await;

    for token in [json!(0), json!(false), json!(null), json!("")] {
        let body = json!({ "public_token": token });
        let response = send(&state, json_request("/plaid/exchange_public_token", &cookie, &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(mock.call_count(), 0);
}
