use super::*;

// =============================================================================
// bytes_to_hex / generate_token
// =============================================================================

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// check_password
// =============================================================================

#[test]
fn check_password_exact_match_succeeds() {
    assert!(check_password("hunter2", "hunter2"));
}

#[test]
fn check_password_mismatch_fails() {
    assert!(!check_password("hunter3", "hunter2"));
    assert!(!check_password("", "hunter2"));
    assert!(!check_password("Hunter2", "hunter2"));
}

#[test]
fn check_password_is_byte_exact() {
    assert!(!check_password("hunter2 ", "hunter2"));
    assert!(!check_password(" hunter2", "hunter2"));
}

#[test]
fn check_password_unset_expected_always_fails() {
    assert!(!check_password("", ""));
    assert!(!check_password("anything", ""));
}

// =============================================================================
// SessionStore
// =============================================================================

#[tokio::test]
async fn created_session_is_valid() {
    let store = SessionStore::new(Duration::from_secs(60));
    let id = store.create().await;
    assert!(store.touch(&id).await);
    assert_eq!(store.active_count().await, 1);
}

#[tokio::test]
async fn unknown_session_is_invalid() {
    let store = SessionStore::new(Duration::from_secs(60));
    assert!(!store.touch("nope").await);
}

#[tokio::test]
async fn destroyed_session_is_invalid() {
    let store = SessionStore::new(Duration::from_secs(60));
    let id = store.create().await;
    store.destroy(&id).await;
    assert!(!store.touch(&id).await);
    assert_eq!(store.active_count().await, 0);
}

#[tokio::test]
async fn destroy_unknown_is_noop() {
    let store = SessionStore::new(Duration::from_secs(60));
    let id = store.create().await;
    store.destroy("other").await;
    assert!(store.touch(&id).await);
}

#[tokio::test]
async fn expired_session_is_invalid_and_removed() {
    let store = SessionStore::new(Duration::ZERO);
    let id = store.create().await;
    assert!(!store.touch(&id).await);
    assert_eq!(store.active_count().await, 0);
}

#[tokio::test]
async fn create_prunes_expired_sessions() {
    let store = SessionStore::new(Duration::from_millis(10));
    let _old = store.create().await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let fresh = store.create().await;
    assert_eq!(store.active_count().await, 1);
    assert!(store.touch(&fresh).await);
}

#[tokio::test]
async fn sessions_are_independent() {
    let store = SessionStore::new(Duration::from_secs(60));
    let a = store.create().await;
    let b = store.create().await;
    assert_ne!(a, b);
    store.destroy(&a).await;
    assert!(!store.touch(&a).await);
    assert!(store.touch(&b).await);
}
