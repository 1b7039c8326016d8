//! Operator sessions and password check.
//!
//! ARCHITECTURE
//! ============
//! Sessions are process memory only: a map from a random hex id to the time
//! the session was last seen. The id travels in a signed cookie; presence in
//! the map is what "authenticated" means. Logout removes the entry, so a
//! replayed cookie stops working immediately.
//!
//! TRADE-OFFS
//! ==========
//! The password check is a plain string comparison, not constant-time. This
//! is a single-operator gateway and the weakness is accepted knowingly.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::RwLock;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex session id.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// `true` iff a password is configured and the submission matches it exactly.
#[must_use]
pub fn check_password(submitted: &str, expected: &str) -> bool {
    !expected.is_empty() && submitted == expected
}

/// In-memory store of authenticated sessions.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Instant>>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Create an authenticated session and return its id.
    /// Expired sessions are pruned on the way.
    pub async fn create(&self) -> String {
        let id = generate_token();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, last_seen| now.duration_since(*last_seen) < self.ttl);
        sessions.insert(id.clone(), now);
        id
    }

    /// Check a session id and refresh its idle timer.
    pub async fn touch(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(last_seen) if now.duration_since(*last_seen) < self.ttl => {
                *last_seen = now;
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    /// Destroy a session. Unknown ids are ignored.
    pub async fn destroy(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
