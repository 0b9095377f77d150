use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use labwatch_core::UserId;
use rand::Rng;

/// Name of the session cookie issued on login.
pub const SESSION_COOKIE: &str = "labwatch_session";

/// A logged-in console user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub username: Box<str>,
    pub created_at: jiff::Timestamp,
}

/// Shared in-process table of active sessions, keyed by opaque token.
///
/// Sessions live for the lifetime of the process; a restart logs
/// everyone out.
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    sessions: HashMap<Box<str>, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: HashMap::new(),
            })),
        }
    }

    /// Create a session for the user and return its token.
    pub async fn create(&self, user_id: UserId, username: &str) -> Box<str> {
        let token = generate_token();
        let session = Session {
            user_id,
            username: username.into(),
            created_at: jiff::Timestamp::now(),
        };

        let mut inner = self.inner.lock().await;
        inner.sessions.insert(token.clone(), session);

        token
    }

    /// Look up the session behind a token.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let inner = self.inner.lock().await;
        inner.sessions.get(token).cloned()
    }

    /// Drop a session. Returns whether the token was known.
    pub async fn revoke(&self, token: &str) -> bool {
        let mut inner = self.inner.lock().await;
        inner.sessions.remove(token).is_some()
    }

    /// Number of active sessions.
    pub async fn active_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// 32 hex characters of randomness from the thread-local generator.
fn generate_token() -> Box<str> {
    let raw: u128 = rand::rng().random();
    format!("{raw:032x}").into_boxed_str()
}
