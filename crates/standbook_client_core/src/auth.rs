//! Session handling against the backend login endpoint.

use crate::error::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

/// Shared holder for the current session. Clones see the same session.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().ok().and_then(|s| s.clone())
    }

    pub fn set(&self, session: Session) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(session);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }

    pub(crate) fn bearer_token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError>;
    fn logout(&self);
    fn current_session(&self) -> Option<Session>;
}
