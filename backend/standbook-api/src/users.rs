//! Users allowed to log in. Passwords are kept as bcrypt hashes only.

use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    password_hash: String,
}

#[derive(Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user or replace the password of an existing one. Returns the user id.
    pub async fn upsert(&self, username: &str, password: &str, cost: u32) -> anyhow::Result<Uuid> {
        let password_hash = bcrypt::hash(password, cost)?;
        let mut users = self.users.write().await;
        let id = users.get(username).map(|u| u.id).unwrap_or_else(Uuid::new_v4);
        users.insert(
            username.to_string(),
            UserRecord {
                id,
                username: username.to_string(),
                password_hash,
            },
        );
        Ok(id)
    }

    pub async fn verify(&self, username: &str, password: &str) -> Option<UserRecord> {
        let user = self.users.read().await.get(username).cloned()?;
        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => Some(user),
            Ok(false) => None,
            Err(e) => {
                tracing::error!("Password hash check failed for {}: {:?}", username, e);
                None
            }
        }
    }
}
