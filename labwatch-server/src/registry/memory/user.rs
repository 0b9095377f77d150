use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use labwatch_core::{User, UserId};

use super::InMemoryError;
use crate::registry::UserStore;

/// In-memory user accounts.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    type Error = InMemoryError;

    async fn add(&self, user: User) -> Result<(), Self::Error> {
        let mut map = self.users.lock()?;

        if map.values().any(|u| u.username == user.username) {
            return Err(InMemoryError::UsernameTaken(user.username));
        }
        map.insert(user.id, user);

        Ok(())
    }

    async fn users(&self) -> Result<Vec<User>, Self::Error> {
        let map = self.users.lock()?;

        let mut all: Vec<User> = map.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.0.cmp(&b.id.0)));

        Ok(all)
    }

    async fn remove(&self, id: UserId) -> Result<bool, Self::Error> {
        let mut map = self.users.lock()?;

        Ok(map.remove(&id).is_some())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Self::Error> {
        let map = self.users.lock()?;

        Ok(map.values().find(|u| &*u.username == username).cloned())
    }
}
