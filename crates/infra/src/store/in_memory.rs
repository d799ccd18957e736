use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use userbase_core::{Entity, NewUser, User, UserId};

use super::r#trait::{StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

/// In-memory user store.
///
/// Intended for tests/dev. Ids start at 1 and are never reused, matching the
/// auto-increment behaviour of the SQL stores.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        inner.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let next = inner
            .last_id
            .checked_add(1)
            .and_then(UserId::from_raw)
            .ok_or_else(|| StoreError::Constraint("id space exhausted".to_string()))?;
        inner.last_id = next.as_i64();

        let user = user.into_user(next);
        inner.users.insert(next, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> StoreResult<User> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let slot = inner.users.get_mut(&user.id()).ok_or(StoreError::NotFound)?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.users.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
