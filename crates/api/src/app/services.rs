use std::sync::Arc;

use userbase_infra::config::DatabaseConfig;
use userbase_infra::store::{InMemoryUserStore, UserStore};

/// Dependencies shared by every handler.
///
/// Constructed once at startup and installed as an axum `Extension`; tests
/// build their own instance over an isolated store.
#[derive(Clone)]
pub struct AppServices {
    users: Arc<dyn UserStore>,
}

impl AppServices {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Services over a fresh in-memory store (tests/dev).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()))
    }

    /// Connect to the configured database and apply the schema.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let users = userbase_infra::db::connect(config).await?;
        Ok(Self::new(users))
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }
}
