use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use userbase_core::{NewUser, User, UserId};

/// User store operation error.
///
/// A closed set of failure kinds, independent of the database driver. Handlers
/// only distinguish `NotFound` (404) from everything else (500); the other
/// variants exist so logs and tests can tell a constraint failure from an
/// outage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Unknown(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence façade for the `User` entity.
///
/// ## Semantics
///
/// - `find_all` returns every user ordered by id (ascending), empty if none.
/// - `find_by_id` returns `StoreError::NotFound` when no row matches.
/// - `insert` assigns the id and returns the persisted user.
/// - `save` overwrites `name` and `birthday` of an existing row with the
///   values on `user`. Partial merging happens before this call.
///   `NotFound` if the row no longer exists.
/// - `delete` hard-deletes the row; `NotFound` if nothing was deleted.
///
/// Implementations own their connection pool (or in-memory map) and must be
/// safe to share across request tasks.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Backend name used in logs (`postgres`, `sqlite`, `memory`).
    fn backend(&self) -> &'static str;

    async fn find_all(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<User>;

    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    async fn save(&self, user: &User) -> StoreResult<User>;

    async fn delete(&self, id: UserId) -> StoreResult<()>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        (**self).insert(user).await
    }

    async fn save(&self, user: &User) -> StoreResult<User> {
        (**self).save(user).await
    }

    async fn delete(&self, id: UserId) -> StoreResult<()> {
        (**self).delete(id).await
    }
}
