//! Postgres-backed user store.
//!
//! Table layout (created by [`PostgresUserStore::migrate`]):
//!
//! | column | type |
//! |--------|------|
//! | `id` | `BIGSERIAL PRIMARY KEY` |
//! | `name` | `TEXT NOT NULL` |
//! | `birthday` | `TEXT NOT NULL` |

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use userbase_core::{Entity, NewUser, User, UserId};

use super::r#trait::{StoreError, StoreResult, UserStore};
use super::sqlx_error::map_sqlx_error;

/// Postgres-backed user store.
///
/// Uses the SQLx connection pool, which is already `Send + Sync` and cheap to
/// clone; every statement checks out its own connection.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id       BIGSERIAL PRIMARY KEY,
                name     TEXT NOT NULL,
                birthday TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let raw: i64 = row.try_get("id").map_err(|e| map_sqlx_error("decode_user", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("decode_user", e))?;
    let birthday: String = row
        .try_get("birthday")
        .map_err(|e| map_sqlx_error("decode_user", e))?;
    let id = UserId::from_raw(raw)
        .ok_or_else(|| StoreError::Unknown(format!("negative user id {raw} in users table")))?;
    Ok(User::from_parts(id, name, birthday))
}

#[async_trait]
impl UserStore for PostgresUserStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, name, birthday FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        let row = sqlx::query("SELECT id, name, birthday FROM users WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?
            .ok_or(StoreError::NotFound)?;

        user_from_row(&row)
    }

    #[instrument(skip(self, user))]
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query("INSERT INTO users (name, birthday) VALUES ($1, $2) RETURNING id")
            .bind(user.name())
            .bind(user.birthday())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        let raw: i64 = row.try_get("id").map_err(|e| map_sqlx_error("insert", e))?;
        let id = UserId::from_raw(raw)
            .ok_or_else(|| StoreError::Unknown(format!("database assigned negative id {raw}")))?;
        Ok(user.into_user(id))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn save(&self, user: &User) -> StoreResult<User> {
        let result = sqlx::query("UPDATE users SET name = $1, birthday = $2 WHERE id = $3")
            .bind(user.name())
            .bind(user.birthday())
            .bind(user.id().as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("save", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(user.clone())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
