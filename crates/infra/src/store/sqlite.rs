//! SQLite-backed user store.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use userbase_core::{Entity, NewUser, User, UserId};

use super::r#trait::{StoreError, StoreResult, UserStore};
use super::sqlx_error::map_sqlx_error;

/// SQLite-backed user store (embedded, file-based).
///
/// `AUTOINCREMENT` keeps ids strictly increasing, so a deleted id is never
/// handed out again.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
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

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
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
impl UserStore for SqliteUserStore {
    fn backend(&self) -> &'static str {
        "sqlite"
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
        let row = sqlx::query("SELECT id, name, birthday FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?
            .ok_or(StoreError::NotFound)?;

        user_from_row(&row)
    }

    #[instrument(skip(self, user))]
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let result = sqlx::query("INSERT INTO users (name, birthday) VALUES (?, ?)")
            .bind(user.name())
            .bind(user.birthday())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        let raw = result.last_insert_rowid();
        let id = UserId::from_raw(raw)
            .ok_or_else(|| StoreError::Unknown(format!("database assigned negative id {raw}")))?;
        Ok(user.into_user(id))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn save(&self, user: &User) -> StoreResult<User> {
        let result = sqlx::query("UPDATE users SET name = ?, birthday = ? WHERE id = ?")
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
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
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
