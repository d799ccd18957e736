//! User persistence: the `UserStore` trait and its backends.

mod r#trait;
mod sqlx_error;

pub mod in_memory;
pub mod postgres;
pub mod sqlite;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use r#trait::{StoreError, StoreResult, UserStore};
pub use sqlite::SqliteUserStore;
