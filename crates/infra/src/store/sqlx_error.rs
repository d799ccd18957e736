//! Mapping from `sqlx::Error` to `StoreError`.
//!
//! | SQLx error | StoreError |
//! |------------|------------|
//! | `RowNotFound` | `NotFound` |
//! | `Database` (unique / foreign key / not null / check violation) | `Constraint` |
//! | `Database` (other) | `Unknown` |
//! | `PoolTimedOut`, `PoolClosed`, `Io`, `Tls`, `Protocol`, `WorkerCrashed` | `Unavailable` |
//! | anything else | `Unknown` |

use sqlx::error::ErrorKind;

use super::r#trait::StoreError;

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::Constraint(msg),
                _ => StoreError::Unknown(msg),
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_) => {
            StoreError::Unavailable(format!("{} failed: {}", operation, err))
        }
        _ => StoreError::Unknown(format!("sqlx error in {}: {}", operation, err)),
    }
}
