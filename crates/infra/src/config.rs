//! Configuration loading and representation.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file by the binary before this runs):
//!
//! - `DB_TYPE`: `postgres` or `sqlite` (required)
//! - `DATABASE_URL`: connection string, required for `postgres`
//! - `SQLITE_PATH`: database file for `sqlite` (default `users.db`)
//! - `DB_MAX_CONNECTIONS`: pool size (default 5)
//! - `PORT`: listen port (default 8000)

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SQLITE_PATH: &str = "users.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported database type {0:?}; set DB_TYPE to 'postgres' or 'sqlite'")]
    UnsupportedDatabase(String),

    #[error("DATABASE_URL must be set when DB_TYPE=postgres")]
    MissingDatabaseUrl,

    #[error("invalid PORT {0:?}")]
    InvalidPort(String),

    #[error("invalid DB_MAX_CONNECTIONS {0:?}; expected a positive integer")]
    InvalidMaxConnections(String),
}

/// Which relational backend to open, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    Postgres { url: String, max_connections: u32 },
    Sqlite { path: PathBuf, max_connections: u32 },
}

impl DatabaseConfig {
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Sqlite { .. } => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated like unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidMaxConnections(raw)),
            },
        };

        let database = match get("DB_TYPE").as_deref() {
            Some("postgres") => DatabaseConfig::Postgres {
                url: get("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?,
                max_connections,
            },
            Some("sqlite") => DatabaseConfig::Sqlite {
                path: get("SQLITE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
                max_connections,
            },
            other => {
                return Err(ConfigError::UnsupportedDatabase(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };

        let port = match get("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
        };

        Ok(Self { database, port })
    }

    /// Listen address: all interfaces on the configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
