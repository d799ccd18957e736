//! `userbase-core` — the `User` entity and its identifiers.
//!
//! This crate contains **pure domain** types (no storage or HTTP concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod user;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use user::{NewUser, User, UserPatch};
