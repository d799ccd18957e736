//! The `User` entity and the inputs that create or modify it.

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// A persisted user.
///
/// Only the store constructs these (on insert or when reading rows back), so
/// an existing `User` always has a store-assigned id and non-empty fields
/// unless the underlying table was edited out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    birthday: String,
}

impl User {
    /// Rehydrate a user from stored columns.
    pub fn from_parts(id: UserId, name: impl Into<String>, birthday: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            birthday: birthday.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birthday(&self) -> &str {
        &self.birthday
    }

    /// Overlay the non-empty fields of `patch` onto this user.
    ///
    /// Absent and empty fields leave the current value untouched, so applying
    /// the same patch twice is the same as applying it once.
    pub fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name.filter(|v| !v.is_empty()) {
            self.name = name;
        }
        if let Some(birthday) = patch.birthday.filter(|v| !v.is_empty()) {
            self.birthday = birthday;
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// A user that has not been persisted yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    birthday: String,
}

impl NewUser {
    /// Both fields are required and must be non-empty.
    pub fn new(name: impl Into<String>, birthday: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let birthday = birthday.into();
        if name.is_empty() || birthday.is_empty() {
            return Err(DomainError::validation("name and birthday are required"));
        }
        Ok(Self { name, birthday })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birthday(&self) -> &str {
        &self.birthday
    }

    /// Attach the id the store assigned on insert.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            birthday: self.birthday,
        }
    }
}

/// Partial update of a user's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub birthday: Option<String>,
}
