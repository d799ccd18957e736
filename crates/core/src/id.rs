//! Strongly-typed user identifier.

use core::str::FromStr;

use crate::error::DomainError;

/// Identifier of a persisted user.
///
/// Assigned by the store on insert and never changed afterwards. Both backing
/// databases key on a signed 64-bit column, so the admissible range is
/// `0..=i64::MAX`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw key read back from storage.
    ///
    /// Returns `None` for negative values, which no store ever assigns.
    pub fn from_raw(raw: i64) -> Option<Self> {
        (raw >= 0).then_some(Self(raw))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    /// Parse a path segment. Only plain non-negative base-10 integers are
    /// accepted; a leading `+`, a sign, whitespace or overflow are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!("UserId: {s:?} is not a non-negative integer")));
        }
        let raw = s
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("UserId: {e}")))?;
        Ok(Self(raw))
    }
}
