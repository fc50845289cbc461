//! Stable traveler identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a user id is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user id must not be blank")]
pub struct InvalidUserId;

/// External identity of a traveler, issued by the identity provider.
///
/// Opaque to this crate apart from being non-blank. It is the primary key
/// of the remote record and the basis of self-exclusion during ranking.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidUserId> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(InvalidUserId);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}
