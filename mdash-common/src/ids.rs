//! Identifier types and UUID utilities
//!
//! Backend ids are opaque strings. Newly minted ids are UUIDv4 strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Identifier of an attendance submission
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random id
    pub fn generate() -> Self {
        Self(generate().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Stable identity of a person named in a submission
///
/// Two attendees are the same person exactly when their ids are equal;
/// display names are never compared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeId(String);

impl AttendeeId {
    /// Prefix of ids derived from a bare display name
    pub const NAME_PREFIX: &'static str = "name:";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id for a legacy record that only carries a display name
    pub fn from_name(name: &str) -> Self {
        Self(format!("{}{}", Self::NAME_PREFIX, name.trim()))
    }

    /// True if this id was derived from a display name rather than issued
    /// by the membership directory
    pub fn is_name_derived(&self) -> bool {
        self.0.starts_with(Self::NAME_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttendeeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
