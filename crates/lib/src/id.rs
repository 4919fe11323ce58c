//! Identifier type shared by version nodes, locks, and audit records.

use serde::{Deserialize, Serialize};

/// An opaque identifier for a stored object.
///
/// Freshly minted ids are random UUIDs; ids read back from a store are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ID(String);

impl ID {
    /// Creates a new ID from any string-like input.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Mints a fresh random ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ID {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ID {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&String> for ID {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&ID> for ID {
    fn from(id: &ID) -> Self {
        id.clone()
    }
}

impl AsRef<str> for ID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl PartialEq<str> for ID {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ID {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
