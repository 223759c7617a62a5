use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, unique character identifier.
///
/// Stored as a string because records synced from the account service may
/// carry ids minted elsewhere; locally created characters get a UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CharacterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Uuid> for CharacterId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}
