//! Character sheet operation errors.

use crate::infrastructure::ports::RepoError;
use charsheet_domain::{CharacterId, ValidationError};

/// Errors that can occur during character sheet operations.
#[derive(Debug, thiserror::Error)]
pub enum CharacterSheetError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CharacterSheetError {
    /// Field path of a rejected edit, for form-level error display.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(e) => Some(&e.field),
            _ => None,
        }
    }
}
