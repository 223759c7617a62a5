//! Unified error types for the domain layer
//!
//! The rules engine itself never fails: derived statistics degrade to zero
//! for unknown classes instead of raising. The only failure a caller sees
//! from this crate is a rejected edit ([`ValidationError`]) or a malformed
//! value object (dice formulas, identifiers).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value_objects::DiceParseError;

/// A rejected edit to a character record.
///
/// Carries the dotted field path the form layer used (e.g. `combat.currentHP`)
/// and a human-readable reason, so the caller can surface it next to the input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Value is outside the accepted inclusive range.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: Option<i64>) -> Self {
        let reason = match max {
            Some(max) => format!("must be between {} and {}", min, max),
            None => format!("must be at least {}", min),
        };
        Self::new(field, reason)
    }

    /// Value has the wrong JSON type for the field.
    pub fn wrong_type(field: impl Into<String>, expected: &str) -> Self {
        Self::new(field, format!("must be {}", expected))
    }
}

/// Malformed value objects: identifiers and dice formulas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
