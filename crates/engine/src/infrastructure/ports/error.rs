//! Error types for port operations.

/// Store and catalog errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Filesystem operation failed - includes operation name for tracing.
    #[error("I/O error in {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The account sync service failed. `status` is absent when the
    /// request never got a response.
    #[error("Remote error{}: {message}", status_suffix(.status))]
    Remote {
        status: Option<u16>,
        message: String,
    },
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn io(operation: &'static str, message: impl ToString) -> Self {
        Self::Io {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn remote(status: Option<u16>, message: impl ToString) -> Self {
        Self::Remote {
            status,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_entity_and_id() {
        let err = RepoError::not_found("Character", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Character not found: abc");
    }

    #[test]
    fn io_error_names_operation() {
        let err = RepoError::io("save", "disk full");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "I/O error in save: disk full");
    }

    #[test]
    fn remote_error_shows_status_when_present() {
        assert_eq!(
            RepoError::remote(Some(500), "boom").to_string(),
            "Remote error (500): boom"
        );
        assert_eq!(
            RepoError::remote(None, "connection refused").to_string(),
            "Remote error: connection refused"
        );
    }
}
