//! Error types for the Retouch session layer.

use thiserror::Error;

/// A shared error type for the entire Retouch workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetouchError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Storage medium error (unavailable, I/O failure, lock failure)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The storage medium refused a write because its capacity would be exceeded
    #[error("Storage quota exceeded: {required} bytes required, {capacity} bytes available")]
    QuotaExceeded { required: u64, capacity: u64 },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote collaborator (subject or edit-history fetch) failed
    #[error("Remote error: {0}")]
    Remote(String),

    /// An edit's saved flag was already set
    #[error("Edit {edit_id} is already saved as subject {saved_subject_id}")]
    AlreadySaved { edit_id: i64, saved_subject_id: i64 },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RetouchError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a quota error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RetouchError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for RetouchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RetouchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML parse error: {}", err))
    }
}

/// Collaborator failures arrive as `anyhow::Error`; they are always remote.
impl From<anyhow::Error> for RetouchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Remote(format!("{:#}", err))
    }
}

/// A type alias for `Result<T, RetouchError>`.
pub type Result<T> = std::result::Result<T, RetouchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RetouchError = io.into();
        assert!(matches!(err, RetouchError::Storage(ref msg) if msg.contains("PermissionDenied")));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: RetouchError = json_err.into();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_anyhow_error_maps_to_remote() {
        let err: RetouchError = anyhow::anyhow!("connection reset").into();
        assert_eq!(err, RetouchError::Remote("connection reset".to_string()));
    }

    #[test]
    fn test_quota_message() {
        let err = RetouchError::QuotaExceeded {
            required: 10,
            capacity: 4,
        };
        assert!(err.is_quota_exceeded());
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded: 10 bytes required, 4 bytes available"
        );
    }
}
