//! # Error Types
//!
//! Structured error types for kredi_core. The loan calculator itself never
//! fails (degenerate inputs give zero-valued quotes), so these errors come
//! from input validation, catalog bookkeeping and catalog file I/O.
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::errors::{KrediError, KrediResult};
//!
//! fn validate_term(term_months: u32) -> KrediResult<()> {
//!     if term_months == 0 {
//!         return Err(KrediError::InvalidInput {
//!             field: "term_months".to_string(),
//!             value: term_months.to_string(),
//!             reason: "Term must be at least one month".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_term(0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for kredi_core operations
pub type KrediResult<T> = Result<T, KrediError>;

/// Structured error type for kredi operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum KrediError {
    /// An input value is invalid (non-numeric, out of range, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing or blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A referenced catalog record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A catalog record cannot be removed while other records point at it
    #[error("{entity} {id} is still in use - {reason}")]
    InUse {
        entity: String,
        id: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Catalog schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl KrediError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        KrediError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        KrediError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        KrediError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create an InUse error
    pub fn in_use(entity: impl Into<String>, id: impl ToString, reason: impl Into<String>) -> Self {
        KrediError::InUse {
            entity: entity.into(),
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        KrediError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        KrediError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, KrediError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            KrediError::InvalidInput { .. } => "INVALID_INPUT",
            KrediError::MissingField { .. } => "MISSING_FIELD",
            KrediError::NotFound { .. } => "NOT_FOUND",
            KrediError::InUse { .. } => "IN_USE",
            KrediError::FileError { .. } => "FILE_ERROR",
            KrediError::FileLocked { .. } => "FILE_LOCKED",
            KrediError::SerializationError { .. } => "SERIALIZATION_ERROR",
            KrediError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for KrediError {
    fn from(e: serde_json::Error) -> Self {
        KrediError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = KrediError::invalid_input("amount", "-5", "Amount must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: KrediError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(KrediError::missing_field("name").error_code(), "MISSING_FIELD");
        assert_eq!(KrediError::not_found("Bank", "abc").error_code(), "NOT_FOUND");
        assert_eq!(KrediError::in_use("Bank", "abc", "2 products").error_code(), "IN_USE");
    }

    #[test]
    fn test_only_lock_errors_are_recoverable() {
        assert!(KrediError::file_locked("catalog.krd", "ayse", "now").is_recoverable());
        assert!(!KrediError::missing_field("name").is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        let err = KrediError::not_found("Bank", "42");
        assert_eq!(err.to_string(), "Bank not found: 42");
    }
}
