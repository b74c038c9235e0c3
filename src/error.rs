//! Custom error types for SaveStash
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Engine failures carry the underlying OS
//! error as their source so front ends can print a precise message.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for SaveStash operations
#[derive(Error, Debug)]
pub enum SaveStashError {
    /// A path string could not be expanded
    #[error("Invalid path '{input}': {reason}")]
    InvalidPath { input: String, reason: String },

    /// The directory to back up does not exist or is not a directory
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The requested snapshot is missing or incomplete
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// Copying a new snapshot failed; the partial copy has been removed
    #[error("Backup {snapshot} failed: {source}")]
    BackupFailed {
        snapshot: String,
        #[source]
        source: std::io::Error,
    },

    /// Copying a snapshot back onto the save directory failed
    #[error("Restore of {snapshot} failed: {source}{}", safety_hint(.safety_snapshot))]
    RestoreFailed {
        snapshot: String,
        safety_snapshot: Option<String>,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be removed even after clearing write protection
    #[error("Failed to delete snapshot {snapshot}: {source}")]
    DeletionFailed {
        snapshot: String,
        #[source]
        source: std::io::Error,
    },

    /// The caller declined a destructive operation
    #[error("Operation declined: {0}")]
    Declined(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },
}

fn safety_hint(safety_snapshot: &Option<String>) -> String {
    match safety_snapshot {
        Some(id) => format!(" (previous save data kept in {})", id),
        None => String::new(),
    }
}

impl SaveStashError {
    /// Create a "not found" error for game profiles
    pub fn game_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Game",
            identifier: identifier.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::SnapshotNotFound(_) | Self::SourceNotFound(_)
        )
    }

    /// Check if the caller declined the operation
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SaveStashError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SaveStashError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for SaveStash operations
pub type SaveStashResult<T> = Result<T, SaveStashError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = SaveStashError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = SaveStashError::game_not_found("skyrim");
        assert_eq!(err.to_string(), "Game not found: skyrim");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_backup_failed_keeps_cause() {
        let err = SaveStashError::BackupFailed {
            snapshot: "backup_20250101_120000".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Backup backup_20250101_120000 failed: denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_restore_failed_mentions_safety_snapshot() {
        let err = SaveStashError::RestoreFailed {
            snapshot: "backup_20250101_120000".into(),
            safety_snapshot: Some("backup_20250102_080000".into()),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let message = err.to_string();
        assert!(message.contains("disk full"));
        assert!(message.contains("backup_20250102_080000"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SaveStashError = io_err.into();
        assert!(matches!(err, SaveStashError::Io(_)));
    }
}
