//! Audit entry data structures
//!
//! Defines what gets recorded for each engine operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backup::SnapshotId;

/// Engine operations that are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A snapshot was captured
    Backup,
    /// A snapshot was copied back onto the save folder
    Restore,
    /// A snapshot was deleted on request
    Delete,
    /// Old snapshots were pruned by the retention policy
    Cleanup,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Backup => write!(f, "BACKUP"),
            Operation::Restore => write!(f, "RESTORE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Cleanup => write!(f, "CLEANUP"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation finished (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Game identifier, when the engine was built from a profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,

    /// Snapshot the operation was about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotId>,

    pub success: bool,

    /// Human-readable summary or error message
    pub details: String,
}

impl AuditEntry {
    /// Entry for an operation that completed
    pub fn success(
        operation: Operation,
        game: Option<String>,
        snapshot: Option<SnapshotId>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            game,
            snapshot,
            success: true,
            details: details.into(),
        }
    }

    /// Entry for an operation that failed
    pub fn failure(
        operation: Operation,
        game: Option<String>,
        snapshot: Option<SnapshotId>,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            game,
            snapshot,
            success: false,
            details: error.to_string(),
        }
    }

    /// One-line rendering for terminal output
    pub fn format_human_readable(&self) -> String {
        let mut line = format!(
            "{} {:<7} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation.to_string(),
            if self.success { "ok  " } else { "FAIL" }
        );
        if let Some(game) = &self.game {
            line.push_str(&format!(" [{}]", game));
        }
        if let Some(snapshot) = &self.snapshot {
            line.push_str(&format!(" {}", snapshot));
        }
        if !self.details.is_empty() {
            line.push_str(&format!(": {}", self.details));
        }
        line
    }
}
