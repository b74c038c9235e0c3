//! Confirmation requested from the caller before destructive operations
//!
//! The engine never prompts. Restore, delete and cleanup describe what
//! they are about to do in a [`ConfirmRequest`] and ask the caller's
//! [`Confirm`] implementation. Front ends that already asked through their
//! own dialog pass [`AssumeYes`].

use std::fmt;
use std::path::PathBuf;

use super::naming::SnapshotId;

/// A destructive operation waiting for approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// Overwrite `target` with the content of `snapshot`
    Restore {
        snapshot: SnapshotId,
        target: PathBuf,
    },
    /// Remove one snapshot
    Delete { snapshot: SnapshotId },
    /// Remove every snapshot in `delete`, keeping the newest `keep`
    Cleanup {
        keep: usize,
        delete: Vec<SnapshotId>,
    },
}

impl ConfirmRequest {
    /// Short name of the operation, used in `Declined` errors
    pub fn action(&self) -> &'static str {
        match self {
            ConfirmRequest::Restore { .. } => "restore",
            ConfirmRequest::Delete { .. } => "delete",
            ConfirmRequest::Cleanup { .. } => "cleanup",
        }
    }
}

impl fmt::Display for ConfirmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmRequest::Restore { snapshot, target } => write!(
                f,
                "Restore '{}' over {}? Current saves will be replaced.",
                snapshot,
                target.display()
            ),
            ConfirmRequest::Delete { snapshot } => write!(f, "Delete '{}'?", snapshot),
            ConfirmRequest::Cleanup { keep, delete } => write!(
                f,
                "Delete {} old backup(s), keeping the {} most recent?",
                delete.len(),
                keep
            ),
        }
    }
}

/// Decides whether a destructive operation may proceed
pub trait Confirm {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Approves everything; for callers that have already confirmed
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Declines everything; useful for dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        false
    }
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmRequest) -> bool,
{
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}
