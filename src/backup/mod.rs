//! Backup system for SaveStash
//!
//! Snapshots a game's save folder into timestamped directories, restores
//! them, and prunes old ones under a keep-N-most-recent retention policy.
//!
//! # Architecture
//!
//! - `BackupManager`: creates, lists, deletes, verifies and prunes snapshots
//! - `RestoreManager`: copies a snapshot back after a safety capture
//! - `Confirm`: caller-supplied approval for destructive operations
//!
//! # Backup Format
//!
//! Each snapshot is a plain directory `<backup root>/backup_YYYYMMDD_HHMMSS`
//! (with a `_001`, `_002`, ... suffix when several are taken in the same second) that
//! mirrors the save folder. Two sidecar files sit next to the copied data:
//! - `.backup_description`: the optional user description
//! - `.backup_meta.json`: kind, file count, size and content checksum
//!
//! Snapshots are built in a hidden staging directory and renamed into
//! place, so listing never sees a partial copy. Staging directories left
//! by a killed process are removed when the next backup starts.
//!
//! # Example
//!
//! ```rust,ignore
//! use savestash::backup::{AssumeYes, BackupManager, BackupOptions, RestoreManager};
//!
//! let manager = BackupManager::new("/games/foo/saves", "/backups/foo");
//! let snapshot = manager.create_backup(BackupOptions::new().with_description("before boss"))?;
//! RestoreManager::new(&manager).restore_backup(&snapshot.id, &AssumeYes)?;
//! manager.cleanup(10, &AssumeYes)?;
//! ```

pub mod confirm;
pub mod manager;
pub mod metadata;
pub mod naming;
pub mod restore;
pub mod scan;

pub use confirm::{AssumeNo, AssumeYes, Confirm, ConfirmRequest};
pub use manager::{
    BackupManager, BackupOptions, CleanupFailure, CleanupReport, VerifyReport, VerifyStatus,
};
pub use metadata::{SnapshotKind, SnapshotMetadata};
pub use naming::{ParseSnapshotIdError, SnapshotId};
pub use restore::{RestoreManager, RestoreResult};
pub use scan::{compute_size, content_checksum, inventory, list_backups, FileEntry, Snapshot};

pub use crate::storage::{CancelToken, ProgressHook};
