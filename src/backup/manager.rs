//! Backup manager for SaveStash
//!
//! Creates snapshots of a save folder, lists them, deletes them, and
//! enforces the keep-N-most-recent retention policy. One manager serves one
//! backup root; callers must not run two operations against the same root
//! at once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use uuid::Uuid;

use super::confirm::{Confirm, ConfirmRequest};
use super::metadata::{self, SnapshotKind, SnapshotMetadata};
use super::naming::SnapshotId;
use super::scan::{self, Snapshot};
use crate::audit::{AuditEntry, AuditLogger, Operation};
use crate::config::ResolvedProfile;
use crate::error::{SaveStashError, SaveStashResult};
use crate::storage::tree::{self, CancelToken, CopyOptions, CopyStats, ProgressHook};

const STAGING_PREFIX: &str = ".staging-";

/// How a snapshot should be captured
#[derive(Debug, Clone, Default)]
pub struct BackupOptions {
    /// Stored in the description sidecar
    pub description: Option<String>,
    pub kind: SnapshotKind,
    /// Checked between files; cancelling fails the backup and removes the partial copy
    pub cancel: Option<CancelToken>,
    /// Told about every file copied into the snapshot
    pub progress: Option<ProgressHook>,
}

impl BackupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Options for the safety snapshot taken before restoring `restoring`
    pub fn pre_restore(restoring: &SnapshotId) -> Self {
        Self {
            description: Some(format!(
                "Pre-restore safety backup (before restoring {})",
                restoring
            )),
            kind: SnapshotKind::PreRestore,
            cancel: None,
            progress: None,
        }
    }
}

/// A snapshot that cleanup could not delete
#[derive(Debug)]
pub struct CleanupFailure {
    pub snapshot: SnapshotId,
    pub error: SaveStashError,
}

/// Outcome of a retention cleanup
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Snapshots left in place, most recent first
    pub kept: Vec<SnapshotId>,
    pub deleted: Vec<SnapshotId>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// True when every snapshot selected for deletion was deleted
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of comparing a snapshot with its recorded checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStatus {
    Intact,
    Modified,
    /// The snapshot has no metadata to compare against
    Unverifiable,
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub snapshot: SnapshotId,
    pub status: VerifyStatus,
    pub expected: Option<String>,
    pub actual: String,
}

/// Manages snapshot creation, listing and retention for one backup root
#[derive(Debug, Clone)]
pub struct BackupManager {
    /// Live save directory
    source_dir: PathBuf,
    /// Directory holding this game's snapshots
    backup_root: PathBuf,
    /// Game identifier recorded in the audit history
    game: Option<String>,
    audit: Option<AuditLogger>,
}

impl BackupManager {
    /// Create a manager for an explicit source and backup root
    pub fn new(source_dir: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            backup_root: backup_root.into(),
            game: None,
            audit: None,
        }
    }

    /// Create a manager for a resolved game profile
    pub fn for_profile(profile: &ResolvedProfile) -> Self {
        let mut manager = Self::new(&profile.source_dir, &profile.backup_root);
        manager.game = Some(profile.id.clone());
        manager
    }

    /// Record operations in an audit history
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Capture the save folder as a new snapshot
    pub fn create_backup(&self, options: BackupOptions) -> SaveStashResult<Snapshot> {
        self.create_backup_at(options, Local::now().naive_local())
    }

    /// Capture the save folder, naming the snapshot after `captured_at`
    pub fn create_backup_at(
        &self,
        options: BackupOptions,
        captured_at: NaiveDateTime,
    ) -> SaveStashResult<Snapshot> {
        if !self.source_dir.is_dir() {
            return Err(SaveStashError::SourceNotFound(self.source_dir.clone()));
        }
        if self.backup_root == self.source_dir {
            return Err(SaveStashError::Validation(
                "Backup directory cannot be the save directory itself".into(),
            ));
        }

        let id = SnapshotId::next_free(captured_at, &self.backup_root);
        let fail = |source: io::Error| SaveStashError::BackupFailed {
            snapshot: id.to_string(),
            source,
        };

        fs::create_dir_all(&self.backup_root).map_err(fail)?;
        self.remove_stale_staging();

        let staging = self.backup_root.join(format!(
            "{}{}-{}",
            STAGING_PREFIX,
            id,
            Uuid::new_v4().simple()
        ));
        fs::create_dir(&staging).map_err(fail)?;

        let final_path = self.backup_root.join(id.to_string());
        let result = self
            .fill_staging(&staging, &id, &options)
            .and_then(|stats| fs::rename(&staging, &final_path).map(|_| stats));

        let stats = match result {
            Ok(stats) => stats,
            Err(e) => {
                if let Err(cleanup_err) = tree::remove_tree(&staging) {
                    warn!(
                        "Could not remove partial backup {}: {}",
                        staging.display(),
                        cleanup_err
                    );
                }
                let err = fail(e);
                self.record(AuditEntry::failure(
                    Operation::Backup,
                    self.game.clone(),
                    Some(id),
                    &err,
                ));
                return Err(err);
            }
        };

        info!(
            "Created {} ({} files, {} bytes) from {}",
            id,
            stats.files,
            stats.bytes,
            self.source_dir.display()
        );
        self.record(AuditEntry::success(
            Operation::Backup,
            self.game.clone(),
            Some(id),
            format!("{} files, {} bytes ({})", stats.files, stats.bytes, options.kind),
        ));

        Snapshot::from_dir(&final_path).ok_or_else(|| SaveStashError::BackupFailed {
            snapshot: id.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "snapshot vanished after creation"),
        })
    }

    /// Remove staging directories left by a process that died mid-backup
    ///
    /// Only one writer uses a backup root at a time, so any staging directory
    /// found before a backup starts is abandoned.
    fn remove_stale_staging(&self) {
        let entries = match fs::read_dir(&self.backup_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not scan {}: {}", self.backup_root.display(), e);
                return;
            }
        };

        for entry in entries.flatten() {
            let is_staging = entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX);
            if !is_staging || !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }

            let path = entry.path();
            match tree::remove_tree(&path) {
                Ok(()) => info!("Removed abandoned partial backup {}", path.display()),
                Err(e) => warn!("Could not remove partial backup {}: {}", path.display(), e),
            }
        }
        debug!("Staging sweep of {} done", self.backup_root.display());
    }

    /// Copy the source and write the sidecars into the staging directory
    fn fill_staging(
        &self,
        staging: &Path,
        id: &SnapshotId,
        options: &BackupOptions,
    ) -> io::Result<CopyStats> {
        // A backup root nested inside the save folder must not copy itself
        let skip: Vec<PathBuf> = if self.backup_root.starts_with(&self.source_dir) {
            vec![self.backup_root.clone()]
        } else {
            Vec::new()
        };

        let stats = tree::copy_tree(
            &self.source_dir,
            staging,
            &CopyOptions {
                skip: &skip,
                cancel: options.cancel.as_ref(),
                progress: options.progress.as_ref(),
            },
        )?;

        let checksum = scan::content_checksum(staging, &[])?;

        if let Some(description) = &options.description {
            metadata::write_description(staging, description)?;
        }

        metadata::write_metadata(
            staging,
            &SnapshotMetadata {
                snapshot_id: *id,
                created_at: Local::now(),
                source: self.source_dir.clone(),
                kind: options.kind,
                description: options
                    .description
                    .as_ref()
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                file_count: stats.files,
                total_size: stats.bytes,
                checksum,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        )?;

        Ok(stats)
    }

    /// List all complete snapshots, most recent first
    pub fn list_backups(&self) -> SaveStashResult<Vec<Snapshot>> {
        scan::list_backups(&self.backup_root)
    }

    /// Get a specific snapshot by id
    pub fn get_backup(&self, id: &SnapshotId) -> SaveStashResult<Snapshot> {
        Snapshot::from_dir(&self.backup_root.join(id.to_string()))
            .ok_or_else(|| SaveStashError::SnapshotNotFound(id.to_string()))
    }

    /// Get the most recent snapshot
    pub fn get_latest_backup(&self) -> SaveStashResult<Option<Snapshot>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Find a snapshot by id, by 1-based position in the listing, or `latest`
    pub fn find_backup(&self, selector: &str) -> SaveStashResult<Snapshot> {
        let selector = selector.trim();
        let not_found = || SaveStashError::SnapshotNotFound(selector.to_string());

        if selector.eq_ignore_ascii_case("latest") {
            return self.get_latest_backup()?.ok_or_else(not_found);
        }

        if let Ok(position) = selector.parse::<usize>() {
            let snapshots = self.list_backups()?;
            return position
                .checked_sub(1)
                .and_then(|index| snapshots.into_iter().nth(index))
                .ok_or_else(not_found);
        }

        let id: SnapshotId = selector.parse().map_err(|_| not_found())?;
        self.get_backup(&id)
    }

    /// Delete one snapshot after the caller confirms
    pub fn delete_snapshot(&self, id: &SnapshotId, confirm: &dyn Confirm) -> SaveStashResult<()> {
        let snapshot = self.get_backup(id)?;

        let request = ConfirmRequest::Delete { snapshot: *id };
        if !confirm.confirm(&request) {
            return Err(SaveStashError::Declined(request.action().into()));
        }

        match self.remove_snapshot(&snapshot) {
            Ok(()) => {
                self.record(AuditEntry::success(
                    Operation::Delete,
                    self.game.clone(),
                    Some(*id),
                    "deleted",
                ));
                Ok(())
            }
            Err(e) => {
                self.record(AuditEntry::failure(
                    Operation::Delete,
                    self.game.clone(),
                    Some(*id),
                    &e,
                ));
                Err(e)
            }
        }
    }

    /// Remove a snapshot directory, clearing write protection first
    fn remove_snapshot(&self, snapshot: &Snapshot) -> SaveStashResult<()> {
        tree::remove_tree(&snapshot.path).map_err(|source| SaveStashError::DeletionFailed {
            snapshot: snapshot.id.to_string(),
            source,
        })?;
        info!("Deleted {}", snapshot.id);
        Ok(())
    }

    /// Keep the `keep_count` most recent snapshots and delete the rest
    ///
    /// A snapshot that cannot be deleted is reported in the result and does
    /// not stop the others from being deleted.
    pub fn cleanup(&self, keep_count: usize, confirm: &dyn Confirm) -> SaveStashResult<CleanupReport> {
        let mut snapshots = self.list_backups()?;
        let to_delete = snapshots.split_off(keep_count.min(snapshots.len()));

        let mut report = CleanupReport {
            kept: snapshots.iter().map(|s| s.id).collect(),
            ..CleanupReport::default()
        };

        if to_delete.is_empty() {
            return Ok(report);
        }

        let request = ConfirmRequest::Cleanup {
            keep: keep_count,
            delete: to_delete.iter().map(|s| s.id).collect(),
        };
        if !confirm.confirm(&request) {
            return Err(SaveStashError::Declined(request.action().into()));
        }

        for snapshot in to_delete {
            match self.remove_snapshot(&snapshot) {
                Ok(()) => report.deleted.push(snapshot.id),
                Err(error) => {
                    warn!("Cleanup could not delete {}: {}", snapshot.id, error);
                    report.failed.push(CleanupFailure {
                        snapshot: snapshot.id,
                        error,
                    });
                }
            }
        }

        let details = format!(
            "kept {}, deleted {}, failed {}",
            report.kept.len(),
            report.deleted.len(),
            report.failed.len()
        );
        info!("Cleanup of {}: {}", self.backup_root.display(), details);
        let entry = if report.is_complete() {
            AuditEntry::success(Operation::Cleanup, self.game.clone(), None, details)
        } else {
            AuditEntry::failure(Operation::Cleanup, self.game.clone(), None, details)
        };
        self.record(entry);

        Ok(report)
    }

    /// Recompute a snapshot's checksum and compare it with its metadata
    pub fn verify_snapshot(&self, id: &SnapshotId) -> SaveStashResult<VerifyReport> {
        let snapshot = self.get_backup(id)?;
        let expected = snapshot.metadata()?.map(|m| m.checksum);

        let actual = scan::content_checksum(&snapshot.path, &metadata::sidecar_paths(&snapshot.path))
            .map_err(|e| {
                SaveStashError::Io(format!("Failed to read snapshot {}: {}", id, e))
            })?;

        let status = match &expected {
            None => VerifyStatus::Unverifiable,
            Some(expected) if *expected == actual => VerifyStatus::Intact,
            Some(_) => VerifyStatus::Modified,
        };

        Ok(VerifyReport {
            snapshot: *id,
            status,
            expected,
            actual,
        })
    }

    /// Append to the audit history; a failing history never fails the operation
    pub(crate) fn record(&self, entry: AuditEntry) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log(&entry) {
                warn!("Could not write audit history: {}", e);
            }
        }
    }

    pub(crate) fn game(&self) -> Option<&str> {
        self.game.as_deref()
    }
}
