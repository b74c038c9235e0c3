//! Snapshot restoration for SaveStash
//!
//! Restoring replaces the live save folder with a snapshot's content. The
//! current save data is captured first as a pre-restore snapshot, so a
//! restore that fails halfway never loses anything: the previous state stays
//! listable and can be restored in turn.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use super::confirm::{Confirm, ConfirmRequest};
use super::manager::{BackupManager, BackupOptions};
use super::metadata;
use super::naming::SnapshotId;
use super::scan::Snapshot;
use crate::audit::{AuditEntry, Operation};
use crate::error::{SaveStashError, SaveStashResult};
use crate::storage::tree::{self, CancelToken, CopyOptions, ProgressHook};

/// Restores snapshots owned by a [`BackupManager`]
pub struct RestoreManager<'a> {
    backups: &'a BackupManager,
    cancel: Option<CancelToken>,
    progress: Option<ProgressHook>,
}

impl<'a> RestoreManager<'a> {
    /// Create a new RestoreManager
    pub fn new(backups: &'a BackupManager) -> Self {
        Self {
            backups,
            cancel: None,
            progress: None,
        }
    }

    /// Stop the safety capture or the copy back between files
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Report every file copied back into the save folder
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Restore a snapshot onto the save folder
    ///
    /// This overwrites everything in the save folder. The previous content is
    /// kept as a pre-restore snapshot which is returned in the result.
    pub fn restore_backup(
        &self,
        id: &SnapshotId,
        confirm: &dyn Confirm,
    ) -> SaveStashResult<RestoreResult> {
        let snapshot = self.backups.get_backup(id)?;
        let target = self.backups.source_dir().to_path_buf();

        let request = ConfirmRequest::Restore {
            snapshot: *id,
            target: target.clone(),
        };
        if !confirm.confirm(&request) {
            return Err(SaveStashError::Declined(request.action().into()));
        }

        // Nothing is touched unless the current state was captured first
        let safety_snapshot = if target.is_dir() {
            let mut options = BackupOptions::pre_restore(id);
            options.cancel = self.cancel.clone();
            Some(self.backups.create_backup(options)?)
        } else {
            None
        };

        match self.replace_contents(&snapshot, &target) {
            Ok((files_restored, bytes_restored)) => {
                let result = RestoreResult {
                    snapshot: *id,
                    safety_snapshot,
                    files_restored,
                    bytes_restored,
                };
                info!("{}", result.summary());
                self.backups.record(AuditEntry::success(
                    Operation::Restore,
                    self.backups.game().map(String::from),
                    Some(*id),
                    result.summary(),
                ));
                Ok(result)
            }
            Err(source) => {
                let err = SaveStashError::RestoreFailed {
                    snapshot: id.to_string(),
                    safety_snapshot: safety_snapshot.map(|s| s.id.to_string()),
                    source,
                };
                self.backups.record(AuditEntry::failure(
                    Operation::Restore,
                    self.backups.game().map(String::from),
                    Some(*id),
                    &err,
                ));
                Err(err)
            }
        }
    }

    /// Empty the save folder and copy the snapshot content into it
    fn replace_contents(&self, snapshot: &Snapshot, target: &Path) -> io::Result<(u64, u64)> {
        fs::create_dir_all(target)?;

        let keep: Vec<PathBuf> = if self.backups.backup_root().starts_with(target) {
            vec![self.backups.backup_root().to_path_buf()]
        } else {
            Vec::new()
        };
        tree::remove_dir_contents(target, &keep)?;

        let sidecars = metadata::sidecar_paths(&snapshot.path);
        let stats = tree::copy_tree(
            &snapshot.path,
            target,
            &CopyOptions {
                skip: &sidecars,
                cancel: self.cancel.as_ref(),
                progress: self.progress.as_ref(),
            },
        )?;

        Ok((stats.files, stats.bytes))
    }
}

/// Result of a restore operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    pub snapshot: SnapshotId,
    /// Pre-restore capture of the previous save data, absent when the save
    /// folder did not exist
    pub safety_snapshot: Option<Snapshot>,
    pub files_restored: u64,
    pub bytes_restored: u64,
}

impl RestoreResult {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Restored {} ({} files, {} bytes)",
            self.snapshot, self.files_restored, self.bytes_restored
        );
        if let Some(safety) = &self.safety_snapshot {
            summary.push_str(&format!("; previous saves kept in {}", safety.id));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::confirm::{AssumeNo, AssumeYes};
    use crate::backup::metadata::SnapshotKind;
    use crate::backup::scan;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn setup() -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("saves");
        write(&source.join("a.txt"), "abc");
        write(&source.join("sub").join("b.txt"), "hello");
        let manager = BackupManager::new(source, temp_dir.path().join("backups"));
        (manager, temp_dir)
    }

    #[test]
    fn test_backup_mutate_restore_round_trip() {
        let (manager, _temp) = setup();
        let source = manager.source_dir().to_path_buf();

        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        let listed = manager.list_backups().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size_bytes().unwrap(), 8);

        fs::remove_file(source.join("a.txt")).unwrap();
        write(&source.join("new.txt"), "stray");

        let result = RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap();

        assert_eq!(fs::read_to_string(source.join("a.txt")).unwrap(), "abc");
        assert_eq!(fs::read_to_string(source.join("sub").join("b.txt")).unwrap(), "hello");
        assert!(!source.join("new.txt").exists());
        assert!(!source.join(metadata::METADATA_FILE).exists());
        assert_eq!(result.files_restored, 2);
        assert_eq!(result.bytes_restored, 8);

        let safety = result.safety_snapshot.unwrap();
        assert_eq!(safety.kind(), SnapshotKind::PreRestore);
        assert!(safety
            .description
            .as_deref()
            .unwrap()
            .contains(&snapshot.id.to_string()));
        // sub/b.txt (5) + new.txt (5)
        assert_eq!(safety.size_bytes().unwrap(), 10);

        let listed = manager.list_backups().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, safety.id);
    }

    #[test]
    fn test_end_to_end_safety_snapshot_size() {
        let (manager, _temp) = setup();
        let source = manager.source_dir().to_path_buf();

        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        fs::remove_file(source.join("a.txt")).unwrap();

        let result = RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap();

        assert_eq!(fs::metadata(source.join("a.txt")).unwrap().len(), 3);
        assert_eq!(fs::metadata(source.join("sub").join("b.txt")).unwrap().len(), 5);
        assert_eq!(result.safety_snapshot.unwrap().size_bytes().unwrap(), 5);
        assert_eq!(manager.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_restore_then_backup_is_identical() {
        let (manager, _temp) = setup();
        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        write(&manager.source_dir().join("a.txt"), "different");

        RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap();
        let again = manager.create_backup(BackupOptions::new()).unwrap();

        assert_eq!(snapshot.inventory().unwrap(), again.inventory().unwrap());
        let skip_original = metadata::sidecar_paths(&snapshot.path);
        let skip_again = metadata::sidecar_paths(&again.path);
        assert_eq!(
            scan::content_checksum(&snapshot.path, &skip_original).unwrap(),
            scan::content_checksum(&again.path, &skip_again).unwrap()
        );
    }

    #[test]
    fn test_restore_over_readonly_file() {
        let (manager, _temp) = setup();
        let source = manager.source_dir().to_path_buf();
        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();

        write(&source.join("a.txt"), "modified");
        let mut perms = fs::metadata(source.join("a.txt")).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(source.join("a.txt"), perms).unwrap();

        RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap();

        assert_eq!(fs::read_to_string(source.join("a.txt")).unwrap(), "abc");
    }

    #[test]
    fn test_restore_into_missing_source() {
        let (manager, _temp) = setup();
        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        tree::remove_tree(manager.source_dir()).unwrap();

        let result = RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap();

        assert!(result.safety_snapshot.is_none());
        assert_eq!(
            fs::read_to_string(manager.source_dir().join("a.txt")).unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_declined_restore_changes_nothing() {
        let (manager, _temp) = setup();
        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        fs::remove_file(manager.source_dir().join("a.txt")).unwrap();

        let err = RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeNo)
            .unwrap_err();

        assert!(err.is_declined());
        assert!(!manager.source_dir().join("a.txt").exists());
        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_missing_snapshot() {
        let (manager, _temp) = setup();
        let id: SnapshotId = "backup_20200101_000000".parse().unwrap();

        let err = RestoreManager::new(&manager)
            .restore_backup(&id, &AssumeYes)
            .unwrap_err();
        assert!(matches!(err, SaveStashError::SnapshotNotFound(_)));
    }

    #[test]
    fn test_nested_backup_root_survives_restore() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("saves");
        write(&source.join("slot.sav"), "1");
        let manager = BackupManager::new(&source, source.join(".backups"));

        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        RestoreManager::new(&manager)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap();

        assert!(snapshot.path.is_dir());
        assert_eq!(manager.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_safety_capture_leaves_saves_untouched() {
        let (manager, _temp) = setup();
        let source = manager.source_dir().to_path_buf();
        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        write(&source.join("a.txt"), "newer progress");

        let token = CancelToken::new();
        token.cancel();
        let err = RestoreManager::new(&manager)
            .with_cancel(token)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap_err();

        assert!(matches!(err, SaveStashError::BackupFailed { .. }));
        assert_eq!(fs::read_to_string(source.join("a.txt")).unwrap(), "newer progress");
        assert_eq!(fs::read_to_string(source.join("sub").join("b.txt")).unwrap(), "hello");

        let listed = manager.list_backups().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, snapshot.id);
        assert_eq!(fs::read_dir(manager.backup_root()).unwrap().count(), 1);
    }

    #[test]
    fn test_interrupted_restore_names_safety_snapshot() {
        let (manager, _temp) = setup();
        let source = manager.source_dir().to_path_buf();
        let snapshot = manager.create_backup(BackupOptions::new()).unwrap();
        write(&source.join("a.txt"), "newer progress");

        let token = CancelToken::new();
        let restored = Arc::new(AtomicUsize::new(0));
        let hook = {
            let token = token.clone();
            let restored = Arc::clone(&restored);
            ProgressHook::new(move |_, _| {
                restored.fetch_add(1, Ordering::SeqCst);
                token.cancel();
            })
        };

        let err = RestoreManager::new(&manager)
            .with_cancel(token)
            .with_progress(hook)
            .restore_backup(&snapshot.id, &AssumeYes)
            .unwrap_err();

        assert_eq!(restored.load(Ordering::SeqCst), 1);
        let safety_name = match err {
            SaveStashError::RestoreFailed {
                snapshot: failed,
                safety_snapshot: Some(safety),
                ..
            } => {
                assert_eq!(failed, snapshot.id.to_string());
                safety
            }
            other => panic!("unexpected error: {other}"),
        };

        // The pre-restore state is still listed and restorable
        let safety_id: SnapshotId = safety_name.parse().unwrap();
        let safety = manager.get_backup(&safety_id).unwrap();
        assert_eq!(safety.kind(), SnapshotKind::PreRestore);
        assert_eq!(
            fs::read_to_string(safety.path.join("a.txt")).unwrap(),
            "newer progress"
        );
        let listed = manager.list_backups().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, safety_id);
    }
}
