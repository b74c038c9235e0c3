//! Directory scanning: sizes, file inventories, checksums and snapshot listing

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::metadata::{self, SnapshotKind, SnapshotMetadata};
use super::naming::SnapshotId;
use crate::error::{SaveStashError, SaveStashResult};

/// One file found by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path relative to the scanned directory
    pub relative: PathBuf,
    pub size: u64,
}

/// A complete snapshot found under a backup root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub path: PathBuf,
    pub captured_at: NaiveDateTime,
    pub description: Option<String>,
}

impl Snapshot {
    /// Recognize `path` as a snapshot directory
    ///
    /// Staging directories and anything else whose name is not a snapshot
    /// id are not snapshots.
    pub fn from_dir(path: &Path) -> Option<Self> {
        let id: SnapshotId = path.file_name()?.to_str()?.parse().ok()?;
        if !path.is_dir() {
            return None;
        }

        Some(Self {
            id,
            path: path.to_path_buf(),
            captured_at: id.captured_at(),
            description: metadata::read_description(path),
        })
    }

    /// Size of the captured content, sidecars excluded
    pub fn size_bytes(&self) -> io::Result<u64> {
        Ok(content_files(&self.path, &metadata::sidecar_paths(&self.path))?
            .iter()
            .map(|f| f.size)
            .sum())
    }

    /// Captured files, sidecars excluded
    pub fn inventory(&self) -> io::Result<Vec<FileEntry>> {
        content_files(&self.path, &metadata::sidecar_paths(&self.path))
    }

    pub fn metadata(&self) -> SaveStashResult<Option<SnapshotMetadata>> {
        metadata::read_metadata(&self.path)
    }

    /// Kind recorded in the metadata; manual when unknown
    pub fn kind(&self) -> SnapshotKind {
        self.metadata()
            .ok()
            .flatten()
            .map(|m| m.kind)
            .unwrap_or_default()
    }
}

/// Total size in bytes of every file under `dir`
pub fn compute_size(dir: &Path) -> io::Result<u64> {
    Ok(content_files(dir, &[])?.iter().map(|f| f.size).sum())
}

/// Every file under `dir`, sorted by relative path
pub fn inventory(dir: &Path) -> io::Result<Vec<FileEntry>> {
    content_files(dir, &[])
}

/// Files under `dir` the way a copy sees them
///
/// Symlinked files count with their target's size; symlinked directories
/// and dangling links are ignored, matching what a backup copies.
fn content_files(dir: &Path, skip: &[PathBuf]) -> io::Result<Vec<FileEntry>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !skip.iter().any(|s| s == entry.path()));

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let size = if entry.file_type().is_file() {
            entry.metadata().map_err(io::Error::from)?.len()
        } else if entry.path_is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => meta.len(),
                _ => continue,
            }
        } else {
            continue;
        };

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .to_path_buf();
        files.push(FileEntry { relative, size });
    }

    Ok(files)
}

/// SHA-256 over every file's relative path, size and content
///
/// Paths are hashed with `/` separators so the value is portable.
pub fn content_checksum(dir: &Path, skip: &[PathBuf]) -> io::Result<String> {
    let mut hasher = Sha256::new();

    for file in content_files(dir, skip)? {
        let relative: Vec<String> = file
            .relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        hasher.update(relative.join("/").as_bytes());
        hasher.update([0u8]);
        hasher.update(file.size.to_le_bytes());

        let mut reader = File::open(dir.join(&file.relative))?;
        io::copy(&mut reader, &mut hasher)?;
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Snapshots under `backup_root`, most recent first
///
/// A missing root yields an empty list.
pub fn list_backups(backup_root: &Path) -> SaveStashResult<Vec<Snapshot>> {
    if !backup_root.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(backup_root).map_err(|e| {
        SaveStashError::Io(format!(
            "Failed to read backup directory {}: {}",
            backup_root.display(),
            e
        ))
    })?;

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            SaveStashError::Io(format!("Failed to read directory entry: {}", e))
        })?;
        if let Some(snapshot) = Snapshot::from_dir(&entry.path()) {
            snapshots.push(snapshot);
        }
    }

    snapshots.sort_by(|a, b| b.id.cmp(&a.id));

    Ok(snapshots)
}
