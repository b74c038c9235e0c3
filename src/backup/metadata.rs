//! Sidecar files stored inside a snapshot directory
//!
//! - `.backup_description`: the free-text description, nothing else
//! - `.backup_meta.json`: capture details and a content checksum
//!
//! Both live at the top of the snapshot and are never part of the restored
//! content, size, or checksum. Snapshots made by older tools may have
//! neither.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::naming::SnapshotId;
use crate::error::{SaveStashError, SaveStashResult};

pub const DESCRIPTION_FILE: &str = ".backup_description";
pub const METADATA_FILE: &str = ".backup_meta.json";

/// Names of all sidecar files
pub const SIDECAR_FILES: [&str; 2] = [DESCRIPTION_FILE, METADATA_FILE];

/// Absolute sidecar paths for a snapshot directory
pub fn sidecar_paths(snapshot_dir: &Path) -> Vec<PathBuf> {
    SIDECAR_FILES
        .iter()
        .map(|name| snapshot_dir.join(name))
        .collect()
}

/// Why a snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// Requested by the user
    #[default]
    Manual,
    /// Taken automatically right before a restore overwrote the save folder
    PreRestore,
}

impl std::fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotKind::Manual => write!(f, "manual"),
            SnapshotKind::PreRestore => write!(f, "pre-restore"),
        }
    }
}

/// Contents of `.backup_meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub snapshot_id: SnapshotId,
    pub created_at: DateTime<Local>,
    pub source: PathBuf,
    #[serde(default)]
    pub kind: SnapshotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_count: u64,
    pub total_size: u64,
    /// SHA-256 over relative paths and contents, see [`super::scan::content_checksum`]
    pub checksum: String,
    pub tool_version: String,
}

/// Write the description sidecar; blank descriptions are not stored
pub fn write_description(snapshot_dir: &Path, description: &str) -> std::io::Result<()> {
    let description = description.trim();
    if description.is_empty() {
        return Ok(());
    }
    fs::write(snapshot_dir.join(DESCRIPTION_FILE), description)
}

/// Read the description sidecar, if present and non-empty
pub fn read_description(snapshot_dir: &Path) -> Option<String> {
    let text = fs::read_to_string(snapshot_dir.join(DESCRIPTION_FILE)).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub fn write_metadata(snapshot_dir: &Path, metadata: &SnapshotMetadata) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(snapshot_dir.join(METADATA_FILE), json)
}

/// Read the metadata sidecar; `Ok(None)` when the snapshot has none
pub fn read_metadata(snapshot_dir: &Path) -> SaveStashResult<Option<SnapshotMetadata>> {
    let path = snapshot_dir.join(METADATA_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path).map_err(|e| {
        SaveStashError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let metadata = serde_json::from_str(&contents).map_err(|e| {
        SaveStashError::Json(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    Ok(Some(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_description_round_trip() {
        let temp = TempDir::new().unwrap();
        write_description(temp.path(), "  before the boss fight \n").unwrap();
        assert_eq!(
            read_description(temp.path()).as_deref(),
            Some("before the boss fight")
        );
    }

    #[test]
    fn test_blank_description_is_not_written() {
        let temp = TempDir::new().unwrap();
        write_description(temp.path(), "   ").unwrap();
        assert!(!temp.path().join(DESCRIPTION_FILE).exists());
        assert_eq!(read_description(temp.path()), None);
    }

    #[test]
    fn test_metadata_round_trip() {
        let temp = TempDir::new().unwrap();
        let metadata = SnapshotMetadata {
            snapshot_id: "backup_20250101_101010".parse().unwrap(),
            created_at: Local::now(),
            source: PathBuf::from("/saves/game"),
            kind: SnapshotKind::PreRestore,
            description: Some("safety".into()),
            file_count: 2,
            total_size: 8,
            checksum: "abc".into(),
            tool_version: "0.1.0".into(),
        };
        write_metadata(temp.path(), &metadata).unwrap();

        let loaded = read_metadata(temp.path()).unwrap().unwrap();
        assert_eq!(loaded, metadata);

        let raw = fs::read_to_string(temp.path().join(METADATA_FILE)).unwrap();
        assert!(raw.contains("\"kind\": \"pre_restore\""));
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_metadata(temp.path()).unwrap().is_none());
    }
}
