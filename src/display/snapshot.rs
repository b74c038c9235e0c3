//! Snapshot display formatting

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::{format_duration, format_size};
use crate::backup::{FileEntry, Snapshot, SnapshotId, SnapshotKind, SnapshotMetadata};
use crate::error::{SaveStashError, SaveStashResult};

/// A listed snapshot with its computed size, used for table and
/// structured output alike
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    /// 1-based position in the listing, usable as a selector
    pub index: usize,
    pub id: SnapshotId,
    pub captured_at: NaiveDateTime,
    pub kind: SnapshotKind,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub path: PathBuf,
}

impl SnapshotSummary {
    pub fn from_snapshot(index: usize, snapshot: &Snapshot) -> SaveStashResult<Self> {
        let size_bytes = snapshot.size_bytes().map_err(|e| {
            SaveStashError::Io(format!("Failed to measure {}: {}", snapshot.id, e))
        })?;

        Ok(Self {
            index,
            id: snapshot.id,
            captured_at: snapshot.captured_at,
            kind: snapshot.kind(),
            size_bytes,
            description: snapshot.description.clone(),
            path: snapshot.path.clone(),
        })
    }

    /// Summaries for a listing that is already ordered newest first
    pub fn collect(snapshots: &[Snapshot]) -> SaveStashResult<Vec<Self>> {
        snapshots
            .iter()
            .enumerate()
            .map(|(i, s)| Self::from_snapshot(i + 1, s))
            .collect()
    }
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Snapshot")]
    id: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Format a snapshot listing as a table
pub fn format_snapshot_table(summaries: &[SnapshotSummary]) -> String {
    if summaries.is_empty() {
        return "No backups found.".to_string();
    }

    let now = Local::now().naive_local();
    let rows = summaries.iter().map(|s| SnapshotRow {
        index: s.index,
        id: s.id.to_string(),
        age: format_duration(now.signed_duration_since(s.captured_at)),
        size: format_size(s.size_bytes),
        kind: s.kind.to_string(),
        description: s.description.clone().unwrap_or_default(),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format one snapshot's details, its metadata and the files it holds
pub fn format_snapshot_details(
    summary: &SnapshotSummary,
    metadata: Option<&SnapshotMetadata>,
    files: &[FileEntry],
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Snapshot: {}\n", summary.id));
    output.push_str(&format!("  Location:    {}\n", summary.path.display()));
    output.push_str(&format!(
        "  Captured:    {}\n",
        summary.captured_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!("  Kind:        {}\n", summary.kind));
    output.push_str(&format!("  Size:        {}\n", format_size(summary.size_bytes)));
    output.push_str(&format!("  Files:       {}\n", files.len()));
    if let Some(description) = &summary.description {
        output.push_str(&format!("  Description: {}\n", description));
    }

    match metadata {
        Some(meta) => {
            output.push_str(&format!("  Source:      {}\n", meta.source.display()));
            output.push_str(&format!("  Checksum:    {}\n", meta.checksum));
            output.push_str(&format!("  Written by:  savestash {}\n", meta.tool_version));
        }
        None => output.push_str("  Metadata:    none (created by an older tool)\n"),
    }

    if !files.is_empty() {
        output.push('\n');
        output.push_str("Contents:\n");
        for file in files {
            output.push_str(&format!(
                "  {:>10}  {}\n",
                format_size(file.size),
                file.relative.display()
            ));
        }
    }

    output
}
