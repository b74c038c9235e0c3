//! Snapshot identifiers
//!
//! A snapshot directory is named `backup_YYYYMMDD_HHMMSS` after its local
//! capture time. A second capture within the same second gets `_001`, the
//! next `_002`, and so on, so an existing snapshot is never overwritten.
//! The counter is zero-padded so plain name order matches capture order.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const PREFIX: &str = "backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;
const SEQUENCE_WIDTH: usize = 3;

/// Identifier of one snapshot, ordered by capture time then collision suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId {
    captured_at: NaiveDateTime,
    sequence: u32,
}

impl SnapshotId {
    /// Identifier for a capture at `captured_at` (sub-second part dropped)
    pub fn new(captured_at: NaiveDateTime) -> Self {
        let captured_at = captured_at
            .with_nanosecond(0)
            .unwrap_or(captured_at);
        Self {
            captured_at,
            sequence: 0,
        }
    }

    /// The first identifier for `captured_at` that is not already taken in `root`
    pub fn next_free(captured_at: NaiveDateTime, root: &Path) -> Self {
        let mut id = Self::new(captured_at);
        while root.join(id.to_string()).exists() {
            id.sequence += 1;
        }
        id
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    /// Collision suffix; 0 when the name has none
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.captured_at.format(TIMESTAMP_FORMAT))?;
        if self.sequence > 0 {
            write!(f, "_{:0width$}", self.sequence, width = SEQUENCE_WIDTH)?;
        }
        Ok(())
    }
}

/// Error returned for names that are not snapshot identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSnapshotIdError(String);

impl fmt::Display for ParseSnapshotIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a snapshot name: {}", self.0)
    }
}

impl std::error::Error for ParseSnapshotIdError {}

impl FromStr for SnapshotId {
    type Err = ParseSnapshotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSnapshotIdError(s.to_string());

        let rest = s.strip_prefix(PREFIX).ok_or_else(invalid)?;
        if rest.len() < TIMESTAMP_LEN || !rest.is_char_boundary(TIMESTAMP_LEN) {
            return Err(invalid());
        }
        let (stamp, suffix) = rest.split_at(TIMESTAMP_LEN);

        let captured_at =
            NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|_| invalid())?;

        let sequence = match suffix.strip_prefix('_') {
            None if suffix.is_empty() => 0,
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                let n: u32 = digits.parse().map_err(|_| invalid())?;
                // Only the exact padded form round-trips to the same directory name
                let padded = format!("{:0width$}", n, width = SEQUENCE_WIDTH);
                if n == 0 || digits != padded {
                    return Err(invalid());
                }
                n
            }
            _ => return Err(invalid()),
        };

        Ok(Self {
            captured_at,
            sequence,
        })
    }
}

impl Serialize for SnapshotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SnapshotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
