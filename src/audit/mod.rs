//! Audit history for SaveStash
//!
//! Every backup, restore, delete and cleanup performed by a
//! [`BackupManager`](crate::backup::BackupManager) that has a logger attached
//! is appended to a line-delimited JSON file, successes and failures alike.
//!
//! - `AuditEntry`: one recorded operation
//! - `AuditLogger`: appends entries and reads them back

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
