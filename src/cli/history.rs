//! History CLI command

use crate::audit::AuditLogger;
use crate::config::StashPaths;
use crate::error::SaveStashResult;

/// Print the most recent engine operations, oldest first
pub fn handle_history_command(paths: &StashPaths, limit: usize) -> SaveStashResult<()> {
    let logger = AuditLogger::new(paths.history_file());
    let entries = logger.read_recent(limit)?;

    if entries.is_empty() {
        println!("No history recorded yet.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }

    Ok(())
}
