//! Backup CLI commands
//!
//! Implements CLI commands for snapshot management.

use std::io::{self, IsTerminal};

use clap::Subcommand;

use super::{render_structured, OutputFormat};
use crate::audit::AuditLogger;
use crate::backup::{
    AssumeYes, BackupManager, BackupOptions, ProgressHook, RestoreManager, VerifyStatus,
};
use crate::config::{GamesConfig, ResolvedProfile, StashPaths};
use crate::display::{format_size, format_snapshot_details, format_snapshot_table, SnapshotSummary};
use crate::error::SaveStashResult;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Game identifier
        game: String,

        /// Description stored with the snapshot
        #[arg(short, long)]
        description: Option<String>,

        /// Do not prune old snapshots afterwards
        #[arg(long)]
        no_prune: bool,
    },

    /// List all snapshots of a game, newest first
    List {
        /// Game identifier
        game: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show information about a specific snapshot
    Info {
        /// Game identifier
        game: String,
        /// Snapshot id, list number, or 'latest'
        snapshot: String,
    },

    /// Check a snapshot against its recorded checksum
    Verify {
        /// Game identifier
        game: String,
        /// Snapshot id, list number, or 'latest'
        snapshot: String,
    },

    /// Restore a snapshot over the current save data
    Restore {
        /// Game identifier
        game: String,
        /// Snapshot id, list number, or 'latest'
        snapshot: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a snapshot
    Delete {
        /// Game identifier
        game: String,
        /// Snapshot id, list number, or 'latest'
        snapshot: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Delete old snapshots according to the retention policy
    Prune {
        /// Game identifier
        game: String,

        /// Number of snapshots to keep (defaults to the game's setting)
        #[arg(short, long)]
        keep: Option<usize>,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &StashPaths,
    config: &GamesConfig,
    cmd: BackupCommands,
) -> SaveStashResult<()> {
    match cmd {
        BackupCommands::Create {
            game,
            description,
            no_prune,
        } => {
            let (profile, manager) = open_manager(paths, config, &game)?;

            println!("Backing up {}...", profile.name);
            let mut options = BackupOptions::new();
            options.description = description;
            let progress = terminal_progress();
            options.progress = progress.clone();
            let snapshot = manager.create_backup(options);
            finish_progress(progress.as_ref());
            let snapshot = snapshot?;
            let size = snapshot.size_bytes()?;

            println!("Backup created: {}", snapshot.id);
            println!("Location: {}", snapshot.path.display());
            println!("Size: {}", format_size(size));

            if !no_prune {
                // The snapshot just taken always survives its own prune
                let keep = profile.keep_count.max(1);
                let report = manager.cleanup(keep, &AssumeYes)?;
                if !report.deleted.is_empty() {
                    println!(
                        "Pruned {} old backup(s), keeping {}.",
                        report.deleted.len(),
                        keep
                    );
                }
                for failure in &report.failed {
                    eprintln!("Could not prune {}: {}", failure.snapshot, failure.error);
                }
            }
        }

        BackupCommands::List { game, format } => {
            let (profile, manager) = open_manager(paths, config, &game)?;
            let summaries = SnapshotSummary::collect(&manager.list_backups()?)?;

            if let Some(rendered) = render_structured(&summaries, format)? {
                println!("{}", rendered);
                return Ok(());
            }

            if summaries.is_empty() {
                println!("No backups found for {}.", profile.name);
                println!("Create one with: savestash backup create {}", game);
                return Ok(());
            }

            println!("Backups of {}", profile.name);
            println!("{}", format_snapshot_table(&summaries));
            let total: u64 = summaries.iter().map(|s| s.size_bytes).sum();
            println!(
                "Total: {} backup(s), {} (keeping {})",
                summaries.len(),
                format_size(total),
                profile.keep_count
            );
        }

        BackupCommands::Info { game, snapshot } => {
            let (_, manager) = open_manager(paths, config, &game)?;
            let found = manager.find_backup(&snapshot)?;

            let index = manager
                .list_backups()?
                .iter()
                .position(|s| s.id == found.id)
                .map_or(0, |i| i + 1);
            let summary = SnapshotSummary::from_snapshot(index, &found)?;
            let metadata = found.metadata()?;
            let files = found.inventory()?;

            print!(
                "{}",
                format_snapshot_details(&summary, metadata.as_ref(), &files)
            );
        }

        BackupCommands::Verify { game, snapshot } => {
            let (_, manager) = open_manager(paths, config, &game)?;
            let found = manager.find_backup(&snapshot)?;
            let report = manager.verify_snapshot(&found.id)?;

            match report.status {
                VerifyStatus::Intact => println!("{}: OK", report.snapshot),
                VerifyStatus::Modified => {
                    println!("{}: MODIFIED", report.snapshot);
                    println!("  Recorded: {}", report.expected.unwrap_or_default());
                    println!("  Current:  {}", report.actual);
                }
                VerifyStatus::Unverifiable => {
                    println!("{}: no checksum recorded, cannot verify", report.snapshot);
                }
            }
        }

        BackupCommands::Restore {
            game,
            snapshot,
            force,
        } => {
            let (profile, manager) = open_manager(paths, config, &game)?;
            let found = manager.find_backup(&snapshot)?;

            println!("Snapshot: {}", found.id);
            println!("Captured: {}", found.captured_at.format("%Y-%m-%d %H:%M:%S"));
            if let Some(description) = &found.description {
                println!("Description: {}", description);
            }
            println!("Target: {}", profile.source_dir.display());
            println!();

            if !force {
                println!("WARNING: This will replace ALL current save data for {}!", profile.name);
                println!("The current saves are backed up first.");
                println!("To proceed, run again with --force flag:");
                println!("  savestash backup restore {} {} --force", game, snapshot);
                return Ok(());
            }

            let mut restorer = RestoreManager::new(&manager);
            let progress = terminal_progress();
            if let Some(hook) = &progress {
                restorer = restorer.with_progress(hook.clone());
            }
            let result = restorer.restore_backup(&found.id, &AssumeYes);
            finish_progress(progress.as_ref());
            let result = result?;

            println!("Restore complete!");
            println!("{}", result.summary());
        }

        BackupCommands::Delete {
            game,
            snapshot,
            force,
        } => {
            let (_, manager) = open_manager(paths, config, &game)?;
            let found = manager.find_backup(&snapshot)?;

            if !force {
                println!(
                    "This will permanently delete {} ({}).",
                    found.id,
                    format_size(found.size_bytes()?)
                );
                println!("To proceed, run again with --force flag:");
                println!("  savestash backup delete {} {} --force", game, snapshot);
                return Ok(());
            }

            manager.delete_snapshot(&found.id, &AssumeYes)?;
            println!("Deleted {}.", found.id);
        }

        BackupCommands::Prune { game, keep, force } => {
            let (profile, manager) = open_manager(paths, config, &game)?;
            let keep = keep.unwrap_or(profile.keep_count);
            let backups = manager.list_backups()?;

            if backups.len() <= keep {
                println!("No backups to prune.");
                println!(
                    "{} has {} backup(s); retention keeps {}.",
                    profile.name,
                    backups.len(),
                    keep
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Keeping the {} most recent of {} backup(s).", keep, backups.len());
            println!("To be deleted:");
            for snapshot in &backups[keep..] {
                println!("  {}", snapshot.id);
            }
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  savestash backup prune {} --force", game);
                return Ok(());
            }

            let report = manager.cleanup(keep, &AssumeYes)?;
            println!("Deleted {} backup(s).", report.deleted.len());
            for failure in &report.failed {
                eprintln!("Could not delete {}: {}", failure.snapshot, failure.error);
            }
        }
    }

    Ok(())
}

/// Resolve a game and build its audited backup manager
fn open_manager(
    paths: &StashPaths,
    config: &GamesConfig,
    game: &str,
) -> SaveStashResult<(ResolvedProfile, BackupManager)> {
    let profile = config.resolve(game, paths)?;
    let manager = BackupManager::for_profile(&profile)
        .with_audit(AuditLogger::new(paths.history_file()));
    Ok((profile, manager))
}

/// Running file count on stderr, only when a person is watching
fn terminal_progress() -> Option<ProgressHook> {
    if !io::stderr().is_terminal() {
        return None;
    }
    Some(ProgressHook::new(|_, stats| {
        eprint!("\r  {} file(s), {}", stats.files, format_size(stats.bytes));
    }))
}

fn finish_progress(progress: Option<&ProgressHook>) {
    if progress.is_some() {
        eprintln!();
    }
}
