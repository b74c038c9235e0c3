//! Global settings CLI commands

use clap::Subcommand;

use crate::config::{resolve_path, GamesConfig, StashPaths};
use crate::error::{SaveStashError, SaveStashResult};

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and paths
    Show,

    /// Set how many snapshots games keep by default
    SetRetention {
        /// Number of snapshots to keep
        count: usize,
    },

    /// Set the parent directory for games without their own backup path
    SetBackupPath {
        /// Directory; omit to fall back to the data directory
        path: Option<String>,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &StashPaths,
    config: &mut GamesConfig,
    cmd: ConfigCommands,
) -> SaveStashResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("SaveStash Configuration");
            println!("=======================");
            println!("Config directory: {}", paths.config_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Games file:       {}", paths.games_file().display());
            println!("History file:     {}", paths.history_file().display());
            println!();
            println!("Settings:");
            println!("  Default retention:   {}", config.settings.default_max_backups);
            println!(
                "  Default backup path: {}",
                config
                    .settings
                    .default_backup_path
                    .as_deref()
                    .unwrap_or("(data directory)")
            );
            println!("  Games configured:    {}", config.games.len());
        }

        ConfigCommands::SetRetention { count } => {
            if count == 0 {
                return Err(SaveStashError::Validation(
                    "Default retention must keep at least one backup".into(),
                ));
            }
            config.settings.default_max_backups = count;
            config.save(paths)?;
            println!("Games now keep {} backup(s) by default.", count);
        }

        ConfigCommands::SetBackupPath { path } => {
            match &path {
                Some(p) => {
                    let resolved = resolve_path(p)?;
                    println!("Default backup path set to {}", resolved.display());
                }
                None => println!("Default backup path cleared."),
            }
            config.settings.default_backup_path = path;
            config.save(paths)?;
        }
    }

    Ok(())
}
