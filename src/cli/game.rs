//! Game profile CLI commands

use clap::Subcommand;
use log::warn;

use crate::backup::list_backups;
use crate::config::{resolve_path, GameProfile, GamesConfig, StashPaths};
use crate::display::{format_game_details, format_game_list};
use crate::error::SaveStashResult;

/// Game subcommands
#[derive(Subcommand)]
pub enum GameCommands {
    /// List configured games
    List,

    /// Show a game's settings and resolved paths
    Show {
        /// Game identifier
        id: String,
    },

    /// Add a game profile
    Add {
        /// Game identifier used by other commands
        id: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Save folder; may contain ~ and environment variables
        #[arg(short, long)]
        save_path: String,

        /// Where this game's snapshots go
        #[arg(short, long)]
        backup_path: Option<String>,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,

        /// Snapshots to keep for this game
        #[arg(short, long)]
        max_backups: Option<usize>,
    },

    /// Remove a game profile; its snapshots are left on disk
    Remove {
        /// Game identifier
        id: String,
    },
}

/// Handle a game command
pub fn handle_game_command(
    paths: &StashPaths,
    config: &mut GamesConfig,
    cmd: GameCommands,
) -> SaveStashResult<()> {
    match cmd {
        GameCommands::List => {
            print!("{}", format_game_list(config));
            if config.games.is_empty() {
                println!();
                println!("Add one with: savestash game add <id> --name <name> --save-path <path>");
            }
        }

        GameCommands::Show { id } => {
            let game = config.game(&id)?;
            let resolved = match config.resolve(&id, paths) {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    warn!("Could not resolve paths for {}: {}", id, e);
                    None
                }
            };
            let snapshot_count = match &resolved {
                Some(r) => list_backups(&r.backup_root)?.len(),
                None => 0,
            };

            print!(
                "{}",
                format_game_details(&id, game, resolved.as_ref(), snapshot_count)
            );
        }

        GameCommands::Add {
            id,
            name,
            save_path,
            backup_path,
            description,
            max_backups,
        } => {
            // Reject paths that can never expand before they are stored
            let source = resolve_path(&save_path)?;
            if let Some(backup_path) = &backup_path {
                resolve_path(backup_path)?;
            }
            if !source.is_dir() {
                println!(
                    "Note: {} does not exist yet; backups will fail until it does.",
                    source.display()
                );
            }

            let mut profile = GameProfile::new(name, save_path);
            profile.backup_path = backup_path;
            profile.description = description;
            profile.max_backups = max_backups;

            config.add_game(&id, profile)?;
            config.save(paths)?;
            println!("Added game '{}'.", id.trim());
        }

        GameCommands::Remove { id } => {
            let removed = config.remove_game(&id)?;
            config.save(paths)?;
            println!("Removed game '{}' ({}).", id, removed.name);
            println!("Existing backups were not deleted.");
        }
    }

    Ok(())
}
