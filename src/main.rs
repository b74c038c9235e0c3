use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use savestash::cli::{
    handle_backup_command, handle_config_command, handle_game_command, handle_history_command,
    BackupCommands, ConfigCommands, GameCommands,
};
use savestash::config::{GamesConfig, StashPaths};

#[derive(Parser)]
#[command(
    name = "savestash",
    version,
    about = "Snapshot backups for game save folders",
    long_about = "SaveStash copies game save folders into timestamped snapshots, \
                  restores them with an automatic safety backup of the current \
                  saves, and keeps only the most recent snapshots per game."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding games_config.json and the history
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Game profile management
    #[command(subcommand)]
    Game(GameCommands),

    /// Snapshot management
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Global settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show recent backups, restores and deletions
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut paths = StashPaths::new()?;
    if let Some(dir) = &cli.config_dir {
        paths = paths.with_config_dir(dir);
    }
    let mut config = GamesConfig::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Game(cmd)) => handle_game_command(&paths, &mut config, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&paths, &config, cmd)?,
        Some(Commands::Config(cmd)) => handle_config_command(&paths, &mut config, cmd)?,
        Some(Commands::History { limit }) => handle_history_command(&paths, limit)?,
        None => {
            println!("SaveStash - snapshot backups for game save folders");
            println!();
            println!("Run 'savestash --help' for usage information.");
            println!("Run 'savestash game add' to register a game.");
        }
    }

    Ok(())
}
