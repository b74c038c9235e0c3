//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup engine.

pub mod backup;
pub mod config;
pub mod game;
pub mod history;

pub use backup::{handle_backup_command, BackupCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use game::{handle_game_command, GameCommands};
pub use history::handle_history_command;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{SaveStashError, SaveStashResult};

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Serialize `value` for the json and yaml formats
///
/// Returns `None` for the table format, which each command renders itself.
pub fn render_structured<T: Serialize>(
    value: &T,
    format: OutputFormat,
) -> SaveStashResult<Option<String>> {
    match format {
        OutputFormat::Table => Ok(None),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(Some)
            .map_err(|e| SaveStashError::Json(format!("Failed to render JSON: {}", e))),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(Some)
            .map_err(|e| SaveStashError::Json(format!("Failed to render YAML: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_structured() {
        let value = vec![1, 2];
        assert!(render_structured(&value, OutputFormat::Table).unwrap().is_none());
        assert_eq!(
            render_structured(&value, OutputFormat::Json).unwrap().unwrap(),
            "[\n  1,\n  2\n]"
        );
        assert_eq!(
            render_structured(&value, OutputFormat::Yaml).unwrap().unwrap(),
            "- 1\n- 2\n"
        );
    }
}
