//! Path management for SaveStash
//!
//! Provides platform-aware resolution for the games config, the audit
//! history, and the fallback backup location.
//!
//! ## Path Resolution Order
//!
//! 1. `SAVESTASH_CONFIG_DIR` / `SAVESTASH_DATA_DIR` environment variables (if set)
//! 2. The platform directories reported by `directories::ProjectDirs`
//!    (`~/.config/savestash` and `~/.local/share/savestash` on Linux,
//!    `%APPDATA%\savestash` on Windows)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::SaveStashError;

/// Manages all paths used by SaveStash
#[derive(Debug, Clone)]
pub struct StashPaths {
    /// Directory holding the games config and history
    config_dir: PathBuf,
    /// Directory holding default backup roots
    data_dir: PathBuf,
}

impl StashPaths {
    /// Create a new StashPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, SaveStashError> {
        let project = ProjectDirs::from("", "", "savestash");

        let config_dir = match std::env::var_os("SAVESTASH_CONFIG_DIR") {
            Some(custom) => PathBuf::from(custom),
            None => project
                .as_ref()
                .map(|p| p.config_dir().to_path_buf())
                .ok_or_else(|| {
                    SaveStashError::Config("Could not determine config directory".into())
                })?,
        };

        let data_dir = match std::env::var_os("SAVESTASH_DATA_DIR") {
            Some(custom) => PathBuf::from(custom),
            None => match project.as_ref() {
                Some(p) => p.data_dir().to_path_buf(),
                None => config_dir.clone(),
            },
        };

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Create StashPaths rooted at a single directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            config_dir: base_dir.clone(),
            data_dir: base_dir,
        }
    }

    /// Use an explicit config directory, keeping the data directory
    pub fn with_config_dir(mut self, config_dir: impl AsRef<Path>) -> Self {
        self.config_dir = config_dir.as_ref().to_path_buf();
        self
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the path to the games config file
    pub fn games_file(&self) -> PathBuf {
        self.config_dir.join("games_config.json")
    }

    /// Get the path to the audit history
    pub fn history_file(&self) -> PathBuf {
        self.config_dir.join("history.jsonl")
    }

    /// Fallback backup root for a game without a configured backup path
    pub fn default_backup_root(&self, game_id: &str) -> PathBuf {
        self.data_dir.join("backups").join(game_id)
    }

    /// Ensure the config directory exists
    pub fn ensure_directories(&self) -> Result<(), SaveStashError> {
        std::fs::create_dir_all(&self.config_dir).map_err(|e| {
            SaveStashError::Io(format!("Failed to create config directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if a games config has been written yet
    pub fn is_initialized(&self) -> bool {
        self.games_file().exists()
    }
}
