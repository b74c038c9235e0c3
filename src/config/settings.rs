//! Game profiles and global settings for SaveStash
//!
//! The games config is a single JSON document holding every game profile
//! plus the global retention default. It is loaded once per process and
//! passed by reference into the engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::expand::resolve_path;
use super::paths::StashPaths;
use crate::error::{SaveStashError, SaveStashResult};
use crate::storage::file_io::{read_json, write_json_atomic};

/// One game whose save folder is backed up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    /// Display name
    pub name: String,

    /// Live save directory, as typed by the user (may contain `~` or env vars)
    pub save_path: String,

    /// Where snapshots are stored; falls back to the global default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,

    /// Free-text notes about the game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Per-game retention override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_backups: Option<usize>,
}

impl GameProfile {
    /// Create a profile with only the required fields
    pub fn new(name: impl Into<String>, save_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            save_path: save_path.into(),
            backup_path: None,
            description: None,
            max_backups: None,
        }
    }
}

/// Global settings shared by all games
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Number of snapshots kept per game unless the game overrides it
    #[serde(default = "default_max_backups")]
    pub default_max_backups: usize,

    /// Parent directory for games without their own backup path
    #[serde(default)]
    pub default_backup_path: Option<String>,
}

fn default_max_backups() -> usize {
    10
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            default_max_backups: default_max_backups(),
            default_backup_path: None,
        }
    }
}

/// The whole games config document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesConfig {
    /// Profiles keyed by game identifier
    #[serde(default)]
    pub games: BTreeMap<String, GameProfile>,

    /// Global settings
    #[serde(default)]
    pub settings: GlobalSettings,
}

/// A profile with every path expanded and the retention count settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub id: String,
    pub name: String,
    pub source_dir: PathBuf,
    pub backup_root: PathBuf,
    pub description: Option<String>,
    pub keep_count: usize,
}

impl GamesConfig {
    /// Load the games config, writing the default document if none exists
    pub fn load_or_create(paths: &StashPaths) -> SaveStashResult<Self> {
        let games_path = paths.games_file();

        if games_path.exists() {
            let config: GamesConfig = read_json(&games_path).map_err(|e| {
                SaveStashError::Config(format!(
                    "Failed to load {}: {}",
                    games_path.display(),
                    e
                ))
            })?;
            config.validate().map_err(|e| {
                SaveStashError::Config(format!("Invalid {}: {}", games_path.display(), e))
            })?;
            Ok(config)
        } else {
            let config = GamesConfig::default();
            config.save(paths)?;
            Ok(config)
        }
    }

    /// Check values serde cannot reject on its own
    ///
    /// A retention count of zero would delete every snapshot right after it
    /// is taken, so it is refused for the default and for each game.
    pub fn validate(&self) -> SaveStashResult<()> {
        if self.settings.default_max_backups == 0 {
            return Err(SaveStashError::Validation(
                "default_max_backups must keep at least one backup".into(),
            ));
        }
        for (id, profile) in &self.games {
            check_max_backups(profile).map_err(|_| {
                SaveStashError::Validation(format!(
                    "Game '{}': max_backups must keep at least one backup",
                    id
                ))
            })?;
        }
        Ok(())
    }

    /// Save the games config to disk
    pub fn save(&self, paths: &StashPaths) -> SaveStashResult<()> {
        paths.ensure_directories()?;
        write_json_atomic(paths.games_file(), self)
    }

    /// Look up a profile by identifier
    pub fn game(&self, id: &str) -> SaveStashResult<&GameProfile> {
        self.games
            .get(id)
            .ok_or_else(|| SaveStashError::game_not_found(id))
    }

    /// Add a new profile; identifiers are unique
    pub fn add_game(&mut self, id: &str, profile: GameProfile) -> SaveStashResult<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SaveStashError::Validation("Game id cannot be empty".into()));
        }
        if profile.name.trim().is_empty() {
            return Err(SaveStashError::Validation("Game name cannot be empty".into()));
        }
        if profile.save_path.trim().is_empty() {
            return Err(SaveStashError::Validation("Save path cannot be empty".into()));
        }
        check_max_backups(&profile)?;
        if self.games.contains_key(id) {
            return Err(SaveStashError::Duplicate {
                entity_type: "Game",
                identifier: id.to_string(),
            });
        }

        self.games.insert(id.to_string(), profile);
        Ok(())
    }

    /// Remove a profile, returning it. Snapshots on disk are left alone.
    pub fn remove_game(&mut self, id: &str) -> SaveStashResult<GameProfile> {
        self.games
            .remove(id)
            .ok_or_else(|| SaveStashError::game_not_found(id))
    }

    /// Effective retention count for a game
    pub fn keep_count(&self, profile: &GameProfile) -> usize {
        profile
            .max_backups
            .unwrap_or(self.settings.default_max_backups)
    }

    /// Expand a profile into absolute paths ready for the engine
    pub fn resolve(&self, id: &str, paths: &StashPaths) -> SaveStashResult<ResolvedProfile> {
        let profile = self.game(id)?;
        let source_dir = resolve_path(&profile.save_path)?;

        let backup_root = match (&profile.backup_path, &self.settings.default_backup_path) {
            (Some(own), _) if !own.trim().is_empty() => resolve_path(own)?,
            (_, Some(shared)) if !shared.trim().is_empty() => resolve_path(shared)?.join(id),
            _ => paths.default_backup_root(id),
        };

        Ok(ResolvedProfile {
            id: id.to_string(),
            name: profile.name.clone(),
            source_dir,
            backup_root,
            description: profile.description.clone(),
            keep_count: self.keep_count(profile),
        })
    }
}

fn check_max_backups(profile: &GameProfile) -> SaveStashResult<()> {
    match profile.max_backups {
        Some(0) => Err(SaveStashError::Validation(
            "max_backups must keep at least one backup".into(),
        )),
        _ => Ok(()),
    }
}
