//! SaveStash - snapshot backups for game save folders
//!
//! This library provides the engine behind the `savestash` command: it
//! copies a game's save folder into timestamped snapshot directories,
//! restores them after capturing the current state, and prunes old ones
//! under a keep-N-most-recent retention policy.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, path expansion and the games config
//! - `error`: Custom error types
//! - `storage`: Atomic JSON files and directory tree copy/removal
//! - `backup`: Snapshot creation, listing, restore, deletion and retention
//! - `audit`: History of engine operations
//! - `cli`: Command handlers
//! - `display`: Terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use savestash::backup::{AssumeYes, BackupManager, BackupOptions};
//! use savestash::config::{GamesConfig, StashPaths};
//!
//! let paths = StashPaths::new()?;
//! let config = GamesConfig::load_or_create(&paths)?;
//! let profile = config.resolve("skyrim", &paths)?;
//! let manager = BackupManager::for_profile(&profile);
//! manager.create_backup(BackupOptions::new())?;
//! manager.cleanup(profile.keep_count, &AssumeYes)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod storage;

pub use error::SaveStashError;
