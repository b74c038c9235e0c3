//! Configuration module for SaveStash
//!
//! This module provides configuration management including:
//! - Platform-aware path resolution for SaveStash's own files
//! - Expansion of user-supplied save and backup locations
//! - The games config (profiles plus global settings)

pub mod expand;
pub mod paths;
pub mod settings;

pub use expand::resolve_path;
pub use paths::StashPaths;
pub use settings::{GameProfile, GamesConfig, GlobalSettings, ResolvedProfile};
