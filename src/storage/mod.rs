//! Filesystem layer for SaveStash
//!
//! - `file_io`: atomic JSON reads and writes for the games config
//! - `tree`: recursive copy, write-protection clearing and removal used by
//!   the backup engine

pub mod file_io;
pub mod tree;

pub use tree::{CancelToken, CopyOptions, CopyStats, ProgressHook};
