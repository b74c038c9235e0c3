//! Recursive directory primitives
//!
//! Everything the engine does to a directory tree goes through here:
//! copying a tree with best-effort modification times, clearing write
//! protection before overwrite or removal, and removing trees or the
//! contents of a directory.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use filetime::FileTime;
use log::{debug, warn};
use walkdir::WalkDir;

/// Cooperative cancellation flag checked between files
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the running copy stops before its next file
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Callback told about every file a copy finishes
///
/// Receives the copied source path and the running totals.
#[derive(Clone)]
pub struct ProgressHook(Arc<dyn Fn(&Path, &CopyStats) + Send + Sync>);

impl ProgressHook {
    pub fn new(f: impl Fn(&Path, &CopyStats) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn report(&self, path: &Path, stats: &CopyStats) {
        (self.0)(path, stats)
    }
}

impl fmt::Debug for ProgressHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressHook")
    }
}

/// Options for [`copy_tree`]
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyOptions<'a> {
    /// Absolute paths under the source that are not copied (with their contents)
    pub skip: &'a [PathBuf],
    /// Checked before every file
    pub cancel: Option<&'a CancelToken>,
    /// Called after every file
    pub progress: Option<&'a ProgressHook>,
}

/// What a copy moved
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub bytes: u64,
}

/// Copy every file and subdirectory of `src` into `dst`
///
/// `dst` is created if needed. Symlinked files are copied by content;
/// symlinked directories and dangling links are skipped.
pub fn copy_tree(src: &Path, dst: &Path, options: &CopyOptions<'_>) -> io::Result<CopyStats> {
    fs::create_dir_all(dst)?;

    let mut stats = CopyStats::default();
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !options.skip.iter().any(|skip| skip == entry.path()));

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        let relative = path
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if file_type.is_symlink() {
            match fs::metadata(path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => {
                    warn!("Skipping symlinked directory {}", path.display());
                    continue;
                }
                Err(e) => {
                    warn!("Skipping dangling symlink {}: {}", path.display(), e);
                    continue;
                }
            }
        }

        if options.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "operation cancelled",
            ));
        }

        stats.bytes += copy_file(path, &target)?;
        stats.files += 1;
        if let Some(progress) = options.progress {
            progress.report(path, &stats);
        }
    }

    Ok(stats)
}

/// Copy one file, retrying once if a read-only destination blocks it
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    debug!("Copying {} -> {}", src.display(), dst.display());

    let bytes = match fs::copy(src, dst) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && dst.exists() => {
            debug!("Clearing write protection on {}", dst.display());
            clear_write_protection(dst);
            fs::copy(src, dst)?
        }
        Err(e) => return Err(e),
    };

    match fs::metadata(src) {
        Ok(meta) => {
            let mtime = FileTime::from_last_modification_time(&meta);
            if let Err(e) = filetime::set_file_mtime(dst, mtime) {
                warn!("Could not preserve mtime of {}: {}", dst.display(), e);
            }
        }
        Err(e) => warn!("Could not read mtime of {}: {}", src.display(), e),
    }

    Ok(bytes)
}

/// Clear write protection on `path` and everything beneath it
///
/// Best effort: entries that cannot be changed are left for the following
/// removal or overwrite to report.
pub fn clear_write_protection(path: &Path) {
    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry while clearing write protection: {}", e);
                continue;
            }
        };
        if entry.path_is_symlink() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => {
                if let Err(e) = make_writable(entry.path(), &meta) {
                    debug!("Could not make {} writable: {}", entry.path().display(), e);
                }
            }
            Err(e) => debug!("Could not stat {}: {}", entry.path().display(), e),
        }
    }
}

#[cfg(unix)]
fn make_writable(path: &Path, meta: &fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    // Directories also need owner read/execute to be emptied
    let wanted = if meta.is_dir() { 0o700 } else { 0o200 };
    let mut perms = meta.permissions();
    let mode = perms.mode();
    if mode & wanted != wanted {
        perms.set_mode(mode | wanted);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_writable(path: &Path, meta: &fs::Metadata) -> io::Result<()> {
    let mut perms = meta.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Remove a whole tree after clearing write protection on it
pub fn remove_tree(path: &Path) -> io::Result<()> {
    clear_write_protection(path);
    fs::remove_dir_all(path)
}

/// Remove everything inside `dir` except the paths in `keep`
///
/// Directories that contain a kept path are emptied around it rather than
/// removed.
pub fn remove_dir_contents(dir: &Path, keep: &[PathBuf]) -> io::Result<()> {
    if let Ok(meta) = fs::metadata(dir) {
        make_writable(dir, &meta)?;
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if keep.iter().any(|k| *k == path) {
            continue;
        }
        if keep.iter().any(|k| k.starts_with(&path)) {
            remove_dir_contents(&path, keep)?;
            continue;
        }

        let meta = fs::symlink_metadata(&path)?;
        if meta.is_dir() {
            remove_tree(&path)?;
        } else {
            if !meta.file_type().is_symlink() {
                make_writable(&path, &meta)?;
            }
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}
