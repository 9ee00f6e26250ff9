//! Cache inspection and cleanup

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors from explicit cache maintenance.
///
/// Tile reads and writes never produce these; they only arise when a user
/// asks to inspect or clear the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error while walking the cache directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configured cache location exists but is not a directory.
    #[error("Cache path is not a directory: {0}")]
    NotADirectory(String),
}

/// File count and size of the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub files: u64,
    pub bytes: u64,
}

/// Outcome of [`clear_cache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearResult {
    pub files_deleted: u64,
    pub bytes_freed: u64,
}

/// Counts cached files and their total size.
///
/// A missing directory is an empty cache.
pub fn disk_cache_stats(cache_dir: &Path) -> Result<CacheStats, CacheError> {
    if !cache_dir.exists() {
        return Ok(CacheStats::default());
    }
    ensure_directory(cache_dir)?;

    let mut stats = CacheStats::default();
    walk_files(cache_dir, &mut |_, len| {
        stats.files += 1;
        stats.bytes += len;
        Ok(())
    })?;
    Ok(stats)
}

/// Deletes every cached file, keeping the root directory.
pub fn clear_cache(cache_dir: &Path) -> Result<ClearResult, CacheError> {
    if !cache_dir.exists() {
        return Ok(ClearResult::default());
    }
    ensure_directory(cache_dir)?;

    let mut result = ClearResult::default();
    walk_files(cache_dir, &mut |path, len| {
        fs::remove_file(path)?;
        result.files_deleted += 1;
        result.bytes_freed += len;
        Ok(())
    })?;

    for entry in fs::read_dir(cache_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        }
    }

    info!(
        cache_dir = %cache_dir.display(),
        files = result.files_deleted,
        bytes = result.bytes_freed,
        "Cache cleared"
    );
    Ok(result)
}

fn ensure_directory(path: &Path) -> Result<(), CacheError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CacheError::NotADirectory(path.display().to_string()))
    }
}

fn walk_files(
    dir: &Path,
    visit: &mut dyn FnMut(&Path, u64) -> io::Result<()>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            walk_files(&path, visit)?;
        } else if file_type.is_file() {
            let len = entry.metadata()?.len();
            visit(&path, len)?;
        }
    }
    Ok(())
}
