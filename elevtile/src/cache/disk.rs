//! Disk-backed tile store

use crate::coord::TileCoordinate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Distinguishes temporary files of concurrent writers within this process.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Construct the full path for a cached tile.
///
/// ```text
/// <cache_dir>/<zoom>/<x>/elevation_<zoom>_<x>_<y>.png
/// ```
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use elevtile::cache::cache_path;
/// use elevtile::coord::TileCoordinate;
///
/// let path = cache_path(&PathBuf::from("/cache"), TileCoordinate::new(15, 5241, 12663));
/// assert_eq!(path, PathBuf::from("/cache/15/5241/elevation_15_5241_12663.png"));
/// ```
pub fn cache_path(cache_dir: &Path, tile: TileCoordinate) -> PathBuf {
    cache_dir
        .join(tile.zoom.to_string())
        .join(tile.x.to_string())
        .join(format!("elevation_{}_{}_{}.png", tile.zoom, tile.x, tile.y))
}

/// Durable tile store keyed by [`TileCoordinate`].
///
/// Files hold the provider response byte for byte. Writes go through a
/// temporary sibling and a rename, so a reader never observes a partial file
/// even when two writers store the same tile at once.
#[derive(Debug, Clone)]
pub struct ElevationTileCache {
    root: PathBuf,
}

impl ElevationTileCache {
    /// Creates a cache rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `tile`.
    pub fn path_for(&self, tile: TileCoordinate) -> PathBuf {
        cache_path(&self.root, tile)
    }

    /// Reads a cached tile.
    ///
    /// Missing and unreadable files are both reported as `None`.
    pub fn read(&self, tile: TileCoordinate) -> Option<Vec<u8>> {
        let path = self.path_for(tile);
        match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => {
                debug!(tile = %tile, path = %path.display(), "Ignoring empty cache file");
                None
            }
            Ok(bytes) => {
                trace!(tile = %tile, size_bytes = bytes.len(), "Cache file read");
                Some(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(tile = %tile, path = %path.display(), error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Stores a tile, replacing any previous file.
    pub fn write(&self, tile: TileCoordinate, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(tile);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = temp_path(&path);
        if let Err(e) = fs::write(&temp, bytes) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        fs::rename(&temp, &path).inspect_err(|_| {
            let _ = fs::remove_file(&temp);
        })
    }

    /// Async variant of [`write`](Self::write).
    pub async fn write_async(&self, tile: TileCoordinate, bytes: Vec<u8>) -> io::Result<()> {
        let path = self.path_for(tile);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = temp_path(&path);
        if let Err(e) = tokio::fs::write(&temp, &bytes).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        Ok(())
    }

    /// Stores a tile in the background.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn spawn_write(&self, runtime: &Handle, tile: TileCoordinate, bytes: Vec<u8>) -> JoinHandle<()> {
        let cache = self.clone();
        runtime.spawn(async move {
            let size = bytes.len();
            match cache.write_async(tile, bytes).await {
                Ok(()) => debug!(tile = %tile, size_bytes = size, "Tile written to cache"),
                Err(e) => warn!(tile = %tile, error = %e, "Cache write failed"),
            }
        })
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_path_layout() {
        let path = cache_path(Path::new("/cache"), TileCoordinate::new(12, 655, 1407));
        assert_eq!(path, PathBuf::from("/cache/12/655/elevation_12_655_1407.png"));
    }

    #[test]
    fn test_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = ElevationTileCache::new(dir.path());
        assert!(cache.read(TileCoordinate::new(3, 1, 1)).is_none());
    }

    #[test]
    fn test_write_then_read_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let cache = ElevationTileCache::new(dir.path());
        let tile = TileCoordinate::new(15, 100, 200);
        let data: Vec<u8> = (0..=255).cycle().take(4096).collect();

        cache.write(tile, &data).unwrap();

        assert_eq!(cache.read(tile), Some(data));
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let cache = ElevationTileCache::new(dir.path());
        let tile = TileCoordinate::new(15, 100, 200);

        cache.write(tile, &[1, 2, 3]).unwrap();
        cache.write(tile, &[4, 5]).unwrap();

        assert_eq!(cache.read(tile), Some(vec![4, 5]));
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let cache = ElevationTileCache::new(dir.path());
        let tile = TileCoordinate::new(1, 0, 1);
        cache.write(tile, &[9; 16]).unwrap();

        let parent = cache.path_for(tile).parent().unwrap().to_path_buf();
        let names: Vec<_> = fs::read_dir(parent)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["elevation_1_0_1.png".to_string()]);
    }

    #[test]
    fn test_empty_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = ElevationTileCache::new(dir.path());
        let tile = TileCoordinate::new(2, 1, 1);
        cache.write(tile, &[]).unwrap();
        assert!(cache.read(tile).is_none());
    }

    #[test]
    fn test_write_into_unwritable_root_fails() {
        let dir = TempDir::new().unwrap();
        // A regular file where the cache root should be
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let cache = ElevationTileCache::new(&blocker);

        assert!(cache.write(TileCoordinate::new(1, 0, 0), &[1]).is_err());
        assert!(cache.read(TileCoordinate::new(1, 0, 0)).is_none());
    }

    #[tokio::test]
    async fn test_spawn_write_persists_tile() {
        let dir = TempDir::new().unwrap();
        let cache = ElevationTileCache::new(dir.path());
        let tile = TileCoordinate::new(7, 10, 20);

        cache
            .spawn_write(&Handle::current(), tile, vec![7, 7, 7])
            .await
            .unwrap();

        assert_eq!(cache.read(tile), Some(vec![7, 7, 7]));
    }

    #[tokio::test]
    async fn test_spawn_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let cache = ElevationTileCache::new(&blocker);

        // Task completes without panicking even though the write fails
        cache
            .spawn_write(&Handle::current(), TileCoordinate::new(1, 1, 1), vec![1])
            .await
            .unwrap();
    }
}
