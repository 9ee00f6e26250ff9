//! Configuration for the elevation pipeline.

use crate::config::default_cache_directory;
use crate::job::DEFAULT_FETCH_TIMEOUT;
use crate::tiling::TERRARIUM_URL_TEMPLATE;
use std::path::PathBuf;
use std::time::Duration;

/// Host loop sleep when a step settled no job.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(100);

/// TCP connect timeout for provider requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Tile requests open at the same time within one batch.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 8;

/// Configuration for an [`ElevationModel`](super::ElevationModel).
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationConfig {
    /// Directory holding cached tiles.
    pub cache_dir: PathBuf,

    /// Provider URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,

    /// Zoom level to fetch. `None` selects the highest level of the scheme.
    pub zoom: Option<u8>,

    /// Wall-clock budget per tile request.
    pub fetch_timeout: Duration,

    /// How long the host loop waits after a step in which nothing settled.
    pub idle_interval: Duration,

    /// HTTP connect timeout.
    pub connect_timeout: Duration,

    /// Maximum tile requests in flight per batch.
    pub max_concurrent_downloads: usize,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_directory(),
            url_template: TERRARIUM_URL_TEMPLATE.to_string(),
            zoom: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
        }
    }
}

impl ElevationConfig {
    /// Create a configuration caching tiles under `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Default::default()
        }
    }

    /// Set the provider URL template.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Fetch tiles at a fixed zoom level.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Set the per-tile request timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the idle interval of the host loop.
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// Set the HTTP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum concurrent downloads.
    pub fn with_max_concurrent_downloads(mut self, max: usize) -> Self {
        self.max_concurrent_downloads = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ElevationConfig::new("/tmp/tiles");

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/tiles"));
        assert_eq!(config.url_template, TERRARIUM_URL_TEMPLATE);
        assert_eq!(config.zoom, None);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.idle_interval, Duration::from_millis(100));
        assert_eq!(config.max_concurrent_downloads, 8);
    }

    #[test]
    fn test_builder_chain() {
        let config = ElevationConfig::new("/tmp/tiles")
            .with_url_template("http://localhost/{z}/{x}/{y}.png")
            .with_zoom(12)
            .with_fetch_timeout(Duration::from_secs(3))
            .with_idle_interval(Duration::from_millis(20))
            .with_connect_timeout(Duration::from_secs(1))
            .with_max_concurrent_downloads(2);

        assert_eq!(config.url_template, "http://localhost/{z}/{x}/{y}.png");
        assert_eq!(config.zoom, Some(12));
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.idle_interval, Duration::from_millis(20));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.max_concurrent_downloads, 2);
    }
}
