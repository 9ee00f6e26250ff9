//! Common types and utilities shared across CLI commands.

use clap::Args;
use elevtile::config::ConfigFile;
use elevtile::model::{AreaRequest, ElevationConfig};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::error::CliError;

/// Area selection shared by `fetch` and `plan`.
#[derive(Debug, Clone, Args)]
pub struct AreaArgs {
    /// Longitude of the area centre in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude of the area centre in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Half the edge length of the square area, in meters
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub radius: u32,

    /// Zoom level to fetch (0-15, default: most detailed)
    #[arg(long)]
    pub zoom: Option<u8>,
}

impl AreaArgs {
    pub fn request(&self) -> AreaRequest {
        AreaRequest::new(self.lon, self.lat, self.radius)
    }
}

/// Load the config file, from `path` when given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Library configuration with command-line overrides applied.
pub fn elevation_config(
    config: &ConfigFile,
    cache_dir: Option<&PathBuf>,
    zoom: Option<u8>,
) -> ElevationConfig {
    let mut elevation = config.to_elevation_config();
    if let Some(dir) = cache_dir {
        elevation.cache_dir = dir.clone();
    }
    if let Some(zoom) = zoom {
        elevation.zoom = Some(zoom);
    }
    elevation
}

/// Multi-threaded runtime that carries tile requests and cache writes.
pub fn build_runtime() -> Result<Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("elevtile-io")
        .build()
        .map_err(CliError::Runtime)
}

/// Format a byte count using binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
