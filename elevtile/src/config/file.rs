//! Configuration file handling for ~/.elevtile/config.ini.
//!
//! Missing files and missing keys fall back to defaults; parsing lives in
//! [`super::parser`] and serialization in [`super::writer`].

use super::defaults::{
    config_file_path, default_cache_directory, default_log_directory, DEFAULT_IDLE_MS,
    DEFAULT_LOG_FILE, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS,
};
use crate::model::ElevationConfig;
use crate::tiling::TERRARIUM_URL_TEMPLATE;
use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub directory: PathBuf,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
    pub idle_ms: u64,
    pub max_concurrent: usize,
    pub url_template: String,
    /// Fixed zoom level; `None` uses the highest available.
    pub zoom: Option<u8>,
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub directory: PathBuf,
    pub file: String,
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub log: LogSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            cache: CacheSettings {
                directory: default_cache_directory(),
            },
            download: DownloadSettings {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                idle_ms: DEFAULT_IDLE_MS,
                max_concurrent: DEFAULT_MAX_CONCURRENT,
                url_template: TERRARIUM_URL_TEMPLATE.to_string(),
                zoom: None,
            },
            log: LogSettings {
                directory: default_log_directory(),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.elevtile/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Pipeline configuration described by this file.
    pub fn to_elevation_config(&self) -> ElevationConfig {
        let config = ElevationConfig::new(&self.cache.directory)
            .with_url_template(&self.download.url_template)
            .with_fetch_timeout(Duration::from_secs(self.download.timeout_secs))
            .with_idle_interval(Duration::from_millis(self.download.idle_ms))
            .with_max_concurrent_downloads(self.download.max_concurrent);

        match self.download.zoom {
            Some(zoom) => config.with_zoom(zoom),
            None => config,
        }
    }
}
