//! Default values and well-known paths.

use std::path::PathBuf;

/// Per-tile request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Host loop idle interval in milliseconds.
pub const DEFAULT_IDLE_MS: u64 = 100;

/// Tile requests open at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Log file name inside the log directory.
pub const DEFAULT_LOG_FILE: &str = "elevtile.log";

/// Get the path to the config directory (~/.elevtile).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".elevtile")
}

/// Get the path to the config file (~/.elevtile/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Platform cache directory for terrarium tiles, falling back to the config
/// directory.
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("elevtile"))
        .unwrap_or_else(|| config_directory().join("cache"))
        .join("terrarium")
}

/// Get the default log directory (~/.elevtile/logs).
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_in_config_directory() {
        assert_eq!(config_file_path().parent(), Some(config_directory().as_path()));
        assert!(config_file_path().ends_with(".elevtile/config.ini"));
    }

    #[test]
    fn test_cache_directory_is_terrarium() {
        assert!(default_cache_directory().ends_with("terrarium"));
    }
}
