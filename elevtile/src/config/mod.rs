//! User configuration stored in `~/.elevtile/config.ini`.

mod defaults;
mod file;
mod parser;
mod writer;

pub use defaults::{
    config_directory, config_file_path, default_cache_directory, default_log_directory,
    DEFAULT_IDLE_MS, DEFAULT_LOG_FILE, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS,
};
pub use file::{CacheSettings, ConfigFile, ConfigFileError, DownloadSettings, LogSettings};
