//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use elevtile::cache::CacheError;
use elevtile::config::ConfigFileError;
use elevtile::model::{BatchError, ElevationError};
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Async runtime could not be started
    Runtime(std::io::Error),
    /// Elevation pipeline failed
    Elevation(ElevationError),
    /// User pressed Ctrl-C during a download
    Cancelled,
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// Cache maintenance failed
    Cache(CacheError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        if let CliError::Cancelled = self {
            eprintln!("Cancelled.");
            process::exit(130);
        }

        eprintln!("Error: {}", self);

        if let CliError::Elevation(ElevationError::Batch(BatchError::Failed { .. })) = self {
            eprintln!();
            eprintln!("No height raster was written. Cached tiles are kept, so");
            eprintln!("running the command again only fetches what is missing.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Elevation(e) => write!(f, "{}", e),
            CliError::Cancelled => write!(f, "Cancelled by user"),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Elevation(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ElevationError> for CliError {
    fn from(e: ElevationError) -> Self {
        match e {
            ElevationError::Batch(BatchError::Cancelled) => CliError::Cancelled,
            other => CliError::Elevation(other),
        }
    }
}

impl From<BatchError> for CliError {
    fn from(e: BatchError) -> Self {
        ElevationError::from(e).into()
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_batch_maps_to_cancelled() {
        let err: CliError = BatchError::Cancelled.into();
        assert!(matches!(err, CliError::Cancelled));
    }

    #[test]
    fn test_batch_incomplete_keeps_message() {
        let err: CliError = BatchError::Incomplete {
            settled: 1,
            total: 4,
        }
        .into();
        assert_eq!(err.to_string(), "Batch incomplete: 1 of 4 tiles available");
    }
}
