//! Error types for batch downloads and the elevation pipeline.

use crate::coord::{CoordError, TileCoordinate};
use crate::job::FetchFailure;
use crate::provider::ProviderError;
use crate::raster::ExportError;
use thiserror::Error;

/// Outcome of a batch that did not produce a complete tile set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    /// A tile failed permanently and the rest of the batch was cancelled.
    #[error("Tile {tile} failed: {reason}")]
    Failed {
        tile: TileCoordinate,
        reason: FetchFailure,
    },

    /// The user aborted the download.
    #[error("Download cancelled")]
    Cancelled,

    /// Tiles were requested before every job settled.
    #[error("Batch incomplete: {settled} of {total} tiles available")]
    Incomplete { settled: usize, total: usize },
}

/// Top-level error of the elevation pipeline.
#[derive(Debug, Error)]
pub enum ElevationError {
    /// The requested area falls outside the projection.
    #[error("Requested area is outside the projection: {0}")]
    OutOfDomain(#[from] CoordError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Invalid pipeline configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP client could not be set up.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Writing the height raster failed.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_batch_failure_names_tile() {
        let err = BatchError::Failed {
            tile: TileCoordinate::new(15, 3, 4),
            reason: FetchFailure::Timeout {
                elapsed: Duration::from_secs(11),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("15/3/4"), "{}", msg);
    }

    #[test]
    fn test_batch_error_is_transparent() {
        let err: ElevationError = BatchError::Cancelled.into();
        assert_eq!(err.to_string(), "Download cancelled");
    }
}
