//! Elevation model: planning and driving tile batches for an area.
//!
//! ```text
//! AreaRequest ──plan_batch──► DownloadBatch ──step()*──► TileSet ──► Reprojector
//! ```

mod batch;
mod config;
mod elevation;
mod error;
mod request;
mod tiles;

pub use batch::{BatchStatus, DownloadBatch, DownloadStats, StepReport};
pub use config::{
    ElevationConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IDLE_INTERVAL, DEFAULT_MAX_CONCURRENT_DOWNLOADS,
};
pub use elevation::ElevationModel;
pub use error::{BatchError, ElevationError};
pub use request::AreaRequest;
pub use tiles::TileSet;
