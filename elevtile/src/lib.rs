//! elevtile - terrain height rasters from terrarium elevation tiles
//!
//! Given a geographic origin and a radius, the library works out which
//! Web Mercator tiles cover the area, fetches them through a disk cache with
//! a non-blocking, all-or-nothing batch downloader, decodes the terrarium
//! PNG encoding and resamples the result into a fixed-point height raster.
//!
//! ```no_run
//! use elevtile::model::{AreaRequest, ElevationConfig, ElevationModel};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), elevtile::model::ElevationError> {
//! let model = ElevationModel::from_config(
//!     ElevationConfig::default(),
//!     tokio::runtime::Handle::current(),
//! )?;
//! let request = AreaRequest::new(7.6586, 45.9763, 2000);
//! let raster = model
//!     .build_height_raster(&request, &CancellationToken::new())
//!     .await?;
//! println!("{}x{}", raster.width(), raster.height());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod job;
pub mod logging;
pub mod model;
pub mod provider;
pub mod raster;
pub mod terrarium;
pub mod tiling;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
