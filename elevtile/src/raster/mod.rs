//! Output rasters
//!
//! The [`Reprojector`] samples a [`TileSet`](crate::model::TileSet) into a
//! floating-point [`ElevationGrid`] on the local meter grid of a request, and
//! the [`HeightRasterEncoder`] packs that grid into the fixed-point
//! [`HeightRaster`] handed to terrain consumers.

mod encode;
mod grid;
mod height;
mod layers;
mod reproject;

pub use encode::{encode_elevation, EncodeStats, HeightRasterEncoder, ZERO_OFFSET};
pub use grid::ElevationGrid;
pub use height::{ExportError, HeightRaster, RasterFormat};
pub use layers::{PaintLayer, FULL_WEIGHT};
pub use reproject::Reprojector;
