//! Tiling scheme for the elevation pyramid.
//!
//! Maps projected coordinates onto the XYZ tile grid of a provider and builds
//! provider URLs for individual tiles.

mod range;
mod scheme;

pub use range::{TileRange, TileRangeIter};
pub use scheme::{PixelPosition, ProjectedBounds, TiledMapScheme, TERRARIUM_URL_TEMPLATE};
