//! Coordinate type definitions

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Web Mercator valid latitude range (`atan(sinh(π))` in degrees)
pub const MIN_LAT: f64 = -85.051_128_779_806_59;
pub const MAX_LAT: f64 = 85.051_128_779_806_59;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Radius of the sphere used by EPSG:3857, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the width of the projected world, in meters (`π * EARTH_RADIUS`).
pub const PROJECTED_EXTENT: f64 = std::f64::consts::PI * EARTH_RADIUS;

/// Errors raised by coordinate conversions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// The location falls outside the projection's valid domain.
    #[error("location ({longitude:.6}, {latitude:.6}) is outside the Web Mercator domain")]
    OutOfDomain { longitude: f64, latitude: f64 },

    /// The tiling scheme has no such zoom level.
    #[error("zoom level {zoom} is not available (scheme has {levels} levels)")]
    InvalidZoom { zoom: u8, levels: u8 },
}

/// Identifies one tile of the elevation pyramid.
///
/// Uses the XYZ convention: `x` grows eastward, `y` grows southward, both
/// starting at 0 in the north-west corner of the projected world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileCoordinate {
    /// Zoom level
    pub zoom: u8,
    /// Column, 0 at 180°W
    pub x: u32,
    /// Row, 0 at the northern edge of the projection
    pub y: u32,
}

impl TileCoordinate {
    /// Creates a tile coordinate.
    #[inline]
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Offset from the configured origin on the local tangent plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalOffset {
    /// Meters east of the origin
    pub east: f64,
    /// Meters north of the origin
    pub north: f64,
}

impl LocalOffset {
    #[inline]
    pub fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }
}

/// Geographic location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns true if the point can be represented in EPSG:3857.
    #[inline]
    pub fn is_projectable(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.latitude)
            && (MIN_LON..=MAX_LON).contains(&self.longitude)
    }
}

/// Planar EPSG:3857 coordinate in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectedCoordinate {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
}

impl ProjectedCoordinate {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
