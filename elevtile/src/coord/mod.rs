//! Coordinate conversion module
//!
//! Provides conversions between the three coordinate systems the elevation
//! pipeline works in: meters on a local tangent plane, geographic degrees,
//! and EPSG:3857 (spherical Web Mercator) projected meters.

mod srs;
mod types;

pub use srs::SpatialReferenceSystem;
pub use types::{
    CoordError, GeoPoint, LocalOffset, ProjectedCoordinate, TileCoordinate, EARTH_RADIUS, MAX_LAT,
    MAX_LON, MIN_LAT, MIN_LON, PROJECTED_EXTENT,
};

use std::f64::consts::FRAC_PI_4;

/// Projects geographic coordinates with the spherical Web Mercator formula.
///
/// # Errors
///
/// Returns [`CoordError::OutOfDomain`] if the latitude exceeds the projection
/// limit (about ±85.0511°) or the longitude lies outside ±180°.
#[inline]
pub fn project(geo: GeoPoint) -> Result<ProjectedCoordinate, CoordError> {
    if !geo.is_projectable() {
        return Err(CoordError::OutOfDomain {
            longitude: geo.longitude,
            latitude: geo.latitude,
        });
    }

    let x = EARTH_RADIUS * geo.longitude.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + geo.latitude.to_radians() / 2.0).tan().ln();

    Ok(ProjectedCoordinate::new(x, y))
}

/// Inverse of [`project`].
#[inline]
pub fn unproject(projected: ProjectedCoordinate) -> GeoPoint {
    let longitude = (projected.x / EARTH_RADIUS).to_degrees();
    let latitude = (2.0 * (projected.y / EARTH_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
    GeoPoint::new(longitude, latitude)
}
