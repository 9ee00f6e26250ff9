//! Local tangent plane to EPSG:3857 conversion.

use super::types::{CoordError, GeoPoint, LocalOffset, ProjectedCoordinate, EARTH_RADIUS};
use super::{project, unproject};

/// Converts between meters around a fixed origin and projected coordinates.
///
/// Local offsets are mapped to degrees with an equirectangular approximation
/// centred on the origin, which is accurate for the few-kilometre areas a
/// height raster covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialReferenceSystem {
    origin: GeoPoint,
}

impl SpatialReferenceSystem {
    /// Creates a reference system anchored at the given longitude/latitude.
    pub fn new(origin_longitude: f64, origin_latitude: f64) -> Self {
        Self {
            origin: GeoPoint::new(origin_longitude, origin_latitude),
        }
    }

    /// The origin of the local plane.
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Converts a local offset to geographic degrees.
    ///
    /// The result is not range checked.
    pub fn to_geographic(&self, local: LocalOffset) -> GeoPoint {
        let cos_lat = self.origin.latitude.to_radians().cos();
        let latitude = self.origin.latitude + (local.north / EARTH_RADIUS).to_degrees();
        let longitude = self.origin.longitude + (local.east / (EARTH_RADIUS * cos_lat)).to_degrees();
        GeoPoint::new(longitude, latitude)
    }

    /// Converts a local offset to a projected coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::OutOfDomain`] when the offset lands beyond the
    /// Web Mercator latitude limit or past the antimeridian.
    pub fn to_projected(&self, local: LocalOffset) -> Result<ProjectedCoordinate, CoordError> {
        project(self.to_geographic(local))
    }

    /// Converts a projected coordinate back to a local offset.
    pub fn to_local(&self, projected: ProjectedCoordinate) -> LocalOffset {
        let geo = unproject(projected);
        let cos_lat = self.origin.latitude.to_radians().cos();
        LocalOffset::new(
            (geo.longitude - self.origin.longitude).to_radians() * EARTH_RADIUS * cos_lat,
            (geo.latitude - self.origin.latitude).to_radians() * EARTH_RADIUS,
        )
    }
}
