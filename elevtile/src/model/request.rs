//! Area requests.

use crate::coord::{
    CoordError, GeoPoint, LocalOffset, ProjectedCoordinate, SpatialReferenceSystem,
};

/// A square area centred on a geographic origin.
///
/// The footprint spans `radius_m` meters in each cardinal direction, so the
/// resulting height raster is `2 * radius_m` cells on a side at one meter per
/// cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRequest {
    origin: GeoPoint,
    radius_m: u32,
    layers: Vec<String>,
}

impl AreaRequest {
    pub fn new(longitude: f64, latitude: f64, radius_m: u32) -> Self {
        Self {
            origin: GeoPoint::new(longitude, latitude),
            radius_m,
            layers: Vec::new(),
        }
    }

    /// Names of the paint layers the consumer wants weight rasters for.
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Edge length of the output raster in cells.
    pub fn raster_size(&self) -> u32 {
        self.radius_m.saturating_mul(2)
    }

    /// Local reference frame centred on the origin.
    pub fn srs(&self) -> SpatialReferenceSystem {
        SpatialReferenceSystem::new(self.origin.longitude, self.origin.latitude)
    }

    /// South-west and north-east corners of the footprint in local meters.
    pub fn local_corners(&self) -> (LocalOffset, LocalOffset) {
        let r = self.radius_m as f64;
        (LocalOffset::new(-r, -r), LocalOffset::new(r, r))
    }

    /// South-west and north-east corners in projected meters.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::OutOfDomain`] if either corner falls outside the
    /// projection.
    pub fn projected_corners(&self) -> Result<(ProjectedCoordinate, ProjectedCoordinate), CoordError> {
        let srs = self.srs();
        let (sw, ne) = self.local_corners();
        Ok((srs.to_projected(sw)?, srs.to_projected(ne)?))
    }
}
