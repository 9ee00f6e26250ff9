//! Completed tile collections.

use super::error::BatchError;
use crate::coord::TileCoordinate;
use crate::terrarium::{ElevationTile, TILE_SIZE};
use crate::tiling::TileRange;
use std::collections::HashMap;

/// Every tile of a [`TileRange`], decoded and ready for sampling.
///
/// Sampling happens in global pixel space at the range's zoom level, where
/// pixel `(0, 0)` is the north-west corner of the world.
#[derive(Debug, Clone)]
pub struct TileSet {
    range: TileRange,
    tiles: HashMap<TileCoordinate, ElevationTile>,
}

impl TileSet {
    /// Builds a set that covers `range` completely.
    ///
    /// Tiles outside the range are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Incomplete`] if a tile of the range is missing.
    pub fn new(
        range: TileRange,
        tiles: impl IntoIterator<Item = ElevationTile>,
    ) -> Result<Self, BatchError> {
        let tiles: HashMap<_, _> = tiles
            .into_iter()
            .filter(|t| range.contains(t.coordinate()))
            .map(|t| (t.coordinate(), t))
            .collect();

        if tiles.len() != range.len() {
            return Err(BatchError::Incomplete {
                settled: tiles.len(),
                total: range.len(),
            });
        }

        Ok(Self { range, tiles })
    }

    pub fn range(&self) -> TileRange {
        self.range
    }

    pub fn zoom(&self) -> u8 {
        self.range.zoom
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, coordinate: TileCoordinate) -> Option<&ElevationTile> {
        self.tiles.get(&coordinate)
    }

    /// Bilinearly interpolated elevation at a global pixel position.
    ///
    /// Each pixel's sample sits at its centre. Positions beyond the covered
    /// rectangle are clamped to its edge pixels.
    pub fn sample_global(&self, global_x: f64, global_y: f64) -> f32 {
        let (x_lo, x_hi) = self.pixel_extent(self.range.min_x, self.range.max_x);
        let (y_lo, y_hi) = self.pixel_extent(self.range.min_y, self.range.max_y);

        let fx = (global_x - 0.5).clamp(x_lo as f64, x_hi as f64);
        let fy = (global_y - 0.5).clamp(y_lo as f64, y_hi as f64);

        let x0 = fx.floor() as u64;
        let y0 = fy.floor() as u64;
        let x1 = (x0 + 1).min(x_hi);
        let y1 = (y0 + 1).min(y_hi);
        let tx = (fx - x0 as f64) as f32;
        let ty = (fy - y0 as f64) as f32;

        let top = lerp(self.pixel(x0, y0), self.pixel(x1, y0), tx);
        let bottom = lerp(self.pixel(x0, y1), self.pixel(x1, y1), tx);
        lerp(top, bottom, ty)
    }

    /// First and last global pixel index covered by tiles `min..=max`.
    fn pixel_extent(&self, min: u32, max: u32) -> (u64, u64) {
        let size = TILE_SIZE as u64;
        (min as u64 * size, (max as u64 + 1) * size - 1)
    }

    fn pixel(&self, gx: u64, gy: u64) -> f32 {
        let size = TILE_SIZE as u64;
        let coordinate =
            TileCoordinate::new(self.range.zoom, (gx / size) as u32, (gy / size) as u32);
        self.tiles
            .get(&coordinate)
            .map(|tile| tile.sample((gx % size) as u32, (gy % size) as u32))
            .unwrap_or(0.0)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
