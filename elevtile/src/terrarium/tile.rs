//! Decoded elevation tile

use crate::coord::TileCoordinate;

/// Edge length of a terrarium tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// A decoded tile: one elevation sample in meters per pixel, row-major from
/// the north-west corner. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationTile {
    coordinate: TileCoordinate,
    samples: Vec<f32>,
}

impl ElevationTile {
    /// Builds a tile from exactly `TILE_SIZE * TILE_SIZE` samples.
    ///
    /// Returns `None` if the sample count is wrong.
    pub fn from_samples(coordinate: TileCoordinate, samples: Vec<f32>) -> Option<Self> {
        if samples.len() != (TILE_SIZE * TILE_SIZE) as usize {
            return None;
        }
        Some(Self {
            coordinate,
            samples,
        })
    }

    /// A tile with the same elevation everywhere.
    pub fn filled(coordinate: TileCoordinate, elevation: f32) -> Self {
        Self {
            coordinate,
            samples: vec![elevation; (TILE_SIZE * TILE_SIZE) as usize],
        }
    }

    pub fn coordinate(&self) -> TileCoordinate {
        self.coordinate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Elevation of the pixel at column `px`, row `py`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= TILE_SIZE`.
    #[inline]
    pub fn sample(&self, px: u32, py: u32) -> f32 {
        assert!(px < TILE_SIZE && py < TILE_SIZE, "pixel ({}, {}) outside tile", px, py);
        self.samples[(py * TILE_SIZE + px) as usize]
    }

    /// Lowest and highest elevation in the tile.
    pub fn elevation_range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}
