//! Fixed-point height encoding

use super::grid::ElevationGrid;
use super::height::HeightRaster;
use tracing::warn;

/// Raster value representing sea level.
pub const ZERO_OFFSET: u16 = 32768;

/// Encodes one elevation, clamping to the `u16` range.
///
/// Returns the encoded value and whether it was clamped. NaN encodes as sea
/// level.
#[inline]
pub fn encode_elevation(elevation: f32) -> (u16, bool) {
    if elevation.is_nan() {
        return (ZERO_OFFSET, false);
    }
    let value = ZERO_OFFSET as f64 + (elevation as f64).round();
    if value < 0.0 {
        (0, true)
    } else if value > u16::MAX as f64 {
        (u16::MAX, true)
    } else {
        (value as u16, false)
    }
}

/// Clamp counts collected while encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Samples below the representable range.
    pub clamped_low: usize,
    /// Samples above the representable range.
    pub clamped_high: usize,
}

impl EncodeStats {
    pub fn clamped(&self) -> usize {
        self.clamped_low + self.clamped_high
    }
}

/// Packs elevation grids into height rasters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeightRasterEncoder;

impl HeightRasterEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes every sample as `ZERO_OFFSET + round(elevation)`.
    pub fn encode(&self, grid: &ElevationGrid) -> (HeightRaster, EncodeStats) {
        let mut stats = EncodeStats::default();
        let data = grid
            .samples()
            .iter()
            .map(|&elevation| {
                let (value, clamped) = encode_elevation(elevation);
                if clamped {
                    if value == 0 {
                        stats.clamped_low += 1;
                    } else {
                        stats.clamped_high += 1;
                    }
                }
                value
            })
            .collect();

        if stats.clamped() > 0 {
            warn!(
                clamped_low = stats.clamped_low,
                clamped_high = stats.clamped_high,
                "Elevations outside the height raster range were clamped"
            );
        }

        (HeightRaster::from_data(grid.width(), grid.height(), data), stats)
    }
}
