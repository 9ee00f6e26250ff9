//! Tiled map scheme definition

use crate::coord::{CoordError, ProjectedCoordinate, TileCoordinate, PROJECTED_EXTENT};

/// Public AWS terrarium elevation tiles.
pub const TERRARIUM_URL_TEMPLATE: &str =
    "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png";

/// Pixel edge length of a terrarium tile.
const TERRARIUM_TILE_SIZE: u32 = 256;

/// Terrarium tiles exist for zoom levels 0 through 15.
const TERRARIUM_ZOOM_LEVELS: u8 = 16;

/// Tile indices are `u32`, so zoom 31 is the deepest addressable level.
const MAX_ZOOM_LEVELS: u8 = 32;

/// A projected coordinate located on the pixel grid of one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPosition {
    /// Tile containing the position.
    pub tile: TileCoordinate,
    /// Column in global pixel space (`tile.x * tile_size + offset`).
    pub global_x: f64,
    /// Row in global pixel space (`tile.y * tile_size + offset`).
    pub global_y: f64,
}

/// Axis-aligned extent in projected meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ProjectedBounds {
    /// Returns true if the coordinate lies inside or on the bounds.
    pub fn contains(&self, p: ProjectedCoordinate) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Fixed tiling scheme: tile size, available zoom levels and URL template.
///
/// The template is substituted literally: `{z}`, `{x}` and `{y}` are replaced
/// by the tile's zoom, column and row.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledMapScheme {
    tile_size_pixels: u32,
    num_zoom_levels: u8,
    url_template: String,
}

impl Default for TiledMapScheme {
    fn default() -> Self {
        Self::terrarium()
    }
}

impl TiledMapScheme {
    /// Creates a scheme with an arbitrary layout.
    ///
    /// `num_zoom_levels` is capped at 32.
    pub fn new(tile_size_pixels: u32, num_zoom_levels: u8, url_template: impl Into<String>) -> Self {
        Self {
            tile_size_pixels,
            num_zoom_levels: num_zoom_levels.min(MAX_ZOOM_LEVELS),
            url_template: url_template.into(),
        }
    }

    /// The terrarium elevation pyramid hosted on AWS Open Data.
    pub fn terrarium() -> Self {
        Self::new(TERRARIUM_TILE_SIZE, TERRARIUM_ZOOM_LEVELS, TERRARIUM_URL_TEMPLATE)
    }

    /// Replaces the URL template, keeping the grid layout.
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    pub fn tile_size_pixels(&self) -> u32 {
        self.tile_size_pixels
    }

    pub fn num_zoom_levels(&self) -> u8 {
        self.num_zoom_levels
    }

    /// Highest zoom level, i.e. the finest resolution available.
    pub fn max_zoom(&self) -> u8 {
        self.num_zoom_levels.saturating_sub(1)
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Checks that the zoom level exists in this scheme.
    pub fn validate_zoom(&self, zoom: u8) -> Result<u8, CoordError> {
        if zoom < self.num_zoom_levels {
            Ok(zoom)
        } else {
            Err(CoordError::InvalidZoom {
                zoom,
                levels: self.num_zoom_levels,
            })
        }
    }

    /// Number of tiles along each axis at the zoom level.
    #[inline]
    pub fn tiles_per_axis(&self, zoom: u8) -> u32 {
        1u32.checked_shl(zoom as u32).unwrap_or(u32::MAX)
    }

    /// Edge length of one tile in projected meters.
    #[inline]
    pub fn tile_span(&self, zoom: u8) -> f64 {
        2.0 * PROJECTED_EXTENT / self.tiles_per_axis(zoom) as f64
    }

    /// Maps a projected coordinate to the tile containing it.
    ///
    /// Coordinates on the outer edge of the world are clamped into the last
    /// row or column.
    pub fn tile_index_for(&self, projected: ProjectedCoordinate, zoom: u8) -> TileCoordinate {
        let span = self.tile_span(zoom);
        let last = self.tiles_per_axis(zoom) - 1;

        let x = ((projected.x + PROJECTED_EXTENT) / span).floor();
        let y = ((PROJECTED_EXTENT - projected.y) / span).floor();

        TileCoordinate::new(zoom, clamp_index(x, last), clamp_index(y, last))
    }

    /// Locates a projected coordinate on the global pixel grid.
    ///
    /// Pixel `(0, 0)` covers the north-west corner of the world; a pixel's
    /// sample is taken to represent its centre.
    pub fn pixel_position(&self, projected: ProjectedCoordinate, zoom: u8) -> PixelPosition {
        let pixels_per_meter = self.tile_size_pixels as f64 / self.tile_span(zoom);
        PixelPosition {
            tile: self.tile_index_for(projected, zoom),
            global_x: (projected.x + PROJECTED_EXTENT) * pixels_per_meter,
            global_y: (PROJECTED_EXTENT - projected.y) * pixels_per_meter,
        }
    }

    /// Projected extent covered by a tile.
    pub fn tile_bounds(&self, tile: TileCoordinate) -> ProjectedBounds {
        let span = self.tile_span(tile.zoom);
        let min_x = -PROJECTED_EXTENT + tile.x as f64 * span;
        let max_y = PROJECTED_EXTENT - tile.y as f64 * span;
        ProjectedBounds {
            min_x,
            min_y: max_y - span,
            max_x: min_x + span,
            max_y,
        }
    }

    /// Builds the provider URL for a tile.
    pub fn url_for(&self, tile: TileCoordinate) -> String {
        self.url_template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

#[inline]
fn clamp_index(value: f64, last: u32) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= last as f64 {
        last
    } else {
        value as u32
    }
}
