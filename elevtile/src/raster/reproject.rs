//! Tile set to local grid reprojection

use super::encode::HeightRasterEncoder;
use super::grid::ElevationGrid;
use super::height::HeightRaster;
use crate::coord::LocalOffset;
use crate::model::{AreaRequest, TileSet};
use crate::tiling::TiledMapScheme;
use rayon::prelude::*;
use tracing::debug;

/// Resamples decoded tiles onto the one-meter grid of an area request.
#[derive(Debug, Clone, Default)]
pub struct Reprojector {
    scheme: TiledMapScheme,
}

impl Reprojector {
    pub fn new(scheme: TiledMapScheme) -> Self {
        Self { scheme }
    }

    /// Samples the elevation of every cell of the request's grid.
    ///
    /// Cell `(x, y)` lies `x - radius` meters east and `radius - y` meters
    /// north of the origin. Cells whose position cannot be projected are left
    /// at zero.
    pub fn sample_grid(&self, tiles: &TileSet, request: &AreaRequest) -> ElevationGrid {
        let size = request.raster_size();
        let radius = request.radius_m() as f64;
        let srs = request.srs();
        let zoom = tiles.zoom();

        let mut grid = ElevationGrid::new(size, size);
        if size == 0 {
            return grid;
        }

        grid.samples_mut()
            .par_chunks_mut(size as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let north = radius - y as f64;
                for (x, cell) in row.iter_mut().enumerate() {
                    let local = LocalOffset::new(x as f64 - radius, north);
                    *cell = match srs.to_projected(local) {
                        Ok(projected) => {
                            let pos = self.scheme.pixel_position(projected, zoom);
                            tiles.sample_global(pos.global_x, pos.global_y)
                        }
                        Err(_) => 0.0,
                    };
                }
            });

        debug!(width = size, height = size, zoom, "Reprojected elevation grid");
        grid
    }

    /// Samples and encodes the request's height raster.
    pub fn reproject(&self, tiles: &TileSet, request: &AreaRequest) -> HeightRaster {
        let grid = self.sample_grid(tiles, request);
        HeightRasterEncoder::new().encode(&grid).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoordinate;
    use crate::raster::ZERO_OFFSET;
    use crate::terrarium::{ElevationTile, TILE_SIZE};
    use crate::tiling::TileRange;

    /// Tiles whose elevation equals the global pixel column.
    fn column_tiles(range: TileRange) -> TileSet {
        let tiles = range.iter().map(|coordinate| {
            let base = coordinate.x * TILE_SIZE;
            let samples = (0..TILE_SIZE * TILE_SIZE)
                .map(|i| ((base + i % TILE_SIZE) % 1000) as f32)
                .collect();
            ElevationTile::from_samples(coordinate, samples).unwrap()
        });
        TileSet::new(range, tiles).unwrap()
    }

    fn plan(request: &AreaRequest, scheme: &TiledMapScheme, zoom: u8) -> TileRange {
        let (sw, ne) = request.projected_corners().unwrap();
        TileRange::spanning(scheme.tile_index_for(sw, zoom), scheme.tile_index_for(ne, zoom))
    }

    #[test]
    fn test_flat_tiles_give_flat_raster() {
        let scheme = TiledMapScheme::terrarium();
        let request = AreaRequest::new(-122.4, 37.8, 40);
        let range = plan(&request, &scheme, 15);
        let tiles = TileSet::new(range, range.iter().map(|c| ElevationTile::filled(c, 55.0))).unwrap();

        let raster = Reprojector::new(scheme).reproject(&tiles, &request);

        assert_eq!((raster.width(), raster.height()), (80, 80));
        assert!(raster.data().iter().all(|&v| v == ZERO_OFFSET + 55));
    }

    #[test]
    fn test_elevation_increases_eastward() {
        let scheme = TiledMapScheme::terrarium();
        // Keep the footprint inside one block of 1000 pixel columns.
        let request = AreaRequest::new(0.001, 0.0, 30);
        let range = plan(&request, &scheme, 15);
        let tiles = column_tiles(range);

        let grid = Reprojector::new(scheme).sample_grid(&tiles, &request);

        let row = 30;
        let west = grid.get(0, row).unwrap();
        let east = grid.get(59, row).unwrap();
        assert!(east > west, "west {} east {}", west, east);
        for x in 1..60 {
            assert!(grid.get(x, row).unwrap() >= grid.get(x - 1, row).unwrap());
        }
    }

    #[test]
    fn test_rows_run_north_to_south() {
        let scheme = TiledMapScheme::terrarium();
        let request = AreaRequest::new(0.0, 0.001, 30);
        let range = plan(&request, &scheme, 15);
        let tiles = TileSet::new(
            range,
            range.iter().map(|c| {
                let base = c.y * TILE_SIZE;
                let samples = (0..TILE_SIZE * TILE_SIZE)
                    .map(|i| (base + i / TILE_SIZE) as f32)
                    .collect();
                ElevationTile::from_samples(c, samples).unwrap()
            }),
        )
        .unwrap();

        let grid = Reprojector::new(scheme).sample_grid(&tiles, &request);

        // Elevation grows with the global row index, i.e. southward.
        assert!(grid.get(10, 0).unwrap() < grid.get(10, 59).unwrap());
    }

    #[test]
    fn test_zero_radius_gives_empty_raster() {
        let tiles = TileSet::new(
            TileRange::spanning(TileCoordinate::new(0, 0, 0), TileCoordinate::new(0, 0, 0)),
            [ElevationTile::filled(TileCoordinate::new(0, 0, 0), 1.0)],
        )
        .unwrap();
        let raster = Reprojector::default().reproject(&tiles, &AreaRequest::new(0.0, 0.0, 0));
        assert!(raster.data().is_empty());
    }
}
