//! Inclusive rectangles of tiles

use crate::coord::TileCoordinate;

/// Inclusive rectangle of tile indices at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Builds the range spanned by two corner tiles, in any order.
    pub fn spanning(a: TileCoordinate, b: TileCoordinate) -> Self {
        debug_assert_eq!(a.zoom, b.zoom, "corner tiles must share a zoom level");
        Self {
            zoom: a.zoom,
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Number of tiles in the range.
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// A range always holds at least one tile.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, tile: TileCoordinate) -> bool {
        tile.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Iterates the tiles in row-major order, north to south.
    pub fn iter(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            next: 0,
        }
    }
}

impl IntoIterator for TileRange {
    type Item = TileCoordinate;
    type IntoIter = TileRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Row-major iterator over a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIter {
    range: TileRange,
    next: usize,
}

impl Iterator for TileRangeIter {
    type Item = TileCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.range.len() {
            return None;
        }

        let width = self.range.width() as usize;
        let x = self.range.min_x + (self.next % width) as u32;
        let y = self.range.min_y + (self.next / width) as u32;
        self.next += 1;

        Some(TileCoordinate::new(self.range.zoom, x, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.range.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileRangeIter {}
