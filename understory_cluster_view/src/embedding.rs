// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The global embedding space and its tile partition.

use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;
use understory_tile_grid::{TileId, effective_size, tile_containing};

/// Tiles around a center tile, at most nine.
pub type Neighborhood = SmallVec<[TileId; 9]>;

/// Continuous 2D space in which item positions are given.
///
/// Fixed by the first cluster-tile response. At zoom level `z` the space is
/// partitioned into `2^z × 2^z` equally sized tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmbeddingSpace {
    bounds: Rect,
}

impl EmbeddingSpace {
    /// Creates the space from its bounds.
    ///
    /// The bounds are normalized, and an axis of zero extent is widened to
    /// one unit around its center so tiles never degenerate.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        let mut bounds = bounds.abs();
        if bounds.width() <= 0.0 || !bounds.width().is_finite() {
            let cx = if bounds.x0.is_finite() { bounds.x0 } else { 0.0 };
            bounds.x0 = cx - 0.5;
            bounds.x1 = cx + 0.5;
        }
        if bounds.height() <= 0.0 || !bounds.height().is_finite() {
            let cy = if bounds.y0.is_finite() { bounds.y0 } else { 0.0 };
            bounds.y0 = cy - 0.5;
            bounds.y1 = cy + 0.5;
        }
        Self { bounds }
    }

    /// Bounds of the space.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Size of one tile at `zoom`.
    #[must_use]
    pub fn tile_size(&self, zoom: u8) -> Size {
        effective_size(zoom, self.bounds.size())
    }

    /// Tile containing `point` at `zoom`, clamped to the partition.
    #[must_use]
    pub fn tile_at(&self, point: Point, zoom: u8) -> TileId {
        let last = TileId::tiles_per_side(zoom) - 1;
        let local = Point::new(point.x - self.bounds.x0, point.y - self.bounds.y0);
        let (x, y) = tile_containing(local, self.tile_size(zoom));
        TileId::new(zoom, x.min(last), y.min(last))
    }

    /// Footprint of `tile` in embedding units.
    #[must_use]
    pub fn tile_rect(&self, tile: TileId) -> Rect {
        let size = self.tile_size(tile.zoom);
        let origin = Point::new(
            self.bounds.x0 + f64::from(tile.x) * size.width,
            self.bounds.y0 + f64::from(tile.y) * size.height,
        );
        Rect::from_origin_size(origin, size)
    }

    /// `tile` and its up to eight neighbors, clipped at the edges of the space.
    ///
    /// Ordered row by row, top to bottom.
    #[must_use]
    pub fn neighborhood(&self, tile: TileId) -> Neighborhood {
        let last = TileId::tiles_per_side(tile.zoom) - 1;
        let mut out = Neighborhood::new();
        for y in tile.y.saturating_sub(1)..=tile.y.saturating_add(1).min(last) {
            for x in tile.x.saturating_sub(1)..=tile.x.saturating_add(1).min(last) {
                out.push(TileId::new(tile.zoom, x, y));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size};
    use understory_tile_grid::TileId;

    use super::EmbeddingSpace;

    fn space() -> EmbeddingSpace {
        EmbeddingSpace::new(Rect::new(-4.0, -4.0, 4.0, 4.0))
    }

    #[test]
    fn tiles_partition_the_space() {
        let s = space();
        assert_eq!(s.tile_size(0), Size::new(8.0, 8.0));
        assert_eq!(s.tile_size(2), Size::new(2.0, 2.0));
        assert_eq!(s.tile_at(Point::new(-4.0, -4.0), 2), TileId::new(2, 0, 0));
        assert_eq!(s.tile_at(Point::new(1.0, -0.5), 2), TileId::new(2, 2, 1));
        // The far edge belongs to the last tile.
        assert_eq!(s.tile_at(Point::new(4.0, 4.0), 2), TileId::new(2, 3, 3));
        assert_eq!(s.tile_rect(TileId::new(2, 2, 1)), Rect::new(0.0, -2.0, 2.0, 0.0));
    }

    #[test]
    fn neighborhood_is_clipped_at_edges() {
        let s = space();
        assert_eq!(s.neighborhood(TileId::ROOT).as_slice(), [TileId::ROOT]);
        assert_eq!(s.neighborhood(TileId::new(2, 0, 0)).len(), 4);
        assert_eq!(s.neighborhood(TileId::new(2, 3, 1)).len(), 6);
        let inner = s.neighborhood(TileId::new(2, 1, 2));
        assert_eq!(inner.len(), 9);
        assert_eq!(inner[0], TileId::new(2, 0, 1));
        assert_eq!(inner[8], TileId::new(2, 2, 3));
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let s = EmbeddingSpace::new(Rect::new(3.0, 1.0, 3.0, 5.0));
        assert_eq!(s.bounds(), Rect::new(2.5, 1.0, 3.5, 5.0));
    }
}
