// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadrant stitching: splitting an effective window across up to four tiles.
//!
//! The effective window is exactly one tile in size, so its top-left corner
//! falls into a *primary* tile and the rest of the window spills into the
//! right, bottom and diagonal neighbors. If the corner sits at cell
//! `(cx, cy)` of the primary tile, then:
//!
//! - the primary tile owes cells `cx..N × cy..N`,
//! - the right neighbor owes `0..cx × cy..N`,
//! - the bottom neighbor owes `cx..N × 0..cy`,
//! - the diagonal neighbor owes `0..cx × 0..cy`.
//!
//! Together these are exactly `N²` distinct cells. A neighbor that owes
//! nothing (window aligned to a tile boundary) is still reported, with an
//! empty range.

use core::ops::Range;

use crate::math::{CellCoord, TileId, local_cell, tile_containing};
use crate::window::EffectiveWindow;

/// Position of a tile relative to the tile holding the window's corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Tile containing the window's top-left corner.
    Primary,
    /// Neighbor to the right of the primary tile.
    Right,
    /// Neighbor below the primary tile.
    Bottom,
    /// Neighbor to the bottom right of the primary tile.
    Diagonal,
}

impl Quadrant {
    /// All quadrants in processing order.
    pub const ALL: [Self; 4] = [Self::Primary, Self::Right, Self::Bottom, Self::Diagonal];

    const fn slot(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Diagonal => 3,
        }
    }
}

/// A rectangular range of local cells inside one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    /// Columns.
    pub x: Range<u32>,
    /// Rows.
    pub y: Range<u32>,
}

impl CellRange {
    /// Creates a range from column and row ranges.
    #[must_use]
    pub fn new(x: Range<u32>, y: Range<u32>) -> Self {
        Self { x, y }
    }

    /// Number of cells in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len() * self.y.len()
    }

    /// Returns `true` if the range holds no cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    /// Returns `true` if `cell` lies in the range.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.x.contains(&cell.x) && self.y.contains(&cell.y)
    }

    /// Top-left cell of the range.
    #[must_use]
    pub fn origin(&self) -> CellCoord {
        CellCoord::new(self.x.start, self.y.start)
    }

    /// Cells of the range in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.y
            .clone()
            .flat_map(move |y| self.x.clone().map(move |x| CellCoord::new(x, y)))
    }
}

/// One tile's share of the visible region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuadrantCells {
    /// Where the tile sits relative to the primary tile.
    pub quadrant: Quadrant,
    /// The contributing tile.
    pub tile: TileId,
    /// Local cells the tile contributes; possibly empty.
    pub cells: CellRange,
}

/// The up to four tiles intersecting an effective window, with the cells each
/// one contributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleRegion {
    cells_per_side: u32,
    corner: CellCoord,
    quadrants: [QuadrantCells; 4],
}

impl VisibleRegion {
    /// Splits `window` at `zoom` across its tiles, for `cells_per_side` cells per tile side.
    ///
    /// The window's own size is used as the tile size, since a tile's
    /// footprint equals one effective window at its zoom level.
    #[must_use]
    pub fn compute(zoom: u8, window: &EffectiveWindow, cells_per_side: u32) -> Self {
        let n = cells_per_side.max(1);
        let (tx, ty) = tile_containing(window.origin, window.size);
        let corner = local_cell(window.origin, (tx, ty), window.size, n);
        let primary = TileId::new(zoom, tx, ty);
        let (cx, cy) = (corner.x, corner.y);
        let quadrants = [
            QuadrantCells {
                quadrant: Quadrant::Primary,
                tile: primary,
                cells: CellRange::new(cx..n, cy..n),
            },
            QuadrantCells {
                quadrant: Quadrant::Right,
                tile: primary.right(),
                cells: CellRange::new(0..cx, cy..n),
            },
            QuadrantCells {
                quadrant: Quadrant::Bottom,
                tile: primary.below(),
                cells: CellRange::new(cx..n, 0..cy),
            },
            QuadrantCells {
                quadrant: Quadrant::Diagonal,
                tile: primary.diagonal(),
                cells: CellRange::new(0..cx, 0..cy),
            },
        ];
        Self {
            cells_per_side: n,
            corner,
            quadrants,
        }
    }

    /// Number of cells per tile side.
    #[must_use]
    pub fn cells_per_side(&self) -> u32 {
        self.cells_per_side
    }

    /// Cell of the primary tile under the window's top-left corner.
    #[must_use]
    pub fn corner_cell(&self) -> CellCoord {
        self.corner
    }

    /// The tile containing the window's top-left corner.
    #[must_use]
    pub fn primary_tile(&self) -> TileId {
        self.quadrants[0].tile
    }

    /// Share of one quadrant.
    #[must_use]
    pub fn quadrant(&self, quadrant: Quadrant) -> &QuadrantCells {
        &self.quadrants[quadrant.slot()]
    }

    /// Cells contributed by `tile`, if it is one of the four tiles.
    #[must_use]
    pub fn cells_for(&self, tile: TileId) -> Option<&CellRange> {
        self.quadrants
            .iter()
            .find(|q| q.tile == tile)
            .map(|q| &q.cells)
    }

    /// All four quadrants in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &QuadrantCells> + '_ {
        self.quadrants.iter()
    }

    /// Quadrants that contribute at least one cell.
    pub fn contributing(&self) -> impl Iterator<Item = &QuadrantCells> + '_ {
        self.quadrants.iter().filter(|q| !q.cells.is_empty())
    }

    /// Total number of contributed cells; always `N²`.
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.quadrants.iter().map(|q| q.cells.len()).sum()
    }

    /// Real-window offset at which the right and bottom neighbors start.
    ///
    /// This is the number of columns and rows the primary tile contributes.
    #[must_use]
    pub fn shift(&self) -> CellCoord {
        CellCoord::new(
            self.cells_per_side - self.corner.x,
            self.cells_per_side - self.corner.y,
        )
    }

    /// Real-window cell at which `quadrant`'s contribution is anchored.
    #[must_use]
    pub fn anchor(&self, quadrant: Quadrant) -> CellCoord {
        let shift = self.shift();
        match quadrant {
            Quadrant::Primary => CellCoord::new(0, 0),
            Quadrant::Right => CellCoord::new(shift.x, 0),
            Quadrant::Bottom => CellCoord::new(0, shift.y),
            Quadrant::Diagonal => shift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Quadrant, VisibleRegion};
    use crate::math::{CellCoord, TileId};
    use crate::window::EffectiveWindow;

    #[test]
    fn straddling_the_bottom_edge() {
        let window = EffectiveWindow::new(1012.0, 1929.0, 1000.0, 1000.0);
        let region = VisibleRegion::compute(2, &window, 10);

        let primary = region.quadrant(Quadrant::Primary);
        assert_eq!(primary.tile, TileId::new(2, 1, 1));
        assert_eq!(primary.cells.x, 0..10);
        assert_eq!(primary.cells.y, 9..10);
        assert_eq!(primary.cells.len(), 10);

        let right = region.quadrant(Quadrant::Right);
        assert_eq!(right.tile, TileId::new(2, 2, 1));
        assert!(right.cells.is_empty());

        let bottom = region.quadrant(Quadrant::Bottom);
        assert_eq!(bottom.tile, TileId::new(2, 1, 2));
        assert_eq!(bottom.cells.x, 0..10);
        assert_eq!(bottom.cells.y, 0..9);
        assert_eq!(bottom.cells.len(), 90);

        let diagonal = region.quadrant(Quadrant::Diagonal);
        assert_eq!(diagonal.tile, TileId::new(2, 2, 2));
        assert_eq!(diagonal.cells.len(), 0);

        assert_eq!(region.total_cells(), 100);
        assert_eq!(region.contributing().count(), 2);
    }

    #[test]
    fn aligned_window_uses_primary_only() {
        let window = EffectiveWindow::new(0.0, 0.0, 1920.0, 1080.0);
        let region = VisibleRegion::compute(0, &window, 10);
        assert_eq!(region.quadrant(Quadrant::Primary).cells.len(), 100);
        assert_eq!(region.contributing().count(), 1);
        // Empty neighbors are still reported.
        assert_eq!(region.iter().count(), 4);
        assert_eq!(region.shift(), CellCoord::new(10, 10));
    }

    #[test]
    fn anchors_follow_the_primary_share() {
        let window = EffectiveWindow::new(130.0, 270.0, 100.0, 100.0);
        let region = VisibleRegion::compute(3, &window, 10);
        assert_eq!(region.corner_cell(), CellCoord::new(3, 7));
        assert_eq!(region.shift(), CellCoord::new(7, 3));
        assert_eq!(region.anchor(Quadrant::Right), CellCoord::new(7, 0));
        assert_eq!(region.anchor(Quadrant::Bottom), CellCoord::new(0, 3));
        assert_eq!(region.anchor(Quadrant::Diagonal), CellCoord::new(7, 3));
        assert_eq!(
            region.cells_for(TileId::new(3, 2, 3)).map(|r| r.len()),
            Some(21)
        );
        assert!(region.cells_for(TileId::new(3, 0, 0)).is_none());
    }

    #[test]
    fn cells_iterate_row_major() {
        let window = EffectiveWindow::new(18.0, 18.0, 10.0, 10.0);
        let region = VisibleRegion::compute(1, &window, 2);
        let primary: Vec<_> = region.quadrant(Quadrant::Primary).cells.cells().collect();
        assert_eq!(primary, [CellCoord::new(1, 1)]);
        let diagonal: Vec<_> = region.quadrant(Quadrant::Diagonal).cells.cells().collect();
        assert_eq!(diagonal, [CellCoord::new(0, 0)]);
    }
}
