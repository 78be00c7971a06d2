// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate math between pixels, tiles and cells.
//!
//! All functions are pure. Inputs are expected to be finite and non-negative
//! after the caller clamped them; anything else collapses to index `0`.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Identifies one tile of the pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    /// Zoom level of the tile.
    pub zoom: u8,
    /// Column of the tile at its zoom level.
    pub x: u32,
    /// Row of the tile at its zoom level.
    pub y: u32,
}

impl TileId {
    /// Creates a tile identifier.
    #[must_use]
    pub const fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// The single tile at zoom level `0`.
    pub const ROOT: Self = Self::new(0, 0, 0);

    /// Number of tiles per side at `zoom`.
    #[must_use]
    pub const fn tiles_per_side(zoom: u8) -> u32 {
        if zoom >= 32 { u32::MAX } else { 1 << zoom }
    }

    /// The neighbor to the right.
    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.zoom, self.x.saturating_add(1), self.y)
    }

    /// The neighbor below.
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.zoom, self.x, self.y.saturating_add(1))
    }

    /// The neighbor to the bottom right.
    #[must_use]
    pub const fn diagonal(self) -> Self {
        self.right().below()
    }

    /// Returns `true` if the tile lies inside the pyramid at its zoom level.
    #[must_use]
    pub const fn is_in_pyramid(self) -> bool {
        let side = Self::tiles_per_side(self.zoom);
        self.x < side && self.y < side
    }
}

/// A cell inside a tile's `N × N` grid, or inside the real-window grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Linear scale factor of a zoom level, `2^zoom`.
#[must_use]
pub fn zoom_scale(zoom: u8) -> f64 {
    2.0_f64.powi(i32::from(zoom))
}

/// Size of the effective window at `zoom` for a real window of size `real`.
///
/// Zoom level `0` yields the full real size; each increment halves both
/// dimensions.
#[must_use]
pub fn effective_size(zoom: u8, real: Size) -> Size {
    let scale = zoom_scale(zoom);
    Size::new(real.width / scale, real.height / scale)
}

/// Column and row of the tile containing `point` for tiles of size `tile`.
#[must_use]
pub fn tile_containing(point: Point, tile: Size) -> (u32, u32) {
    (
        floor_index(point.x / tile.width),
        floor_index(point.y / tile.height),
    )
}

/// Cell of `point` inside tile `(tile_x, tile_y)`, on an `N × N` grid.
///
/// The result is clamped into `0..cells_per_side` on both axes.
#[must_use]
pub fn local_cell(point: Point, tile_xy: (u32, u32), tile: Size, cells_per_side: u32) -> CellCoord {
    let n = f64::from(cells_per_side.max(1));
    let last = cells_per_side.max(1) - 1;
    let offset_x = point.x - f64::from(tile_xy.0) * tile.width;
    let offset_y = point.y - f64::from(tile_xy.1) * tile.height;
    CellCoord::new(
        floor_index(offset_x * n / tile.width).min(last),
        floor_index(offset_y * n / tile.height).min(last),
    )
}

fn floor_index(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Saturating float-to-int cast; callers clamp to the grid afterwards"
    )]
    {
        value.floor() as u32
    }
}
