// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tile_grid --heading-base-level=0

//! Understory Tile Grid: a viewport over a quad-pyramid of tiled cells.
//!
//! A very large image collection is served as a pyramid of tiles. At zoom
//! level `z` the content is split into `2^z × 2^z` tiles, and every tile is
//! divided into an `N × N` grid of cells that hold at most one item each. The
//! on-screen viewport (the *real window*) always shows exactly one tile's
//! worth of content (the *effective window*), which in general straddles up
//! to four tiles.
//!
//! This crate provides the pieces that turn a pan/zoom state into the set of
//! cells to display:
//!
//! - [`effective_size`], [`tile_containing`] and [`local_cell`]: pure
//!   coordinate math between pixels, tiles and cells.
//! - [`VisibleRegion`]: which of the up to four neighboring tiles contribute
//!   which cells to the `N × N` real-window grid.
//! - [`map_region`] / [`stitch_region`]: place each contributing tile's items
//!   onto one shared real-window grid and resolve them to storage paths.
//! - [`ZoomTransition`]: pointer-anchored zoom, shared by the wheel and the
//!   zoom buttons.
//! - [`GridViewport`]: the controller that owns the [`ViewportState`] and
//!   hands out generation-stamped [`FrameRequest`]s, so results of superseded
//!   transitions are discarded instead of painted.
//!
//! The crate never touches a display API and never performs I/O itself: tile
//! contents and item paths come from the [`TileDataSource`] and
//! [`PathLookup`] collaborators.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_tile_grid::{GridConfig, GridViewport, Quadrant};
//!
//! let config = GridConfig::default()
//!     .with_real_window(Size::new(4000.0, 4000.0))
//!     .with_cells_per_side(10);
//! let mut viewport = GridViewport::new(config);
//!
//! // Zoom in once around a pointer position.
//! let request = viewport.zoom_at(1, Point::new(1000.0, 1000.0)).unwrap();
//! assert_eq!(viewport.zoom(), 1);
//!
//! // The request carries the visible region that must be fetched and stitched.
//! let region = request.region();
//! assert_eq!(region.total_cells(), 100);
//! assert_eq!(region.quadrant(Quadrant::Primary).tile.zoom, 1);
//! ```

mod config;
mod mapper;
mod math;
mod quadrant;
mod source;
mod viewport;
mod window;
mod zoom;

pub use config::GridConfig;
pub use mapper::{
    IndexedCoordinates, RealCoordinateMap, StitchError, map_region, resolve_paths, stitch_region,
};
pub use math::{CellCoord, TileId, effective_size, local_cell, tile_containing, zoom_scale};
pub use quadrant::{CellRange, Quadrant, QuadrantCells, VisibleRegion};
pub use source::{
    FetchError, ItemIndex, PathEntry, PathLookup, TileData, TileDataSource, TileImages,
};
pub use viewport::{ApplyOutcome, FrameRequest, GridViewport, ResolvedFrame, ViewportState};
pub use window::EffectiveWindow;
pub use zoom::{ZoomTransition, wheel_step};
