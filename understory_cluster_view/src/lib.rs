// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_cluster_view --heading-base-level=0

//! Understory Cluster View: a viewport over a clustered 2D embedding.
//!
//! Items of a large collection are placed at continuous coordinates of an
//! embedding space. The server groups nearby items into clusters and serves,
//! per tile of a `2^z × 2^z` partition, one representative item per cluster.
//! This crate keeps a fixed pool of renderable slots bound to the
//! representatives around the current view:
//!
//! - [`EmbeddingSpace`]: the bounds fixed by the first (root) tile response,
//!   its tile partition and the Moore neighborhood of a tile.
//! - [`EmbeddingView`]: the effective window over the space and its mapping
//!   onto the real window, with pointer-anchored zoom.
//! - [`RenderablePool`]: an arena of [`Slot`]s with a free list; listeners are
//!   attached on bind and detached on release.
//! - [`ViewportController`]: tracks visible cluster tiles, binds and releases
//!   slots, and hands out generation-stamped [`ClusterBatch`]es so results of
//!   superseded transitions are dropped.
//! - [`ClusterSession`]: a sequential driver that also warms an
//!   [`AssetCache`](understory_asset_cache::AssetCache) with the assets of
//!   newly bound items.
//!
//! The crate never touches a display API. A UI layer drains [`SlotChange`]s
//! and renders them.
//!
//! ## Minimal example
//!
//! ```rust
//! use futures::executor::block_on;
//! use futures::future::{FutureExt, LocalBoxFuture, ready};
//! use kurbo::{Point, Size};
//! use understory_cluster_view::{ClusterSource, ClusterTile, ClusterViewConfig, ViewportController};
//! use understory_tile_grid::{FetchError, TileId};
//!
//! struct OneCluster;
//!
//! impl ClusterSource for OneCluster {
//!     fn fetch_clusters(&self, _tile: TileId) -> LocalBoxFuture<'_, Result<ClusterTile, FetchError>> {
//!         let body = r#"{
//!             "tile_coordinate_range": { "x_min": 0.0, "x_max": 100.0, "y_min": 0.0, "y_max": 100.0 },
//!             "clusters_representatives": { "entities": [
//!                 { "representative": {
//!                     "index": 7, "path": "7.jpg", "width": 64, "height": 64,
//!                     "low_dimensional_embedding_x": 50.0, "low_dimensional_embedding_y": 50.0
//!                   },
//!                   "number_of_entities": 3 }
//!             ] }
//!         }"#;
//!         ready(ClusterTile::from_json(body)).boxed_local()
//!     }
//! }
//!
//! let config = ClusterViewConfig::default().with_real_window(Size::new(1000.0, 1000.0));
//! let mut controller = ViewportController::new(config);
//!
//! // The root tile fixes the embedding space.
//! let batch = controller.start();
//! let outcome = controller.apply(block_on(batch.resolve(&OneCluster)));
//! assert_eq!(outcome.bound, 1);
//! let slot = controller.pool().slot_for_item(7).unwrap();
//! assert_eq!(controller.pool().slot(slot).unwrap().position(), Point::new(500.0, 500.0));
//!
//! // Zooming in releases the root tile and requests its zoom-1 neighborhood.
//! let batch = controller.zoom_in().unwrap();
//! assert_eq!(batch.tiles().len(), 4);
//! assert!(controller.hover(slot).is_none());
//! ```

mod config;
mod controller;
mod embedding;
mod gesture;
mod pool;
mod session;
mod view;
mod wire;

pub use config::ClusterViewConfig;
pub use controller::{BatchOutcome, ClusterBatch, ResolvedBatch, ViewportController};
pub use embedding::{EmbeddingSpace, Neighborhood};
pub use gesture::{DragEnd, DragTracker};
pub use pool::{Binding, Interaction, Listeners, RenderablePool, Slot, SlotChange, SlotId};
pub use session::{ClusterSession, SessionUpdate, ViewportInput};
pub use view::{EmbeddingView, EmbeddingViewDebugInfo};
pub use wire::{
    ClusterEntity, ClusterRepresentatives, ClusterSource, ClusterTile, CoordinateRange,
    Representative,
};
