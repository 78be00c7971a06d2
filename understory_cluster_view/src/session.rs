// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;

use kurbo::Point;
use understory_asset_cache::{AssetCache, AssetStore, BatchReport};

use crate::config::ClusterViewConfig;
use crate::controller::{BatchOutcome, ClusterBatch, ViewportController};
use crate::pool::SlotChange;
use crate::wire::ClusterSource;

/// Pointer, wheel and button input for a [`ClusterSession`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportInput {
    /// Pointer pressed at a screen position.
    PointerDown(Point),
    /// Pointer moved to a screen position.
    PointerMove(Point),
    /// Pointer released at a screen position.
    PointerUp(Point),
    /// Wheel scrolled by `delta_y` with the pointer at `pointer`.
    Wheel {
        /// Pointer position.
        pointer: Point,
        /// Vertical scroll delta; negative zooms in.
        delta_y: f64,
    },
    /// Zoom-in button.
    ZoomIn,
    /// Zoom-out button.
    ZoomOut,
}

/// Result of one fetch round of a [`ClusterSession`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// What happened to the cluster tiles.
    pub clusters: BatchOutcome,
    /// What happened to the assets of newly bound items.
    pub assets: BatchReport,
}

/// Sequential driver around a [`ViewportController`].
///
/// Each input is handled to completion: cluster tiles are fetched and
/// applied, then the assets of newly bound items are loaded into the cache.
/// Hosts that want to keep handling input while fetches are in flight drive
/// the controller directly instead.
pub struct ClusterSession<S, A>
where
    A: AssetStore<String>,
{
    controller: ViewportController,
    source: S,
    assets: A,
    cache: AssetCache<String, A::Asset>,
}

impl<S, A> Debug for ClusterSession<S, A>
where
    A: AssetStore<String>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClusterSession")
            .field("controller", &self.controller)
            .field("cached_assets", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<S, A> ClusterSession<S, A>
where
    S: ClusterSource,
    A: AssetStore<String>,
{
    /// Creates a session; nothing is fetched until [`ClusterSession::start`].
    #[must_use]
    pub fn new(config: ClusterViewConfig, source: S, assets: A) -> Self {
        let controller = ViewportController::new(config);
        let cache = AssetCache::new(controller.config().cache_capacity);
        Self {
            controller,
            source,
            assets,
            cache,
        }
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    /// The asset cache.
    #[must_use]
    pub fn cache(&self) -> &AssetCache<String, A::Asset> {
        &self.cache
    }

    /// Fetches the root tile, or any visible tile still missing.
    pub async fn start(&mut self) -> SessionUpdate {
        let batch = self.controller.start();
        self.run(batch).await
    }

    /// Handles one input; returns `None` if nothing had to be fetched.
    pub async fn handle(&mut self, input: ViewportInput) -> Option<SessionUpdate> {
        let batch = match input {
            ViewportInput::PointerDown(pos) => {
                self.controller.drag_start(pos);
                None
            }
            ViewportInput::PointerMove(pos) => self.controller.drag_move(pos),
            ViewportInput::PointerUp(pos) => {
                self.controller.drag_end(pos);
                None
            }
            ViewportInput::Wheel { pointer, delta_y } => self.controller.wheel(pointer, delta_y),
            ViewportInput::ZoomIn => self.controller.zoom_in(),
            ViewportInput::ZoomOut => self.controller.zoom_out(),
        }?;
        Some(self.run(batch).await)
    }

    /// The cached asset for `path`, promoting it to most recently used.
    pub fn asset(&mut self, path: &str) -> Option<&A::Asset> {
        self.cache.get(&path.to_owned())
    }

    /// Takes the slot changes recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<SlotChange> {
        self.controller.drain_changes()
    }

    async fn run(&mut self, batch: ClusterBatch) -> SessionUpdate {
        let resolved = batch.resolve(&self.source).await;
        let clusters = self.controller.apply(resolved);
        let assets = self
            .cache
            .add_batch(&clusters.asset_paths, &self.assets)
            .await;
        SessionUpdate { clusters, assets }
    }
}
