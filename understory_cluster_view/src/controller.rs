// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cluster-tile tracking and slot binding for the continuous viewport.

use futures::future::join_all;
use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use log::{debug, trace, warn};
use smallvec::SmallVec;
use understory_tile_grid::{FetchError, ItemIndex, TileId, wheel_step};

use crate::config::ClusterViewConfig;
use crate::embedding::EmbeddingSpace;
use crate::gesture::{DragEnd, DragTracker};
use crate::pool::{Interaction, RenderablePool, SlotChange, SlotId};
use crate::view::EmbeddingView;
use crate::wire::{ClusterEntity, ClusterSource, ClusterTile};

type TileItems = SmallVec<[ItemIndex; 16]>;

#[derive(Clone, Debug)]
enum TileState {
    /// Requested by the transition with this generation.
    Pending { generation: u64 },
    /// Delivered. `items` lists every representative of the tile, bound or
    /// not; `waiting` holds the clusters no slot was free for.
    Loaded {
        items: TileItems,
        waiting: Vec<ClusterEntity>,
    },
}

/// Cluster tiles one transition needs, stamped with its generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterBatch {
    generation: u64,
    tiles: Vec<TileId>,
}

impl ClusterBatch {
    /// Generation of the transition that requested the tiles.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Requested tiles.
    #[must_use]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Returns `true` if nothing needs fetching.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Fetches every tile of the batch concurrently.
    pub async fn resolve<S>(self, source: &S) -> ResolvedBatch
    where
        S: ClusterSource + ?Sized,
    {
        let results = join_all(self.tiles.iter().map(|tile| source.fetch_clusters(*tile))).await;
        ResolvedBatch {
            generation: self.generation,
            tiles: self.tiles.into_iter().zip(results).collect(),
        }
    }
}

/// Fetch results of a [`ClusterBatch`], ready to be applied.
#[derive(Debug)]
pub struct ResolvedBatch {
    generation: u64,
    tiles: Vec<(TileId, Result<ClusterTile, FetchError>)>,
}

impl ResolvedBatch {
    /// Generation of the batch.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`ViewportController::apply`] did with a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Tiles whose clusters were bound.
    pub applied: Vec<TileId>,
    /// Tiles no longer awaited by the controller; dropped.
    pub stale: Vec<TileId>,
    /// Tiles whose fetch failed; they are requested again by a later
    /// transition that still shows them.
    pub failed: Vec<TileId>,
    /// Slots newly bound, including clusters of loaded tiles that waited
    /// for a free slot and got one since the previous batch.
    pub bound: usize,
    /// Asset paths of the newly bound representatives.
    pub asset_paths: Vec<String>,
}

/// Viewport over a clustered embedding space.
///
/// The controller starts by requesting the zoom-0 root tile, whose
/// coordinate range fixes the [`EmbeddingSpace`]. From then on every
/// pan/zoom transition:
///
/// 1. moves the [`EmbeddingView`],
/// 2. releases the slots of tiles that left the visible neighborhood,
/// 3. repositions the remaining bound slots, and
/// 4. returns a [`ClusterBatch`] for newly visible tiles.
///
/// A batch may be resolved while further transitions happen. When it is
/// applied, a tile is only bound if it is still awaited with the batch's
/// generation; anything else is stale and dropped.
///
/// An item delivered by several tracked tiles is bound once and stays bound
/// until the last of those tiles is released. Clusters that found the pool
/// full wait with their tile and are bound as soon as slots free up.
#[derive(Debug)]
pub struct ViewportController {
    config: ClusterViewConfig,
    space: Option<EmbeddingSpace>,
    view: Option<EmbeddingView>,
    tracked: HashMap<TileId, TileState>,
    /// Number of loaded tiles listing each item.
    holders: HashMap<ItemIndex, u32>,
    /// Asset paths of waiting clusters bound outside [`ViewportController::apply`].
    rebound_paths: Vec<String>,
    pool: RenderablePool,
    generation: u64,
    drag: DragTracker,
}

impl ViewportController {
    /// Creates a controller with an empty pool of `config.pool_size` slots.
    #[must_use]
    pub fn new(config: ClusterViewConfig) -> Self {
        let config = config.sanitized();
        Self {
            pool: RenderablePool::new(config.pool_size),
            config,
            space: None,
            view: None,
            tracked: HashMap::new(),
            holders: HashMap::new(),
            rebound_paths: Vec::new(),
            generation: 0,
            drag: DragTracker::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ClusterViewConfig {
        &self.config
    }

    /// The embedding space, once the root tile arrived.
    #[must_use]
    pub fn space(&self) -> Option<&EmbeddingSpace> {
        self.space.as_ref()
    }

    /// The view, once the root tile arrived.
    #[must_use]
    pub fn view(&self) -> Option<&EmbeddingView> {
        self.view.as_ref()
    }

    /// The slot pool.
    #[must_use]
    pub fn pool(&self) -> &RenderablePool {
        &self.pool
    }

    /// Current transition generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tracked tiles, pending or loaded, in sorted order.
    #[must_use]
    pub fn tracked_tiles(&self) -> Vec<TileId> {
        let mut tiles: Vec<TileId> = self.tracked.keys().copied().collect();
        tiles.sort_unstable();
        tiles
    }

    /// Returns `true` if `tile` is awaiting its fetch.
    #[must_use]
    pub fn is_pending(&self, tile: TileId) -> bool {
        matches!(self.tracked.get(&tile), Some(TileState::Pending { .. }))
    }

    /// Returns `true` if the clusters of `tile` are bound.
    #[must_use]
    pub fn is_loaded(&self, tile: TileId) -> bool {
        matches!(self.tracked.get(&tile), Some(TileState::Loaded { .. }))
    }

    /// Requests the tiles needed for the current state.
    ///
    /// Before the embedding space is known this is the root tile. Later
    /// calls request visible tiles that are not tracked, e.g. after a
    /// failed fetch.
    pub fn start(&mut self) -> ClusterBatch {
        self.generation += 1;
        if self.space.is_none() {
            self.tracked.insert(
                TileId::ROOT,
                TileState::Pending {
                    generation: self.generation,
                },
            );
            return ClusterBatch {
                generation: self.generation,
                tiles: vec![TileId::ROOT],
            };
        }
        self.update_visible_tiles()
    }

    /// Applies fetched cluster tiles that are still awaited.
    pub fn apply(&mut self, resolved: ResolvedBatch) -> BatchOutcome {
        let asset_paths = core::mem::take(&mut self.rebound_paths);
        let mut outcome = BatchOutcome {
            bound: asset_paths.len(),
            asset_paths,
            ..BatchOutcome::default()
        };
        for (tile, result) in resolved.tiles {
            let awaited = matches!(
                self.tracked.get(&tile),
                Some(TileState::Pending { generation }) if *generation == resolved.generation
            );
            if !awaited {
                debug!(
                    "dropping stale cluster tile {tile:?} from batch {}",
                    resolved.generation
                );
                outcome.stale.push(tile);
                continue;
            }
            match result {
                Ok(data) => {
                    self.load(tile, data, &mut outcome);
                    outcome.applied.push(tile);
                }
                Err(err) => {
                    warn!("failed to fetch cluster tile {tile:?}: {err}");
                    self.tracked.remove(&tile);
                    outcome.failed.push(tile);
                }
            }
        }
        outcome
    }

    /// Drags the content by `delta` screen pixels.
    ///
    /// Returns `None` if nothing new has to be fetched.
    pub fn pan_by(&mut self, delta: Vec2) -> Option<ClusterBatch> {
        if !self.view.as_mut()?.pan_by_view(delta) {
            return None;
        }
        self.after_transition()
    }

    /// Changes the zoom level to `zoom`, keeping the content under `pointer` fixed.
    ///
    /// Returns `None` if nothing new has to be fetched.
    pub fn zoom_at(&mut self, zoom: i32, pointer: Point) -> Option<ClusterBatch> {
        if !self.view.as_mut()?.zoom_about_view_point(pointer, zoom) {
            return None;
        }
        self.after_transition()
    }

    /// Zooms one level for a wheel event; scrolling up zooms in.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) -> Option<ClusterBatch> {
        let zoom = i32::from(self.view.as_ref()?.zoom());
        match wheel_step(delta_y) {
            0 => None,
            step => self.zoom_at(zoom + step, pointer),
        }
    }

    /// Zoom-in button: one level in, anchored at the screen center.
    pub fn zoom_in(&mut self) -> Option<ClusterBatch> {
        let view = self.view.as_ref()?;
        let (zoom, center) = (i32::from(view.zoom()), view.screen_rect().center());
        self.zoom_at(zoom + 1, center)
    }

    /// Zoom-out button: one level out, anchored at the screen center.
    pub fn zoom_out(&mut self) -> Option<ClusterBatch> {
        let view = self.view.as_ref()?;
        let (zoom, center) = (i32::from(view.zoom()), view.screen_rect().center());
        self.zoom_at(zoom - 1, center)
    }

    /// Pointer down: starts a drag.
    pub fn drag_start(&mut self, pos: Point) {
        self.drag.press(pos);
    }

    /// Pointer move: pans by the movement since the last move while dragging.
    pub fn drag_move(&mut self, pos: Point) -> Option<ClusterBatch> {
        let delta = self.drag.motion(pos)?;
        self.pan_by(delta)
    }

    /// Pointer up: ends the drag and tells whether it was a click.
    pub fn drag_end(&mut self, pos: Point) -> Option<DragEnd> {
        self.drag.release(pos)
    }

    /// The cluster shown by `slot`, while its hover listener is attached.
    #[must_use]
    pub fn hover(&self, slot: SlotId) -> Option<&ClusterEntity> {
        self.pool
            .interact(slot, Interaction::Hover)
            .map(|binding| &binding.entity)
    }

    /// The cluster shown by `slot`, while its click listener is attached.
    #[must_use]
    pub fn click(&self, slot: SlotId) -> Option<&ClusterEntity> {
        self.pool
            .interact(slot, Interaction::Click)
            .map(|binding| &binding.entity)
    }

    /// Takes the slot changes recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<SlotChange> {
        self.pool.drain_changes()
    }

    fn after_transition(&mut self) -> Option<ClusterBatch> {
        self.generation += 1;
        let batch = self.update_visible_tiles();
        self.reposition();
        // Waiting clusters bound by this transition still need their assets.
        (!batch.is_empty() || !self.rebound_paths.is_empty()).then_some(batch)
    }

    /// Tracks the tile under the window origin and its neighbors, forgets the rest.
    fn update_visible_tiles(&mut self) -> ClusterBatch {
        let generation = self.generation;
        let (Some(space), Some(view)) = (self.space.as_ref(), self.view.as_ref()) else {
            return ClusterBatch {
                generation,
                tiles: Vec::new(),
            };
        };
        let visible = space.neighborhood(space.tile_at(view.window().origin, view.zoom()));

        let mut gone: Vec<TileId> = self
            .tracked
            .keys()
            .filter(|tile| !visible.contains(tile))
            .copied()
            .collect();
        gone.sort_unstable();
        for tile in &gone {
            self.forget(*tile);
        }
        if !gone.is_empty() {
            self.bind_waiting();
        }

        let mut tiles = Vec::new();
        for tile in visible {
            if !self.tracked.contains_key(&tile) {
                self.tracked.insert(tile, TileState::Pending { generation });
                tiles.push(tile);
            }
        }
        if !tiles.is_empty() {
            trace!("requesting cluster tiles {tiles:?} (generation {generation})");
        }
        ClusterBatch { generation, tiles }
    }

    /// Stops tracking `tile` and releases the items no other loaded tile holds.
    fn forget(&mut self, tile: TileId) {
        let Some(TileState::Loaded { items, .. }) = self.tracked.remove(&tile) else {
            return;
        };
        let mut released = 0_usize;
        for item in items {
            let Some(count) = self.holders.get_mut(&item) else {
                continue;
            };
            *count -= 1;
            if *count > 0 {
                continue;
            }
            self.holders.remove(&item);
            if let Some(slot) = self.pool.slot_for_item(item) {
                self.pool.release(slot);
                released += 1;
            }
        }
        trace!("released {released} slots of {tile:?}");
    }

    /// Binds waiting clusters of loaded tiles while slots are free.
    fn bind_waiting(&mut self) {
        let mut tiles: Vec<TileId> = self
            .tracked
            .iter()
            .filter(|(_, state)| {
                matches!(state, TileState::Loaded { waiting, .. } if !waiting.is_empty())
            })
            .map(|(tile, _)| *tile)
            .collect();
        tiles.sort_unstable();
        for tile in tiles {
            if self.pool.free_len() == 0 {
                return;
            }
            let Some(TileState::Loaded { waiting, .. }) = self.tracked.get_mut(&tile) else {
                continue;
            };
            let queue = core::mem::take(waiting);
            let mut rest = Vec::new();
            for entity in queue {
                if self.pool.slot_for_item(entity.representative.index).is_some() {
                    continue;
                }
                if self.pool.free_len() == 0 {
                    rest.push(entity);
                } else if let Some(path) = self.bind_entity(tile, entity) {
                    self.rebound_paths.push(path);
                }
            }
            if let Some(TileState::Loaded { waiting, .. }) = self.tracked.get_mut(&tile) {
                *waiting = rest;
            }
        }
    }

    fn bind_entity(&mut self, tile: TileId, entity: ClusterEntity) -> Option<String> {
        let (position, visible) = self.placement(entity.representative.embedding());
        let path = entity.representative.path.clone();
        self.pool.bind(tile, entity, position, visible).map(|_| path)
    }

    fn load(&mut self, tile: TileId, data: ClusterTile, outcome: &mut BatchOutcome) {
        if self.space.is_none() {
            let space = EmbeddingSpace::new(data.tile_coordinate_range.to_rect());
            debug!("embedding space fixed at {:?}", space.bounds());
            self.view = Some(EmbeddingView::new(
                &space,
                self.config.real_window,
                self.config.max_zoom_level,
            ));
            self.space = Some(space);
        }

        let mut items = TileItems::new();
        let mut waiting = Vec::new();
        for entity in data.clusters_representatives.entities {
            let item = entity.representative.index;
            items.push(item);
            *self.holders.entry(item).or_insert(0) += 1;
            if self.pool.slot_for_item(item).is_some() {
                trace!("item {item} of {tile:?} already shown");
                continue;
            }
            if self.pool.free_len() == 0 {
                waiting.push(entity);
            } else if let Some(path) = self.bind_entity(tile, entity) {
                outcome.asset_paths.push(path);
                outcome.bound += 1;
            }
        }
        if !waiting.is_empty() {
            warn!(
                "renderable pool exhausted ({} slots), {} clusters of {tile:?} wait for a free slot",
                self.pool.capacity(),
                waiting.len()
            );
        }
        self.tracked.insert(tile, TileState::Loaded { items, waiting });
    }

    fn reposition(&mut self) {
        let mut moves: Vec<(SlotId, Point, bool)> = self
            .pool
            .bound()
            .map(|(slot, binding)| {
                let (position, visible) = self.placement(binding.entity.representative.embedding());
                (slot, position, visible)
            })
            .collect();
        moves.sort_unstable_by_key(|(slot, ..)| *slot);
        for (slot, position, visible) in moves {
            self.pool.place(slot, position, visible);
        }
    }

    /// Screen position of an embedding point, and whether it is on screen
    /// with one item of margin on every side.
    fn placement(&self, item: Point) -> (Point, bool) {
        let Some(view) = self.view.as_ref() else {
            return (Point::ZERO, false);
        };
        let position = view.world_to_view_point(item);
        let margin = self.config.item_size;
        let screen = view.screen();
        let visible = (-margin..=screen.width + margin).contains(&position.x)
            && (-margin..=screen.height + margin).contains(&position.y);
        (position, visible)
    }
}
