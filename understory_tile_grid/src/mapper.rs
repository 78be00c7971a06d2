// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping tile-local cells onto the shared real-window grid.

use futures::future::join_all;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::{debug, warn};

use crate::math::{CellCoord, TileId};
use crate::quadrant::VisibleRegion;
use crate::source::{FetchError, ItemIndex, PathEntry, PathLookup, TileData, TileDataSource};

/// A tile response that cannot be mapped without producing wrong coordinates.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StitchError {
    /// The response describes a different tile than the one requested.
    #[error("requested tile {requested:?} but the response describes {reported:?}")]
    TileMismatch {
        /// Requested tile.
        requested: TileId,
        /// `[zoom, x, y]` reported by the response.
        reported: [u32; 3],
    },
    /// The parallel placement arrays have different lengths.
    #[error(
        "tile {tile:?} has {indexes} indexes but {x_cells} column and {y_cells} row entries"
    )]
    MalformedTile {
        /// Offending tile.
        tile: TileId,
        /// Length of `indexes`.
        indexes: usize,
        /// Length of `x_cell`.
        x_cells: usize,
        /// Length of `y_cell`.
        y_cells: usize,
    },
}

/// Item indices placed on real-window cells, before path resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexedCoordinates {
    items: HashMap<CellCoord, ItemIndex>,
}

impl IndexedCoordinates {
    /// Number of placed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no item was placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item placed on real-window `cell`.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<ItemIndex> {
        self.items.get(&cell).copied()
    }

    /// All placements, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, ItemIndex)> + '_ {
        self.items.iter().map(|(cell, index)| (*cell, *index))
    }

    /// Distinct item indices, sorted, ready for one batched path lookup.
    #[must_use]
    pub fn indexes(&self) -> Vec<ItemIndex> {
        let mut indexes: Vec<_> = self.items.values().copied().collect();
        indexes.sort_unstable();
        indexes.dedup();
        indexes
    }
}

/// Real-window cells resolved to item storage paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RealCoordinateMap {
    paths: HashMap<CellCoord, String>,
}

impl RealCoordinateMap {
    /// Number of resolved cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no cell resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Path shown at real-window `cell`.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&str> {
        self.paths.get(&cell).map(String::as_str)
    }

    /// All resolved cells, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &str)> + '_ {
        self.paths.iter().map(|(cell, path)| (*cell, path.as_str()))
    }

    /// Distinct paths, sorted; the keys to feed into an asset cache.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.paths.values().cloned().collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

/// Places the items of each contributing tile onto the real-window grid.
///
/// `tiles` is indexed like [`Quadrant::ALL`](crate::Quadrant::ALL); `None`
/// means the tile is absent (not fetched, or the fetch failed) and
/// contributes empty cells. Tiles are processed primary, right, bottom,
/// diagonal; each one's contribution is anchored at
/// [`VisibleRegion::anchor`] and offset by the cell's distance from the top
/// left of its contributed range.
///
/// Fails if a response does not describe the tile it was requested for, or
/// if its placement arrays disagree in length.
pub fn map_region(
    region: &VisibleRegion,
    tiles: &[Option<&TileData>; 4],
) -> Result<IndexedCoordinates, StitchError> {
    let mut out = IndexedCoordinates::default();
    for (share, data) in region.iter().zip(tiles) {
        let Some(data) = data else {
            continue;
        };
        if !data.describes(share.tile) {
            return Err(StitchError::TileMismatch {
                requested: share.tile,
                reported: data.zoom_plus_tile,
            });
        }
        if !data.images.is_consistent() {
            return Err(StitchError::MalformedTile {
                tile: share.tile,
                indexes: data.images.indexes.len(),
                x_cells: data.images.x_cell.len(),
                y_cells: data.images.y_cell.len(),
            });
        }
        let anchor = region.anchor(share.quadrant);
        let origin = share.cells.origin();
        for (index, cell) in data.images.placements() {
            if !share.cells.contains(cell) {
                continue;
            }
            let real = CellCoord::new(
                anchor.x + (cell.x - origin.x),
                anchor.y + (cell.y - origin.y),
            );
            match out.items.entry(real) {
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
                Entry::Occupied(existing) => {
                    warn!(
                        "tile {:?} places item {index} on occupied cell {cell:?}; keeping {}",
                        share.tile,
                        existing.get()
                    );
                }
            }
        }
    }
    Ok(out)
}

/// Turns placed indices into paths using one path-lookup answer.
///
/// Items the lookup did not answer for are dropped.
#[must_use]
pub fn resolve_paths(indexed: &IndexedCoordinates, entries: Vec<PathEntry>) -> RealCoordinateMap {
    let by_index: HashMap<ItemIndex, String> = entries
        .into_iter()
        .map(|entry| (entry.index, entry.path))
        .collect();
    let mut paths = HashMap::with_capacity(indexed.len());
    for (cell, index) in indexed.iter() {
        match by_index.get(&index) {
            Some(path) => {
                paths.insert(cell, path.clone());
            }
            None => debug!("no path for item {index}; leaving cell {cell:?} empty"),
        }
    }
    RealCoordinateMap { paths }
}

/// Fetches, maps and resolves a visible region.
///
/// Contributing tiles are fetched concurrently; tiles that owe no cells are
/// not fetched. A failed tile fetch is logged and the tile is treated as
/// empty. All placed items are then resolved with a single path lookup; a
/// failed lookup is logged and yields an empty map. Data-integrity faults
/// abort the stitch with an error.
pub async fn stitch_region<S>(region: &VisibleRegion, source: &S) -> Result<RealCoordinateMap, StitchError>
where
    S: TileDataSource + PathLookup + ?Sized,
{
    let fetches = region.iter().map(|share| async move {
        if share.cells.is_empty() {
            return None;
        }
        match source.fetch_tile(share.tile).await {
            Ok(data) => Some(data),
            Err(err) => {
                log_fetch_failure(share.tile, &err);
                None
            }
        }
    });
    let fetched: Vec<Option<TileData>> = join_all(fetches).await;
    let tiles: [Option<&TileData>; 4] =
        core::array::from_fn(|i| fetched.get(i).and_then(Option::as_ref));

    let indexed = map_region(region, &tiles)?;
    if indexed.is_empty() {
        return Ok(RealCoordinateMap::default());
    }

    let indexes = indexed.indexes();
    let entries = match source.lookup_paths(&indexes).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!("path lookup for {} items failed: {err}", indexes.len());
            Vec::new()
        }
    };
    Ok(resolve_paths(&indexed, entries))
}

fn log_fetch_failure(tile: TileId, err: &FetchError) {
    warn!("fetching tile {tile:?} failed: {err}");
}
