// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits and wire types for tile contents and item paths.

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::math::{CellCoord, TileId};

/// Index of an item in the collection; the item's identity.
pub type ItemIndex = u64;

/// Failure talking to a collaborator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("server responded with status {0}")]
    Status(u16),
    /// The request did not complete.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Sparse item placements of one tile, as parallel arrays.
///
/// `indexes[i]` sits at cell `(x_cell[i], y_cell[i])`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileImages {
    /// Item indices.
    pub indexes: Vec<ItemIndex>,
    /// Cell columns.
    pub x_cell: Vec<u32>,
    /// Cell rows.
    pub y_cell: Vec<u32>,
}

impl TileImages {
    /// Returns `true` if the three arrays have the same length.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.indexes.len() == self.x_cell.len() && self.indexes.len() == self.y_cell.len()
    }

    /// Placements as `(index, cell)` pairs.
    ///
    /// Stops at the shortest array; check [`TileImages::is_consistent`] first.
    pub fn placements(&self) -> impl Iterator<Item = (ItemIndex, CellCoord)> + '_ {
        self.indexes
            .iter()
            .zip(self.x_cell.iter().zip(&self.y_cell))
            .map(|(index, (x, y))| (*index, CellCoord::new(*x, *y)))
    }
}

/// Contents of one tile as returned by the tile-data endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    /// Item placements.
    pub images: TileImages,
    /// The tile the server says this is, as `[zoom, x, y]`.
    pub zoom_plus_tile: [u32; 3],
}

impl TileData {
    /// Creates tile data for `tile` from `(index, cell)` placements.
    #[must_use]
    pub fn new(tile: TileId, placements: impl IntoIterator<Item = (ItemIndex, CellCoord)>) -> Self {
        let mut images = TileImages::default();
        for (index, cell) in placements {
            images.indexes.push(index);
            images.x_cell.push(cell.x);
            images.y_cell.push(cell.y);
        }
        Self {
            images,
            zoom_plus_tile: [u32::from(tile.zoom), tile.x, tile.y],
        }
    }

    /// Decodes a JSON tile-data response.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Returns `true` if the response describes `tile`.
    #[must_use]
    pub fn describes(&self, tile: TileId) -> bool {
        self.zoom_plus_tile == [u32::from(tile.zoom), tile.x, tile.y]
    }
}

/// One `index → path` pair from the path-lookup endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    /// Item index.
    pub index: ItemIndex,
    /// Storage path of the item; also its asset-cache key.
    pub path: String,
}

/// Source of tile contents for one collection.
pub trait TileDataSource {
    /// Fetches the contents of `tile`.
    fn fetch_tile(&self, tile: TileId) -> LocalBoxFuture<'_, Result<TileData, FetchError>>;
}

/// Resolves item indices to storage paths for one collection.
pub trait PathLookup {
    /// Looks up the paths of `indexes` in a single request.
    ///
    /// Indices unknown to the collection are simply missing from the answer.
    fn lookup_paths<'a>(
        &'a self,
        indexes: &'a [ItemIndex],
    ) -> LocalBoxFuture<'a, Result<Vec<PathEntry>, FetchError>>;
}
