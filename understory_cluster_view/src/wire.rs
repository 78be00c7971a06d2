// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cluster-tile responses and the collaborator that serves them.

use std::collections::BTreeMap;

use futures::future::LocalBoxFuture;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use understory_tile_grid::{FetchError, ItemIndex, TileId};

/// Embedding-space extent of the collection.
///
/// Only authoritative in the response for the zoom-0 root tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRange {
    /// Smallest x coordinate.
    pub x_min: f64,
    /// Largest x coordinate.
    pub x_max: f64,
    /// Smallest y coordinate.
    pub y_min: f64,
    /// Largest y coordinate.
    pub y_max: f64,
}

impl CoordinateRange {
    /// The range as a rectangle.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x_min, self.y_min, self.x_max, self.y_max)
    }
}

/// An item chosen to stand in for a cluster of similar items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    /// Collection index; the item's identity.
    pub index: ItemIndex,
    /// Storage path; also the asset-cache key.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Embedding x coordinate.
    pub low_dimensional_embedding_x: f64,
    /// Embedding y coordinate.
    pub low_dimensional_embedding_y: f64,
    /// Author credit, if known.
    #[serde(default)]
    pub author: Option<String>,
    /// Any further metadata the server attaches.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Representative {
    /// Position of the item in embedding space.
    #[must_use]
    pub fn embedding(&self) -> Point {
        Point::new(self.low_dimensional_embedding_x, self.low_dimensional_embedding_y)
    }
}

/// One cluster: its representative and how many items it stands for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntity {
    /// The representative item.
    pub representative: Representative,
    /// Number of items in the cluster.
    pub number_of_entities: u32,
}

/// Cluster list of a tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRepresentatives {
    /// Clusters of the tile.
    pub entities: Vec<ClusterEntity>,
}

/// Response of the cluster-tile endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterTile {
    /// Embedding extent of the whole collection.
    pub tile_coordinate_range: CoordinateRange,
    /// Clusters whose representative falls in the tile.
    pub clusters_representatives: ClusterRepresentatives,
}

impl ClusterTile {
    /// Decodes a JSON cluster-tile response.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Clusters of the tile.
    #[must_use]
    pub fn entities(&self) -> &[ClusterEntity] {
        &self.clusters_representatives.entities
    }
}

/// Source of cluster tiles for one collection.
pub trait ClusterSource {
    /// Fetches the clusters of `tile`.
    fn fetch_clusters(&self, tile: TileId) -> LocalBoxFuture<'_, Result<ClusterTile, FetchError>>;
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::ClusterTile;

    #[test]
    fn decodes_cluster_tile_with_extra_metadata() {
        let body = r#"{
            "tile_coordinate_range": { "x_min": -2.0, "x_max": 2.0, "y_min": 0.0, "y_max": 8.0 },
            "clusters_representatives": { "entities": [
                { "representative": {
                    "index": 12, "path": "a/b.jpg", "width": 640, "height": 480,
                    "low_dimensional_embedding_x": 1.5, "low_dimensional_embedding_y": 3.0,
                    "author": "someone", "license": "CC-BY"
                  },
                  "number_of_entities": 42 }
            ] }
        }"#;
        let tile = ClusterTile::from_json(body).unwrap();
        assert_eq!(tile.tile_coordinate_range.to_rect().width(), 4.0);
        let entity = &tile.entities()[0];
        assert_eq!(entity.number_of_entities, 42);
        assert_eq!(entity.representative.embedding(), Point::new(1.5, 3.0));
        assert_eq!(entity.representative.author.as_deref(), Some("someone"));
        assert_eq!(
            entity.representative.extra.get("license").and_then(|v| v.as_str()),
            Some("CC-BY")
        );
    }

    #[test]
    fn author_is_optional() {
        let body = r#"{
            "tile_coordinate_range": { "x_min": 0.0, "x_max": 1.0, "y_min": 0.0, "y_max": 1.0 },
            "clusters_representatives": { "entities": [
                { "representative": {
                    "index": 1, "path": "p", "width": 1, "height": 1,
                    "low_dimensional_embedding_x": 0.0, "low_dimensional_embedding_y": 0.0
                  },
                  "number_of_entities": 1 }
            ] }
        }"#;
        let tile = ClusterTile::from_json(body).unwrap();
        assert!(tile.entities()[0].representative.author.is_none());
    }
}
