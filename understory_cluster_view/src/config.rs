// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Configuration of a [`ViewportController`](crate::ViewportController) and
/// the [`ClusterSession`](crate::ClusterSession) around it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterViewConfig {
    /// Size of the on-screen viewport in pixels.
    pub real_window: Size,
    /// Number of renderable slots in the pool.
    pub pool_size: usize,
    /// On-screen extent of one item, used as the culling margin.
    pub item_size: f64,
    /// Deepest zoom level served by the cluster pyramid.
    pub max_zoom_level: u8,
    /// Capacity of the asset cache.
    pub cache_capacity: usize,
}

impl Default for ClusterViewConfig {
    fn default() -> Self {
        Self {
            real_window: Size::new(1920.0, 1080.0),
            pool_size: 1024,
            item_size: 64.0,
            max_zoom_level: 8,
            cache_capacity: 512,
        }
    }
}

impl ClusterViewConfig {
    /// Sets the real window size.
    #[must_use]
    pub fn with_real_window(mut self, size: Size) -> Self {
        self.real_window = size;
        self
    }

    /// Sets the number of pooled slots.
    #[must_use]
    pub fn with_pool_size(mut self, slots: usize) -> Self {
        self.pool_size = slots;
        self
    }

    /// Sets the item extent used for culling.
    #[must_use]
    pub fn with_item_size(mut self, size: f64) -> Self {
        self.item_size = size;
        self
    }

    /// Sets the deepest zoom level.
    #[must_use]
    pub fn with_max_zoom_level(mut self, level: u8) -> Self {
        self.max_zoom_level = level;
        self
    }

    /// Sets the asset cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Returns a copy with degenerate values replaced by usable ones.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let item_size = if self.item_size.is_finite() {
            self.item_size.max(0.0)
        } else {
            0.0
        };
        Self {
            real_window: Size::new(
                self.real_window.width.max(0.0),
                self.real_window.height.max(0.0),
            ),
            pool_size: self.pool_size.max(1),
            item_size,
            max_zoom_level: self.max_zoom_level.min(31),
            cache_capacity: self.cache_capacity,
        }
    }
}
