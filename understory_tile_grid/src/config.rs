// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Configuration of a [`GridViewport`](crate::GridViewport).
///
/// Hosts typically load this from JSON; missing fields fall back to the
/// [`Default`] values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Size of the on-screen viewport in pixels.
    pub real_window: Size,
    /// Number of cells per tile side (`N`).
    pub cells_per_side: u32,
    /// Deepest zoom level served by the tile pyramid.
    pub max_zoom_level: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            real_window: Size::new(1920.0, 1080.0),
            cells_per_side: 10,
            max_zoom_level: 6,
        }
    }
}

impl GridConfig {
    /// Sets the real window size.
    #[must_use]
    pub fn with_real_window(mut self, size: Size) -> Self {
        self.real_window = size;
        self
    }

    /// Sets the number of cells per tile side.
    #[must_use]
    pub fn with_cells_per_side(mut self, cells: u32) -> Self {
        self.cells_per_side = cells;
        self
    }

    /// Sets the deepest zoom level.
    #[must_use]
    pub fn with_max_zoom_level(mut self, level: u8) -> Self {
        self.max_zoom_level = level;
        self
    }

    /// Returns a copy with degenerate values replaced by usable ones.
    ///
    /// At least one cell per side, non-negative window extents, and a zoom
    /// depth that keeps `2^z` within `u32`.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            real_window: Size::new(
                self.real_window.width.max(0.0),
                self.real_window.height.max(0.0),
            ),
            cells_per_side: self.cells_per_side.max(1),
            max_zoom_level: self.max_zoom_level.min(31),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::GridConfig;

    #[test]
    fn partial_json_uses_defaults() {
        let config: GridConfig = serde_json::from_str(r#"{ "cells_per_side": 8 }"#).unwrap();
        assert_eq!(config.cells_per_side, 8);
        assert_eq!(config.max_zoom_level, GridConfig::default().max_zoom_level);
        assert_eq!(config.real_window, GridConfig::default().real_window);
    }

    #[test]
    fn sanitized_fixes_degenerate_values() {
        let config = GridConfig::default()
            .with_cells_per_side(0)
            .with_max_zoom_level(200)
            .with_real_window(Size::new(-5.0, 10.0))
            .sanitized();
        assert_eq!(config.cells_per_side, 1);
        assert_eq!(config.max_zoom_level, 31);
        assert_eq!(config.real_window, Size::new(0.0, 10.0));
    }
}
