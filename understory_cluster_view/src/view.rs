// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Size, Vec2};
use understory_tile_grid::{EffectiveWindow, ZoomTransition};

use crate::embedding::EmbeddingSpace;

/// Effective window over the embedding space, mapped onto the real window.
///
/// At zoom level `z` the window is `bounds / 2^z` large and always stays
/// inside the embedding bounds. The view keeps a world-to-screen transform in
/// sync with the window:
///
/// ```text
/// screen = (item - window.origin) * (real / window.size)
/// ```
#[derive(Clone, Debug)]
pub struct EmbeddingView {
    screen: Size,
    bounds: Rect,
    zoom: u8,
    max_zoom: u8,
    window: EffectiveWindow,
    world_to_view: Affine,
    view_to_world: Affine,
}

impl EmbeddingView {
    /// Creates a view at zoom level `0`, showing the whole space on `screen`.
    #[must_use]
    pub fn new(space: &EmbeddingSpace, screen: Size, max_zoom: u8) -> Self {
        let bounds = space.bounds();
        let mut view = Self {
            screen,
            bounds,
            zoom: 0,
            max_zoom,
            window: EffectiveWindow::covering(bounds),
            world_to_view: Affine::IDENTITY,
            view_to_world: Affine::IDENTITY,
        };
        view.rebuild_transforms();
        view
    }

    /// Size of the real window.
    #[must_use]
    pub fn screen(&self) -> Size {
        self.screen
    }

    /// Current zoom level.
    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Deepest zoom level.
    #[must_use]
    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Current effective window, in embedding units.
    #[must_use]
    pub fn window(&self) -> EffectiveWindow {
        self.window
    }

    /// Changes the zoom level, keeping the content under `anchor` fixed.
    ///
    /// `anchor` is in screen pixels. `zoom` is clamped into
    /// `0..=max_zoom`; returns `false` if the level does not change.
    pub fn zoom_about_view_point(&mut self, anchor: Point, zoom: i32) -> bool {
        let max = i32::from(self.max_zoom);
        let new_zoom = u8::try_from(zoom.clamp(0, max)).unwrap_or(self.max_zoom);
        if new_zoom == self.zoom {
            return false;
        }
        let transition = ZoomTransition::compute(
            new_zoom,
            self.zoom,
            anchor,
            self.window,
            self.screen,
            self.bounds,
        );
        self.zoom = transition.zoom;
        self.window = transition.window;
        self.rebuild_transforms();
        true
    }

    /// Pans by a drag of `delta` screen pixels.
    ///
    /// The content follows the pointer, so the window moves the opposite
    /// way. Returns `false` if clamping leaves the window where it was.
    pub fn pan_by_view(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        let world_delta = self.view_to_world_vec(delta);
        let window = self.window.translated(-world_delta).clamped_within(self.bounds);
        if window == self.window {
            return false;
        }
        self.window = window;
        self.rebuild_transforms();
        true
    }

    /// Converts an embedding-space point into screen coordinates.
    #[must_use]
    pub fn world_to_view_point(&self, pt: Point) -> Point {
        self.world_to_view * pt
    }

    /// Converts a screen point into embedding-space coordinates.
    #[must_use]
    pub fn view_to_world_point(&self, pt: Point) -> Point {
        self.view_to_world * pt
    }

    /// The embedding-space rectangle currently on screen.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        self.window.rect()
    }

    /// The real window in screen coordinates.
    #[must_use]
    pub fn screen_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.screen)
    }

    /// Snapshot of the current view state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> EmbeddingViewDebugInfo {
        EmbeddingViewDebugInfo {
            screen: self.screen,
            bounds: self.bounds,
            visible_world_rect: self.visible_world_rect(),
            zoom: self.zoom,
            max_zoom: self.max_zoom,
            scale: self.scale(),
        }
    }

    fn scale(&self) -> Vec2 {
        Vec2::new(
            ratio(self.screen.width, self.window.size.width),
            ratio(self.screen.height, self.window.size.height),
        )
    }

    fn view_to_world_vec(&self, delta: Vec2) -> Vec2 {
        let scale = self.scale();
        Vec2::new(ratio(delta.x, scale.x), ratio(delta.y, scale.y))
    }

    fn rebuild_transforms(&mut self) {
        let origin = self.window.origin.to_vec2();
        let scale = self.scale();
        // World → view: move the window origin to zero, then stretch onto the screen.
        self.world_to_view =
            Affine::scale_non_uniform(scale.x, scale.y) * Affine::translate(-origin);
        self.view_to_world = Affine::translate(origin)
            * Affine::scale_non_uniform(ratio(1.0, scale.x), ratio(1.0, scale.y));
    }
}

/// Debug snapshot of an [`EmbeddingView`] state.
#[derive(Clone, Copy, Debug)]
pub struct EmbeddingViewDebugInfo {
    /// Real window size in pixels.
    pub screen: Size,
    /// Embedding-space bounds.
    pub bounds: Rect,
    /// Embedding-space rectangle currently on screen.
    pub visible_world_rect: Rect,
    /// Current zoom level.
    pub zoom: u8,
    /// Deepest zoom level.
    pub max_zoom: u8,
    /// Screen pixels per embedding unit on each axis.
    pub scale: Vec2,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}
