// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-anchored zoom transitions.

use kurbo::{Point, Rect, Size, Vec2};

use crate::math::effective_size;
use crate::window::EffectiveWindow;

/// Result of a zoom-level change: the new level and the new effective window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransition {
    /// New zoom level.
    pub zoom: u8,
    /// New effective window, clamped into the content bounds.
    pub window: EffectiveWindow,
}

impl ZoomTransition {
    /// Computes the window after changing zoom from `old_zoom` to `new_zoom`.
    ///
    /// - `pointer` is in screen pixels, relative to the real window whose
    ///   size is `screen`.
    /// - `window` is the effective window before the change.
    /// - `bounds` is the content space the window lives in; at zoom `z` the
    ///   window is `bounds.size() / 2^z` large and always stays inside it.
    ///
    /// The content point under the pointer stays under the pointer, unless
    /// clamping into `bounds` has to move the window. For a single-level step
    /// this is `x + p / 2` when zooming in and `x - p` when zooming out, with
    /// `p` the pointer offset in effective-window units.
    ///
    /// `new_zoom` is expected to be valid already; callers clamp it.
    #[must_use]
    pub fn compute(
        new_zoom: u8,
        old_zoom: u8,
        pointer: Point,
        window: EffectiveWindow,
        screen: Size,
        bounds: Rect,
    ) -> Self {
        let pointer_eff = Vec2::new(
            scale_axis(pointer.x, window.size.width, screen.width),
            scale_axis(pointer.y, window.size.height, screen.height),
        );
        // Remaining fraction of the pointer offset once the window is rescaled.
        let ratio = 2.0_f64.powi(i32::from(old_zoom) - i32::from(new_zoom));
        let origin = window.origin + pointer_eff * (1.0 - ratio);
        let size = effective_size(new_zoom, bounds.size());
        Self {
            zoom: new_zoom,
            window: EffectiveWindow { origin, size }.clamped_within(bounds),
        }
    }

    /// [`ZoomTransition::compute`] for a tile grid, whose content space is
    /// the real window itself.
    #[must_use]
    pub fn in_real_window(
        new_zoom: u8,
        old_zoom: u8,
        pointer: Point,
        window: EffectiveWindow,
        real: Size,
    ) -> Self {
        Self::compute(
            new_zoom,
            old_zoom,
            pointer,
            window,
            real,
            Rect::from_origin_size(Point::ZERO, real),
        )
    }
}

/// Zoom step for a wheel delta: scrolling up (`delta_y < 0`) zooms in.
#[must_use]
pub fn wheel_step(delta_y: f64) -> i32 {
    if delta_y < 0.0 {
        1
    } else if delta_y > 0.0 {
        -1
    } else {
        0
    }
}

fn scale_axis(pointer: f64, window: f64, screen: f64) -> f64 {
    if screen > 0.0 {
        pointer * window / screen
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size};

    use super::{ZoomTransition, wheel_step};
    use crate::window::EffectiveWindow;

    const REAL: Size = Size::new(4000.0, 4000.0);

    #[test]
    fn zoom_in_one_level_moves_toward_pointer() {
        let window = EffectiveWindow::new(1354.0, 727.0, 1000.0, 1000.0);
        let t = ZoomTransition::in_real_window(3, 2, Point::new(1250.0, 1000.0), window, REAL);
        assert_eq!(t.zoom, 3);
        assert_eq!(t.window.size, Size::new(500.0, 500.0));
        assert_eq!(t.window.origin, Point::new(1354.0 + 156.25, 727.0 + 125.0));
    }

    #[test]
    fn zoom_out_one_level_reverses_zoom_in() {
        let pointer = Point::new(1250.0, 1000.0);
        let start = EffectiveWindow::new(1354.0, 727.0, 1000.0, 1000.0);
        let zoomed = ZoomTransition::in_real_window(3, 2, pointer, start, REAL);
        let back = ZoomTransition::in_real_window(2, 3, pointer, zoomed.window, REAL);
        assert_eq!(back.window.size, Size::new(1000.0, 1000.0));
        assert_eq!(back.window.origin, start.origin);
    }

    #[test]
    fn two_level_jump_matches_two_single_steps() {
        let pointer = Point::new(1250.0, 1000.0);
        let start = EffectiveWindow::new(1354.0, 727.0, 1000.0, 1000.0);

        // Pointer offset (312.5, 250) keeps 1/4 of itself: origin moves by 3/4 of it.
        let jump = ZoomTransition::in_real_window(4, 2, pointer, start, REAL);
        assert_eq!(jump.window.size, Size::new(250.0, 250.0));
        assert_eq!(jump.window.origin, Point::new(1588.375, 914.5));

        let step = ZoomTransition::in_real_window(3, 2, pointer, start, REAL);
        let step = ZoomTransition::in_real_window(4, 3, pointer, step.window, REAL);
        assert_eq!(step.window, jump.window);

        let back = ZoomTransition::in_real_window(2, 4, pointer, jump.window, REAL);
        assert_eq!(back.window, start);
    }

    #[test]
    fn clamped_at_content_edges() {
        let window = EffectiveWindow::new(3000.0, 3000.0, 1000.0, 1000.0);
        let t = ZoomTransition::in_real_window(1, 2, Point::new(4000.0, 4000.0), window, REAL);
        assert_eq!(t.window.size, Size::new(2000.0, 2000.0));
        assert_eq!(t.window.origin, Point::new(2000.0, 2000.0));
        assert!(t.window.is_within(Rect::from_origin_size(Point::ZERO, REAL), 0.0));
    }

    #[test]
    fn wheel_direction() {
        assert_eq!(wheel_step(-120.0), 1);
        assert_eq!(wheel_step(53.0), -1);
        assert_eq!(wheel_step(0.0), 0);
    }
}
