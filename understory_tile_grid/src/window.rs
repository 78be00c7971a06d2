// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Size, Vec2};

/// The sub-region of content space currently mapped onto the real window.
///
/// Expressed in the same units as the content bounds it lives in: pixels of
/// the real window for the tile grid, embedding units for continuous
/// layouts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveWindow {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl EffectiveWindow {
    /// Creates a window from its corner and extent.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// A window covering all of `bounds`.
    #[must_use]
    pub fn covering(bounds: Rect) -> Self {
        Self {
            origin: bounds.origin(),
            size: bounds.size(),
        }
    }

    /// The window as a rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Center of the window.
    #[must_use]
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Returns the window moved by `delta`.
    #[must_use]
    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            origin: self.origin + delta,
            size: self.size,
        }
    }

    /// Returns the window translated (never resized) so it lies inside `bounds`.
    ///
    /// A window larger than `bounds` on some axis is pinned to the minimum
    /// edge on that axis.
    #[must_use]
    pub fn clamped_within(self, bounds: Rect) -> Self {
        let x = clamp_axis(self.origin.x, self.size.width, bounds.x0, bounds.x1);
        let y = clamp_axis(self.origin.y, self.size.height, bounds.y0, bounds.y1);
        Self {
            origin: Point::new(x, y),
            size: self.size,
        }
    }

    /// Returns `true` if the window lies inside `bounds`, up to `eps`.
    #[must_use]
    pub fn is_within(&self, bounds: Rect, eps: f64) -> bool {
        let r = self.rect();
        r.x0 >= bounds.x0 - eps
            && r.y0 >= bounds.y0 - eps
            && r.x1 <= bounds.x1 + eps
            && r.y1 <= bounds.y1 + eps
    }
}

fn clamp_axis(start: f64, extent: f64, min: f64, max: f64) -> f64 {
    let upper = (max - extent).max(min);
    if start.is_nan() {
        return min;
    }
    start.clamp(min, upper)
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Vec2};

    use super::EffectiveWindow;

    #[test]
    fn clamping_translates_without_resizing() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let w = EffectiveWindow::new(80.0, -10.0, 50.0, 50.0).clamped_within(bounds);
        assert_eq!(w, EffectiveWindow::new(50.0, 0.0, 50.0, 50.0));
        assert!(w.is_within(bounds, 0.0));
    }

    #[test]
    fn oversized_window_pins_to_minimum() {
        let bounds = Rect::new(10.0, 10.0, 20.0, 20.0);
        let w = EffectiveWindow::new(30.0, 30.0, 50.0, 5.0).clamped_within(bounds);
        assert_eq!(w.origin.x, 10.0);
        assert_eq!(w.origin.y, 15.0);
    }

    #[test]
    fn translate_then_clamp() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let w = EffectiveWindow::new(10.0, 10.0, 50.0, 50.0)
            .translated(Vec2::new(-30.0, 20.0))
            .clamped_within(bounds);
        assert_eq!(w, EffectiveWindow::new(0.0, 30.0, 50.0, 50.0));
    }
}
