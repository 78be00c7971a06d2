// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer drag tracking: per-move deltas and click-versus-drag classification.
//!
//! ## Usage
//!
//! 1) Call [`DragTracker::press`] on pointer down.
//! 2) On each move, [`DragTracker::motion`] yields the delta since the last move.
//! 3) [`DragTracker::release`] ends the gesture and tells whether it was a click.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_cluster_view::{DragEnd, DragTracker};
//!
//! let mut drag = DragTracker::default();
//! drag.press(Point::new(10.0, 20.0));
//! assert_eq!(drag.motion(Point::new(40.0, 20.0)), Some(Vec2::new(30.0, 0.0)));
//! assert_eq!(
//!     drag.release(Point::new(40.0, 20.0)),
//!     Some(DragEnd::Drag { total: Vec2::new(30.0, 0.0) })
//! );
//! assert!(!drag.is_dragging());
//! ```

use kurbo::{Point, Vec2};

/// How a pointer gesture ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEnd {
    /// The pointer never travelled past the click threshold.
    Click,
    /// The pointer moved; `total` is the offset from the press position.
    Drag {
        /// Offset from press to release.
        total: Vec2,
    },
}

/// Tracks one pointer drag at a time.
#[derive(Clone, Copy, Debug)]
pub struct DragTracker {
    start: Option<Point>,
    last: Option<Point>,
    travelled: f64,
    click_threshold: f64,
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl DragTracker {
    /// Creates a tracker that treats gestures shorter than `click_threshold`
    /// pixels of travel as clicks.
    #[must_use]
    pub fn new(click_threshold: f64) -> Self {
        Self {
            start: None,
            last: None,
            travelled: 0.0,
            click_threshold: click_threshold.max(0.0),
        }
    }

    /// Starts a drag at `pos`, dropping any unfinished one.
    pub fn press(&mut self, pos: Point) {
        self.start = Some(pos);
        self.last = Some(pos);
        self.travelled = 0.0;
    }

    /// Records a move to `pos`, returning the delta since the last move.
    ///
    /// Returns `None` when no drag is active or the pointer did not move.
    pub fn motion(&mut self, pos: Point) -> Option<Vec2> {
        let last = self.last?;
        let delta = pos - last;
        self.last = Some(pos);
        self.travelled += delta.hypot();
        (delta != Vec2::ZERO).then_some(delta)
    }

    /// Offset from the press position to `pos`, while dragging.
    #[must_use]
    pub fn total_offset(&self, pos: Point) -> Option<Vec2> {
        self.start.map(|start| pos - start)
    }

    /// Ends the drag at `pos`.
    pub fn release(&mut self, pos: Point) -> Option<DragEnd> {
        let start = self.start.take()?;
        self.last = None;
        let travelled = core::mem::take(&mut self.travelled);
        if travelled < self.click_threshold {
            Some(DragEnd::Click)
        } else {
            Some(DragEnd::Drag { total: pos - start })
        }
    }

    /// Returns `true` while a drag is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }
}
