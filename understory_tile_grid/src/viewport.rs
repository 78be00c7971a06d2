// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Discrete-grid viewport controller.

use kurbo::{Point, Rect, Vec2};
use log::debug;

use crate::config::GridConfig;
use crate::mapper::{RealCoordinateMap, StitchError, stitch_region};
use crate::quadrant::VisibleRegion;
use crate::source::{PathLookup, TileDataSource};
use crate::window::EffectiveWindow;
use crate::zoom::{ZoomTransition, wheel_step};

/// Zoom level and effective window of a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Current zoom level.
    pub zoom: u8,
    /// Current effective window, in real-window pixels.
    pub window: EffectiveWindow,
}

/// Work needed to materialize one viewport transition.
///
/// The request is an owned value so that the fetch can be awaited without
/// borrowing the viewport; further pan/zoom events may be handled meanwhile.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRequest {
    generation: u64,
    state: ViewportState,
    region: VisibleRegion,
}

impl FrameRequest {
    /// Generation of the transition that produced this request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Viewport state the request was made for.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Region to fetch and stitch.
    #[must_use]
    pub fn region(&self) -> &VisibleRegion {
        &self.region
    }

    /// Fetches and stitches the region.
    pub async fn resolve<S>(self, source: &S) -> ResolvedFrame
    where
        S: TileDataSource + PathLookup + ?Sized,
    {
        let result = stitch_region(&self.region, source).await;
        ResolvedFrame {
            generation: self.generation,
            result,
        }
    }
}

/// The outcome of a [`FrameRequest`], ready to be applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedFrame {
    generation: u64,
    result: Result<RealCoordinateMap, StitchError>,
}

impl ResolvedFrame {
    /// Generation of the request this frame resolves.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`GridViewport::apply`] did with a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ApplyOutcome {
    /// The frame is now the viewport's coordinate map.
    Applied,
    /// The viewport moved on since the frame was requested; it was dropped.
    Stale {
        /// Generation of the dropped frame.
        frame: u64,
        /// Current generation of the viewport.
        current: u64,
    },
    /// The stitch hit a data-integrity fault; the previous map is kept.
    Failed(StitchError),
}

/// Viewport over a tile pyramid with an `N × N` cell grid per tile.
///
/// Owns the [`ViewportState`]. Every transition applies the new window first
/// and then recomputes the visible region from it, bumps a generation
/// counter, and returns a [`FrameRequest`]. Only a frame from the latest
/// generation is ever applied, so results of superseded transitions never
/// reach the screen.
#[derive(Clone, Debug)]
pub struct GridViewport {
    config: GridConfig,
    state: ViewportState,
    region: VisibleRegion,
    generation: u64,
    coordinates: RealCoordinateMap,
}

impl GridViewport {
    /// Creates a viewport at zoom level `0`, showing the whole real window.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let config = config.sanitized();
        let window = EffectiveWindow::covering(Rect::from_origin_size(
            Point::ZERO,
            config.real_window,
        ));
        let state = ViewportState { zoom: 0, window };
        Self {
            config,
            region: VisibleRegion::compute(0, &window, config.cells_per_side),
            state,
            generation: 0,
            coordinates: RealCoordinateMap::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Current zoom level.
    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.state.zoom
    }

    /// Current effective window.
    #[must_use]
    pub fn window(&self) -> EffectiveWindow {
        self.state.window
    }

    /// Visible region of the current state.
    #[must_use]
    pub fn region(&self) -> &VisibleRegion {
        &self.region
    }

    /// Current transition generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last applied coordinate map.
    #[must_use]
    pub fn coordinates(&self) -> &RealCoordinateMap {
        &self.coordinates
    }

    /// Request for the current state, e.g. for the first paint after mount.
    #[must_use]
    pub fn request(&self) -> FrameRequest {
        FrameRequest {
            generation: self.generation,
            state: self.state,
            region: self.region.clone(),
        }
    }

    /// Drags the content by `delta` screen pixels.
    ///
    /// Dragging right reveals content to the left, so the window moves by
    /// the opposite delta, scaled into effective-window units and clamped
    /// into the real window. Returns `None` if clamping leaves the window
    /// where it was.
    pub fn pan_by(&mut self, delta: Vec2) -> Option<FrameRequest> {
        let real = self.config.real_window;
        let window = self.state.window;
        let scaled = Vec2::new(
            scale(delta.x, window.size.width, real.width),
            scale(delta.y, window.size.height, real.height),
        );
        let window = window.translated(-scaled).clamped_within(self.bounds());
        if window == self.state.window {
            return None;
        }
        Some(self.commit(ViewportState {
            zoom: self.state.zoom,
            window,
        }))
    }

    /// Changes the zoom level to `zoom`, keeping the content under `pointer` fixed.
    ///
    /// `zoom` is clamped into `0..=max_zoom_level`; returns `None` if the
    /// level does not change.
    pub fn zoom_at(&mut self, zoom: i32, pointer: Point) -> Option<FrameRequest> {
        let new_zoom = self.clamp_zoom(zoom);
        if new_zoom == self.state.zoom {
            return None;
        }
        let transition = ZoomTransition::in_real_window(
            new_zoom,
            self.state.zoom,
            pointer,
            self.state.window,
            self.config.real_window,
        );
        Some(self.commit(ViewportState {
            zoom: transition.zoom,
            window: transition.window,
        }))
    }

    /// Zooms one level in or out for a wheel event at `pointer`.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) -> Option<FrameRequest> {
        match wheel_step(delta_y) {
            0 => None,
            step => self.zoom_at(i32::from(self.state.zoom) + step, pointer),
        }
    }

    /// Zoom-in button: one level in, anchored at the center of the screen.
    pub fn zoom_in(&mut self) -> Option<FrameRequest> {
        self.zoom_at(i32::from(self.state.zoom) + 1, self.screen_center())
    }

    /// Zoom-out button: one level out, anchored at the center of the screen.
    pub fn zoom_out(&mut self) -> Option<FrameRequest> {
        self.zoom_at(i32::from(self.state.zoom) - 1, self.screen_center())
    }

    /// Installs a resolved frame if it belongs to the current generation.
    pub fn apply(&mut self, frame: ResolvedFrame) -> ApplyOutcome {
        if frame.generation != self.generation {
            debug!(
                "dropping stale grid frame {} (current {})",
                frame.generation, self.generation
            );
            return ApplyOutcome::Stale {
                frame: frame.generation,
                current: self.generation,
            };
        }
        match frame.result {
            Ok(map) => {
                self.coordinates = map;
                ApplyOutcome::Applied
            }
            Err(err) => ApplyOutcome::Failed(err),
        }
    }

    fn commit(&mut self, state: ViewportState) -> FrameRequest {
        self.state = state;
        self.generation += 1;
        self.region = VisibleRegion::compute(state.zoom, &state.window, self.config.cells_per_side);
        self.request()
    }

    fn clamp_zoom(&self, zoom: i32) -> u8 {
        let max = i32::from(self.config.max_zoom_level);
        u8::try_from(zoom.clamp(0, max)).unwrap_or(self.config.max_zoom_level)
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.config.real_window)
    }

    fn screen_center(&self) -> Point {
        self.bounds().center()
    }
}

fn scale(delta: f64, window: f64, screen: f64) -> f64 {
    if screen > 0.0 {
        delta * window / screen
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size, Vec2};

    use super::{ApplyOutcome, GridViewport, ResolvedFrame};
    use crate::config::GridConfig;
    use crate::mapper::RealCoordinateMap;
    use crate::math::effective_size;

    fn viewport() -> GridViewport {
        GridViewport::new(
            GridConfig::default()
                .with_real_window(Size::new(1000.0, 1000.0))
                .with_max_zoom_level(3),
        )
    }

    #[test]
    fn zoom_is_clamped_to_configured_range() {
        let mut vp = viewport();
        assert!(vp.zoom_at(-4, Point::ZERO).is_none());
        let request = vp.zoom_at(10, Point::new(500.0, 500.0)).unwrap();
        assert_eq!(request.state().zoom, 3);
        assert_eq!(vp.window().size, effective_size(3, vp.config().real_window));
        assert!(vp.zoom_in().is_none());
    }

    #[test]
    fn pan_moves_against_the_drag_and_clamps() {
        let mut vp = viewport();
        vp.zoom_at(1, Point::ZERO).unwrap();
        assert_eq!(vp.window().origin, Point::ZERO);

        // Drag left by 200 screen pixels: the window moves right by 100 units.
        vp.pan_by(Vec2::new(-200.0, 0.0));
        assert_eq!(vp.window().origin, Point::new(100.0, 0.0));

        // Dragging far never leaves the real window.
        vp.pan_by(Vec2::new(-5000.0, -5000.0));
        assert_eq!(vp.window().origin, Point::new(500.0, 500.0));

        // Further drags against the corner leave the state untouched.
        let generation = vp.generation();
        assert!(vp.pan_by(Vec2::new(-300.0, -300.0)).is_none());
        assert_eq!(vp.generation(), generation);
    }

    #[test]
    fn region_is_recomputed_after_the_window_moves() {
        let mut vp = viewport();
        vp.zoom_at(1, Point::ZERO).unwrap();
        let request = vp.pan_by(Vec2::new(-200.0, 0.0)).unwrap();
        assert_eq!(request.region(), vp.region());
        assert_eq!(vp.region().corner_cell().x, 2);
    }

    #[test]
    fn stale_frames_are_dropped() {
        let mut vp = viewport();
        let first = vp.zoom_in().unwrap();
        let _second = vp.zoom_in().unwrap();
        let outcome = vp.apply(ResolvedFrame {
            generation: first.generation(),
            result: Ok(RealCoordinateMap::default()),
        });
        assert_eq!(outcome, ApplyOutcome::Stale { frame: 1, current: 2 });
    }
}
