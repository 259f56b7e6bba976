//! Pan/zoom transform between canvas pixels and world coordinates.
//!
//! World space is the data's own coordinate system (image pixels, energy and
//! counts). Canvas space is CSS pixels on the render surface. The mapping is
//! `canvas = world * scale + pan`, independently per axis, so non-uniform
//! zoom (locking one axis of a spectrum) is a first-class case.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::config::AxisLock;
use crate::consts::MIN_SCALE_FLOOR;
use crate::signal::Signal;

/// A point or vector in either canvas or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The rectangle covering this size anchored at the origin.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Axis-aligned rectangle. `width`/`height` are never negative once built
/// through [`Rect::from_corners`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self { x, y, width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Overlap of two rectangles, or `None` when they are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// The persistable part of a transform: pan offset (canvas pixels) and scale
/// (canvas pixels per world unit).
///
/// This is what a host hands to its view-state persistence service after a
/// gesture completes, and what the drawer applies as the world matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub pan: Point,
    pub scale: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { pan: Point::new(0.0, 0.0), scale: Point::new(1.0, 1.0) }
    }
}

impl ViewState {
    /// Convert a canvas-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn canvas_to_world(&self, canvas: Point) -> Point {
        Point {
            x: (canvas.x - self.pan.x) / self.scale.x,
            y: (canvas.y - self.pan.y) / self.scale.y,
        }
    }

    /// Convert a world-space point to canvas coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_canvas(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale.x + self.pan.x,
            y: world.y * self.scale.y + self.pan.y,
        }
    }

    /// The affine matrix `[a, b, c, d, e, f]` in canvas `setTransform` order.
    #[must_use]
    pub fn matrix(&self) -> [f64; 6] {
        [self.scale.x, 0.0, 0.0, self.scale.y, self.pan.x, self.pan.y]
    }
}

/// Pan/zoom state for one widget instance.
///
/// Every mutation goes through a setter that clamps scale into
/// `[min_scale, max_scale]` (with a hard positive floor) and takes an
/// `complete` flag. Only completed mutations fire [`Transform::gesture_completed`],
/// so live-drag intermediate states never reach persistence.
#[derive(Debug)]
pub struct Transform {
    view: ViewState,
    viewport: Size,
    min_scale: f64,
    max_scale: f64,
    /// Fired with the committed view after a mutation marked complete.
    pub gesture_completed: Signal<ViewState>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(MIN_SCALE_FLOOR, f64::MAX)
    }
}

impl Transform {
    /// Identity transform with the given scale limits.
    ///
    /// Limits are sanitized: `min_scale` is raised to the positive floor and
    /// `max_scale` is raised to `min_scale`.
    #[must_use]
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        let min_scale = if min_scale > MIN_SCALE_FLOOR { min_scale } else { MIN_SCALE_FLOOR };
        let max_scale = if max_scale > min_scale { max_scale } else { min_scale };
        let mut transform = Self {
            view: ViewState::default(),
            viewport: Size::default(),
            min_scale,
            max_scale,
            gesture_completed: Signal::new(),
        };
        transform.view.scale = transform.clamp_scale(transform.view.scale);
        transform
    }

    // --- Queries ---

    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub fn pan(&self) -> Point {
        self.view.pan
    }

    #[must_use]
    pub fn scale(&self) -> Point {
        self.view.scale
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    #[must_use]
    pub fn canvas_to_world(&self, canvas: Point) -> Point {
        self.view.canvas_to_world(canvas)
    }

    #[must_use]
    pub fn world_to_canvas(&self, world: Point) -> Point {
        self.view.world_to_canvas(world)
    }

    /// The world-space rectangle currently covered by the viewport.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        let a = self.canvas_to_world(Point::new(0.0, 0.0));
        let b = self.canvas_to_world(Point::new(self.viewport.width, self.viewport.height));
        Rect::from_corners(a, b)
    }

    // --- Mutation ---

    /// Update the viewport size. Negative or non-finite sizes collapse to zero.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = Size::new(non_negative(size.width), non_negative(size.height));
    }

    /// Assign pan directly.
    pub fn set_pan(&mut self, pan: Point, complete: bool) {
        self.view.pan = pan;
        self.finish(complete);
    }

    /// Assign scale while keeping `anchor_world` under the same canvas pixel.
    ///
    /// Each axis is handled independently, so changing only `scale.x` leaves
    /// the Y mapping untouched.
    pub fn set_scale_relative_to(&mut self, scale: Point, anchor_world: Point, complete: bool) {
        let before = self.world_to_canvas(anchor_world);
        self.view.scale = self.clamp_scale(scale);
        let after = self.world_to_canvas(anchor_world);
        self.view.pan = self.view.pan.add(before.sub(after));
        self.finish(complete);
    }

    /// Multiply scale by `factor` on the axes enabled in `axes`, anchored at
    /// `anchor_world`.
    pub fn zoom_by(&mut self, factor: f64, anchor_world: Point, axes: AxisLock, complete: bool) {
        let current = self.view.scale;
        let scale = Point::new(
            if axes.x { current.x * factor } else { current.x },
            if axes.y { current.y * factor } else { current.y },
        );
        self.set_scale_relative_to(scale, anchor_world, complete);
    }

    /// Fit scale and pan so `rect` exactly fills the viewport (non-uniform).
    ///
    /// Returns `false` and leaves the view untouched when the viewport or
    /// `rect` has no area.
    pub fn reset_view_to_rect(&mut self, rect: Rect, complete: bool) -> bool {
        if !self.can_fit(rect) {
            return false;
        }
        let scale = self.clamp_scale(Point::new(self.viewport.width / rect.width, self.viewport.height / rect.height));
        self.view.scale = scale;
        self.view.pan = Point::new(-rect.x * scale.x, -rect.y * scale.y);
        self.finish(complete);
        true
    }

    /// Fit `rect` inside the viewport with one uniform scale, centred.
    ///
    /// Same degenerate-input rule as [`Transform::reset_view_to_rect`].
    pub fn zoom_to_fit(&mut self, rect: Rect, complete: bool) -> bool {
        if !self.can_fit(rect) {
            return false;
        }
        let uniform = (self.viewport.width / rect.width).min(self.viewport.height / rect.height);
        let scale = self.clamp_scale(Point::new(uniform, uniform));
        self.view.scale = scale;
        let center = rect.center();
        self.view.pan = Point::new(
            self.viewport.width * 0.5 - center.x * scale.x,
            self.viewport.height * 0.5 - center.y * scale.y,
        );
        self.finish(complete);
        true
    }

    /// Restore a previously persisted view. Scale is clamped like any other
    /// mutation.
    pub fn restore(&mut self, view: ViewState, complete: bool) {
        self.view.scale = self.clamp_scale(view.scale);
        self.view.pan = view.pan;
        self.finish(complete);
    }

    fn can_fit(&self, rect: Rect) -> bool {
        has_extent(self.viewport.width)
            && has_extent(self.viewport.height)
            && has_extent(rect.width)
            && has_extent(rect.height)
            && rect.x.is_finite()
            && rect.y.is_finite()
    }

    fn finish(&mut self, complete: bool) {
        if complete {
            self.gesture_completed.emit(&self.view);
        }
    }

    fn clamp_scale(&self, scale: Point) -> Point {
        Point::new(
            clamp_axis(scale.x, self.min_scale, self.max_scale),
            clamp_axis(scale.y, self.min_scale, self.max_scale),
        )
    }
}

/// Clamp one scale component. NaN and non-positive values land on `min`.
fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

fn has_extent(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
