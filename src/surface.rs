//! Render targets.
//!
//! [`Surface`] is the narrow set of 2D calls the drawer and layers need. The
//! browser implementation wraps [`web_sys::CanvasRenderingContext2d`] and is
//! the only place in the crate that touches it. [`Recorder`] captures the
//! calls instead, for headless replay and tests.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::transform::{Point, Rect, Size, ViewState};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("render backend call `{call}` failed: {detail}")]
    Backend { call: &'static str, detail: String },
    #[error("render surface unavailable: {0}")]
    Unavailable(String),
}

impl SurfaceError {
    pub(crate) fn js(call: &'static str, err: &JsValue) -> Self {
        Self::Backend { call, detail: format!("{err:?}") }
    }
}

/// Per-frame drawing parameters handed to every layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Canvas size in CSS pixels.
    pub viewport: Size,
    /// The world transform in effect for this frame.
    pub view: ViewState,
    /// Device pixel ratio; the base matrix of both passes.
    pub dpr: f64,
}

impl DrawParams {
    /// World-space rectangle covered by the viewport.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        let a = self.view.canvas_to_world(Point::new(0.0, 0.0));
        let b = self.view.canvas_to_world(Point::new(self.viewport.width, self.viewport.height));
        Rect::from_corners(a, b)
    }

    /// World length of one canvas pixel along x. Used to keep strokes and
    /// dashes a constant on-screen width inside the world pass.
    #[must_use]
    pub fn world_per_px_x(&self) -> f64 {
        1.0 / self.view.scale.x
    }

    #[must_use]
    pub fn world_per_px_y(&self) -> f64 {
        1.0 / self.view.scale.y
    }
}

/// A 2D render target supplied by the host widget.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);

    /// Replace the current matrix with `[a, b, c, d, e, f]`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend rejects the matrix.
    fn set_transform(&mut self, matrix: [f64; 6]) -> Result<(), SurfaceError>;

    fn clear(&mut self, rect: Rect);
    fn set_fill(&mut self, color: &str);
    fn set_stroke(&mut self, color: &str, width: f64);

    /// Dash pattern for subsequent strokes; empty for solid.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend rejects the pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError>;

    fn set_font(&mut self, font: &str);
    fn fill_rect(&mut self, rect: Rect);
    fn stroke_rect(&mut self, rect: Rect);
    fn polyline(&mut self, points: &[Point]);

    /// # Errors
    ///
    /// Returns `Err` if the backend fails to lay out the text.
    fn fill_text(&mut self, text: &str, at: Point) -> Result<(), SurfaceError>;
}

// =============================================================
// Browser canvas
// =============================================================

impl Surface for CanvasRenderingContext2d {
    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn set_transform(&mut self, m: [f64; 6]) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::set_transform(self, m[0], m[1], m[2], m[3], m[4], m[5])
            .map_err(|e| SurfaceError::js("setTransform", &e))
    }

    fn clear(&mut self, rect: Rect) {
        self.clear_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn set_fill(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.set_stroke_style_str(color);
        self.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        let dash_array = js_sys::Array::new();
        for segment in segments {
            dash_array.push(&JsValue::from_f64(*segment));
        }
        CanvasRenderingContext2d::set_line_dash(self, &dash_array).map_err(|e| SurfaceError::js("setLineDash", &e))
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn fill_rect(&mut self, rect: Rect) {
        CanvasRenderingContext2d::fill_rect(self, rect.x, rect.y, rect.width, rect.height);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        CanvasRenderingContext2d::stroke_rect(self, rect.x, rect.y, rect.width, rect.height);
    }

    fn polyline(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_path();
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        self.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Point) -> Result<(), SurfaceError> {
        CanvasRenderingContext2d::fill_text(self, text, at.x, at.y).map_err(|e| SurfaceError::js("fillText", &e))
    }
}

// =============================================================
// Recorder
// =============================================================

/// One captured surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    SetTransform([f64; 6]),
    Clear(Rect),
    SetFill(String),
    SetStroke { color: String, width: f64 },
    SetLineDash(Vec<f64>),
    SetFont(String),
    FillRect(Rect),
    StrokeRect(Rect),
    Polyline(Vec<Point>),
    Text { text: String, at: Point },
}

/// A surface that records every call in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub ops: Vec<DrawOp>,
    /// When set, `set_transform` fails. Exercises error propagation.
    pub fail_transforms: bool,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `Save` calls minus `Restore` calls; zero for a balanced frame.
    #[must_use]
    pub fn save_depth(&self) -> i64 {
        self.ops.iter().fold(0, |depth, op| match op {
            DrawOp::Save => depth + 1,
            DrawOp::Restore => depth - 1,
            _ => depth,
        })
    }

    /// Texts drawn, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for Recorder {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn set_transform(&mut self, matrix: [f64; 6]) -> Result<(), SurfaceError> {
        if self.fail_transforms {
            return Err(SurfaceError::Backend { call: "setTransform", detail: "recorder set to fail".into() });
        }
        self.ops.push(DrawOp::SetTransform(matrix));
        Ok(())
    }

    fn clear(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Clear(rect));
    }

    fn set_fill(&mut self, color: &str) {
        self.ops.push(DrawOp::SetFill(color.to_string()));
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.ops.push(DrawOp::SetStroke { color: color.to_string(), width });
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::SetLineDash(segments.to_vec()));
        Ok(())
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(DrawOp::SetFont(font.to_string()));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::StrokeRect(rect));
    }

    fn polyline(&mut self, points: &[Point]) {
        self.ops.push(DrawOp::Polyline(points.to_vec()));
    }

    fn fill_text(&mut self, text: &str, at: Point) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::Text { text: text.to_string(), at });
        Ok(())
    }
}
