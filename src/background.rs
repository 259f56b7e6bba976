//! Domain content drawn beneath every tool and UI element.
//!
//! A background paints in the same two passes as any [`Layer`]. Unlike
//! layers it also has a [`Background::prepare`] step that the drawer calls at
//! the start of every frame to rebuild viewport-dependent layout (axis ticks),
//! and it reports the world-space [`Background::bounds`] used to fit the view
//! when data is loaded.

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use std::ops::Range;

use crate::axis::{self, Tick};
use crate::consts::{AXIS_TICK_LEN_PX, AXIS_TICK_SPACING_PX, SPECTRUM_LINE_PX};
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::tool::Layer;
use crate::transform::{Point, Rect};

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("image is {width}x{height} but has {actual} pixels")]
    PixelCount { width: usize, height: usize, actual: usize },
    #[error("spectrum has {energies} energies but {counts} counts")]
    SampleCount { energies: usize, counts: usize },
}

pub trait Background: Layer {
    /// Recompute derived layout for this frame. Called before either pass.
    fn prepare(&mut self, _params: &DrawParams) {}

    /// Extent of the content in world space.
    fn bounds(&self) -> Rect;
}

// =============================================================
// Image
// =============================================================

/// Row-major scalar image rendered as greyscale, one world unit per pixel.
///
/// Only pixels intersecting the visible world rect are drawn. When zoomed out
/// past one pixel per screen pixel, pixels are sampled in blocks so the number
/// of fills stays proportional to the viewport, not the image.
#[derive(Debug, Clone)]
pub struct ImageBackground {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
    lo: f32,
    hi: f32,
}

impl ImageBackground {
    /// # Errors
    ///
    /// Returns [`BackgroundError::PixelCount`] if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<f32>) -> Result<Self, BackgroundError> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(BackgroundError::PixelCount { width, height, actual: pixels.len() });
        }
        let (lo, hi) = pixels
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (0.0, 0.0) };
        Ok(Self { width, height, pixels, lo, hi })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn value(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Grey level for a sample, stretched over the image's finite range.
    #[must_use]
    pub fn grey(&self, value: f32) -> u8 {
        if !value.is_finite() || self.hi <= self.lo {
            return 0;
        }
        let t = ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        unit_to_byte(t)
    }
}

impl Layer for ImageBackground {
    fn draw_world(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), SurfaceError> {
        let Some(visible) = params.visible_world_rect().intersect(&self.bounds()) else {
            return Ok(());
        };
        let cols = index_range(visible.x, visible.max().x, self.width);
        let rows = index_range(visible.y, visible.max().y, self.height);
        let step_x = block_size(params.world_per_px_x());
        let step_y = block_size(params.world_per_px_y());

        surface.save();
        let mut current = None;
        for y in rows.step_by(step_y) {
            for x in cols.clone().step_by(step_x) {
                let Some(value) = self.value(x, y) else {
                    continue;
                };
                let grey = self.grey(value);
                if current != Some(grey) {
                    surface.set_fill(&format!("rgb({grey}, {grey}, {grey})"));
                    current = Some(grey);
                }
                surface.fill_rect(Rect::new(to_f64(x), to_f64(y), to_f64(step_x), to_f64(step_y)));
            }
        }
        surface.restore();
        Ok(())
    }
}

impl Background for ImageBackground {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, to_f64(self.width), to_f64(self.height))
    }
}

// =============================================================
// Spectrum
// =============================================================

/// A 1D spectrum: counts sampled at increasing energies.
///
/// World x is energy; world y is `-counts`, so counts grow upward on screen
/// while scale stays positive. The line is mapped to canvas pixels and drawn
/// in the screen pass so its width does not stretch with axis-locked zoom.
/// Axis ticks are recomputed in `prepare` for the visible range and drawn
/// along the bottom and left edges.
#[derive(Debug, Clone)]
pub struct SpectrumBackground {
    energies: Vec<f64>,
    counts: Vec<f64>,
    color: String,
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
}

impl SpectrumBackground {
    /// # Errors
    ///
    /// Returns [`BackgroundError::SampleCount`] if the slices differ in length.
    pub fn new(energies: Vec<f64>, counts: Vec<f64>) -> Result<Self, BackgroundError> {
        if energies.len() != counts.len() {
            return Err(BackgroundError::SampleCount { energies: energies.len(), counts: counts.len() });
        }
        Ok(Self { energies, counts, color: "#1E90FF".into(), x_ticks: Vec::new(), y_ticks: Vec::new() })
    }

    #[must_use]
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.into();
        self
    }

    /// Energy ticks from the last `prepare`.
    #[must_use]
    pub fn x_ticks(&self) -> &[Tick] {
        &self.x_ticks
    }

    /// Count ticks from the last `prepare`. Values are counts, not world y.
    #[must_use]
    pub fn y_ticks(&self) -> &[Tick] {
        &self.y_ticks
    }

    /// Samples whose energy falls in `[lo, hi]`, plus one neighbour on each
    /// side so the line runs off the edge of the view instead of stopping
    /// short.
    fn visible_points(&self, lo: f64, hi: f64) -> Vec<Point> {
        let start = self.energies.partition_point(|&e| e < lo).saturating_sub(1);
        let end = (self.energies.partition_point(|&e| e <= hi) + 1).min(self.energies.len());
        if start >= end {
            return Vec::new();
        }
        self.energies[start..end].iter().zip(&self.counts[start..end]).map(|(&e, &c)| Point::new(e, -c)).collect()
    }
}

impl Layer for SpectrumBackground {
    fn draw_screen(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), SurfaceError> {
        let visible = params.visible_world_rect();
        let line: Vec<Point> = self
            .visible_points(visible.x, visible.max().x)
            .into_iter()
            .map(|p| params.view.world_to_canvas(p))
            .collect();
        let bottom = params.viewport.height;
        surface.save();
        if line.len() >= 2 {
            surface.set_stroke(&self.color, SPECTRUM_LINE_PX);
            surface.polyline(&line);
        }
        surface.set_stroke("#888", 1.0);
        surface.set_fill("#888");
        surface.set_font("10px sans-serif");

        for tick in &self.x_ticks {
            let x = params.view.world_to_canvas(Point::new(tick.value, 0.0)).x;
            surface.polyline(&[Point::new(x, bottom), Point::new(x, bottom - AXIS_TICK_LEN_PX)]);
            surface.fill_text(&tick.label, Point::new(x + 2.0, bottom - AXIS_TICK_LEN_PX - 2.0))?;
        }
        for tick in &self.y_ticks {
            let y = params.view.world_to_canvas(Point::new(0.0, -tick.value)).y;
            surface.polyline(&[Point::new(0.0, y), Point::new(AXIS_TICK_LEN_PX, y)]);
            surface.fill_text(&tick.label, Point::new(AXIS_TICK_LEN_PX + 2.0, y - 2.0))?;
        }

        surface.restore();
        Ok(())
    }
}

impl Background for SpectrumBackground {
    fn prepare(&mut self, params: &DrawParams) {
        let visible = params.visible_world_rect();
        self.x_ticks = axis::ticks(visible.x, visible.max().x, params.viewport.width, AXIS_TICK_SPACING_PX);
        self.y_ticks = axis::ticks(-visible.max().y, -visible.y, params.viewport.height, AXIS_TICK_SPACING_PX);
    }

    fn bounds(&self) -> Rect {
        let (Some(&first), Some(&last)) = (self.energies.first(), self.energies.last()) else {
            return Rect::new(0.0, 0.0, 1.0, 1.0);
        };
        let peak = self.counts.iter().copied().filter(|c| c.is_finite()).fold(0.0, f64::max);
        let floor = self.counts.iter().copied().filter(|c| c.is_finite()).fold(0.0, f64::min);
        Rect::from_corners(Point::new(first, -peak), Point::new(last, -floor))
    }
}

// =============================================================
// Index helpers
// =============================================================

/// Indices of unit cells overlapping `[lo, hi)`, clipped to `0..len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn index_range(lo: f64, hi: f64, len: usize) -> Range<usize> {
    let start = lo.floor().max(0.0) as usize;
    let end = hi.ceil().max(0.0) as usize;
    start.min(len)..end.min(len)
}

/// Source pixels per fill when one screen pixel covers `world_per_px` pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn block_size(world_per_px: f64) -> usize {
    if world_per_px.is_finite() && world_per_px > 1.0 { world_per_px.floor() as usize } else { 1 }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_byte(t: f32) -> u8 {
    (t * 255.0).round() as u8
}
