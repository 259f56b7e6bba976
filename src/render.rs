//! The drawer: composes one frame from the background and the host's layers.
//!
//! A frame is two passes over the same ordered list (background first, then
//! [`ToolHost::drawers`]):
//!
//! 1. World pass: matrix `dpr * view`, so layers draw in world coordinates.
//! 2. Screen pass: matrix `dpr` only, so layers draw in CSS pixels.
//!
//! Each pass runs inside its own save/restore pair. The drawer reads the
//! transform and host but never mutates them; only the background's derived
//! layout is refreshed, once per frame, before either pass.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::background::Background;
use crate::host::ToolHost;
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::tool::Layer;
use crate::transform::{Transform, ViewState};

/// Draw one full frame.
///
/// `dpr` is the device pixel ratio; non-positive or non-finite values are
/// treated as `1.0`.
///
/// # Errors
///
/// Returns the first [`SurfaceError`] raised by the surface or a layer. The
/// surface's save/restore stack is balanced even on error.
pub fn draw_frame(
    surface: &mut dyn Surface,
    transform: &Transform,
    host: &ToolHost,
    background: &mut dyn Background,
    dpr: f64,
) -> Result<(), SurfaceError> {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let params = DrawParams { viewport: transform.viewport(), view: transform.view(), dpr };
    background.prepare(&params);
    let background: &dyn Background = background;
    let layers = host.drawers();

    let base = base_matrix(dpr);
    surface.set_transform(base)?;
    surface.clear(params.viewport.to_rect());

    in_pass(surface, world_matrix(params.view, dpr), |s| {
        background.draw_world(s, &params)?;
        for layer in &layers {
            layer.draw_world(s, &params)?;
        }
        Ok(())
    })?;

    in_pass(surface, base, |s| {
        background.draw_screen(s, &params)?;
        for layer in &layers {
            layer.draw_screen(s, &params)?;
        }
        Ok(())
    })
}

/// Screen-space matrix: CSS pixels to device pixels.
#[must_use]
pub fn base_matrix(dpr: f64) -> [f64; 6] {
    [dpr, 0.0, 0.0, dpr, 0.0, 0.0]
}

/// World-space matrix: the view mapping followed by the device pixel ratio.
#[must_use]
pub fn world_matrix(view: ViewState, dpr: f64) -> [f64; 6] {
    view.matrix().map(|v| v * dpr)
}

fn in_pass(
    surface: &mut dyn Surface,
    matrix: [f64; 6],
    body: impl FnOnce(&mut dyn Surface) -> Result<(), SurfaceError>,
) -> Result<(), SurfaceError> {
    surface.save();
    let result = surface.set_transform(matrix).and_then(|()| body(&mut *surface));
    surface.restore();
    result
}
