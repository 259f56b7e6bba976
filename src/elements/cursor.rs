//! Crosshair and world-coordinate readout that follows the pointer.

#[cfg(test)]
#[path = "cursor_test.rs"]
mod cursor_test;

use crate::input::{InteractionResult, MouseEvent, MouseEventKind};
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::tool::{Layer, ToolContext, UiElement};
use crate::transform::Point;

const READOUT_OFFSET_PX: f64 = 8.0;

/// Never catches: every pointer event passes through to later consumers.
#[derive(Debug)]
pub struct CursorOverlay {
    canvas: Option<Point>,
    /// Decimal places in the readout.
    precision: usize,
}

impl Default for CursorOverlay {
    fn default() -> Self {
        Self::new(2)
    }
}

impl CursorOverlay {
    #[must_use]
    pub fn new(precision: usize) -> Self {
        Self { canvas: None, precision }
    }

    /// Last pointer position in canvas space, `None` once it left the canvas.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.canvas
    }

    /// Readout text for a world point.
    #[must_use]
    pub fn readout(&self, world: Point) -> String {
        let p = self.precision;
        format!("{:.p$}, {:.p$}", world.x, world.y)
    }
}

impl Layer for CursorOverlay {
    fn draw_screen(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), SurfaceError> {
        let Some(c) = self.canvas else {
            return Ok(());
        };
        let world = params.view.canvas_to_world(c);
        surface.save();
        surface.set_stroke("rgba(255, 255, 255, 0.5)", 1.0);
        surface.polyline(&[Point::new(c.x, 0.0), Point::new(c.x, params.viewport.height)]);
        surface.polyline(&[Point::new(0.0, c.y), Point::new(params.viewport.width, c.y)]);
        surface.set_fill("#fff");
        surface.set_font("11px monospace");
        surface.fill_text(&self.readout(world), Point::new(c.x + READOUT_OFFSET_PX, c.y - READOUT_OFFSET_PX))?;
        surface.restore();
        Ok(())
    }
}

impl UiElement for CursorOverlay {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        match event.kind {
            MouseEventKind::Move | MouseEventKind::Drag | MouseEventKind::Down | MouseEventKind::Up => {
                self.canvas = Some(event.canvas);
                ctx.selection.hover(Some(event.world_point(ctx.transform.view())));
                InteractionResult::REDRAW
            }
            MouseEventKind::Leave => {
                self.canvas = None;
                ctx.selection.hover(None);
                InteractionResult::REDRAW
            }
            MouseEventKind::Wheel => InteractionResult::IGNORED,
        }
    }
}
