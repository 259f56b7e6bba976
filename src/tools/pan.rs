//! Drag to pan.

#[cfg(test)]
#[path = "pan_test.rs"]
mod pan_test;

use crate::input::{Button, InteractionResult, MouseEvent, MouseEventKind};
use crate::tool::{Layer, Tool, ToolContext, ToolId};
use crate::transform::Point;

/// Keeps the world point grabbed on press under the pointer for the whole
/// drag. Moves request a redraw without catching, so overlays such as the
/// cursor readout still see them.
#[derive(Debug, Default)]
pub struct PanTool {
    /// World point grabbed on press; `None` when no drag is in progress.
    origin_world: Option<Point>,
}

impl PanTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.origin_world.is_some()
    }

    fn follow(origin: Point, event: &MouseEvent, ctx: &mut ToolContext<'_>, complete: bool) {
        let scale = ctx.transform.scale();
        let pan = Point::new(event.canvas.x - origin.x * scale.x, event.canvas.y - origin.y * scale.y);
        ctx.transform.set_pan(pan, complete);
    }
}

impl Layer for PanTool {}

impl Tool for PanTool {
    fn id(&self) -> ToolId {
        ToolId::Pan
    }

    fn deactivate(&mut self) {
        self.origin_world = None;
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        match event.kind {
            MouseEventKind::Down if event.button != Button::Secondary => {
                self.origin_world = Some(event.world_point(ctx.transform.view()));
                InteractionResult::new(false, true)
            }
            MouseEventKind::Drag => {
                let Some(origin) = self.origin_world else {
                    return InteractionResult::IGNORED;
                };
                Self::follow(origin, event, ctx, false);
                InteractionResult::REDRAW
            }
            MouseEventKind::Up => {
                let Some(origin) = self.origin_world.take() else {
                    return InteractionResult::IGNORED;
                };
                Self::follow(origin, event, ctx, true);
                InteractionResult::REDRAW
            }
            _ => InteractionResult::IGNORED,
        }
    }
}
