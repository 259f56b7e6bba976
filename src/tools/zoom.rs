//! Click to zoom by a fixed step, or drag vertically to zoom continuously.
//! Both are anchored at the press point.

#[cfg(test)]
#[path = "zoom_test.rs"]
mod zoom_test;

use crate::config::AxisLock;
use crate::consts::{CLICK_SLOP_PX, DRAG_ZOOM_PER_PX};
use crate::input::{InteractionResult, KeyEvent, MouseEvent, MouseEventKind};
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::tool::{Layer, Tool, ToolContext, ToolId};
use crate::transform::{Point, Rect};

const ANCHOR_MARK_PX: f64 = 6.0;

#[derive(Debug, Clone, Copy)]
struct ZoomDrag {
    anchor_world: Point,
    start_canvas: Point,
    start_scale: Point,
    moved: bool,
}

#[derive(Debug)]
pub struct ZoomTool {
    step: f64,
    axes: AxisLock,
    drag: Option<ZoomDrag>,
}

impl ZoomTool {
    /// `step` is the click zoom factor (> 1); `axes` limits which scale
    /// components change.
    #[must_use]
    pub fn new(step: f64, axes: AxisLock) -> Self {
        Self { step, axes, drag: None }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Scale for a drag that has travelled `dy` pixels from its start.
    /// Upward drags zoom in.
    fn drag_scale(&self, drag: &ZoomDrag, dy: f64) -> Point {
        let factor = (-dy * DRAG_ZOOM_PER_PX).exp();
        Point::new(
            if self.axes.x { drag.start_scale.x * factor } else { drag.start_scale.x },
            if self.axes.y { drag.start_scale.y * factor } else { drag.start_scale.y },
        )
    }

    fn track(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>, complete: bool) -> bool {
        let Some(mut drag) = self.drag else {
            return false;
        };
        let delta = event.canvas.sub(drag.start_canvas);
        if delta.x.abs() > CLICK_SLOP_PX || delta.y.abs() > CLICK_SLOP_PX {
            drag.moved = true;
        }
        if drag.moved {
            let scale = self.drag_scale(&drag, delta.y);
            ctx.transform.set_scale_relative_to(scale, drag.anchor_world, complete);
        }
        self.drag = Some(drag);
        drag.moved
    }
}

impl Layer for ZoomTool {
    fn draw_screen(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), SurfaceError> {
        let Some(drag) = self.drag else {
            return Ok(());
        };
        let c = params.view.world_to_canvas(drag.anchor_world);
        surface.save();
        surface.set_stroke("#1E90FF", 1.0);
        surface.polyline(&[Point::new(c.x - ANCHOR_MARK_PX, c.y), Point::new(c.x + ANCHOR_MARK_PX, c.y)]);
        surface.polyline(&[Point::new(c.x, c.y - ANCHOR_MARK_PX), Point::new(c.x, c.y + ANCHOR_MARK_PX)]);
        surface.stroke_rect(Rect::new(c.x - 2.0, c.y - 2.0, 4.0, 4.0));
        surface.restore();
        Ok(())
    }
}

impl Tool for ZoomTool {
    fn id(&self) -> ToolId {
        ToolId::Zoom
    }

    fn deactivate(&mut self) {
        self.drag = None;
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        match event.kind {
            MouseEventKind::Down => {
                self.drag = Some(ZoomDrag {
                    anchor_world: event.world_point(ctx.transform.view()),
                    start_canvas: event.canvas,
                    start_scale: ctx.transform.scale(),
                    moved: false,
                });
                InteractionResult::CAUGHT
            }
            MouseEventKind::Drag => {
                if self.drag.is_none() {
                    return InteractionResult::IGNORED;
                }
                self.track(event, ctx, false);
                InteractionResult::CAUGHT
            }
            MouseEventKind::Up => {
                let Some(drag) = self.drag else {
                    return InteractionResult::IGNORED;
                };
                if !self.track(event, ctx, true) {
                    let zoom_out = event.modifiers.alt || event.modifiers.shift;
                    let factor = if zoom_out { 1.0 / self.step } else { self.step };
                    ctx.transform.zoom_by(factor, drag.anchor_world, self.axes, true);
                }
                self.drag = None;
                InteractionResult::CAUGHT
            }
            _ => InteractionResult::IGNORED,
        }
    }

    /// Escape abandons a drag and puts the scale back.
    fn on_key(&mut self, event: &KeyEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        if !event.down || event.key.0 != "Escape" {
            return InteractionResult::IGNORED;
        }
        let Some(drag) = self.drag.take() else {
            return InteractionResult::IGNORED;
        };
        if drag.moved {
            ctx.transform.set_scale_relative_to(drag.start_scale, drag.anchor_world, true);
        }
        InteractionResult::CAUGHT
    }
}
