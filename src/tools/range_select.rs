//! Rubber-band selection.
//!
//! The band lives in canvas space while it is being dragged and is converted
//! to world space once, on release, before it is handed to the selection
//! service.

#[cfg(test)]
#[path = "range_select_test.rs"]
mod range_select_test;

use crate::consts::SELECTION_DASH_PX;
use crate::input::{InteractionResult, KeyEvent, MouseEvent, MouseEventKind};
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::tool::{Layer, Tool, ToolContext, ToolId};
use crate::transform::{Point, Rect, Size};

/// Shape of the selected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectShape {
    /// Free rectangle (image viewer).
    #[default]
    Rect,
    /// Horizontal span covering the full viewport height (spectrum energy
    /// window).
    XSpan,
}

#[derive(Debug, Default)]
pub struct RangeSelectTool {
    shape: SelectShape,
    /// Canvas-space press point and current point.
    band: Option<(Point, Point)>,
}

impl RangeSelectTool {
    #[must_use]
    pub fn new(shape: SelectShape) -> Self {
        Self { shape, band: None }
    }

    #[must_use]
    pub fn shape(&self) -> SelectShape {
        self.shape
    }

    /// Current band in canvas space, if a drag is in progress.
    #[must_use]
    pub fn band(&self, viewport: Size) -> Option<Rect> {
        let (start, current) = self.band?;
        let rect = Rect::from_corners(start, current);
        Some(match self.shape {
            SelectShape::Rect => rect,
            SelectShape::XSpan => Rect::new(rect.x, 0.0, rect.width, viewport.height),
        })
    }
}

impl Layer for RangeSelectTool {
    fn draw_screen(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), SurfaceError> {
        let Some(band) = self.band(params.viewport) else {
            return Ok(());
        };
        surface.save();
        surface.set_fill("rgba(30, 144, 255, 0.12)");
        surface.fill_rect(band);
        surface.set_stroke("#1E90FF", 1.0);
        surface.set_line_dash(&[SELECTION_DASH_PX, SELECTION_DASH_PX])?;
        surface.stroke_rect(band);
        surface.set_line_dash(&[])?;
        surface.restore();
        Ok(())
    }
}

impl Tool for RangeSelectTool {
    fn id(&self) -> ToolId {
        ToolId::RangeSelect
    }

    fn deactivate(&mut self) {
        self.band = None;
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        match event.kind {
            MouseEventKind::Down => {
                self.band = Some((event.canvas, event.canvas));
                InteractionResult::CAUGHT
            }
            MouseEventKind::Drag => {
                let Some((start, _)) = self.band else {
                    return InteractionResult::IGNORED;
                };
                self.band = Some((start, event.canvas));
                InteractionResult::CAUGHT
            }
            MouseEventKind::Up => {
                let Some((start, _)) = self.band else {
                    return InteractionResult::IGNORED;
                };
                self.band = Some((start, event.canvas));
                let band = self.band(ctx.transform.viewport());
                self.band = None;
                if let Some(band) = band.filter(|b| b.width > 0.0 && b.height > 0.0) {
                    let world = Rect::from_corners(
                        ctx.transform.canvas_to_world(band.min()),
                        ctx.transform.canvas_to_world(band.max()),
                    );
                    ctx.selection.select_range(world);
                }
                InteractionResult::CAUGHT
            }
            _ => InteractionResult::IGNORED,
        }
    }

    /// Escape drops the band without selecting.
    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        if event.down && event.key.0 == "Escape" && self.band.take().is_some() {
            return InteractionResult::CAUGHT;
        }
        InteractionResult::IGNORED
    }
}
