//! Physical scale bar, fixed in screen space and draggable.

#[cfg(test)]
#[path = "scale_bar_test.rs"]
mod scale_bar_test;

use crate::axis::nice_step;
use crate::config::ScaleBarConfig;
use crate::consts::{SCALE_BAR_HEIGHT_PX, SCALE_BAR_MARGIN_PX, SCALE_BAR_MAX_FRACTION};
use crate::input::{InteractionResult, MouseEvent, MouseEventKind};
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::tool::{Layer, ToolContext, UiElement};
use crate::transform::{Point, Rect, Size};

const PADDING_PX: f64 = 6.0;
const LABEL_WIDTH_PX: f64 = 56.0;

/// Displayed bar length in physical units and in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLength {
    pub units: f64,
    pub px: f64,
}

/// Catches presses that land on its box and drags itself; everything else
/// passes through.
#[derive(Debug)]
pub struct ScaleBar {
    config: ScaleBarConfig,
    /// Displacement from the default bottom-left position.
    offset: Point,
    /// Pointer position relative to the box origin while dragging.
    grab: Option<Point>,
}

impl ScaleBar {
    #[must_use]
    pub fn new(config: ScaleBarConfig) -> Self {
        Self { config, offset: Point::default(), grab: None }
    }

    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// The configured length, or the largest 1-2-5 length that stays within
    /// [`SCALE_BAR_MAX_FRACTION`] of the viewport width when the configured
    /// one would not.
    #[must_use]
    pub fn bar_length(&self, viewport: Size, scale_x: f64) -> BarLength {
        let px_per_unit = self.config.world_per_unit * scale_x;
        let nominal = BarLength { units: self.config.length_units, px: self.config.length_units * px_per_unit };
        let max_px = viewport.width * SCALE_BAR_MAX_FRACTION;
        let capped = max_px > 0.0 && px_per_unit.is_finite() && px_per_unit > 0.0;
        if !capped || nominal.px <= max_px {
            return nominal;
        }
        let limit = max_px / px_per_unit;
        let mut units = nice_step(limit);
        if units > limit {
            // previous value in the 1-2-5 sequence
            units = nice_step(units * 0.39);
        }
        BarLength { units, px: units * px_per_unit }
    }

    /// The box in canvas space, including label and padding.
    #[must_use]
    pub fn bounds(&self, viewport: Size, scale_x: f64) -> Rect {
        let origin = self.default_origin(viewport).add(self.offset);
        let width = self.bar_length(viewport, scale_x).px + LABEL_WIDTH_PX + PADDING_PX * 3.0;
        Rect::new(origin.x, origin.y, width, SCALE_BAR_HEIGHT_PX)
    }

    #[must_use]
    pub fn label(&self, length: BarLength) -> String {
        format!("{} {}", length.units, self.config.unit)
    }

    fn default_origin(&self, viewport: Size) -> Point {
        Point::new(SCALE_BAR_MARGIN_PX, viewport.height - SCALE_BAR_MARGIN_PX - SCALE_BAR_HEIGHT_PX)
    }
}

impl Layer for ScaleBar {
    fn draw_screen(&self, surface: &mut dyn Surface, params: &DrawParams) -> Result<(), SurfaceError> {
        let bounds = self.bounds(params.viewport, params.view.scale.x);
        let length = self.bar_length(params.viewport, params.view.scale.x);
        let bar_y = bounds.y + bounds.height * 0.5;
        let bar_x = bounds.x + PADDING_PX;
        let bar_len = length.px;

        surface.save();
        surface.set_fill("rgba(0, 0, 0, 0.55)");
        surface.fill_rect(bounds);
        surface.set_stroke("#fff", 2.0);
        surface.polyline(&[Point::new(bar_x, bar_y), Point::new(bar_x + bar_len, bar_y)]);
        surface.set_fill("#fff");
        surface.set_font("11px sans-serif");
        surface.fill_text(&self.label(length), Point::new(bar_x + bar_len + PADDING_PX, bar_y + 4.0))?;
        surface.restore();
        Ok(())
    }
}

impl UiElement for ScaleBar {
    fn name(&self) -> &'static str {
        "scale_bar"
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        let viewport = ctx.transform.viewport();
        match event.kind {
            MouseEventKind::Down => {
                let bounds = self.bounds(viewport, ctx.transform.scale().x);
                if !bounds.contains(event.canvas) {
                    return InteractionResult::IGNORED;
                }
                self.grab = Some(event.canvas.sub(bounds.min()));
                InteractionResult::new(false, true)
            }
            MouseEventKind::Drag => {
                let Some(grab) = self.grab else {
                    return InteractionResult::IGNORED;
                };
                let origin = event.canvas.sub(grab);
                self.offset = origin.sub(self.default_origin(viewport));
                InteractionResult::CAUGHT
            }
            MouseEventKind::Up => {
                if self.grab.take().is_none() {
                    return InteractionResult::IGNORED;
                }
                InteractionResult::CAUGHT
            }
            _ => InteractionResult::IGNORED,
        }
    }
}
