//! Reference tools: pan, zoom, and range-select.

pub mod pan;
pub mod range_select;
pub mod zoom;

pub use pan::PanTool;
pub use range_select::{RangeSelectTool, SelectShape};
pub use zoom::ZoomTool;

use crate::config::CanvasConfig;
use crate::tool::Tool;

/// The standard roster: pan, zoom, range-select, in that order.
#[must_use]
pub fn standard_roster(config: &CanvasConfig, shape: SelectShape) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(PanTool::new()),
        Box::new(ZoomTool::new(config.click_zoom_step, config.zoom_axes)),
        Box::new(RangeSelectTool::new(shape)),
    ]
}
