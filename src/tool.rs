//! Contracts shared by tools and UI elements.
//!
//! A [`Tool`] is a selectable interaction mode; exactly one is effective at a
//! time. A [`UiElement`] is always live and sits ahead of the tool in both
//! input priority and draw order. Both draw through [`Layer`], which gives
//! them an optional world-space pass and an optional screen-space pass.

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::input::{InteractionResult, KeyEvent, MouseEvent};
use crate::surface::{DrawParams, Surface, SurfaceError};
use crate::transform::{Point, Rect, Transform};

/// Identity of a tool. Closed set; the roster a host is built with may hold
/// any subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    /// Drag to pan the view.
    Pan,
    /// Click or drag to zoom around the pointer.
    Zoom,
    /// Rubber-band a region and hand it to the selection service.
    RangeSelect,
}

impl ToolId {
    pub const ALL: [ToolId; 3] = [ToolId::Pan, ToolId::Zoom, ToolId::RangeSelect];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Zoom => "zoom",
            Self::RangeSelect => "range_select",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool name that matches no [`ToolId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool id: {0}")]
pub struct UnknownToolId(pub String);

impl FromStr for ToolId {
    type Err = UnknownToolId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownToolId(s.to_string()))
    }
}

/// Per-tool state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolState {
    /// Not receiving input.
    Off,
    /// The normal selection, receiving input.
    Active,
    /// Temporarily substituted in by a held spring key, receiving input.
    Sprung,
}

/// Receives picks from tools and elements. Implemented by the host
/// application; the engine only notifies.
pub trait SelectionService {
    /// A committed world-space selection rectangle.
    fn select_range(&mut self, world: Rect);

    /// The world point under the pointer, or `None` when it left the canvas.
    fn hover(&mut self, _world: Option<Point>) {}
}

/// Selection service that drops everything.
#[derive(Debug, Default)]
pub struct NullSelection;

impl SelectionService for NullSelection {
    fn select_range(&mut self, _world: Rect) {}
}

/// Selection service that keeps every pick. Useful for headless replay.
#[derive(Debug, Default)]
pub struct SelectionLog {
    pub ranges: Vec<Rect>,
    pub last_hover: Option<Point>,
}

impl SelectionService for SelectionLog {
    fn select_range(&mut self, world: Rect) {
        self.ranges.push(world);
    }

    fn hover(&mut self, world: Option<Point>) {
        self.last_hover = world;
    }
}

/// Mutable state an input handler may touch.
pub struct ToolContext<'a> {
    pub transform: &'a mut Transform,
    pub selection: &'a mut dyn SelectionService,
}

/// Something that contributes pixels to a frame.
///
/// Both passes default to drawing nothing. Drawing reads state only; it must
/// never mutate the transform or host.
pub trait Layer {
    /// Draw in world coordinates; the surface already carries the view matrix.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the render backend rejects a call.
    fn draw_world(&self, _surface: &mut dyn Surface, _params: &DrawParams) -> Result<(), SurfaceError> {
        Ok(())
    }

    /// Draw in canvas pixels, unaffected by pan/zoom.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the render backend rejects a call.
    fn draw_screen(&self, _surface: &mut dyn Surface, _params: &DrawParams) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// A selectable interaction mode.
pub trait Tool: Layer {
    fn id(&self) -> ToolId;

    /// Called when the tool starts receiving input.
    fn activate(&mut self) {}

    /// Called when the tool stops receiving input. Must discard any
    /// half-built gesture.
    fn deactivate(&mut self) {}

    fn on_mouse(&mut self, _event: &MouseEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        InteractionResult::IGNORED
    }

    fn on_key(&mut self, _event: &KeyEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        InteractionResult::IGNORED
    }
}

/// An always-live overlay offered input before the effective tool.
pub trait UiElement: Layer {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn on_mouse(&mut self, _event: &MouseEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        InteractionResult::IGNORED
    }

    fn on_key(&mut self, _event: &KeyEvent, _ctx: &mut ToolContext<'_>) -> InteractionResult {
        InteractionResult::IGNORED
    }
}
