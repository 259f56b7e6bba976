//! Tool host: owns the tool roster and UI elements, decides which tool is
//! effective, and routes input.
//!
//! ## State machine
//!
//! Each tool is `Off`, `Active` (the normal selection) or `Sprung`
//! (substituted in while a spring key is held). `active` always names the
//! tool receiving input. While a spring is held, `sprung_override` names the
//! tool it covers, which is restored on release. Selecting a tool during a
//! spring does not cut the spring short: the new selection is queued in
//! `sprung_override` and takes over on release.
//!
//! ## Ordering
//!
//! `elements` is one ordered list serving two purposes: input priority
//! (earlier elements see events first and may catch them) and draw order
//! (earlier elements paint first). The effective tool comes after all
//! elements in both, so its feedback paints on top of persistent overlays.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AxisLock, CanvasConfig};
use crate::input::{InteractionResult, KeyEvent, MouseEvent, MouseEventKind};
use crate::signal::Signal;
use crate::tool::{Layer, Tool, ToolContext, ToolId, ToolState, UiElement};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("tool roster is empty")]
    EmptyRoster,
    #[error("tool `{0}` appears more than once in the roster")]
    DuplicateTool(ToolId),
}

/// Payload of [`ToolHost::tool_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolChange {
    /// The tool now receiving input.
    pub active: ToolId,
    /// The tool that will be restored when the spring is released.
    pub sprung_override: Option<ToolId>,
}

pub struct ToolHost {
    tools: Vec<Box<dyn Tool>>,
    elements: Vec<Box<dyn UiElement>>,
    active: ToolId,
    sprung_override: Option<ToolId>,
    config: CanvasConfig,
    /// Fired synchronously after every tool transition, for toolbar refresh.
    pub tool_changed: Signal<ToolChange>,
}

impl fmt::Debug for ToolHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHost")
            .field("tools", &self.tool_ids())
            .field("elements", &self.element_names())
            .field("active", &self.active)
            .field("sprung_override", &self.sprung_override)
            .finish_non_exhaustive()
    }
}

impl ToolHost {
    /// Build a host and activate the configured initial tool.
    ///
    /// Falls back to the first tool in the roster (with a warning) when the
    /// configured initial tool is not in it.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::EmptyRoster`] or [`HostError::DuplicateTool`].
    pub fn new(
        tools: Vec<Box<dyn Tool>>,
        elements: Vec<Box<dyn UiElement>>,
        config: &CanvasConfig,
    ) -> Result<Self, HostError> {
        let Some(first) = tools.first().map(|t| t.id()) else {
            return Err(HostError::EmptyRoster);
        };
        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].iter().any(|t| t.id() == tool.id()) {
                return Err(HostError::DuplicateTool(tool.id()));
            }
        }

        let initial = if tools.iter().any(|t| t.id() == config.initial_tool) {
            config.initial_tool
        } else {
            warn!(tool = %config.initial_tool, fallback = %first, "initial tool not in roster");
            first
        };

        let mut host = Self {
            tools,
            elements,
            active: initial,
            sprung_override: None,
            config: config.clone(),
            tool_changed: Signal::new(),
        };
        host.activate(initial);
        Ok(host)
    }

    // --- Queries ---

    /// The tool currently receiving input (sprung or normally selected).
    #[must_use]
    pub fn active_tool(&self) -> ToolId {
        self.active
    }

    /// The tool covered by a held spring, restored on release.
    #[must_use]
    pub fn sprung_override(&self) -> Option<ToolId> {
        self.sprung_override
    }

    #[must_use]
    pub fn is_sprung(&self) -> bool {
        self.sprung_override.is_some()
    }

    #[must_use]
    pub fn state(&self, id: ToolId) -> ToolState {
        if id != self.active || !self.has_tool(id) {
            ToolState::Off
        } else if self.sprung_override.is_some() {
            ToolState::Sprung
        } else {
            ToolState::Active
        }
    }

    #[must_use]
    pub fn has_tool(&self, id: ToolId) -> bool {
        self.tools.iter().any(|t| t.id() == id)
    }

    #[must_use]
    pub fn tool_ids(&self) -> Vec<ToolId> {
        self.tools.iter().map(|t| t.id()).collect()
    }

    #[must_use]
    pub fn element_names(&self) -> Vec<&'static str> {
        self.elements.iter().map(|e| e.name()).collect()
    }

    /// Layers in draw order: UI elements in list order, then the effective
    /// tool last.
    #[must_use]
    pub fn drawers(&self) -> Vec<&dyn Layer> {
        let mut layers: Vec<&dyn Layer> = self.elements.iter().map(|e| e.as_ref() as &dyn Layer).collect();
        if let Some(tool) = self.tools.iter().find(|t| t.id() == self.active) {
            layers.push(tool.as_ref() as &dyn Layer);
        }
        layers
    }

    // --- Transitions ---

    /// Select `id` as the normal tool.
    ///
    /// During a spring the selection is queued underneath and takes effect on
    /// release; selecting the sprung tool itself ends the spring and keeps
    /// that tool.
    pub fn set_tool(&mut self, id: ToolId) {
        if !self.has_tool(id) {
            warn!(tool = %id, "set_tool: tool not in roster");
            return;
        }
        match self.sprung_override {
            Some(_) if id == self.active => {
                self.sprung_override = None;
            }
            Some(covered) => {
                if covered == id {
                    return;
                }
                self.sprung_override = Some(id);
            }
            None => {
                if id == self.active {
                    return;
                }
                self.deactivate(self.active);
                self.activate(id);
                self.active = id;
            }
        }
        debug!(active = %self.active, queued = ?self.sprung_override, "tool selected");
        self.notify();
    }

    /// Spring `Some(id)` in over the current tool, or release with `None`.
    ///
    /// Springing the tool that is already active is a no-op, so key repeat
    /// is harmless. Only one spring is held at a time. Releasing with nothing
    /// sprung is logged and ignored.
    pub fn spring_activate(&mut self, id: Option<ToolId>) {
        match id {
            Some(id) => self.spring_in(id),
            None => self.spring_out(),
        }
    }

    /// Release a held spring, if any. Returns whether one was released.
    pub fn release_spring(&mut self) -> bool {
        if self.sprung_override.is_none() {
            return false;
        }
        self.spring_out();
        true
    }

    fn spring_in(&mut self, id: ToolId) {
        if !self.has_tool(id) {
            warn!(tool = %id, "spring_activate: tool not in roster");
            return;
        }
        if id == self.active {
            return;
        }
        if self.sprung_override.is_some() {
            debug!(tool = %id, sprung = %self.active, "spring ignored: another tool is already sprung");
            return;
        }
        self.deactivate(self.active);
        self.sprung_override = Some(self.active);
        self.activate(id);
        self.active = id;
        debug!(active = %id, covered = ?self.sprung_override, "tool sprung");
        self.notify();
    }

    fn spring_out(&mut self) {
        let Some(restore) = self.sprung_override.take() else {
            warn!(active = %self.active, "spring release with no pending override");
            return;
        };
        if restore != self.active {
            self.deactivate(self.active);
            self.activate(restore);
            self.active = restore;
        }
        debug!(active = %self.active, "spring released");
        self.notify();
    }

    fn activate(&mut self, id: ToolId) {
        if let Some(tool) = self.tool_mut(id) {
            tool.activate();
        }
    }

    fn deactivate(&mut self, id: ToolId) {
        if let Some(tool) = self.tool_mut(id) {
            tool.deactivate();
        }
    }

    fn tool_mut(&mut self, id: ToolId) -> Option<&mut Box<dyn Tool>> {
        self.tools.iter_mut().find(|t| t.id() == id)
    }

    fn notify(&mut self) {
        let change = ToolChange { active: self.active, sprung_override: self.sprung_override };
        self.tool_changed.emit(&change);
    }

    // --- Dispatch ---

    /// Route a pointer event: viewport gestures, then UI elements in order,
    /// then the effective tool. Stops at the first catch.
    pub fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        let event = &event.resolved(ctx.transform.view());
        if let Some(result) = self.viewport_gesture(event, ctx) {
            return result;
        }

        let mut folded = InteractionResult::IGNORED;
        for element in &mut self.elements {
            let result = element.on_mouse(event, ctx);
            folded = folded.merge(result);
            if result.catch {
                return folded;
            }
        }

        let active = self.active;
        if let Some(tool) = self.tool_mut(active) {
            folded = folded.merge(tool.on_mouse(event, ctx));
        }
        folded
    }

    /// Route a key event: spring keys, then hotkeys, then UI elements, then
    /// the effective tool.
    pub fn on_key(&mut self, event: &KeyEvent, ctx: &mut ToolContext<'_>) -> InteractionResult {
        if let Some(id) = self.config.spring_key(&event.key.0) {
            let before = (self.active, self.sprung_override);
            if event.down {
                self.spring_activate(Some(id));
            } else if self.active == id && self.sprung_override.is_some() {
                self.spring_out();
            }
            let changed = before != (self.active, self.sprung_override);
            return InteractionResult::new(changed, true);
        }

        if event.down && !event.modifiers.command() && event.key.letter().is_some() {
            if let Some(id) = self.config.hotkey(&event.key.0) {
                let before = (self.active, self.sprung_override);
                self.set_tool(id);
                let changed = before != (self.active, self.sprung_override);
                return InteractionResult::new(changed, true);
            }
        }

        let mut folded = InteractionResult::IGNORED;
        for element in &mut self.elements {
            let result = element.on_key(event, ctx);
            folded = folded.merge(result);
            if result.catch {
                return folded;
            }
        }

        let active = self.active;
        if let Some(tool) = self.tool_mut(active) {
            folded = folded.merge(tool.on_key(event, ctx));
        }
        folded
    }

    /// Gestures owned by the viewport rather than any tool. Currently the
    /// scroll wheel, which zooms around the pointer.
    fn viewport_gesture(&self, event: &MouseEvent, ctx: &mut ToolContext<'_>) -> Option<InteractionResult> {
        if event.kind != MouseEventKind::Wheel {
            return None;
        }
        let delta = event.wheel?;
        if delta.dy.abs() < f64::EPSILON {
            return None;
        }
        let factor = if delta.dy < 0.0 { self.config.wheel_zoom_step } else { 1.0 / self.config.wheel_zoom_step };
        ctx.transform.zoom_by(factor, event.world_point(ctx.transform.view()), self.zoom_axes(), true);
        Some(InteractionResult::CAUGHT)
    }

    fn zoom_axes(&self) -> AxisLock {
        self.config.zoom_axes
    }
}
