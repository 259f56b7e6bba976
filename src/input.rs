//! Input model: pointer and key events, modifier state, and the per-consumer
//! interaction result.
//!
//! Events arrive from the host widget in canvas space. The tool host fills in
//! the world-space point before dispatch when the host did not pre-transform
//! it. Every consumer answers with an [`InteractionResult`] which the tool
//! host folds into a single answer for the host widget.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::transform::{Point, ViewState};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether a command-style modifier (ctrl or meta) is held. Hotkeys are
    /// suppressed while one is, so `Ctrl+Z` never selects a tool.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// What happened to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseEventKind {
    Down,
    Up,
    /// Movement with no button held.
    Move,
    /// Movement with a button held.
    Drag,
    Wheel,
    /// The pointer left the canvas.
    Leave,
}

/// A pointer event as delivered by the host widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Position in canvas space (CSS pixels).
    pub canvas: Point,
    /// Position in world space. `None` means the engine computes it from the
    /// current transform.
    #[serde(default)]
    pub world: Option<Point>,
    #[serde(default)]
    pub button: Button,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub wheel: Option<WheelDelta>,
    /// Host timestamp in milliseconds; only ordering is meaningful.
    #[serde(default)]
    pub time_ms: f64,
}

impl MouseEvent {
    /// A primary-button event with no modifiers.
    #[must_use]
    pub fn new(kind: MouseEventKind, canvas: Point) -> Self {
        Self {
            kind,
            canvas,
            world: None,
            button: Button::Primary,
            modifiers: Modifiers::default(),
            wheel: None,
            time_ms: 0.0,
        }
    }

    /// A wheel event at `canvas` with vertical delta `dy`.
    #[must_use]
    pub fn wheel(canvas: Point, dy: f64) -> Self {
        Self { wheel: Some(WheelDelta { dx: 0.0, dy }), ..Self::new(MouseEventKind::Wheel, canvas) }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    /// This event with `world` computed from `view` when the host left it
    /// empty.
    #[must_use]
    pub fn resolved(mut self, view: ViewState) -> Self {
        if self.world.is_none() {
            self.world = Some(view.canvas_to_world(self.canvas));
        }
        self
    }

    /// The world point carried by the event, or the canvas point mapped
    /// through `view`.
    #[must_use]
    pub fn world_point(&self, view: ViewState) -> Point {
        self.world.unwrap_or_else(|| view.canvas_to_world(self.canvas))
    }
}

/// A keyboard key as reported by the host (e.g. `"Escape"`, `" "`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Lower-cased single character, if this key is one. Used for hotkeys.
    #[must_use]
    pub fn letter(&self) -> Option<char> {
        let mut chars = self.0.chars();
        let first = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        first.to_lowercase().next()
    }
}

/// A key press or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    /// `true` on press (including auto-repeat), `false` on release.
    pub down: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn down(name: &str) -> Self {
        Self { key: Key::new(name), down: true, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn up(name: &str) -> Self {
        Self { key: Key::new(name), down: false, modifiers: Modifiers::default() }
    }
}

/// One consumer's answer to an input event.
///
/// `redraw` asks the host to repaint; `catch` stops dispatch so no later
/// consumer sees the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionResult {
    pub redraw: bool,
    pub catch: bool,
}

impl InteractionResult {
    /// Not handled: no redraw, keep dispatching.
    pub const IGNORED: Self = Self { redraw: false, catch: false };
    /// Redraw but let later consumers see the event too.
    pub const REDRAW: Self = Self { redraw: true, catch: false };
    /// Consumed and needs a redraw.
    pub const CAUGHT: Self = Self { redraw: true, catch: true };

    #[must_use]
    pub fn new(redraw: bool, catch: bool) -> Self {
        Self { redraw, catch }
    }

    /// Fold a later consumer's result into this one: redraw accumulates,
    /// catch is taken from whichever consumer caught.
    #[must_use]
    pub fn merge(self, other: InteractionResult) -> Self {
        Self { redraw: self.redraw || other.redraw, catch: self.catch || other.catch }
    }
}
