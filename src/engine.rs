use tracing::{debug, error};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::background::{Background, ImageBackground, SpectrumBackground};
use crate::config::CanvasConfig;
use crate::elements::{CursorOverlay, ScaleBar};
use crate::host::{HostError, ToolHost};
use crate::input::{InteractionResult, KeyEvent, MouseEvent};
use crate::render;
use crate::signal::Signal;
use crate::surface::{Surface, SurfaceError};
use crate::tool::{SelectionService, Tool, ToolContext, ToolId, UiElement};
use crate::tools::{self, SelectShape};
use crate::transform::{Size, Transform, ViewState};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// How the view is fitted to content on load and on [`EngineCore::reset_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// One uniform scale, content centred (images keep their aspect ratio).
    #[default]
    Uniform,
    /// Content exactly fills the viewport on both axes (spectra).
    Fill,
}

/// Engine state that does not depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    transform: Transform,
    host: ToolHost,
    config: CanvasConfig,
    background: Box<dyn Background>,
    selection: Box<dyn SelectionService>,
    fit: FitMode,
    /// A fit was requested before the viewport had any area.
    fit_pending: bool,
    dpr: f64,
    /// Fired whenever the engine wants a repaint. The host widget coalesces.
    pub redraw: Signal<()>,
}

impl EngineCore {
    /// Build an engine around an explicit roster.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the tool roster is empty or has duplicates.
    pub fn new(
        config: CanvasConfig,
        tools: Vec<Box<dyn Tool>>,
        elements: Vec<Box<dyn UiElement>>,
        background: Box<dyn Background>,
        selection: Box<dyn SelectionService>,
    ) -> Result<Self, HostError> {
        let host = ToolHost::new(tools, elements, &config)?;
        Ok(Self {
            transform: Transform::new(config.min_scale, config.max_scale),
            host,
            config,
            background,
            selection,
            fit: FitMode::default(),
            fit_pending: false,
            dpr: 1.0,
            redraw: Signal::new(),
        })
    }

    /// The 2D image viewer: cursor overlay and scale bar, rectangular
    /// selection, uniform fit.
    ///
    /// # Errors
    ///
    /// See [`EngineCore::new`].
    pub fn image_viewer(
        config: CanvasConfig,
        image: ImageBackground,
        selection: Box<dyn SelectionService>,
    ) -> Result<Self, HostError> {
        let tools = tools::standard_roster(&config, SelectShape::Rect);
        let elements: Vec<Box<dyn UiElement>> =
            vec![Box::new(CursorOverlay::default()), Box::new(ScaleBar::new(config.scale_bar.clone()))];
        let mut core = Self::new(config, tools, elements, Box::new(image), selection)?;
        core.fit = FitMode::Uniform;
        Ok(core)
    }

    /// The 1D spectrum chart: cursor overlay, energy-window selection, fill
    /// fit.
    ///
    /// # Errors
    ///
    /// See [`EngineCore::new`].
    pub fn spectrum_chart(
        config: CanvasConfig,
        spectrum: SpectrumBackground,
        selection: Box<dyn SelectionService>,
    ) -> Result<Self, HostError> {
        let tools = tools::standard_roster(&config, SelectShape::XSpan);
        let elements: Vec<Box<dyn UiElement>> = vec![Box::new(CursorOverlay::default())];
        let mut core = Self::new(config, tools, elements, Box::new(spectrum), selection)?;
        core.fit = FitMode::Fill;
        Ok(core)
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Direct access, e.g. to subscribe to `gesture_completed`.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    #[must_use]
    pub fn host(&self) -> &ToolHost {
        &self.host
    }

    /// Direct access, e.g. to subscribe to `tool_changed`.
    pub fn host_mut(&mut self) -> &mut ToolHost {
        &mut self.host
    }

    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    #[must_use]
    pub fn background(&self) -> &dyn Background {
        self.background.as_ref()
    }

    #[must_use]
    pub fn fit_mode(&self) -> FitMode {
        self.fit
    }

    pub fn set_fit_mode(&mut self, fit: FitMode) {
        self.fit = fit;
    }

    #[must_use]
    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    ///
    /// Completes a fit that was deferred because the viewport was empty.
    pub fn set_viewport(&mut self, size: Size, dpr: f64) {
        self.transform.set_viewport(size);
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        if self.fit_pending {
            self.fit_to_background(false);
        }
        self.request_redraw();
    }

    /// Fit the view to the background according to the fit mode. Completes
    /// the gesture.
    pub fn reset_view(&mut self) {
        self.fit_to_background(true);
        self.request_redraw();
    }

    /// Apply a persisted view. Does not signal gesture completion.
    pub fn restore_view(&mut self, view: ViewState) {
        self.transform.restore(view, false);
        self.request_redraw();
    }

    /// Replace the background and start a fresh transform fitted to it.
    ///
    /// Gesture-completed subscribers carry over to the new transform.
    pub fn load_background(&mut self, background: Box<dyn Background>) {
        let mut fresh = Transform::new(self.config.min_scale, self.config.max_scale);
        fresh.set_viewport(self.transform.viewport());
        fresh.gesture_completed.absorb(&mut self.transform.gesture_completed);
        self.transform = fresh;
        self.background = background;
        self.fit_to_background(false);
        debug!(bounds = ?self.background.bounds(), "background loaded");
        self.request_redraw();
    }

    fn fit_to_background(&mut self, complete: bool) {
        let bounds = self.background.bounds();
        let fitted = match self.fit {
            FitMode::Uniform => self.transform.zoom_to_fit(bounds, complete),
            FitMode::Fill => self.transform.reset_view_to_rect(bounds, complete),
        };
        if !fitted {
            debug!(?bounds, viewport = ?self.transform.viewport(), "fit deferred until the viewport has area");
        }
        self.fit_pending = !fitted;
    }

    // --- Tools ---

    pub fn set_tool(&mut self, id: ToolId) {
        let before = self.host.active_tool();
        self.host.set_tool(id);
        if self.host.active_tool() != before {
            self.request_redraw();
        }
    }

    pub fn spring_activate(&mut self, id: Option<ToolId>) {
        let before = (self.host.active_tool(), self.host.sprung_override());
        self.host.spring_activate(id);
        if (self.host.active_tool(), self.host.sprung_override()) != before {
            self.request_redraw();
        }
    }

    // --- Input events ---

    /// Dispatch a pointer event. The world point is filled from the current
    /// transform when the caller left it empty.
    pub fn on_mouse(&mut self, event: &MouseEvent) -> InteractionResult {
        let event = event.resolved(self.transform.view());
        let mut ctx = ToolContext { transform: &mut self.transform, selection: self.selection.as_mut() };
        let result = self.host.on_mouse(&event, &mut ctx);
        if result.redraw {
            self.request_redraw();
        }
        result
    }

    pub fn on_key(&mut self, event: &KeyEvent) -> InteractionResult {
        let mut ctx = ToolContext { transform: &mut self.transform, selection: self.selection.as_mut() };
        let result = self.host.on_key(event, &mut ctx);
        if result.redraw {
            self.request_redraw();
        }
        result
    }

    /// The canvas lost keyboard focus. Key-ups will not arrive, so any held
    /// spring is released now.
    pub fn on_focus_lost(&mut self) -> InteractionResult {
        if self.host.release_spring() {
            self.request_redraw();
            return InteractionResult::REDRAW;
        }
        InteractionResult::IGNORED
    }

    // --- Render ---

    /// Draw one frame to `surface`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SurfaceError`] from the frame.
    pub fn render(&mut self, surface: &mut dyn Surface) -> Result<(), SurfaceError> {
        render::draw_frame(surface, &self.transform, &self.host, self.background.as_mut(), self.dpr)
    }

    fn request_redraw(&mut self) {
        self.redraw.emit(&());
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Bind `core` to a canvas element's 2D context.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, core: EngineCore) -> Result<Self, SurfaceError> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| SurfaceError::js("getContext", &e))?
            .ok_or_else(|| SurfaceError::Unavailable("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Unavailable("context is not a CanvasRenderingContext2d".into()))?;
        Ok(Self { canvas, context, core })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the
    /// backing store to device pixels.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(Size::new(width_css, height_css), dpr);
        let dpr = self.core.dpr();
        self.canvas.set_width(device_px(width_css * dpr));
        self.canvas.set_height(device_px(height_css * dpr));
    }

    // --- Delegated input ---

    pub fn on_mouse(&mut self, event: &MouseEvent) -> InteractionResult {
        self.core.on_mouse(event)
    }

    pub fn on_key(&mut self, event: &KeyEvent) -> InteractionResult {
        self.core.on_key(event)
    }

    pub fn on_focus_lost(&mut self) -> InteractionResult {
        self.core.on_focus_lost()
    }

    pub fn set_tool(&mut self, id: ToolId) {
        self.core.set_tool(id);
    }

    pub fn spring_activate(&mut self, id: Option<ToolId>) {
        self.core.spring_activate(id);
    }

    // --- Render ---

    /// Draw the current state to the canvas. Failures are logged, not
    /// propagated; returns whether the frame completed.
    pub fn render(&mut self) -> bool {
        match self.core.render(&mut self.context) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "frame render failed");
                false
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_px(css: f64) -> u32 {
    if css.is_finite() && css > 0.0 { css.round().min(f64::from(u32::MAX)) as u32 } else { 0 }
}
