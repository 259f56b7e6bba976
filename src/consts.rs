//! Shared numeric constants for the canvas crate.

// ── Transform ───────────────────────────────────────────────────

/// Hard lower bound for any scale component. Configured limits below this are
/// raised to it, so a transform can never become degenerate or inverted.
pub const MIN_SCALE_FLOOR: f64 = 1e-9;

/// Default configured minimum scale.
pub const DEFAULT_MIN_SCALE: f64 = 1e-3;

/// Default configured maximum scale.
pub const DEFAULT_MAX_SCALE: f64 = 1e4;

// ── Zoom gestures ───────────────────────────────────────────────

/// Multiplicative zoom per scroll-wheel notch.
pub const DEFAULT_WHEEL_ZOOM_STEP: f64 = 1.1;

/// Multiplicative zoom per zoom-tool click.
pub const DEFAULT_CLICK_ZOOM_STEP: f64 = 2.0;

/// Zoom-tool drag sensitivity: scale multiplies by `exp(-dy * this)`.
pub const DRAG_ZOOM_PER_PX: f64 = 0.01;

/// Pointer travel (CSS pixels) below which a zoom-tool press/release is a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

// ── Overlays ────────────────────────────────────────────────────

/// Target spacing between axis ticks, in CSS pixels.
pub const AXIS_TICK_SPACING_PX: f64 = 80.0;

/// Length of an axis tick mark, in CSS pixels.
pub const AXIS_TICK_LEN_PX: f64 = 6.0;

/// Spectrum line width, in CSS pixels.
pub const SPECTRUM_LINE_PX: f64 = 1.5;

/// Selection dash segment length in screen pixels.
pub const SELECTION_DASH_PX: f64 = 4.0;

/// Scale bar box size and margin, in CSS pixels.
pub const SCALE_BAR_HEIGHT_PX: f64 = 24.0;
pub const SCALE_BAR_MARGIN_PX: f64 = 16.0;

/// Longest scale bar, as a fraction of the viewport width.
pub const SCALE_BAR_MAX_FRACTION: f64 = 0.3;
