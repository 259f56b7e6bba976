//! Axis tick layout on 1-2-5 "nice" steps.
//!
//! Ticks are derived from the visible world range and the on-screen length of
//! the axis, so they must be recomputed whenever either changes. Callers do
//! this every frame.

#[cfg(test)]
#[path = "axis_test.rs"]
mod axis_test;

/// Upper bound on ticks produced for one axis, whatever the inputs.
const MAX_TICKS: usize = 256;

/// Most fractional digits a tick label will show.
const MAX_DECIMALS: usize = 12;

/// One labelled tick along an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position in world units.
    pub value: f64,
    pub label: String,
}

/// Round `raw` up to the next value of the form `{1, 2, 5} * 10^n`.
///
/// Non-positive or non-finite input yields `1.0`.
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Ticks covering `[min, max]` for an axis `length_px` long, aiming for
/// roughly `spacing_px` between ticks.
///
/// Returns nothing for an empty or degenerate range.
#[must_use]
pub fn ticks(min: f64, max: f64, length_px: f64, spacing_px: f64) -> Vec<Tick> {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = hi - lo;
    if !positive(span) || !positive(length_px) || !positive(spacing_px) {
        return Vec::new();
    }

    let wanted = (length_px / spacing_px).max(1.0);
    let step = nice_step(span / wanted);
    let decimals = decimals_for(step);
    let first = (lo / step).ceil() * step;

    let mut out = Vec::new();
    let mut i = 0.0;
    loop {
        let value = first + step * i;
        if value > hi + step * 1e-9 || out.len() >= MAX_TICKS {
            break;
        }
        // Avoid "-0" labels from accumulated error.
        let value = if value.abs() < step * 1e-9 { 0.0 } else { value };
        out.push(Tick { value, label: format!("{value:.decimals$}") });
        i += 1.0;
    }
    out
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Fractional digits needed to print multiples of `step` exactly.
fn decimals_for(step: f64) -> usize {
    let mut scaled = step;
    let mut decimals = 0;
    while scaled < 0.999_999 && decimals < MAX_DECIMALS {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}
