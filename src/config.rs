//! Engine configuration: scale limits, zoom gestures, and key maps.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Loaders always run [`CanvasConfig::validate`] before returning.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CLICK_ZOOM_STEP, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_WHEEL_ZOOM_STEP};
use crate::tool::ToolId;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "DATACANVAS_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scale limits: min {min}, max {max}")]
    ScaleLimits { min: f64, max: f64 },
    #[error("invalid zoom step `{field}`: {value} (must be > 1)")]
    ZoomStep { field: &'static str, value: f64 },
    #[error("hotkey `{0}` is not a single character")]
    HotkeyNotLetter(String),
    #[error("key `{0}` is bound both as a hotkey and a spring key")]
    KeyCollision(String),
}

/// Which axes a zoom gesture changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLock {
    pub x: bool,
    pub y: bool,
}

impl Default for AxisLock {
    fn default() -> Self {
        Self::BOTH
    }
}

impl AxisLock {
    pub const BOTH: Self = Self { x: true, y: true };
    pub const X_ONLY: Self = Self { x: true, y: false };
    pub const Y_ONLY: Self = Self { x: false, y: true };
}

/// Physical scale bar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleBarConfig {
    /// Unit label drawn next to the bar, e.g. `"µm"`.
    pub unit: String,
    /// World units per one physical unit.
    pub world_per_unit: f64,
    /// Bar length in physical units.
    pub length_units: f64,
}

impl Default for ScaleBarConfig {
    fn default() -> Self {
        Self { unit: "px".to_string(), world_per_unit: 1.0, length_units: 100.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub wheel_zoom_step: f64,
    pub click_zoom_step: f64,
    pub zoom_axes: AxisLock,
    pub initial_tool: ToolId,
    /// Single-character keys that select a tool.
    pub hotkeys: BTreeMap<String, ToolId>,
    /// Keys that spring a tool while held.
    pub spring_keys: BTreeMap<String, ToolId>,
    pub scale_bar: ScaleBarConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let hotkeys = [("p", ToolId::Pan), ("z", ToolId::Zoom), ("s", ToolId::RangeSelect)]
            .into_iter()
            .map(|(k, id)| (k.to_string(), id))
            .collect();
        let spring_keys = [(" ", ToolId::Pan), ("Control", ToolId::Zoom)]
            .into_iter()
            .map(|(k, id)| (k.to_string(), id))
            .collect();
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            wheel_zoom_step: DEFAULT_WHEEL_ZOOM_STEP,
            click_zoom_step: DEFAULT_CLICK_ZOOM_STEP,
            zoom_axes: AxisLock::BOTH,
            initial_tool: ToolId::Pan,
            hotkeys,
            spring_keys,
            scale_bar: ScaleBarConfig::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first
    /// validation failure.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`CanvasConfig::from_json`].
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Load the file named by `DATACANVAS_CONFIG`, or defaults when unset.
    ///
    /// # Errors
    ///
    /// As [`CanvasConfig::from_path`] when the variable is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Check invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0) || !(self.max_scale >= self.min_scale) {
            return Err(ConfigError::ScaleLimits { min: self.min_scale, max: self.max_scale });
        }
        if !(self.wheel_zoom_step > 1.0) {
            return Err(ConfigError::ZoomStep { field: "wheel_zoom_step", value: self.wheel_zoom_step });
        }
        if !(self.click_zoom_step > 1.0) {
            return Err(ConfigError::ZoomStep { field: "click_zoom_step", value: self.click_zoom_step });
        }
        for key in self.hotkeys.keys() {
            if key.chars().count() != 1 {
                return Err(ConfigError::HotkeyNotLetter(key.clone()));
            }
        }
        for key in self.spring_keys.keys() {
            if self.hotkey(key).is_some() {
                return Err(ConfigError::KeyCollision(key.clone()));
            }
        }
        Ok(())
    }

    /// Tool selected by a hotkey, compared case-insensitively.
    #[must_use]
    pub fn hotkey(&self, key: &str) -> Option<ToolId> {
        let lower = key.to_lowercase();
        self.hotkeys
            .iter()
            .find(|(k, _)| k.to_lowercase() == lower)
            .map(|(_, id)| *id)
    }

    /// Tool sprung by a held key. Exact match.
    #[must_use]
    pub fn spring_key(&self, key: &str) -> Option<ToolId> {
        self.spring_keys.get(key).copied()
    }
}
