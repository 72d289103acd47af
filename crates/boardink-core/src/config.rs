//! Engine configuration.

use crate::elements::PLACEHOLDER_TEXT;
use crate::persistence::SavePolicy;
use crate::selection::DOUBLE_CLICK_MS;
use crate::tools::{Brush, KEY_DEBOUNCE_MS};
use crate::viewport::ZoomLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Hit-test slack around strokes and arrows, in canvas units.
pub const HIT_TOLERANCE: f64 = 4.0;
/// Device pixels the pointer may travel before a press counts as a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for [`BoardEngine`](crate::BoardEngine). Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub zoom: ZoomLimits,
    pub key_debounce_ms: u64,
    pub double_click_ms: u64,
    pub hit_tolerance: f64,
    pub drag_threshold: f64,
    pub brush: Brush,
    pub placeholder_text: String,
    pub save_policy: SavePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomLimits::default(),
            key_debounce_ms: KEY_DEBOUNCE_MS,
            double_click_ms: DOUBLE_CLICK_MS,
            hit_tolerance: HIT_TOLERANCE,
            drag_threshold: DRAG_THRESHOLD,
            brush: Brush::default(),
            placeholder_text: PLACEHOLDER_TEXT.to_string(),
            save_policy: SavePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let z = &self.zoom;
        if !(z.min > 0.0 && z.min <= z.max && z.max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min <= max, got {}..{}",
                z.min, z.max
            )));
        }
        if !(z.step > 0.0 && z.step.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom step must be positive, got {}",
                z.step
            )));
        }
        if self.hit_tolerance < 0.0 || self.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "hit tolerance and drag threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
