//! Viewer configuration
//!
//! Loaded from JSON. Every section and field is optional; anything left out
//! falls back to the defaults below.
//!
//! ```json
//! {
//!   "zoom": { "min": 0.5, "max": 5.0, "step": 0.25, "default": 0.5 },
//!   "navigation": { "filename_page_offset": false },
//!   "render": { "timeout_ms": 10000, "supersample": 2.0 }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a [`crate::Viewer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub zoom: ZoomConfig,
    pub navigation: NavigationConfig,
    pub render: RenderConfig,
}

/// Zoom bounds and stepping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
    /// Zoom forced while continuous mode is active
    pub continuous: f32,
    /// Allow zoom stepping in continuous mode (re-renders every page)
    pub continuous_stepping: bool,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 5.0,
            step: 0.25,
            default: 0.5,
            continuous: 1.0,
            continuous_stepping: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NavigationConfig {
    /// Add the `_<digits>` suffix of the document name to go-to requests
    pub filename_page_offset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Per-page deadline for the external renderer
    pub timeout_ms: u64,
    /// Oversampling factor applied by the renderer for sharper output
    pub supersample: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            supersample: 2.0,
        }
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded viewer config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min <= zoom.max) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min <= max (got {}..{})",
                zoom.min, zoom.max
            )));
        }
        if zoom.step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom step must be positive (got {})",
                zoom.step
            )));
        }
        if !(zoom.min..=zoom.max).contains(&zoom.default) {
            return Err(ConfigError::Invalid(format!(
                "default zoom {} is outside {}..{}",
                zoom.default, zoom.min, zoom.max
            )));
        }
        if !(zoom.min..=zoom.max).contains(&zoom.continuous) {
            return Err(ConfigError::Invalid(format!(
                "continuous zoom {} is outside {}..{}",
                zoom.continuous, zoom.min, zoom.max
            )));
        }
        if self.render.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "render timeout must be at least 1ms".to_string(),
            ));
        }
        if self.render.supersample <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "supersample factor must be positive (got {})",
                self.render.supersample
            )));
        }
        Ok(())
    }
}
