use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use retouch_core::geometry::GeometryConfig;
use retouch_core::layers::BrushSettings;
use serde::{Deserialize, Serialize};

/// Session tunables. Every field is optional in a config file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Cadence of the coalescing redraw timer.
    pub redraw_interval_ms: u64,
    /// Nominal animation frame; one frame drains a quarter of a buffer.
    pub frame_ms: f64,
    pub geometry: GeometryConfig,
    /// Brush in effect when a session opens.
    pub brush: BrushSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            redraw_interval_ms: 40,
            frame_ms: 16.0,
            geometry: GeometryConfig::default(),
            brush: BrushSettings::default(),
        }
    }
}

impl EditorConfig {
    pub const MIN_REDRAW_MS: u64 = 10;
    pub const MAX_REDRAW_MS: u64 = 100;

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(
            self.redraw_interval_ms
                .clamp(Self::MIN_REDRAW_MS, Self::MAX_REDRAW_MS),
        )
    }

    pub fn frame_ms(&self) -> f64 {
        if self.frame_ms.is_finite() && self.frame_ms > 0.0 {
            self.frame_ms
        } else {
            Self::default().frame_ms
        }
    }
}
