//! Configuration for the waveform viewer.
//!
//! [`ViewerConfig`] is plain data with sensible defaults; it can be stored as
//! JSON next to a dataset and loaded back with [`ViewerConfig::load_json`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

// ─────────────────────────────────────────────────────────────────────────────
// Interaction
// ─────────────────────────────────────────────────────────────────────────────

/// Pan/zoom tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Zooms that would leave a shorter window than this (seconds) are rejected.
    pub min_window_secs: f64,
    /// Fraction of the window each edge moves per wheel notch.
    pub zoom_step: f64,
    /// Scroll distance in egui points that counts as one wheel notch.
    pub wheel_points_per_notch: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_window_secs: 0.1,
            zoom_step: 0.1,
            wheel_points_per_notch: 50.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

/// miniSEED export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Bytes per record; a power of two between 256 and 4096.
    pub record_length: usize,
    /// File extension appended when the chosen path has none.
    pub extension: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            record_length: 256,
            extension: "mseed".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewerConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// | Field         | Purpose |
/// |---------------|---------|
/// | `slot_count`  | Number of stacked plots, i.e. channels shown at once |
/// | `interaction` | Pan/zoom tuning |
/// | `export`      | miniSEED writer parameters |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub slot_count: usize,
    /// Width assumed for pan scaling until the canvas reports its real size.
    pub canvas_width: f64,
    /// Native window title.
    pub title: String,
    pub show_legend: bool,
    pub interaction: InteractionConfig,
    pub export: ExportConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            slot_count: 4,
            // 14 in at 96 dpi
            canvas_width: 1344.0,
            title: "seisview".to_string(),
            show_legend: true,
            interaction: InteractionConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn with_slots(slot_count: usize) -> Self {
        Self {
            slot_count,
            ..Default::default()
        }
    }

    /// Reject values the viewport cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.slot_count == 0 {
            return Err(ViewerError::Config("slot_count must be at least 1".into()));
        }
        if !(self.canvas_width > 0.0) {
            return Err(ViewerError::Config("canvas_width must be positive".into()));
        }
        let i = &self.interaction;
        if !(i.min_window_secs > 0.0) {
            return Err(ViewerError::Config("min_window_secs must be positive".into()));
        }
        if !(i.zoom_step > 0.0 && i.zoom_step < 0.5) {
            return Err(ViewerError::Config("zoom_step must be in (0, 0.5)".into()));
        }
        if !(i.wheel_points_per_notch > 0.0) {
            return Err(ViewerError::Config("wheel_points_per_notch must be positive".into()));
        }
        let len = self.export.record_length;
        if !len.is_power_of_two() || !(256..=4096).contains(&len) {
            return Err(ViewerError::Config(format!(
                "record_length {len} is not a power of two in 256..=4096"
            )));
        }
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: ViewerConfig =
            serde_json::from_str(&text).map_err(|e| ViewerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text =
            serde_json::to_string_pretty(self).map_err(|e| ViewerError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
