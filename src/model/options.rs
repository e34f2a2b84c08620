use crate::render::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Result, anyhow};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct NoteColors {
    pub default: Color,
    pub drums: Color,
    pub bass: Color,
}

impl Default for NoteColors {
    fn default() -> Self {
        Self {
            default: Color::rgb(0x62, 0x00, 0xea),
            drums: Color::rgb(0xff, 0x6d, 0x00),
            bass: Color::rgb(0x29, 0x79, 0xff),
        }
    }
}

/// Geometry and palette of the piano-roll.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VisualizerOptions {
    /// Pixel height of one note row.
    pub note_height: f64,
    /// Pixel gap between note rows.
    pub note_spacing: f64,
    /// Horizontal pixels per second at a time scale of 1.
    pub pixels_per_time_step: f64,
    pub note_colors: NoteColors,
    pub background_color: Color,
    /// Horizontal stretch, the reciprocal of the playback speed.
    pub time_scale: f64,
    /// Position of the playback cursor as a fraction of the viewport width.
    pub cursor_fraction: f64,
}

impl Default for VisualizerOptions {
    fn default() -> Self {
        Self {
            note_height: 8.0,
            note_spacing: 1.0,
            pixels_per_time_step: 30.0,
            note_colors: NoteColors::default(),
            background_color: Color::rgb(0x1a, 0x1a, 0x1a),
            time_scale: 1.0,
            cursor_fraction: 0.2,
        }
    }
}

impl VisualizerOptions {
    /// Reads options from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow!(
                "Failed to read options file {}: {}",
                path.as_ref().display(),
                e
            )
        })?;

        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: VisualizerOptions = serde_yaml::from_str(text)
            .map_err(|e| anyhow!("Failed to parse visualizer options: {}", e))?;

        if !(options.time_scale.is_finite() && options.time_scale > 0.0) {
            return Err(anyhow!(
                "time_scale must be a positive number, got {}",
                options.time_scale
            ));
        }

        Ok(options)
    }
}
