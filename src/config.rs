use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// Tunable editor behaviour, loadable from a TOML file.
///
/// Every section falls back to its defaults, so an empty file is a valid config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub drawing: DrawingConfig,
    #[serde(default)]
    pub draw_guard: DrawGuardConfig,
}

impl EditorConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Rejects values the viewport and tools cannot work with.
    pub fn validate(&self) -> Result<()> {
        let v = &self.viewport;
        finite("viewport.zoom_factor", v.zoom_factor)?;
        finite("viewport.min_scale", v.min_scale)?;
        finite("viewport.max_scale", v.max_scale)?;
        if v.zoom_factor <= 1.0 {
            return Err(invalid("viewport.zoom_factor must be greater than 1"));
        }
        if v.min_scale <= 0.0 {
            return Err(invalid("viewport.min_scale must be positive"));
        }
        if v.min_scale > v.max_scale {
            return Err(invalid("viewport.min_scale must not exceed max_scale"));
        }

        let d = &self.drawing;
        non_negative("drawing.min_box_size", d.min_box_size)?;
        non_negative("drawing.polygon_vertex_spacing", d.polygon_vertex_spacing)?;
        non_negative("drawing.vertex_hit_radius", d.vertex_hit_radius)?;

        let g = &self.draw_guard;
        non_negative("draw_guard.min_brightness", g.min_brightness)?;
        non_negative("draw_guard.max_brightness", g.max_brightness)?;
        if g.min_brightness >= g.max_brightness {
            return Err(invalid("draw_guard.min_brightness must be below max_brightness"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> EditorError {
    EditorError::InvalidConfig(message.to_string())
}

fn finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EditorError::InvalidConfig(format!("{name} must be a finite number")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(EditorError::InvalidConfig(format!("{name} must not be negative")));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Multiplier applied per wheel step.
    pub zoom_factor: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.1,
            min_scale: 0.1,
            max_scale: 10.0,
        }
    }
}

/// Thresholds for shape commits and hit testing, all in image-space units.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// A drawn box must exceed this on both axes to be kept.
    pub min_box_size: f32,
    /// Minimum pointer travel before a freehand polygon gets another vertex.
    pub polygon_vertex_spacing: f32,
    pub vertex_hit_radius: f32,
    /// Label used when the label dialog is submitted blank.
    pub default_class_name: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            min_box_size: 5.0,
            polygon_vertex_spacing: 10.0,
            vertex_hit_radius: 5.0,
            default_class_name: "new_object".to_string(),
        }
    }
}

/// Brightness window outside of which drawing is refused.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawGuardConfig {
    pub enabled: bool,
    pub min_brightness: f32,
    pub max_brightness: f32,
}

impl Default for DrawGuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_brightness: 20.0,
            max_brightness: 235.0,
        }
    }
}
