use std::fs;
use std::path::Path;

use egui::{Color32, Rect};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::gate::GatePolicy;
use crate::projection::CameraProjector;

/// User-tunable painting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old settings
pub struct PaintSettings {
    /// Depth in front of the camera at which touches are placed
    pub distance_from_camera: f32,
    pub vertical_fov_degrees: f32,
    pub line_width: f32,
    pub line_color: Color32,
    pub gate_policy: GatePolicy,
    /// Upper bound on live anchors, `None` for unlimited
    pub max_anchors: Option<usize>,
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            distance_from_camera: 0.5,
            vertical_fov_degrees: 60.0,
            line_width: 4.0,
            line_color: Color32::from_rgb(255, 255, 255),
            gate_policy: GatePolicy::Latch,
            max_anchors: None,
        }
    }
}

impl PaintSettings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.distance_from_camera.is_finite() && self.distance_from_camera > 0.0) {
            return Err(SettingsError::Invalid {
                name: "distance_from_camera",
                reason: format!("must be positive, got {}", self.distance_from_camera),
            });
        }
        if !(self.vertical_fov_degrees > 0.0 && self.vertical_fov_degrees < 180.0) {
            return Err(SettingsError::Invalid {
                name: "vertical_fov_degrees",
                reason: format!("must be in (0, 180), got {}", self.vertical_fov_degrees),
            });
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(SettingsError::Invalid {
                name: "line_width",
                reason: format!("must be positive, got {}", self.line_width),
            });
        }
        Ok(())
    }

    /// Camera at the origin looking down -Z with these settings
    pub fn camera(&self, viewport: Rect) -> CameraProjector {
        CameraProjector::new(
            viewport,
            self.vertical_fov_degrees.to_radians(),
            self.distance_from_camera,
        )
    }
}
