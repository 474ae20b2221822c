use crate::Point;

use serde::{Deserialize, Serialize};

/// Mask applied to the camera overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraShape {
    /// Alpha-masked into a circle.
    #[default]
    Circle,
    /// Square crop without a mask (corners are rounded in the preview only).
    Rounded,
}

/// Camera descriptor as laid out in the UI preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Device label reported by the capture-request layer. Rewritten with the
    /// catalog name once resolved.
    pub label: String,
    /// Side length of the overlay in preview pixels.
    #[serde(default = "default_camera_size")]
    pub size: u32,
    /// Top-left corner of the overlay in preview pixels.
    #[serde(default)]
    pub position: Point,
    /// Overlay mask.
    #[serde(default)]
    pub shape: CameraShape,
    /// Camera is shown in its own floating window and captured with the screen.
    #[serde(default)]
    pub floating: bool,
}

impl CameraConfig {
    /// Camera overlay with default size and position.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            size: default_camera_size(),
            position: Point::default(),
            shape: CameraShape::default(),
            floating: false,
        }
    }
}

fn default_camera_size() -> u32 {
    200
}
