//! Recording sessions described in TOML.
//!
//! ```toml
//! mode = "screen-camera"
//! microphone = "Headset Microphone"
//!
//! [output]
//! folder = "C:/Videos"
//! resolution = "1920x1080"
//!
//! [screen]
//! id = "desktop"
//! kind = "display"
//!
//! [camera]
//! label = "Integrated Camera"
//! size = 240
//! position = { x = 1600, y = 780 }
//!
//! [layers]
//! background = "backdrop.png"
//! content_area = { x = 80, y = 60, width = 1760, height = 990 }
//! ```

use crate::{AppError, AppResult};

use framecast_core::{CompositeLayers, RasterImage, Rect, RecordingConfig};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::Deserialize;
use tracing::{info, instrument};

/// A recording configuration plus optional image layers on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionFile {
    /// The recording itself.
    #[serde(flatten)]
    pub recording: RecordingConfig,
    /// Background/foreground images composited around the screen.
    #[serde(default)]
    pub layers: Option<LayerSpec>,
}

/// Image files for the background layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerSpec {
    /// Background image; its size is the output canvas.
    pub background: PathBuf,
    /// Optional decoration drawn above everything.
    #[serde(default)]
    pub foreground: Option<PathBuf>,
    /// Area of the background the screen is scaled into.
    pub content_area: Rect,
}

impl SessionFile {
    /// Parse a session description.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse session: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Read a session file.
    #[track_caller]
    #[instrument]
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read session {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let session = Self::parse(&contents)?;
        info!(path = ?path, mode = ?session.recording.mode, "Session file loaded");
        Ok(session)
    }

    /// Decode the layer images and produce the recording configuration.
    ///
    /// Relative image paths are resolved against `base_dir`.
    #[track_caller]
    pub fn into_recording_config(self, base_dir: &Path) -> AppResult<RecordingConfig> {
        let Some(layers) = self.layers else {
            return Ok(self.recording);
        };

        let background = RasterImage::from_file(&base_dir.join(&layers.background))?;
        let foreground = match &layers.foreground {
            Some(path) => Some(RasterImage::from_file(&base_dir.join(path))?),
            None => None,
        };

        Ok(self.recording.with_layers(CompositeLayers {
            background,
            foreground,
            content_area: layers.content_area,
        }))
    }
}
