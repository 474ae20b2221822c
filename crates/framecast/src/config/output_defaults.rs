use crate::config::default_fps;

use std::path::PathBuf;

use framecast_core::{OutputConfig, Resolution};
use serde::{Deserialize, Serialize};

/// Output used when a recording does not name its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// Folder receiving recordings.
    pub folder: PathBuf,
    /// Capture frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// `"source"` or `WIDTHxHEIGHT`.
    #[serde(default)]
    pub resolution: Resolution,
}

impl OutputDefaults {
    /// Defaults writing into `folder`.
    pub fn new(folder: PathBuf) -> Self {
        Self {
            folder,
            fps: default_fps(),
            resolution: Resolution::Source,
        }
    }

    /// Core output description.
    pub fn to_output_config(&self) -> OutputConfig {
        let mut output = OutputConfig::new(&self.folder);
        output.fps = self.fps;
        output.resolution = self.resolution;
        output
    }
}
