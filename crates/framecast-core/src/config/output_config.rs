use crate::{Size, config::DEFAULT_FPS};

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Target resolution of the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    /// Keep whatever the source produces.
    #[default]
    Source,
    /// Letterbox into a fixed box.
    Fixed(Size),
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "native" | "" => Ok(Resolution::Source),
            other => other.parse::<Size>().map(Resolution::Fixed),
        }
    }
}

impl TryFrom<String> for Resolution {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Source => f.write_str("source"),
            Resolution::Fixed(size) => write!(f, "{}", size),
        }
    }
}

/// Where and how the recording is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Folder receiving segments and the final file.
    pub folder: PathBuf,
    /// Target resolution.
    #[serde(default)]
    pub resolution: Resolution,
    /// Capture frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl OutputConfig {
    /// Source resolution at the default frame rate.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            resolution: Resolution::Source,
            fps: DEFAULT_FPS,
        }
    }
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}
