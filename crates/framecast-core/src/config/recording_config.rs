use crate::{
    CameraConfig, CompositeLayers, EncoderBackend, OutputConfig, ScreenSource, Size,
};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordingMode {
    /// Screen only.
    Screen,
    /// Camera only.
    Camera,
    /// Screen with a camera overlay.
    ScreenCamera,
}

/// Encoder selection policy.
///
/// Serialized as `"auto"` or a backend name such as `"nvenc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EncoderPreference {
    /// Probe hardware encoders and fall back to software.
    #[default]
    Auto,
    /// Use the given backend without probing.
    Forced(EncoderBackend),
}

impl FromStr for EncoderPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(EncoderPreference::Auto),
            other => other.parse().map(EncoderPreference::Forced),
        }
    }
}

impl TryFrom<String> for EncoderPreference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EncoderPreference> for String {
    fn from(value: EncoderPreference) -> Self {
        match value {
            EncoderPreference::Auto => "auto".to_string(),
            EncoderPreference::Forced(backend) => backend.to_string(),
        }
    }
}

/// Declarative description of one recording session.
///
/// Immutable for the duration of a session except for the device labels,
/// which the controller rewrites with the matched catalog names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Recording mode.
    pub mode: RecordingMode,
    /// Screen source (required for screen modes).
    #[serde(default)]
    pub screen: Option<ScreenSource>,
    /// Camera descriptor (required for camera modes).
    #[serde(default)]
    pub camera: Option<CameraConfig>,
    /// Microphone label; `None` records without audio.
    #[serde(default)]
    pub microphone: Option<String>,
    /// Output location, resolution and frame rate.
    pub output: OutputConfig,
    /// Size of the UI preview canvas the camera geometry was measured in.
    /// Defaults to the output canvas size.
    #[serde(default)]
    pub preview_size: Option<Size>,
    /// Encoder selection.
    #[serde(default)]
    pub encoder: EncoderPreference,
    /// Background/foreground composite, supplied by the canvas.
    #[serde(skip)]
    pub layers: Option<CompositeLayers>,
}

impl RecordingConfig {
    /// Screen-only recording.
    pub fn screen(screen: ScreenSource, output: OutputConfig) -> Self {
        Self {
            mode: RecordingMode::Screen,
            screen: Some(screen),
            camera: None,
            microphone: None,
            output,
            preview_size: None,
            encoder: EncoderPreference::Auto,
            layers: None,
        }
    }

    /// Camera-only recording.
    pub fn camera(camera: CameraConfig, output: OutputConfig) -> Self {
        Self {
            mode: RecordingMode::Camera,
            screen: None,
            camera: Some(camera),
            microphone: None,
            output,
            preview_size: None,
            encoder: EncoderPreference::Auto,
            layers: None,
        }
    }

    /// Screen recording with a camera overlay.
    pub fn screen_camera(screen: ScreenSource, camera: CameraConfig, output: OutputConfig) -> Self {
        Self {
            mode: RecordingMode::ScreenCamera,
            screen: Some(screen),
            camera: Some(camera),
            microphone: None,
            output,
            preview_size: None,
            encoder: EncoderPreference::Auto,
            layers: None,
        }
    }

    /// Record audio from the given microphone.
    pub fn with_microphone(mut self, label: impl Into<String>) -> Self {
        self.microphone = Some(label.into());
        self
    }

    /// Composite the screen onto pre-rendered layers.
    pub fn with_layers(mut self, layers: CompositeLayers) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Force or auto-select the encoder.
    pub fn with_encoder(mut self, encoder: EncoderPreference) -> Self {
        self.encoder = encoder;
        self
    }

    /// Mode includes a screen capture input.
    pub fn captures_screen(&self) -> bool {
        matches!(
            self.mode,
            RecordingMode::Screen | RecordingMode::ScreenCamera
        )
    }

    /// Camera must be opened as its own input.
    ///
    /// A floating camera overlay is part of the captured screen, so it only
    /// needs its own input in camera-only mode.
    pub fn captures_camera(&self) -> bool {
        match (self.mode, &self.camera) {
            (RecordingMode::Camera, Some(_)) => true,
            (RecordingMode::ScreenCamera, Some(camera)) => !camera.floating,
            _ => false,
        }
    }

    /// Background composite applies to this session.
    pub fn uses_layers(&self) -> bool {
        self.layers.is_some() && self.captures_screen()
    }
}
