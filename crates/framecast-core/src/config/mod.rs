mod camera_config;
mod output_config;
mod raster_image;
mod recording_config;
mod screen_source;
mod settings;

pub use {
    camera_config::{CameraConfig, CameraShape},
    output_config::{OutputConfig, Resolution},
    raster_image::{CompositeLayers, RasterImage},
    recording_config::{EncoderPreference, RecordingConfig, RecordingMode},
    screen_source::{ScreenSource, ScreenSourceKind},
    settings::ControllerSettings,
};

pub(crate) use settings::{DEFAULT_AUDIO_OFFSET_SECS, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
