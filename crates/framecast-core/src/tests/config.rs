use crate::{
    CameraConfig, EncoderBackend, EncoderPreference, OutputConfig, RasterImage, RecordingConfig,
    RecordingMode, Resolution, ScreenSource, Size,
};

/// WHAT: A floating camera is not opened as its own input
/// WHY: The floating window is already part of the captured screen
#[test]
fn given_floating_camera_when_screen_camera_mode_then_camera_not_captured() {
    // Given: Screen-camera config with a floating camera
    let mut camera = CameraConfig::new("Integrated Camera");
    camera.floating = true;
    let config =
        RecordingConfig::screen_camera(ScreenSource::desktop(), camera, OutputConfig::new("out"));

    // When/Then: Screen is captured but the camera is not
    assert!(config.captures_screen());
    assert!(!config.captures_camera());
}

/// WHAT: Camera-only mode always opens the camera
/// WHY: The floating flag only matters when a screen is captured
#[test]
fn given_camera_mode_when_floating_then_camera_still_captured() {
    let mut camera = CameraConfig::new("Integrated Camera");
    camera.floating = true;
    let config = RecordingConfig::camera(camera, OutputConfig::new("out"));

    assert!(config.captures_camera());
    assert!(!config.captures_screen());
}

/// WHAT: Resolution accepts "source" and WIDTHxHEIGHT
/// WHY: Both forms appear in configuration files
#[test]
fn given_resolution_strings_when_parsing_then_mapped() {
    assert_eq!("source".parse::<Resolution>(), Ok(Resolution::Source));
    assert_eq!(
        "1280x720".parse::<Resolution>(),
        Ok(Resolution::Fixed(Size::new(1280, 720)))
    );
    assert!("huge".parse::<Resolution>().is_err());
}

/// WHAT: A session description deserializes from TOML
/// WHY: The CLI loads sessions from TOML files
#[test]
fn given_session_toml_when_deserializing_then_config_populated() {
    // Given: A screen-camera session in TOML
    let text = r#"
        mode = "screen-camera"
        microphone = "Headset Microphone"
        encoder = "nvenc"

        [screen]
        id = "display-1"
        bounds = { x = -1920, y = 0, width = 1920, height = 1080 }

        [camera]
        label = "Logi Webcam"
        size = 240
        position = { x = 40, y = 60 }
        shape = "rounded"

        [output]
        folder = "/tmp/recordings"
        resolution = "1280x720"
        fps = 60
    "#;

    // When: Deserializing
    let config: RecordingConfig = toml::from_str(text).unwrap();

    // Then: Every section is populated
    assert_eq!(config.mode, RecordingMode::ScreenCamera);
    assert_eq!(config.encoder, EncoderPreference::Forced(EncoderBackend::Nvenc));
    assert_eq!(config.microphone.as_deref(), Some("Headset Microphone"));
    assert_eq!(config.screen.as_ref().and_then(|s| s.bounds).map(|b| b.x), Some(-1920));
    assert_eq!(config.camera.as_ref().map(|c| c.size), Some(240));
    assert_eq!(config.output.resolution, Resolution::Fixed(Size::new(1280, 720)));
    assert_eq!(config.output.fps, 60);
    assert!(config.layers.is_none());
}

/// WHAT: Encoder preference defaults to auto
/// WHY: Sessions without an encoder key must probe
#[test]
fn given_no_encoder_key_when_deserializing_then_auto() {
    let text = r#"
        mode = "screen"
        [screen]
        [output]
        folder = "/tmp"
    "#;

    let config: RecordingConfig = toml::from_str(text).unwrap();

    assert_eq!(config.encoder, EncoderPreference::Auto);
    assert_eq!(config.output.fps, 30);
}

/// WHAT: RGBA buffers must match their dimensions
/// WHY: A short buffer would produce a corrupt PNG
#[test]
fn given_wrong_buffer_length_when_creating_raster_then_error() {
    assert!(RasterImage::from_rgba(2, 2, vec![0; 16]).is_ok());
    assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_err());
    assert!(RasterImage::from_rgba(0, 2, Vec::new()).is_err());
}
