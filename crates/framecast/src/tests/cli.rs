use crate::{
    AppError,
    cli::{Cli, Command},
    config::Config,
};

use framecast_core::{
    CameraShape, EncoderBackend, EncoderPreference, Point, RecordingMode, Resolution,
    ScreenSourceKind, Size,
};

use std::path::PathBuf;

use clap::Parser;

fn config() -> Config {
    let mut config = Config::with_output_folder(PathBuf::from("/videos"));
    config.devices.camera = Some("Integrated Camera".to_string());
    config.devices.microphone = Some("Headset Microphone".to_string());
    config
}

fn record_args(args: &[&str]) -> crate::cli::RecordArgs {
    let mut argv = vec!["framecast", "record"];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv).unwrap().command {
        Command::Record(args) => args,
        other => panic!("expected record, got {:?}", other),
    }
}

/// WHAT: Plain `record` captures the desktop with configured devices
/// WHY: The everyday invocation needs no flags
#[test]
fn given_no_flags_when_building_recording_then_configured_defaults() {
    let recording = record_args(&[]).recording_config(&config()).unwrap();

    assert_eq!(recording.mode, RecordingMode::Screen);
    assert_eq!(
        recording.screen.as_ref().map(|s| s.kind),
        Some(ScreenSourceKind::Display)
    );
    assert_eq!(recording.microphone.as_deref(), Some("Headset Microphone"));
    assert_eq!(recording.output.folder, PathBuf::from("/videos"));
    assert_eq!(recording.encoder, EncoderPreference::Auto);
}

/// WHAT: Flags override configuration and --no-mic drops audio
/// WHY: One-off recordings should not require editing the config
#[test]
fn given_flags_when_building_recording_then_flags_win() {
    // Given: A screen-camera recording with explicit overrides
    let args = record_args(&[
        "--mode",
        "screen-camera",
        "--window",
        "Editor",
        "--camera",
        "Logi Webcam",
        "--shape",
        "rounded",
        "--camera-size",
        "320",
        "--camera-x",
        "-5",
        "--no-mic",
        "-o",
        "/tmp/rec",
        "--fps",
        "60",
        "--resolution",
        "1280x720",
        "--encoder",
        "x264",
    ]);

    // When: Building the recording
    let recording = args.recording_config(&config()).unwrap();

    // Then: Every override is applied
    assert_eq!(recording.mode, RecordingMode::ScreenCamera);
    assert_eq!(recording.screen.as_ref().map(|s| s.window_title()), Some("Editor"));
    let camera = recording.camera.as_ref().unwrap();
    assert_eq!(camera.label, "Logi Webcam");
    assert_eq!(camera.shape, CameraShape::Rounded);
    assert_eq!(camera.size, 320);
    assert_eq!(camera.position, Point::new(-5, 0));
    assert_eq!(recording.microphone, None);
    assert_eq!(recording.output.folder, PathBuf::from("/tmp/rec"));
    assert_eq!(recording.output.fps, 60);
    assert_eq!(
        recording.output.resolution,
        Resolution::Fixed(Size::new(1280, 720))
    );
    assert_eq!(
        recording.encoder,
        EncoderPreference::Forced(EncoderBackend::X264)
    );
}

/// WHAT: Camera mode without any camera label fails
/// WHY: There is nothing to open
#[test]
fn given_camera_mode_without_label_when_building_then_invalid_arguments() {
    let config = Config::with_output_folder(PathBuf::from("/videos"));

    let result = record_args(&["--mode", "camera"]).recording_config(&config);

    assert!(matches!(result, Err(AppError::InvalidArguments { .. })));
}

/// WHAT: --mic and --no-mic cannot be combined
/// WHY: The intent would be ambiguous
#[test]
fn given_mic_and_no_mic_when_parsing_then_rejected() {
    let result = Cli::try_parse_from(["framecast", "record", "--mic", "Headset", "--no-mic"]);

    assert!(result.is_err());
}

/// WHAT: Overlay defaults to in-place output and preview equal to canvas
/// WHY: Geometry measured on the recording itself needs no scaling
#[test]
fn given_overlay_args_when_parsing_then_geometry_built() {
    // Given: An overlay invocation without output or preview
    let cli = Cli::try_parse_from([
        "framecast",
        "overlay",
        "rec.mp4",
        "cam.mp4",
        "--canvas",
        "1920x1080",
        "--size",
        "300",
        "--x",
        "-20",
        "--y",
        "40",
    ])
    .unwrap();
    let Command::Overlay(args) = cli.command else {
        panic!("expected overlay");
    };

    // When: Building the geometry
    let geometry = args.geometry();

    // Then: Preview equals canvas and the screen file is replaced
    assert_eq!(args.output_path(), PathBuf::from("rec.mp4"));
    assert_eq!(geometry.preview, Size::new(1920, 1080));
    assert_eq!(geometry.position, Point::new(-20, 40));
    assert_eq!(geometry.size, 300);
    assert_eq!(geometry.shape, CameraShape::Circle);
}

/// WHAT: A global --config flag is accepted after the subcommand
/// WHY: Users append it wherever convenient
#[test]
fn given_config_flag_after_subcommand_when_parsing_then_captured() {
    let cli = Cli::try_parse_from(["framecast", "devices", "--config", "/etc/framecast.toml"]).unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("/etc/framecast.toml")));
    assert!(matches!(cli.command, Command::Devices));
}
