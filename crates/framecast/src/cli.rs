use crate::{AppError, AppResult, config::Config};

use std::{panic::Location, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use error_location::ErrorLocation;
use framecast_core::{
    CameraConfig, CameraShape, EncoderPreference, OverlayGeometry, Point, RecordingConfig,
    Resolution, ScreenSource, Size,
};

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "framecast", version, about = "Screen and camera recorder driving ffmpeg")]
pub struct Cli {
    /// Use this configuration file instead of the per-user one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List video and audio capture devices
    Devices,
    /// Probe and print the encoder recordings would use
    Encoder,
    /// Record until stopped from the console or with Ctrl-C
    Record(RecordArgs),
    /// Composite a camera clip onto a finished screen recording
    Overlay(OverlayArgs),
    /// Print the configuration file path and contents
    Config,
}

/// What to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Screen only.
    Screen,
    /// Camera only.
    Camera,
    /// Screen with a camera overlay.
    ScreenCamera,
}

/// Camera overlay shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    /// Circular mask.
    Circle,
    /// Square without a mask.
    Rounded,
}

impl From<ShapeArg> for CameraShape {
    fn from(value: ShapeArg) -> Self {
        match value {
            ShapeArg::Circle => CameraShape::Circle,
            ShapeArg::Rounded => CameraShape::Rounded,
        }
    }
}

/// Arguments of `framecast record`.
#[derive(Debug, Clone, Args)]
pub struct RecordArgs {
    /// Session description in TOML. Only --output overrides it.
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// What to record.
    #[arg(long, value_enum, default_value_t = ModeArg::Screen)]
    pub mode: ModeArg,

    /// Capture the window with this title instead of the desktop.
    #[arg(long)]
    pub window: Option<String>,

    /// Camera label; defaults to the configured camera.
    #[arg(long)]
    pub camera: Option<String>,

    /// Microphone label; defaults to the configured microphone.
    #[arg(long)]
    pub mic: Option<String>,

    /// Record without audio even if a microphone is configured.
    #[arg(long, conflicts_with = "mic")]
    pub no_mic: bool,

    /// Folder receiving the recording.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Capture frame rate.
    #[arg(long)]
    pub fps: Option<u32>,

    /// "source" or WIDTHxHEIGHT.
    #[arg(long)]
    pub resolution: Option<Resolution>,

    /// "auto", "nvenc", "amf", "qsv" or "x264".
    #[arg(long)]
    pub encoder: Option<EncoderPreference>,

    /// Camera overlay shape.
    #[arg(long, value_enum)]
    pub shape: Option<ShapeArg>,

    /// Camera overlay side length in output pixels.
    #[arg(long)]
    pub camera_size: Option<u32>,

    /// Camera overlay left edge in output pixels.
    #[arg(long, allow_hyphen_values = true)]
    pub camera_x: Option<i32>,

    /// Camera overlay top edge in output pixels.
    #[arg(long, allow_hyphen_values = true)]
    pub camera_y: Option<i32>,
}

impl RecordArgs {
    /// Recording described by the flags, with gaps filled from `config`.
    ///
    /// Not used with `--session`.
    pub fn recording_config(&self, config: &Config) -> AppResult<RecordingConfig> {
        let mut output = config.output.to_output_config();
        if let Some(folder) = &self.output {
            output.folder = folder.clone();
        }
        if let Some(fps) = self.fps {
            output.fps = fps;
        }
        if let Some(resolution) = self.resolution {
            output.resolution = resolution;
        }

        let screen = match &self.window {
            Some(title) => ScreenSource::window(title.clone()),
            None => ScreenSource::desktop(),
        };

        let camera = || -> AppResult<CameraConfig> {
            let label = self
                .camera
                .clone()
                .or_else(|| config.devices.camera.clone())
                .ok_or_else(|| AppError::InvalidArguments {
                    reason: "no camera given and none configured".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            let mut camera = CameraConfig::new(label);
            if let Some(shape) = self.shape {
                camera.shape = shape.into();
            }
            if let Some(size) = self.camera_size {
                camera.size = size;
            }
            camera.position = Point::new(
                self.camera_x.unwrap_or(camera.position.x),
                self.camera_y.unwrap_or(camera.position.y),
            );
            Ok(camera)
        };

        let mut recording = match self.mode {
            ModeArg::Screen => RecordingConfig::screen(screen, output),
            ModeArg::Camera => RecordingConfig::camera(camera()?, output),
            ModeArg::ScreenCamera => RecordingConfig::screen_camera(screen, camera()?, output),
        };

        let microphone = if self.no_mic {
            None
        } else {
            self.mic.clone().or_else(|| config.devices.microphone.clone())
        };
        if let Some(microphone) = microphone {
            recording = recording.with_microphone(microphone);
        }

        Ok(recording.with_encoder(self.encoder.unwrap_or(config.tuning.encoder)))
    }
}

/// Arguments of `framecast overlay`.
#[derive(Debug, Clone, Args)]
pub struct OverlayArgs {
    /// Screen recording.
    pub screen: PathBuf,

    /// Camera clip to composite.
    pub clip: PathBuf,

    /// Output file; defaults to replacing the screen recording.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overlay side length in preview pixels.
    #[arg(long, default_value_t = 200)]
    pub size: u32,

    /// Overlay left edge in preview pixels.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub x: i32,

    /// Overlay top edge in preview pixels.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub y: i32,

    /// Overlay shape.
    #[arg(long, value_enum, default_value_t = ShapeArg::Circle)]
    pub shape: ShapeArg,

    /// Size of the preview the geometry was measured in; defaults to the canvas.
    #[arg(long)]
    pub preview: Option<Size>,

    /// Size of the screen recording.
    #[arg(long)]
    pub canvas: Size,
}

impl OverlayArgs {
    /// Overlay geometry in preview space.
    pub fn geometry(&self) -> OverlayGeometry {
        OverlayGeometry {
            size: self.size,
            position: Point::new(self.x, self.y),
            shape: self.shape.into(),
            preview: self.preview.unwrap_or(self.canvas),
            canvas: self.canvas,
        }
    }

    /// Where the composited file is written.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.screen.clone())
    }
}
