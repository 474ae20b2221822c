//! Framecast Core Library
//!
//! Supervises an external ffmpeg process through a multi-segment recording
//! lifecycle: probes the best encoder, resolves capture devices, generates the
//! ffmpeg invocation (including its filter graph), and stitches paused
//! segments back into one continuous file.
//!
//! # Example
//!
//! ```no_run
//! use framecast_core::{
//!     ControllerSettings, CoreResult, FfmpegBinary, OutputConfig, RecordingConfig,
//!     ScreenSource, SessionController,
//! };
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let mut controller =
//!         SessionController::new(FfmpegBinary::new("ffmpeg"), ControllerSettings::default());
//!
//!     let config = RecordingConfig::screen(
//!         ScreenSource::desktop(),
//!         OutputConfig::new("C:/Videos"),
//!     );
//!
//!     controller.start(config).await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     let output = controller.stop().await?;
//!
//!     println!("Saved recording to {}", output.display());
//!     Ok(())
//! }
//! ```

mod command;
mod config;
mod devices;
mod encoder;
mod error;
mod ffmpeg;
mod geometry;
mod post_processor;
mod session;

pub use {
    command::{CommandBuilder, Filter, FilterChain, FilterGraph, PadRef, StreamKind},
    config::{
        CameraConfig, CameraShape, CompositeLayers, ControllerSettings, EncoderPreference,
        OutputConfig, RasterImage, RecordingConfig, RecordingMode, Resolution, ScreenSource,
        ScreenSourceKind,
    },
    devices::{
        DeviceCatalog, DeviceKind, DeviceList, DeviceMatch, MatchTier, match_device,
        normalize_device_name, parse_device_listing,
    },
    encoder::{EncoderBackend, EncoderInfo, EncoderKind, EncoderProbe},
    error::{RecorderError, Result as CoreResult},
    ffmpeg::{FfmpegBinary, ProgressLine},
    geometry::{OverlayGeometry, OverlayPlacement, Point, Rect, Size},
    post_processor::PostProcessor,
    session::{
        LayerFiles, RecorderState, SegmentStore, SessionController, SessionEvent, discard_file,
    },
};

#[cfg(test)]
mod tests;
