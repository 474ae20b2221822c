use crate::DeviceKind;

use std::{path::PathBuf, time::Duration};

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording errors with source location tracking.
///
/// Every public controller operation reports failure through this type; an
/// encoder crash after a segment is confirmed is published as a
/// [`SessionEvent::Crashed`](crate::SessionEvent::Crashed) instead because no
/// caller is awaiting at that point.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Operation is not permitted in the current recorder state.
    #[error("Cannot {operation} while {state} {location}")]
    InvalidState {
        /// Operation that was rejected.
        operation: &'static str,
        /// State the recorder was in.
        state: crate::RecorderState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Output folder is missing or not a directory.
    #[error("Output folder {path:?} does not exist {location}")]
    MissingOutputFolder {
        /// Folder that was requested.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recording configuration is inconsistent with the requested mode.
    #[error("Invalid recording configuration: {reason} {location}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A device label could not be matched against the platform catalog.
    #[error(
        "{kind} device {label:?} not found. Available {kind} devices: {} {location}",
        format_available(.available)
    )]
    DeviceNotFound {
        /// Kind of device that was looked up.
        kind: DeviceKind,
        /// Label supplied by the caller.
        label: String,
        /// Every device of that kind the platform reported.
        available: Vec<String>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder reported that a capture device could not be opened.
    #[error("Capture device could not be found by the encoder: {} {location}", .details.join(" | "))]
    DeviceUnavailable {
        /// Last diagnostic lines emitted by the encoder.
        details: Vec<String>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder process could not be launched.
    #[error("Failed to launch encoder: {reason} {location}")]
    SpawnFailed {
        /// Description of the launch failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder exited before the segment was declared started.
    #[error("Encoder exited during startup (code {code:?}): {} {location}", .details.join(" | "))]
    ExitedDuringStartup {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Last diagnostic lines emitted by the encoder.
        details: Vec<String>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stitching segments into the final output failed.
    #[error("Failed to join segments: {reason}. First segment kept at {fallback:?} {location}")]
    ConcatenationFailed {
        /// Description of the failure.
        reason: String,
        /// First segment, still present on disk and usable on its own.
        fallback: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The overlay pass failed; the screen-only output is preserved.
    #[error("Overlay pass failed: {reason}. Screen recording kept at {preserved:?} {location}")]
    PostProcessFailed {
        /// Description of the failure.
        reason: String,
        /// Screen-only output left intact.
        preserved: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A bounded wait elapsed.
    #[error("{operation} timed out after {limit:?} {location}")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Limit that elapsed.
        limit: Duration,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Finalisation was requested without any recorded segment.
    #[error("No segments were recorded {location}")]
    NoSegments {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Raster overlay could not be decoded or persisted.
    #[error("Image error: {reason} {location}")]
    Image {
        /// Description of the image failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for RecorderError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        RecorderError::Io {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
