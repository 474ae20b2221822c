//! FFmpeg process plumbing.
//!
//! * `binary`: Locating and launching the executable, one-shot runs with a hard timeout.
//! * `monitor`: Parses the diagnostic stream (progress markers, device errors).
//! * `process`: Owns a live recording process: startup confirmation, graceful stop, crash reporting.

mod binary;
mod monitor;
mod process;

pub use {binary::FfmpegBinary, monitor::ProgressLine};

pub(crate) use {
    binary::run_to_completion,
    process::{SegmentProcess, SpawnRequest},
};

#[cfg(test)]
pub(crate) use {
    binary::CommandOutput,
    monitor::{DiagnosticLog, LineSplitter},
    process::{StartGate, StartOutcome},
};
