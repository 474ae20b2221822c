use std::path::PathBuf;

/// Notifications published by [`SessionController`](crate::SessionController).
///
/// Delivered on a broadcast channel; slow subscribers may miss events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A segment began capturing.
    SegmentStarted {
        /// Segment index, starting at 1.
        index: usize,
        /// Segment file.
        path: PathBuf,
        /// A progress marker was seen, rather than startup being presumed.
        confirmed: bool,
    },
    /// A segment's encoder exited after a pause or stop request.
    SegmentClosed {
        /// Segment index.
        index: usize,
        /// Segment file.
        path: PathBuf,
        /// Encoder exit code.
        exit_code: Option<i32>,
    },
    /// The encoder exited while recording with nobody asking it to.
    Crashed {
        /// Segment that was being captured.
        segment: usize,
        /// Encoder exit code, if it exited normally.
        exit_code: Option<i32>,
        /// Last diagnostic lines from the encoder.
        last_lines: Vec<String>,
    },
    /// The session finished and the output file is in place.
    Finalized {
        /// Final output file.
        output: PathBuf,
    },
}
