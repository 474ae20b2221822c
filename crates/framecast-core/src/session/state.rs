use std::fmt;

/// Lifecycle state of the recorder.
///
/// `Idle -> Recording -> Paused -> Recording -> ... -> Stopping -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    /// No session.
    #[default]
    Idle,
    /// A segment is being captured.
    Recording,
    /// Between segments; no encoder is running.
    Paused,
    /// Finalising the output.
    Stopping,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
            RecorderState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
