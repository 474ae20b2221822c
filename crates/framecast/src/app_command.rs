use std::{fmt, str::FromStr};

/// Commands typed on the console while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Close the current segment.
    Pause,
    /// Start a new segment.
    Resume,
    /// Print the recorder state.
    Status,
    /// Finalize the recording and exit.
    Stop,
}

impl FromStr for AppCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p" | "pause" => Ok(AppCommand::Pause),
            "r" | "resume" => Ok(AppCommand::Resume),
            "?" | "status" => Ok(AppCommand::Status),
            "s" | "stop" | "q" | "quit" => Ok(AppCommand::Stop),
            other => Err(format!(
                "Unknown command '{}' (p = pause, r = resume, s = stop, ? = status)",
                other
            )),
        }
    }
}

impl fmt::Display for AppCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppCommand::Pause => "pause",
            AppCommand::Resume => "resume",
            AppCommand::Status => "status",
            AppCommand::Stop => "stop",
        };
        f.write_str(name)
    }
}
