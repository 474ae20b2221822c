use crate::{CoreResult, RecorderError};

use std::{
    ffi::OsString,
    panic::Location,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::process::Command;
use tracing::{debug, instrument};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How to launch the ffmpeg executable.
///
/// Supplied by the caller's binary-path resolver. Leading arguments allow a
/// launcher or wrapper to sit in front of the real executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegBinary {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl FfmpegBinary {
    /// Launch `program` directly.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Launch `program` with `leading_args` placed before every argument list.
    pub fn wrapped<I, S>(program: impl Into<PathBuf>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    /// Executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command with the leading arguments applied and no console window.
    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args);
        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);
        command
    }

    /// Human-readable command line for logs.
    pub(crate) fn describe(&self, args: &[String]) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(
            self.leading_args
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.extend(args.iter().map(|a| {
            if a.contains(' ') {
                format!("\"{}\"", a)
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Captured result of a one-shot ffmpeg run.
#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    pub(crate) success: bool,
    pub(crate) code: Option<i32>,
    pub(crate) stderr: String,
}

impl CommandOutput {
    /// Last non-empty diagnostic lines, oldest first.
    pub(crate) fn tail(&self, count: usize) -> Vec<String> {
        let lines: Vec<&str> = self
            .stderr
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(count);
        lines[start..].iter().map(|l| l.to_string()).collect()
    }
}

/// Run ffmpeg to completion, killing it if `limit` elapses.
///
/// A non-zero exit is reported in [`CommandOutput`], not as an error.
///
/// # Errors
///
/// Returns [`RecorderError::SpawnFailed`] if the process cannot start and
/// [`RecorderError::Timeout`] if it does not exit within `limit`.
#[instrument(skip(binary, args), fields(program = ?binary.program()))]
pub(crate) async fn run_to_completion(
    binary: &FfmpegBinary,
    args: &[String],
    operation: &'static str,
    limit: Duration,
) -> CoreResult<CommandOutput> {
    let child = binary
        .command()
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| RecorderError::SpawnFailed {
            reason: format!("{}: {}", binary.program().display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    // Dropping the future on timeout drops the child, which kills it.
    let output = tokio::time::timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| RecorderError::Timeout {
            operation,
            limit,
            location: ErrorLocation::from(Location::caller()),
        })?
        .map_err(|e| RecorderError::SpawnFailed {
            reason: format!("Failed to wait for {}: {}", operation, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!(
        operation,
        code = ?output.status.code(),
        "ffmpeg run finished"
    );

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
