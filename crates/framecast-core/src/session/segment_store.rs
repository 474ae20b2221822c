use crate::{CoreResult, FfmpegBinary, RecorderError, ffmpeg::run_to_completion};

use std::{
    ffi::OsString,
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Diagnostic lines quoted in a concatenation error.
const ERROR_TAIL_LINES: usize = 5;

/// Delete `path`, treating a missing file as already deleted.
///
/// Returns `true` if a file was removed. Other failures are logged and
/// swallowed; cleanup never fails an operation.
pub fn discard_file(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = ?path, "Removed file");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to remove file");
            false
        }
    }
}

/// Per-session segment bookkeeping.
///
/// Segment files sit next to the final output: `<base>_seg<N>.mp4`, with the
/// concat list at `<base>_segments.txt` and encoder logs at
/// `<base>_ffmpeg_debug.log`. Indexes start at 1 and are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentStore {
    base: PathBuf,
    next_index: usize,
    segments: Vec<PathBuf>,
}

impl SegmentStore {
    /// Store for segments of the final file `output`.
    pub fn new(output: &Path) -> Self {
        Self {
            base: output.with_extension(""),
            next_index: 1,
            segments: Vec::new(),
        }
    }

    /// Reserve the next index and its file path.
    pub fn allocate(&mut self) -> (usize, PathBuf) {
        let index = self.next_index;
        self.next_index += 1;
        (index, self.with_suffix(&format!("_seg{}.mp4", index)))
    }

    /// Record a segment that captured successfully.
    pub fn push(&mut self, path: PathBuf) {
        self.segments.push(path);
    }

    /// Recorded segments in capture order.
    pub fn segments(&self) -> &[PathBuf] {
        &self.segments
    }

    /// Number of recorded segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// No segment recorded yet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concat list file.
    pub fn list_path(&self) -> PathBuf {
        self.with_suffix("_segments.txt")
    }

    /// Encoder debug log shared by every segment of the session.
    pub fn debug_log_path(&self) -> PathBuf {
        self.with_suffix("_ffmpeg_debug.log")
    }

    /// True if an earlier session left files under this output's names.
    pub fn is_claimed(output: &Path) -> bool {
        let store = Self::new(output);
        output.exists()
            || store.with_suffix("_seg1.mp4").exists()
            || store.list_path().exists()
            || store.debug_log_path().exists()
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Produce the final file at `output`.
    ///
    /// One segment is renamed into place; if the rename fails the segment's
    /// own path becomes the output. Several segments are joined with a
    /// stream-copy concatenation, after which the segments and the list are
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NoSegments`] if nothing was recorded and
    /// [`RecorderError::ConcatenationFailed`] if joining fails. Segments are
    /// left on disk on failure and the first one is named as the fallback.
    #[instrument(skip(self, binary), fields(segments = self.segments.len()))]
    pub async fn finalize(
        &mut self,
        binary: &FfmpegBinary,
        output: &Path,
        timeout: Duration,
    ) -> CoreResult<PathBuf> {
        let first = match self.segments.first() {
            Some(first) => first.clone(),
            None => {
                return Err(RecorderError::NoSegments {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        if self.segments.len() == 1 {
            let result = match tokio::fs::rename(&first, output).await {
                Ok(()) => {
                    info!(output = ?output, "Single segment moved into place");
                    output.to_path_buf()
                }
                Err(e) => {
                    warn!(
                        segment = ?first,
                        error = %e,
                        "Rename failed, keeping segment path as output"
                    );
                    first
                }
            };
            self.segments.clear();
            return Ok(result);
        }

        let list_path = self.list_path();
        let list = concat_list(&self.segments);
        if let Err(e) = tokio::fs::write(&list_path, list).await {
            return Err(RecorderError::ConcatenationFailed {
                reason: format!("Failed to write concat list {:?}: {}", list_path, e),
                fallback: first,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let args = concat_args(&list_path, output);
        let failure = match run_to_completion(binary, &args, "segment concatenation", timeout).await
        {
            Ok(run) if run.success => None,
            Ok(run) => Some(format!(
                "exit code {:?}: {}",
                run.code,
                run.tail(ERROR_TAIL_LINES).join(" | ")
            )),
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = failure {
            warn!(reason = %reason, fallback = ?first, "Concatenation failed");
            discard_file(output);
            return Err(RecorderError::ConcatenationFailed {
                reason,
                fallback: first,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        for segment in self.segments.drain(..) {
            discard_file(&segment);
        }
        discard_file(&list_path);

        info!(output = ?output, "Segments joined");
        Ok(output.to_path_buf())
    }
}

/// One `file '<path>'` line per segment, forward slashes, quotes escaped.
pub(crate) fn concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|segment| {
            let normalized = segment.to_string_lossy().replace('\\', "/");
            format!("file '{}'\n", normalized.replace('\'', r"'\''"))
        })
        .collect()
}

fn concat_args(list: &Path, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list.to_string_lossy().into_owned(),
        "-c".to_string(),
        "copy".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-y".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}
