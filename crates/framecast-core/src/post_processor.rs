use crate::{
    CoreResult, EncoderInfo, FfmpegBinary, FilterGraph, OverlayGeometry, PadRef, RecorderError,
    command::{Filter, camera_filters, video_codec_args},
    ffmpeg::run_to_completion,
    session::discard_file,
};

use std::{
    ffi::OsString,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Diagnostic lines quoted in a failure.
const ERROR_TAIL_LINES: usize = 5;

/// Second encode pass compositing a separately captured camera clip onto a
/// finished screen recording.
///
/// Placement is computed with the same preview-to-output mapping as the live
/// camera overlay, so both paths put the camera in the same spot.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    binary: FfmpegBinary,
    encoder: EncoderInfo,
    timeout: Duration,
}

impl PostProcessor {
    /// Pass encoding with `encoder`, killed after `timeout`.
    pub fn new(binary: FfmpegBinary, encoder: EncoderInfo, timeout: Duration) -> Self {
        Self {
            binary,
            encoder,
            timeout,
        }
    }

    /// Overlay `clip` onto `screen`, writing `output`.
    ///
    /// `output` may equal `screen`; the screen file is then moved aside first
    /// and restored if the pass fails. On success the clip and any moved-aside
    /// input are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::PostProcessFailed`] naming the preserved
    /// screen recording.
    #[instrument(skip(self, geometry))]
    pub async fn overlay(
        &self,
        screen: &Path,
        clip: &Path,
        output: &Path,
        geometry: OverlayGeometry,
    ) -> CoreResult<PathBuf> {
        let in_place = same_file(screen, output).await;
        let input = if in_place {
            let aside = moved_aside_path(screen);
            tokio::fs::rename(screen, &aside)
                .await
                .map_err(|e| RecorderError::PostProcessFailed {
                    reason: format!("Failed to move {:?} aside: {}", screen, e),
                    preserved: screen.to_path_buf(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            aside
        } else {
            screen.to_path_buf()
        };

        let args = self.overlay_args(&input, clip, output, geometry);
        let failure = match run_to_completion(&self.binary, &args, "overlay pass", self.timeout)
            .await
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
            warn!(reason = %reason, "Overlay pass failed, restoring screen recording");
            discard_file(output);
            if in_place && let Err(e) = tokio::fs::rename(&input, screen).await {
                warn!(error = %e, kept = ?input, "Failed to restore screen recording");
                return Err(RecorderError::PostProcessFailed {
                    reason,
                    preserved: input,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            return Err(RecorderError::PostProcessFailed {
                reason,
                preserved: screen.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        discard_file(clip);
        if in_place {
            discard_file(&input);
        }

        info!(output = ?output, "Overlay pass complete");
        Ok(output.to_path_buf())
    }

    pub(crate) fn overlay_args(
        &self,
        screen: &Path,
        clip: &Path,
        output: &Path,
        geometry: OverlayGeometry,
    ) -> Vec<String> {
        let placement = geometry.placement();
        let mut graph = FilterGraph::new();
        let cam = graph.chain(
            vec![PadRef::video(1)],
            camera_filters(placement, geometry.shape),
            "cam",
        );
        graph.chain(
            vec![PadRef::video(0), cam],
            vec![Filter::Overlay {
                x: placement.x,
                y: placement.y,
                shortest: false,
                pass_on_eof: true,
            }],
            "vout",
        );

        let mut args = vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            screen.to_string_lossy().into_owned(),
            "-i".to_string(),
            clip.to_string_lossy().into_owned(),
            "-filter_complex".to_string(),
            graph.to_string(),
            "-map".to_string(),
            "[vout]".to_string(),
            "-map".to_string(),
            "0:a?".to_string(),
        ];
        args.extend(video_codec_args(&self.encoder));
        args.extend([
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-y".to_string(),
            output.to_string_lossy().into_owned(),
        ]);
        args
    }
}

/// `<stem>_base.<ext>` next to `path`.
fn moved_aside_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.with_extension("").as_os_str());
    name.push("_base");
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    PathBuf::from(name)
}

/// Whether both paths resolve to one file. An output that does not exist yet
/// cannot be the screen recording.
async fn same_file(screen: &Path, output: &Path) -> bool {
    if screen == output {
        return true;
    }
    match (
        tokio::fs::canonicalize(screen).await,
        tokio::fs::canonicalize(output).await,
    ) {
        (Ok(screen), Ok(output)) => screen == output,
        _ => false,
    }
}
