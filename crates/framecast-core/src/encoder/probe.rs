use crate::{
    EncoderBackend, EncoderInfo, FfmpegBinary,
    ffmpeg::run_to_completion,
};

use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Picks the best available H.264 encoder by trial.
///
/// Each candidate gets one short synthetic encode bounded by the probe
/// timeout. The first success wins; exhausting every candidate selects the
/// software encoder. The result is cached until [`EncoderProbe::invalidate`].
#[derive(Debug)]
pub struct EncoderProbe {
    binary: FfmpegBinary,
    timeout: Duration,
    candidates: Vec<EncoderBackend>,
    cached: OnceCell<EncoderInfo>,
}

impl EncoderProbe {
    /// Probe the hardware backends in default priority order.
    pub fn new(binary: FfmpegBinary, timeout: Duration) -> Self {
        Self {
            binary,
            timeout,
            candidates: EncoderBackend::HARDWARE_PRIORITY.to_vec(),
            cached: OnceCell::new(),
        }
    }

    /// Replace the candidate list; order is priority.
    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = EncoderBackend>) -> Self {
        self.candidates = candidates.into_iter().collect();
        self
    }

    /// Probe whose cache is already filled; `detect` never spawns.
    pub fn preloaded(binary: FfmpegBinary, timeout: Duration, info: EncoderInfo) -> Self {
        Self {
            binary,
            timeout,
            candidates: EncoderBackend::HARDWARE_PRIORITY.to_vec(),
            cached: OnceCell::new_with(Some(info)),
        }
    }

    /// Cached result, if a probe has completed.
    pub fn cached(&self) -> Option<EncoderInfo> {
        self.cached.get().copied()
    }

    /// Forget the cached result so the next `detect` trials again.
    pub fn invalidate(&mut self) {
        if let Some(previous) = self.cached.take() {
            debug!(%previous, "Encoder cache invalidated");
        }
    }

    /// Best available encoder. Trials run at most once per cache lifetime.
    #[instrument(skip(self))]
    pub async fn detect(&self) -> EncoderInfo {
        *self.cached.get_or_init(|| self.run_trials()).await
    }

    async fn run_trials(&self) -> EncoderInfo {
        for &backend in &self.candidates {
            if self.trial(backend).await {
                let info = EncoderInfo::new(backend);
                info!(encoder = %info, "Hardware encoder selected");
                return info;
            }
        }

        let info = EncoderInfo::software();
        info!(encoder = %info, "No hardware encoder available, using software");
        info
    }

    async fn trial(&self, backend: EncoderBackend) -> bool {
        let args = trial_args(backend);
        match run_to_completion(&self.binary, &args, "encoder trial", self.timeout).await {
            Ok(output) if output.success => {
                debug!(%backend, "Encoder trial succeeded");
                true
            }
            Ok(output) => {
                debug!(
                    %backend,
                    code = ?output.code,
                    reason = ?output.tail(1),
                    "Encoder trial failed"
                );
                false
            }
            Err(e) => {
                warn!(%backend, error = %e, "Encoder trial could not run");
                false
            }
        }
    }
}

/// Half a second of black frames at 256x256, discarded.
pub(crate) fn trial_args(backend: EncoderBackend) -> Vec<String> {
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "lavfi",
        "-i",
        "color=c=black:s=256x256:r=30:d=0.5",
        "-c:v",
        backend.as_ffmpeg_codec(),
        "-f",
        "null",
        "-",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
