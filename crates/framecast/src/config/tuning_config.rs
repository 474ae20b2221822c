use std::time::Duration;

use framecast_core::{ControllerSettings, EncoderPreference};
use serde::{Deserialize, Serialize};

/// Timeouts, encoder choice and diagnostics.
///
/// Missing keys take the recorder's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// `"auto"` or a backend name (`nvenc`, `amf`, `qsv`, `x264`).
    pub encoder: EncoderPreference,
    /// Start-confirmation window in milliseconds.
    pub start_timeout_ms: u64,
    /// Graceful-stop window in milliseconds.
    pub stop_timeout_ms: u64,
    /// Encoder trial and device listing limit in milliseconds.
    pub probe_timeout_ms: u64,
    /// Overlay pass limit in seconds.
    pub post_process_timeout_secs: u64,
    /// Segment join limit in seconds.
    pub concat_timeout_secs: u64,
    /// Microphone timestamp shift in seconds.
    pub audio_offset_secs: f64,
    /// Write `<recording>_ffmpeg_debug.log`.
    pub debug_log: bool,
}

impl Default for TuningConfig {
    fn default() -> Self {
        let settings = ControllerSettings::default();
        Self {
            encoder: EncoderPreference::Auto,
            start_timeout_ms: millis(settings.start_timeout),
            stop_timeout_ms: millis(settings.stop_timeout),
            probe_timeout_ms: millis(settings.probe_timeout),
            post_process_timeout_secs: settings.post_process_timeout.as_secs(),
            concat_timeout_secs: settings.concat_timeout.as_secs(),
            audio_offset_secs: settings.audio_offset_secs,
            debug_log: settings.debug_log,
        }
    }
}

impl TuningConfig {
    /// Recorder settings carrying these values.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            start_timeout: Duration::from_millis(self.start_timeout_ms),
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            post_process_timeout: Duration::from_secs(self.post_process_timeout_secs),
            concat_timeout: Duration::from_secs(self.concat_timeout_secs),
            audio_offset_secs: self.audio_offset_secs,
            debug_log: self.debug_log,
            ..ControllerSettings::default()
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
