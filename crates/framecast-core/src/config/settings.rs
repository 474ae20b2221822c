use std::time::Duration;

pub(crate) const DEFAULT_FPS: u32 = 30;
pub(crate) const DEFAULT_WIDTH: u32 = 1920;
pub(crate) const DEFAULT_HEIGHT: u32 = 1080;

const DEFAULT_PRODUCT_NAME: &str = "Framecast";

/// Bound on encoder trial runs and the device listing.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a segment may go without a progress line before it is presumed
/// started.
const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait after the quit request before the encoder is killed.
const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_POST_PROCESS_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_CONCAT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Measured gap between screen and microphone startup on the capture stack.
/// Empirical; tune per machine.
pub(crate) const DEFAULT_AUDIO_OFFSET_SECS: f64 = 1.0;

/// Timeouts and tuning for [`SessionController`](crate::SessionController).
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Prefix of the final file name (`<product>_<timestamp>.mp4`).
    pub product_name: String,
    /// Start-confirmation window for a new segment.
    pub start_timeout: Duration,
    /// Graceful-stop window before the encoder is killed.
    pub stop_timeout: Duration,
    /// Limit for encoder trials and device listing.
    pub probe_timeout: Duration,
    /// Limit for the overlay pass.
    pub post_process_timeout: Duration,
    /// Limit for joining segments.
    pub concat_timeout: Duration,
    /// Seconds the microphone timestamps are shifted to line up with video.
    pub audio_offset_secs: f64,
    /// Append a per-segment section to `<base>_ffmpeg_debug.log`.
    pub debug_log: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            start_timeout: DEFAULT_START_TIMEOUT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            post_process_timeout: DEFAULT_POST_PROCESS_TIMEOUT,
            concat_timeout: DEFAULT_CONCAT_TIMEOUT,
            audio_offset_secs: DEFAULT_AUDIO_OFFSET_SECS,
            debug_log: true,
        }
    }
}
