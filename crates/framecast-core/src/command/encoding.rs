use crate::{EncoderBackend, EncoderInfo};

/// Target quality shared by every backend's rate control.
const QUALITY: u32 = 23;

/// Fragments start at every keyframe, so a killed writer leaves a playable file.
pub(crate) const FRAGMENTED_MP4: &str = "+frag_keyframe+empty_moov+default_base_moof";

fn to_args(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|s| s.to_string()).collect()
}

/// Codec selection and rate control for the chosen backend.
pub(crate) fn video_codec_args(encoder: &EncoderInfo) -> Vec<String> {
    let quality = QUALITY.to_string();
    let mut args = to_args(&["-c:v", encoder.codec()]);
    let tuning: Vec<String> = match encoder.backend {
        EncoderBackend::Nvenc => {
            let mut flags = to_args(&["-preset", "p4", "-tune", "ll", "-rc", "vbr", "-cq"]);
            flags.extend([quality, "-b:v".to_string(), "0".to_string()]);
            flags
        }
        EncoderBackend::Qsv => {
            let mut flags = to_args(&["-preset", "faster", "-global_quality"]);
            flags.extend([quality, "-look_ahead".to_string(), "0".to_string()]);
            flags
        }
        EncoderBackend::Amf => {
            let mut flags = to_args(&["-quality", "balanced", "-rc", "cqp", "-qp_i"]);
            flags.extend([quality.clone(), "-qp_p".to_string(), quality]);
            flags
        }
        EncoderBackend::X264 => {
            let mut flags = to_args(&["-preset", "veryfast", "-crf"]);
            flags.extend([quality, "-tune".to_string(), "zerolatency".to_string()]);
            flags
        }
    };
    args.extend(tuning);
    args
}

/// Full video output flags for a live segment.
pub(crate) fn segment_video_args(encoder: &EncoderInfo, fps: u32) -> Vec<String> {
    let mut args = video_codec_args(encoder);
    args.extend([
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-r".to_string(),
        fps.to_string(),
        "-g".to_string(),
        fps.saturating_mul(2).to_string(),
        "-movflags".to_string(),
        FRAGMENTED_MP4.to_string(),
    ]);
    args
}

/// AAC stereo at 48 kHz.
pub(crate) fn audio_args() -> Vec<String> {
    to_args(&["-c:a", "aac", "-b:a", "192k", "-ar", "48000", "-ac", "2"])
}
