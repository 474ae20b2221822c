use crate::{
    EncoderBackend, EncoderInfo, EncoderKind, EncoderProbe, FfmpegBinary,
    tests::support::FakeFfmpeg,
};

use std::time::Duration;

/// WHAT: Backends map to their ffmpeg codec names
/// WHY: The codec name selects the encoder in every invocation
#[test]
fn given_backends_when_mapping_then_codec_names_match() {
    assert_eq!(EncoderBackend::Nvenc.as_ffmpeg_codec(), "h264_nvenc");
    assert_eq!(EncoderBackend::Amf.as_ffmpeg_codec(), "h264_amf");
    assert_eq!(EncoderBackend::Qsv.as_ffmpeg_codec(), "h264_qsv");
    assert_eq!(EncoderBackend::X264.as_ffmpeg_codec(), "libx264");
    assert_eq!(EncoderInfo::software().kind, EncoderKind::Software);
}

/// WHAT: Backend names parse from config spellings
/// WHY: Users may write either the short name or the codec name
#[test]
fn given_backend_strings_when_parsing_then_accepted() {
    assert_eq!("NVENC".parse::<EncoderBackend>(), Ok(EncoderBackend::Nvenc));
    assert_eq!("h264_qsv".parse::<EncoderBackend>(), Ok(EncoderBackend::Qsv));
    assert_eq!("libx264".parse::<EncoderBackend>(), Ok(EncoderBackend::X264));
    assert!("vp9".parse::<EncoderBackend>().is_err());
}

/// WHAT: A preloaded probe never spawns
/// WHY: Tests inject a known encoder without a real ffmpeg
#[tokio::test]
async fn given_preloaded_probe_when_detecting_then_cached_value_returned() {
    let info = EncoderInfo::new(EncoderBackend::Qsv);
    let probe = EncoderProbe::preloaded(
        FfmpegBinary::new("/nonexistent/ffmpeg"),
        Duration::from_secs(1),
        info,
    );

    assert_eq!(probe.detect().await, info);
}

/// WHAT: Probing stops at the first hardware encoder that works
/// WHY: Candidates are tried in priority order
#[cfg(unix)]
#[tokio::test]
async fn given_second_candidate_available_when_detecting_then_selected() {
    // Given: Only AMF succeeds
    let fake = FakeFfmpeg::builder().hardware(&["h264_amf", "h264_qsv"]).build();
    let probe = EncoderProbe::new(fake.binary(), Duration::from_secs(5));

    // When: Detecting
    let info = probe.detect().await;

    // Then: AMF is chosen after NVENC failed, QSV is never tried
    assert_eq!(info.backend, EncoderBackend::Amf);
    assert_eq!(info.kind, EncoderKind::Hardware);
    assert_eq!(fake.count("lavfi"), 2);
    assert_eq!(fake.count("h264_qsv"), 0);
}

/// WHAT: detect() twice runs exactly one trial sequence
/// WHY: Trials cost a process spawn each
#[cfg(unix)]
#[tokio::test]
async fn given_detected_encoder_when_detecting_again_then_no_new_trials() {
    // Given: No hardware encoder works
    let fake = FakeFfmpeg::builder().build();
    let probe = EncoderProbe::new(fake.binary(), Duration::from_secs(5));

    // When: Detecting twice
    let first = probe.detect().await;
    let second = probe.detect().await;

    // Then: Software is chosen once, after three trials
    assert_eq!(first, EncoderInfo::software());
    assert_eq!(second, first);
    assert_eq!(fake.count("lavfi"), 3);
}

/// WHAT: Invalidation makes the next detect trial again
/// WHY: Caches are reset explicitly rather than by restarting
#[cfg(unix)]
#[tokio::test]
async fn given_invalidated_probe_when_detecting_then_trials_rerun() {
    let fake = FakeFfmpeg::builder().hardware(&["h264_nvenc"]).build();
    let mut probe = EncoderProbe::new(fake.binary(), Duration::from_secs(5));
    probe.detect().await;

    probe.invalidate();
    assert!(probe.cached().is_none());
    probe.detect().await;

    assert_eq!(fake.count("lavfi"), 2);
}

/// WHAT: Encoder preference accepts "auto" and backend names
/// WHY: The preference round-trips through config files as a plain string
#[test]
fn given_preference_strings_when_parsing_then_auto_or_forced() {
    use crate::EncoderPreference;

    assert_eq!("".parse::<EncoderPreference>(), Ok(EncoderPreference::Auto));
    assert_eq!("Auto".parse::<EncoderPreference>(), Ok(EncoderPreference::Auto));
    assert_eq!(
        "h264_nvenc".parse::<EncoderPreference>(),
        Ok(EncoderPreference::Forced(EncoderBackend::Nvenc))
    );
    assert_eq!(
        String::from(EncoderPreference::Forced(EncoderBackend::X264)),
        "x264"
    );
    assert!("hevc".parse::<EncoderPreference>().is_err());
}
