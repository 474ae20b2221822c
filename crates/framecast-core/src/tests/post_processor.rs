use crate::{
    CameraShape, EncoderBackend, EncoderInfo, OverlayGeometry, Point, PostProcessor,
    RecorderError, Size,
    tests::support::FakeFfmpeg,
};

use std::time::Duration;

fn geometry() -> OverlayGeometry {
    OverlayGeometry {
        size: 100,
        position: Point::new(50, 25),
        shape: CameraShape::Circle,
        preview: Size::new(960, 540),
        canvas: Size::new(1920, 1080),
    }
}

fn processor(fake: &FakeFfmpeg) -> PostProcessor {
    PostProcessor::new(
        fake.binary(),
        EncoderInfo::new(EncoderBackend::X264),
        Duration::from_secs(5),
    )
}

/// WHAT: The overlay pass places the clip at the mapped position
/// WHY: Live and post-processed overlays must land in the same spot
#[test]
fn given_geometry_when_building_overlay_args_then_mapped_placement() {
    let fake = FakeFfmpeg::builder().build();
    let args = processor(&fake).overlay_args(
        "screen.mp4".as_ref(),
        "cam.mp4".as_ref(),
        "out.mp4".as_ref(),
        geometry(),
    );

    let graph = args
        .windows(2)
        .find(|w| w[0] == "-filter_complex")
        .map(|w| w[1].clone())
        .unwrap();
    assert!(graph.starts_with("[1:v]setpts=PTS-STARTPTS,crop='min(iw,ih)':'min(iw,ih)',scale=200:200"));
    assert!(graph.ends_with("[0:v][cam]overlay=100:50:eof_action=pass[vout]"));
    assert!(args.contains(&"0:a?".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

/// WHAT: An in-place overlay replaces the screen file and removes the inputs
/// WHY: Only the composited recording should remain
#[cfg(unix)]
#[tokio::test]
async fn given_in_place_overlay_when_pass_succeeds_then_inputs_removed() {
    // Given: A screen recording and a camera clip
    let fake = FakeFfmpeg::builder().build();
    let screen = fake.dir().join("rec.mp4");
    let clip = fake.dir().join("cam.mp4");
    std::fs::write(&screen, b"screen").unwrap();
    std::fs::write(&clip, b"camera").unwrap();

    // When: Overlaying onto the screen file itself
    let output = processor(&fake)
        .overlay(&screen, &clip, &screen, geometry())
        .await
        .unwrap();

    // Then: The output is composited and the inputs are gone
    assert_eq!(output, screen);
    assert_eq!(std::fs::read_to_string(&screen).unwrap(), "composed\n");
    assert!(!clip.exists());
    assert!(!fake.dir().join("rec_base.mp4").exists());
    assert_eq!(fake.count("rec_base.mp4"), 1);
}

/// WHAT: A failed overlay restores the original screen recording
/// WHY: The user's recording must never be lost to a failed pass
#[cfg(unix)]
#[tokio::test]
async fn given_in_place_overlay_when_pass_fails_then_screen_restored() {
    // Given: An overlay pass that fails after writing partial output
    let fake = FakeFfmpeg::builder().failing_overlay().build();
    let screen = fake.dir().join("rec.mp4");
    let clip = fake.dir().join("cam.mp4");
    std::fs::write(&screen, b"screen").unwrap();
    std::fs::write(&clip, b"camera").unwrap();

    // When: Overlaying in place
    let result = processor(&fake)
        .overlay(&screen, &clip, &screen, geometry())
        .await;

    // Then: The screen file is back and the clip is untouched
    match result {
        Err(RecorderError::PostProcessFailed { preserved, reason, .. }) => {
            assert_eq!(preserved, screen);
            assert!(reason.contains("Error while filtering"));
        }
        other => panic!("expected PostProcessFailed, got {:?}", other),
    }
    assert_eq!(std::fs::read_to_string(&screen).unwrap(), "screen");
    assert!(clip.exists());
    assert!(!fake.dir().join("rec_base.mp4").exists());
}

/// WHAT: Writing to a separate output leaves the screen file alone
/// WHY: The screen file is only temporary when it was moved aside
#[cfg(unix)]
#[tokio::test]
async fn given_separate_output_when_pass_succeeds_then_screen_kept() {
    let fake = FakeFfmpeg::builder().build();
    let screen = fake.dir().join("rec.mp4");
    let clip = fake.dir().join("cam.mp4");
    let output = fake.dir().join("final.mp4");
    std::fs::write(&screen, b"screen").unwrap();
    std::fs::write(&clip, b"camera").unwrap();

    processor(&fake)
        .overlay(&screen, &clip, &output, geometry())
        .await
        .unwrap();

    assert!(screen.exists());
    assert!(!clip.exists());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "composed\n");
}

/// WHAT: An output path spelled differently from the screen path still counts as in place
/// WHY: ffmpeg must never read and overwrite the same file
#[cfg(unix)]
#[tokio::test]
async fn given_output_aliasing_screen_when_overlaying_then_moved_aside_first() {
    // Given: The screen file and a second spelling of the same path
    let fake = FakeFfmpeg::builder().build();
    let screen = fake.dir().join("rec.mp4");
    let clip = fake.dir().join("cam.mp4");
    std::fs::create_dir(fake.dir().join("sub")).unwrap();
    let alias = fake.dir().join("sub").join("..").join("rec.mp4");
    std::fs::write(&screen, b"screen").unwrap();
    std::fs::write(&clip, b"camera").unwrap();

    // When: Overlaying onto the alias
    processor(&fake)
        .overlay(&screen, &clip, &alias, geometry())
        .await
        .unwrap();

    // Then: The encoder read the moved-aside copy and the result replaced the screen file
    assert_eq!(fake.count("rec_base.mp4"), 1);
    assert_eq!(std::fs::read_to_string(&screen).unwrap(), "composed\n");
    assert!(!fake.dir().join("rec_base.mp4").exists());
}
