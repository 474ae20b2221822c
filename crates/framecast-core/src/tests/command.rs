use crate::{
    CameraConfig, CameraShape, CommandBuilder, CompositeLayers, EncoderBackend, EncoderInfo,
    Filter, FilterGraph, LayerFiles, OutputConfig, PadRef, Point, RasterImage, RecordingConfig,
    Rect, Resolution, ScreenSource, Size,
};

use std::path::{Path, PathBuf};

fn x264() -> EncoderInfo {
    EncoderInfo::new(EncoderBackend::X264)
}

fn layers() -> CompositeLayers {
    CompositeLayers {
        background: RasterImage::from_rgba(4, 4, vec![0; 64]).unwrap(),
        foreground: None,
        content_area: Rect::new(100, 50, 1600, 900),
    }
}

/// Every `-i` value, in order.
fn inputs(args: &[String]) -> Vec<String> {
    args.windows(2)
        .filter(|w| w[0] == "-i")
        .map(|w| w[1].clone())
        .collect()
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

/// WHAT: Chains serialize with labeled pads, commas and semicolons
/// WHY: The textual graph is the only interface to ffmpeg's filters
#[test]
fn given_graph_when_serializing_then_filter_complex_syntax() {
    // Given: Two chains feeding an overlay
    let mut graph = FilterGraph::new();
    let scr = graph.chain(
        vec![PadRef::video(0)],
        vec![Filter::ResetPts, Filter::Scale { width: 1280, height: 720 }],
        "scr",
    );
    graph.chain(
        vec![scr, PadRef::video(1)],
        vec![Filter::Overlay {
            x: 10,
            y: 20,
            shortest: true,
            pass_on_eof: false,
        }],
        "vout",
    );

    // When: Serializing
    let text = graph.to_string();

    // Then: The ffmpeg syntax is produced
    assert_eq!(
        text,
        "[0:v]setpts=PTS-STARTPTS,scale=1280:720[scr];[scr][1:v]overlay=10:20:shortest=1[vout]"
    );
}

/// WHAT: The audio offset is rendered with its sign
/// WHY: The offset compensates startup skew in either direction
#[test]
fn given_audio_offsets_when_serializing_then_signed_seconds() {
    assert_eq!(
        Filter::ResetAudioPts { offset_secs: 1.0 }.to_string(),
        "asetpts=PTS-STARTPTS+1.000/TB"
    );
    assert_eq!(
        Filter::ResetAudioPts { offset_secs: -0.25 }.to_string(),
        "asetpts=PTS-STARTPTS-0.250/TB"
    );
    assert_eq!(
        Filter::ResetAudioPts { offset_secs: 0.0 }.to_string(),
        "asetpts=PTS-STARTPTS"
    );
}

/// WHAT: Screen-only recording resets timestamps only
/// WHY: No composition is needed for a single input
#[test]
fn given_screen_only_when_building_then_setpts_and_fragmented_output() {
    // Given: A desktop recording
    let config = RecordingConfig::screen(ScreenSource::desktop(), OutputConfig::new("out"));
    let encoder = x264();

    // When: Building
    let args = CommandBuilder::new(&config, &encoder).build(Path::new("out/seg1.mp4"));

    // Then: One gdigrab input, a setpts graph and fragmented MP4 output
    assert_eq!(inputs(&args), vec!["desktop"]);
    assert_eq!(value_after(&args, "-f").as_deref(), Some("gdigrab"));
    assert_eq!(value_after(&args, "-draw_mouse").as_deref(), Some("1"));
    assert_eq!(
        value_after(&args, "-filter_complex").as_deref(),
        Some("[0:v]setpts=PTS-STARTPTS[vout]")
    );
    assert_eq!(
        value_after(&args, "-movflags").as_deref(),
        Some("+frag_keyframe+empty_moov+default_base_moof")
    );
    assert_eq!(value_after(&args, "-c:v").as_deref(), Some("libx264"));
    assert!(!args.contains(&"-c:a".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("out/seg1.mp4"));
}

/// WHAT: Display capture is constrained to the display's physical bounds
/// WHY: Capturing the whole virtual desktop records every monitor
#[test]
fn given_display_bounds_when_building_then_offset_and_size_passed() {
    let config = RecordingConfig::screen(
        ScreenSource::display("display-2", Rect::new(-1920, 0, 1920, 1080)),
        OutputConfig::new("out"),
    );
    let encoder = x264();

    let args = CommandBuilder::new(&config, &encoder).build(Path::new("seg.mp4"));

    assert_eq!(value_after(&args, "-offset_x").as_deref(), Some("-1920"));
    assert_eq!(value_after(&args, "-offset_y").as_deref(), Some("0"));
    assert_eq!(value_after(&args, "-video_size").as_deref(), Some("1920x1080"));
}

/// WHAT: Window capture uses the window title
/// WHY: gdigrab selects windows by title
#[test]
fn given_window_source_when_building_then_title_input() {
    let config = RecordingConfig::screen(ScreenSource::window("Editor"), OutputConfig::new("out"));
    let encoder = x264();

    let args = CommandBuilder::new(&config, &encoder).build(Path::new("seg.mp4"));

    assert_eq!(inputs(&args), vec!["title=Editor"]);
}

/// WHAT: Camera-only recording is mirrored and the camera opened without size
/// WHY: Some cameras reject explicit size or rate requests
#[test]
fn given_camera_only_when_building_then_mirrored_without_size_request() {
    // Given: A camera-only recording
    let config = RecordingConfig::camera(CameraConfig::new("Integrated Camera"), OutputConfig::new("out"));
    let encoder = x264();

    // When: Building
    let args = CommandBuilder::new(&config, &encoder).build(Path::new("seg.mp4"));

    // Then: The dshow input has no size or rate and the video is flipped
    assert_eq!(inputs(&args), vec!["video=Integrated Camera"]);
    assert!(!args.contains(&"-video_size".to_string()));
    assert!(!args.contains(&"-framerate".to_string()));
    assert_eq!(
        value_after(&args, "-filter_complex").as_deref(),
        Some("[0:v]setpts=PTS-STARTPTS,hflip[vout]")
    );
}

/// WHAT: Inputs are registered background, screen, camera, microphone
/// WHY: Every graph reference is by input index
#[test]
fn given_all_inputs_when_building_then_fixed_index_order() {
    // Given: Background layout with camera and microphone
    let config = RecordingConfig::screen_camera(
        ScreenSource::desktop(),
        CameraConfig::new("Integrated Camera"),
        OutputConfig::new("out"),
    )
    .with_microphone("Headset Microphone")
    .with_layers(layers());
    let files = LayerFiles::new(Some(PathBuf::from("bg.png")), Some(PathBuf::from("fg.png")));
    let encoder = x264();

    // When: Building
    let args = CommandBuilder::new(&config, &encoder)
        .with_layer_files(&files)
        .build(Path::new("seg.mp4"));

    // Then: Inputs follow the fixed order with the foreground last
    assert_eq!(
        inputs(&args),
        vec![
            "bg.png",
            "desktop",
            "video=Integrated Camera",
            "audio=Headset Microphone",
            "fg.png"
        ]
    );
    assert_eq!(value_after(&args, "-loop").as_deref(), Some("1"));
}

/// WHAT: Background layout scales the screen into the content area
/// WHY: The background defines the canvas and the screen sits inside it
#[test]
fn given_background_layout_when_building_graph_then_screen_overlaid_in_content_area() {
    // Given: Background layout without camera
    let config = RecordingConfig::screen(ScreenSource::desktop(), OutputConfig::new("out"))
        .with_layers(layers());
    let files = LayerFiles::new(Some(PathBuf::from("bg.png")), None);
    let encoder = x264();

    // When: Building the graph
    let graph = CommandBuilder::new(&config, &encoder)
        .with_layer_files(&files)
        .filter_graph();

    // Then: Screen is reset, scaled and overlaid at the content origin
    assert_eq!(
        graph.to_string(),
        "[0:v]scale=4:4[bg];\
         [1:v]setpts=PTS-STARTPTS,scale=1600:900[scr];\
         [bg][scr]overlay=100:50:shortest=1[vout]"
    );
}

/// WHAT: Camera overlay is cropped, scaled, masked and placed from preview space
/// WHY: The recording must match what the user arranged in the preview
#[test]
fn given_screen_camera_when_building_graph_then_camera_mapped_from_preview() {
    // Given: A circular camera laid out on a 960x540 preview of a 1920x1080 display
    let mut camera = CameraConfig::new("Integrated Camera");
    camera.size = 150;
    camera.position = Point::new(780, 360);
    camera.shape = CameraShape::Circle;
    let mut config = RecordingConfig::screen_camera(
        ScreenSource::display("main", Rect::new(0, 0, 1920, 1080)),
        camera,
        OutputConfig::new("out"),
    );
    config.preview_size = Some(Size::new(960, 540));
    let encoder = x264();

    // When: Building the graph
    let graph = CommandBuilder::new(&config, &encoder).filter_graph();

    // Then: The camera is 300px at (1560, 720) with a circular mask
    assert_eq!(
        graph.to_string(),
        "[0:v]setpts=PTS-STARTPTS[scr];\
         [1:v]setpts=PTS-STARTPTS,crop='min(iw,ih)':'min(iw,ih)',scale=300:300,format=yuva420p,\
         geq=lum='p(X,Y)':a='if(lte(hypot(X-W/2,Y-H/2),W/2),255,0)'[cam];\
         [scr][cam]overlay=1560:720:eof_action=pass[vout]"
    );
}

/// WHAT: Rounded cameras skip the alpha mask
/// WHY: The rounded shape is a plain square crop
#[test]
fn given_rounded_camera_when_building_graph_then_no_mask() {
    let mut camera = CameraConfig::new("Integrated Camera");
    camera.shape = CameraShape::Rounded;
    let config = RecordingConfig::screen_camera(ScreenSource::desktop(), camera, OutputConfig::new("out"));
    let encoder = x264();

    let graph = CommandBuilder::new(&config, &encoder).filter_graph().to_string();

    assert!(graph.contains("crop='min(iw,ih)':'min(iw,ih)'"));
    assert!(!graph.contains("geq="));
}

/// WHAT: A fixed resolution appends one letterbox stage to the existing chain
/// WHY: The scale must extend, not replace, the timestamp reset
#[test]
fn given_fixed_resolution_when_building_graph_then_scale_pad_appended_once() {
    // Given: Screen-only at 1280x720
    let mut output = OutputConfig::new("out");
    output.resolution = Resolution::Fixed(Size::new(1280, 720));
    let config = RecordingConfig::screen(ScreenSource::desktop(), output);
    let encoder = x264();

    // When: Building the graph
    let graph = CommandBuilder::new(&config, &encoder).filter_graph().to_string();

    // Then: setpts is followed by a single scale+pad
    assert_eq!(
        graph,
        "[0:v]setpts=PTS-STARTPTS,scale=1280:720:force_original_aspect_ratio=decrease,\
         pad=1280:720:(ow-iw)/2:(oh-ih)/2:black[vout]"
    );
    assert_eq!(graph.matches("pad=").count(), 1);
}

/// WHAT: Microphone audio is offset, resampled and padded
/// WHY: The microphone starts later than the screen capture
#[test]
fn given_microphone_when_building_then_audio_chain_and_aac_output() {
    // Given: Screen plus microphone with a custom offset
    let config = RecordingConfig::screen(ScreenSource::desktop(), OutputConfig::new("out"))
        .with_microphone("Headset Microphone");
    let encoder = x264();

    // When: Building
    let builder = CommandBuilder::new(&config, &encoder).with_audio_offset(0.5);
    let args = builder.build(Path::new("seg.mp4"));

    // Then: Audio gets its chain, its own map and AAC flags
    let graph = builder.filter_graph().to_string();
    assert!(graph.ends_with("[1:a]asetpts=PTS-STARTPTS+0.500/TB,aresample=async=1000:first_pts=0,apad[aout]"));
    assert!(args.contains(&"[aout]".to_string()));
    assert_eq!(value_after(&args, "-c:a").as_deref(), Some("aac"));
    assert!(args.contains(&"-shortest".to_string()));
}

/// WHAT: Each backend receives its own rate-control flags
/// WHY: Option names differ between hardware encoders
#[test]
fn given_backends_when_building_then_backend_specific_flags() {
    let config = RecordingConfig::screen(ScreenSource::desktop(), OutputConfig::new("out"));

    let flags = |backend| {
        let encoder = EncoderInfo::new(backend);
        CommandBuilder::new(&config, &encoder).build(Path::new("seg.mp4"))
    };

    let nvenc = flags(EncoderBackend::Nvenc);
    assert_eq!(value_after(&nvenc, "-c:v").as_deref(), Some("h264_nvenc"));
    assert_eq!(value_after(&nvenc, "-cq").as_deref(), Some("23"));

    let qsv = flags(EncoderBackend::Qsv);
    assert_eq!(value_after(&qsv, "-global_quality").as_deref(), Some("23"));

    let amf = flags(EncoderBackend::Amf);
    assert_eq!(value_after(&amf, "-rc").as_deref(), Some("cqp"));

    let x264 = flags(EncoderBackend::X264);
    assert_eq!(value_after(&x264, "-crf").as_deref(), Some("23"));
    assert_eq!(value_after(&x264, "-pix_fmt").as_deref(), Some("yuv420p"));
    assert_eq!(value_after(&x264, "-g").as_deref(), Some("60"));
}

/// WHAT: An absurd frame rate saturates the keyframe interval
/// WHY: Building arguments must never overflow
#[test]
fn given_huge_fps_when_building_then_gop_saturates() {
    let mut config = RecordingConfig::screen(ScreenSource::desktop(), OutputConfig::new("out"));
    config.output.fps = u32::MAX;

    let args = CommandBuilder::new(&config, &x264()).build(Path::new("seg.mp4"));

    assert_eq!(value_after(&args, "-g"), Some(u32::MAX.to_string()));
}
