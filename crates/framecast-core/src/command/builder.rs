use crate::{
    EncoderInfo, FilterGraph, LayerFiles, PadRef, RecordingConfig, Resolution, ScreenSourceKind,
    Size,
    command::{
        encoding::{audio_args, segment_video_args},
        filter_graph::{Filter, camera_filters},
    },
    config::{DEFAULT_AUDIO_OFFSET_SECS, DEFAULT_HEIGHT, DEFAULT_WIDTH},
    geometry::map_to_canvas,
};

use std::path::Path;

use tracing::debug;

const VIDEO_OUT: &str = "vout";
const AUDIO_OUT: &str = "aout";

/// Input queue depth for live capture inputs.
const THREAD_QUEUE_SIZE: &str = "512";

/// Real-time buffer for DirectShow devices.
const RT_BUFFER_SIZE: &str = "100M";

/// Maximum samples per second aresample may stretch or squeeze audio.
const AUDIO_MAX_COMPENSATION: u32 = 1000;

/// Input indexes in spawn order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InputIndexes {
    background: Option<usize>,
    screen: Option<usize>,
    camera: Option<usize>,
    microphone: Option<usize>,
    foreground: Option<usize>,
}

/// Builds the ffmpeg argument list for one recording segment.
///
/// Pure: the same configuration, encoder and layer files always produce the
/// same arguments.
///
/// # Example
///
/// ```
/// use framecast_core::{
///     CommandBuilder, EncoderBackend, EncoderInfo, OutputConfig, RecordingConfig, ScreenSource,
/// };
///
/// let config = RecordingConfig::screen(ScreenSource::desktop(), OutputConfig::new("out"));
/// let encoder = EncoderInfo::new(EncoderBackend::X264);
/// let args = CommandBuilder::new(&config, &encoder).build("out/seg1.mp4".as_ref());
///
/// assert!(args.contains(&"gdigrab".to_string()));
/// assert_eq!(args.last().map(String::as_str), Some("out/seg1.mp4"));
/// ```
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    config: &'a RecordingConfig,
    encoder: &'a EncoderInfo,
    layers: Option<&'a LayerFiles>,
    audio_offset_secs: f64,
}

impl<'a> CommandBuilder<'a> {
    /// Builder for `config` encoded with `encoder`.
    pub fn new(config: &'a RecordingConfig, encoder: &'a EncoderInfo) -> Self {
        Self {
            config,
            encoder,
            layers: None,
            audio_offset_secs: DEFAULT_AUDIO_OFFSET_SECS,
        }
    }

    /// Use persisted background/foreground images.
    pub fn with_layer_files(mut self, layers: &'a LayerFiles) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Shift applied to microphone timestamps.
    pub fn with_audio_offset(mut self, secs: f64) -> Self {
        self.audio_offset_secs = secs;
        self
    }

    /// Complete argument list writing to `output`.
    pub fn build(&self, output: &Path) -> Vec<String> {
        let (mut args, inputs) = self.register_inputs();
        let graph = self.graph_for(&inputs);

        if !graph.is_empty() {
            args.push("-filter_complex".to_string());
            args.push(graph.to_string());
        }
        if graph.produces(VIDEO_OUT) {
            args.push("-map".to_string());
            args.push(format!("[{}]", VIDEO_OUT));
        }
        if graph.produces(AUDIO_OUT) {
            args.push("-map".to_string());
            args.push(format!("[{}]", AUDIO_OUT));
        }

        args.extend(segment_video_args(self.encoder, self.config.output.fps));

        if inputs.microphone.is_some() {
            args.extend(audio_args());
            // apad never ends on its own.
            args.push("-shortest".to_string());
        }

        args.push("-y".to_string());
        args.push(output.to_string_lossy().into_owned());

        debug!(
            inputs = ?inputs,
            encoder = %self.encoder,
            "Encoder arguments built"
        );

        args
    }

    /// The filter graph `build` would emit.
    pub fn filter_graph(&self) -> FilterGraph {
        let (_, inputs) = self.register_inputs();
        self.graph_for(&inputs)
    }

    fn background_path(&self) -> Option<&'a Path> {
        if !self.config.uses_layers() {
            return None;
        }
        self.layers.and_then(|l| l.background())
    }

    fn foreground_path(&self) -> Option<&'a Path> {
        if !self.config.uses_layers() {
            return None;
        }
        self.layers.and_then(|l| l.foreground())
    }

    fn register_inputs(&self) -> (Vec<String>, InputIndexes) {
        let fps = self.config.output.fps.to_string();
        let mut args = vec!["-hide_banner".to_string()];
        let mut inputs = InputIndexes::default();
        let mut next = 0;
        let mut claim = || {
            let index = next;
            next += 1;
            index
        };

        if let Some(background) = self.background_path() {
            inputs.background = Some(claim());
            push_image_input(&mut args, background, &fps);
        }

        if let Some(screen) = self.config.screen.as_ref().filter(|_| self.config.captures_screen()) {
            inputs.screen = Some(claim());
            args.extend(
                [
                    "-thread_queue_size",
                    THREAD_QUEUE_SIZE,
                    "-f",
                    "gdigrab",
                    "-framerate",
                    fps.as_str(),
                    "-draw_mouse",
                    "1",
                ]
                .map(String::from),
            );
            match (screen.kind, screen.bounds) {
                (ScreenSourceKind::Window, _) => {
                    args.push("-i".to_string());
                    args.push(format!("title={}", screen.window_title()));
                }
                (ScreenSourceKind::Display, Some(bounds)) => {
                    let size = bounds.size().even();
                    args.extend([
                        "-offset_x".to_string(),
                        bounds.x.to_string(),
                        "-offset_y".to_string(),
                        bounds.y.to_string(),
                        "-video_size".to_string(),
                        size.to_string(),
                        "-i".to_string(),
                        "desktop".to_string(),
                    ]);
                }
                (ScreenSourceKind::Display, None) => {
                    args.push("-i".to_string());
                    args.push("desktop".to_string());
                }
            }
        }

        if self.config.captures_camera()
            && let Some(camera) = &self.config.camera
        {
            inputs.camera = Some(claim());
            // No size or rate: some cameras reject explicit requests.
            push_dshow_input(&mut args, &format!("video={}", camera.label));
        }

        if let Some(microphone) = &self.config.microphone {
            inputs.microphone = Some(claim());
            push_dshow_input(&mut args, &format!("audio={}", microphone));
        }

        if let Some(foreground) = self.foreground_path() {
            inputs.foreground = Some(claim());
            push_image_input(&mut args, foreground, &fps);
        }

        (args, inputs)
    }

    fn graph_for(&self, inputs: &InputIndexes) -> FilterGraph {
        let mut graph = FilterGraph::new();
        let mut scaled = false;

        let layers = self.config.layers.as_ref();
        match (inputs.background, inputs.screen, layers) {
            (Some(background), Some(screen), Some(layers)) => {
                let canvas = layers.canvas();
                let content = layers.content_area;
                let content_size = content.size().even();

                let bg = graph.chain(
                    vec![PadRef::video(background)],
                    vec![Filter::Scale {
                        width: canvas.width,
                        height: canvas.height,
                    }],
                    "bg",
                );
                let scr = graph.chain(
                    vec![PadRef::video(screen)],
                    vec![
                        Filter::ResetPts,
                        Filter::Scale {
                            width: content_size.width,
                            height: content_size.height,
                        },
                    ],
                    "scr",
                );
                let mut base = graph.chain(
                    vec![bg, scr],
                    vec![Filter::Overlay {
                        x: content.x,
                        y: content.y,
                        shortest: true,
                        pass_on_eof: false,
                    }],
                    "base",
                );
                if let Some(camera) = inputs.camera {
                    base = self.overlay_camera(&mut graph, base, camera, canvas, "withcam");
                }
                if let Some(foreground) = inputs.foreground {
                    let fg = graph.chain(
                        vec![PadRef::video(foreground)],
                        vec![
                            Filter::Scale {
                                width: canvas.width,
                                height: canvas.height,
                            },
                            Filter::Format("yuva420p"),
                        ],
                        "fg",
                    );
                    graph.chain(
                        vec![base, fg],
                        vec![Filter::Overlay {
                            x: 0,
                            y: 0,
                            shortest: true,
                            pass_on_eof: false,
                        }],
                        VIDEO_OUT,
                    );
                } else {
                    graph.rename_output(base_label(&base), VIDEO_OUT);
                }
                scaled = true;
            }
            (_, Some(screen), _) if inputs.camera.is_some() => {
                let mut filters = vec![Filter::ResetPts];
                let canvas = match self.config.output.resolution {
                    Resolution::Fixed(target) => {
                        let target = target.even();
                        filters.push(Filter::FitScale {
                            width: target.width,
                            height: target.height,
                        });
                        filters.push(Filter::Pad {
                            width: target.width,
                            height: target.height,
                        });
                        scaled = true;
                        target
                    }
                    Resolution::Source => self.source_canvas(),
                };
                let base = graph.chain(vec![PadRef::video(screen)], filters, "scr");
                if let Some(camera) = inputs.camera {
                    self.overlay_camera(&mut graph, base, camera, canvas, VIDEO_OUT);
                }
            }
            (_, Some(screen), _) => {
                graph.chain(
                    vec![PadRef::video(screen)],
                    vec![Filter::ResetPts],
                    VIDEO_OUT,
                );
            }
            (_, None, _) => {
                if let Some(camera) = inputs.camera {
                    graph.chain(
                        vec![PadRef::video(camera)],
                        vec![Filter::ResetPts, Filter::HFlip],
                        VIDEO_OUT,
                    );
                }
            }
        }

        if let Some(microphone) = inputs.microphone {
            graph.chain(
                vec![PadRef::audio(microphone)],
                vec![
                    Filter::ResetAudioPts {
                        offset_secs: self.audio_offset_secs,
                    },
                    Filter::AsyncResample {
                        max_compensation: AUDIO_MAX_COMPENSATION,
                    },
                    Filter::PadSilence,
                ],
                AUDIO_OUT,
            );
        }

        if inputs.background.is_none()
            && !scaled
            && let Resolution::Fixed(target) = self.config.output.resolution
        {
            let target = target.even();
            graph.append_to(
                VIDEO_OUT,
                [
                    Filter::FitScale {
                        width: target.width,
                        height: target.height,
                    },
                    Filter::Pad {
                        width: target.width,
                        height: target.height,
                    },
                ],
            );
        }

        graph
    }

    fn overlay_camera(
        &self,
        graph: &mut FilterGraph,
        base: PadRef,
        camera_index: usize,
        canvas: Size,
        output: &str,
    ) -> PadRef {
        let Some(camera) = &self.config.camera else {
            return base;
        };
        let preview = self.config.preview_size.unwrap_or(canvas);
        let placement = map_to_canvas(camera.size, camera.position, preview, canvas);

        let cam = graph.chain(
            vec![PadRef::video(camera_index)],
            camera_filters(placement, camera.shape),
            "cam",
        );
        graph.chain(
            vec![base, cam],
            vec![Filter::Overlay {
                x: placement.x,
                y: placement.y,
                shortest: false,
                pass_on_eof: true,
            }],
            output,
        )
    }

    /// Canvas of an unscaled screen capture.
    fn source_canvas(&self) -> Size {
        self.config
            .screen
            .as_ref()
            .and_then(|s| s.bounds)
            .map(|b| b.size().even())
            .unwrap_or(Size::new(DEFAULT_WIDTH, DEFAULT_HEIGHT))
    }
}

fn base_label(pad: &PadRef) -> &str {
    match pad {
        PadRef::Label(label) => label,
        PadRef::Input { .. } => "",
    }
}

fn push_image_input(args: &mut Vec<String>, path: &Path, fps: &str) {
    args.extend([
        "-loop".to_string(),
        "1".to_string(),
        "-framerate".to_string(),
        fps.to_string(),
        "-i".to_string(),
        path.to_string_lossy().into_owned(),
    ]);
}

fn push_dshow_input(args: &mut Vec<String>, device: &str) {
    args.extend([
        "-thread_queue_size".to_string(),
        THREAD_QUEUE_SIZE.to_string(),
        "-f".to_string(),
        "dshow".to_string(),
        "-rtbufsize".to_string(),
        RT_BUFFER_SIZE.to_string(),
        "-i".to_string(),
        device.to_string(),
    ]);
}
