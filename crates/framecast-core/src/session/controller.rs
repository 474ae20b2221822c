use crate::{
    CommandBuilder, ControllerSettings, CoreResult, DeviceCatalog, DeviceKind, EncoderInfo,
    EncoderPreference, EncoderProbe, FfmpegBinary, LayerFiles, RecorderError, RecorderState,
    RecordingConfig, RecordingMode, SegmentStore, SessionEvent, match_device,
    ffmpeg::{SegmentProcess, SpawnRequest},
    session::discard_file,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::Local;
use error_location::ErrorLocation;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 64;

/// Highest frame rate a capture may request.
const MAX_FPS: u32 = 240;

struct ActiveSession {
    id: Uuid,
    config: RecordingConfig,
    encoder: EncoderInfo,
    output_path: PathBuf,
    layers: LayerFiles,
    store: SegmentStore,
    process: Option<SegmentProcess>,
}

/// Drives one recording session at a time through
/// `start -> (pause -> resume)* -> stop`.
///
/// Operations are rejected immediately when the current state does not allow
/// them. A new segment is only spawned after the previous encoder's exit has
/// been observed. Crashes after a segment has started are published as
/// [`SessionEvent::Crashed`] on the channel returned by
/// [`subscribe`](Self::subscribe).
///
/// # Caching
///
/// The encoder probe and device catalog are owned by the controller and live
/// as long as it does. Use [`with_caches`](Self::with_caches) to inject
/// pre-filled caches and [`invalidate_caches`](Self::invalidate_caches) to
/// force fresh lookups.
pub struct SessionController {
    binary: FfmpegBinary,
    settings: ControllerSettings,
    encoder_probe: EncoderProbe,
    catalog: DeviceCatalog,
    events: broadcast::Sender<SessionEvent>,
    state: RecorderState,
    session: Option<ActiveSession>,
}

impl SessionController {
    /// Idle controller with empty caches.
    pub fn new(binary: FfmpegBinary, settings: ControllerSettings) -> Self {
        let encoder_probe = EncoderProbe::new(binary.clone(), settings.probe_timeout);
        let catalog = DeviceCatalog::new(binary.clone(), settings.probe_timeout);
        Self::with_caches(binary, settings, encoder_probe, catalog)
    }

    /// Idle controller using the given encoder probe and device catalog.
    pub fn with_caches(
        binary: FfmpegBinary,
        settings: ControllerSettings,
        encoder_probe: EncoderProbe,
        catalog: DeviceCatalog,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            binary,
            settings,
            encoder_probe,
            catalog,
            events,
            state: RecorderState::Idle,
            session: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Receive session events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Settings in effect.
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Segments recorded so far in the active session.
    pub fn segments(&self) -> &[PathBuf] {
        self.session
            .as_ref()
            .map(|s| s.store.segments())
            .unwrap_or_default()
    }

    /// Final output path of the active session.
    pub fn output_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.output_path.as_path())
    }

    /// Configuration of the active session, with device labels resolved.
    pub fn active_config(&self) -> Option<&RecordingConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    /// Encoder chosen for the active session.
    pub fn active_encoder(&self) -> Option<EncoderInfo> {
        self.session.as_ref().map(|s| s.encoder)
    }

    /// Encoder probe owned by the controller.
    pub fn encoder_probe(&self) -> &EncoderProbe {
        &self.encoder_probe
    }

    /// Device catalog owned by the controller.
    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    /// Forget cached encoder and device results.
    pub async fn invalidate_caches(&mut self) {
        self.encoder_probe.invalidate();
        self.catalog.invalidate().await;
    }

    /// Start a session and its first segment.
    ///
    /// Device labels in `config` are replaced by the matched catalog names.
    /// Returns the path the final recording will be written to.
    ///
    /// # Errors
    ///
    /// Fails without side effects if the controller is not idle, the output
    /// folder is missing, the configuration lacks an input its mode needs or
    /// a device label does not match the catalog. Fails after cleanup if the
    /// first segment cannot start.
    #[instrument(skip(self, config), fields(mode = ?config.mode))]
    pub async fn start(&mut self, config: RecordingConfig) -> CoreResult<PathBuf> {
        if self.state != RecorderState::Idle {
            return Err(self.invalid_state("start"));
        }

        validate_output_folder(&config.output.folder)?;
        validate_inputs(&config)?;

        let mut config = config;
        self.resolve_devices(&mut config).await?;

        let encoder = match config.encoder {
            EncoderPreference::Forced(backend) => EncoderInfo::new(backend),
            EncoderPreference::Auto => self.encoder_probe.detect().await,
        };

        let layers = match config.layers.as_ref().filter(|_| config.uses_layers()) {
            Some(layers) => LayerFiles::persist(layers, &std::env::temp_dir()).await?,
            None => LayerFiles::default(),
        };

        let output_path = unique_output_path(
            &config.output.folder,
            &format!(
                "{}_{}",
                self.settings.product_name,
                Local::now().format("%Y%m%d_%H%M%S")
            ),
        );

        let mut session = ActiveSession {
            id: Uuid::new_v4(),
            store: SegmentStore::new(&output_path),
            config,
            encoder,
            output_path: output_path.clone(),
            layers,
            process: None,
        };

        if let Err(e) = self.launch_segment(&mut session).await {
            session.layers.cleanup();
            return Err(e);
        }

        info!(
            session = %session.id,
            output = ?output_path,
            encoder = %encoder,
            "Recording started"
        );
        self.session = Some(session);
        self.state = RecorderState::Recording;
        Ok(output_path)
    }

    /// Close the current segment.
    ///
    /// # Errors
    ///
    /// Fails if not recording, or if the encoder survives the forced kill.
    #[instrument(skip(self))]
    pub async fn pause(&mut self) -> CoreResult<()> {
        if self.state != RecorderState::Recording {
            return Err(self.invalid_state("pause"));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid_state("pause"));
        };

        if let Some(mut process) = session.process.take() {
            match process.graceful_stop(self.settings.stop_timeout).await {
                Ok(report) => {
                    let path = session.store.segments().last().cloned().unwrap_or_default();
                    let _ = self.events.send(SessionEvent::SegmentClosed {
                        index: process.segment(),
                        path,
                        exit_code: report.code,
                    });
                }
                Err(e) => {
                    session.process = Some(process);
                    return Err(e);
                }
            }
        }

        info!(session = %session.id, segments = session.store.len(), "Recording paused");
        self.state = RecorderState::Paused;
        Ok(())
    }

    /// Start a new segment after a pause.
    ///
    /// # Errors
    ///
    /// Fails if not paused or the new segment cannot start; the controller
    /// stays paused in that case.
    #[instrument(skip(self))]
    pub async fn resume(&mut self) -> CoreResult<()> {
        if self.state != RecorderState::Paused {
            return Err(self.invalid_state("resume"));
        }
        let Some(mut session) = self.session.take() else {
            return Err(self.invalid_state("resume"));
        };

        let launched = self.launch_segment(&mut session).await;
        let segments = session.store.len();
        let id = session.id;
        self.session = Some(session);
        launched?;

        info!(session = %id, segments, "Recording resumed");
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Finish the session and produce the final file.
    ///
    /// # Errors
    ///
    /// Fails if no session is active or the segments cannot be joined, in
    /// which case the error names the first segment as a usable fallback.
    /// The controller is idle afterwards either way.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> CoreResult<PathBuf> {
        if !matches!(
            self.state,
            RecorderState::Recording | RecorderState::Paused
        ) {
            return Err(self.invalid_state("stop"));
        }
        let Some(mut session) = self.session.take() else {
            return Err(self.invalid_state("stop"));
        };
        self.state = RecorderState::Stopping;

        if let Some(mut process) = session.process.take() {
            match process.graceful_stop(self.settings.stop_timeout).await {
                Ok(report) => {
                    let path = session.store.segments().last().cloned().unwrap_or_default();
                    let _ = self.events.send(SessionEvent::SegmentClosed {
                        index: process.segment(),
                        path,
                        exit_code: report.code,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Encoder did not stop cleanly, finalising anyway");
                }
            }
        }

        let result = session
            .store
            .finalize(&self.binary, &session.output_path, self.settings.concat_timeout)
            .await;

        session.layers.cleanup();
        self.state = RecorderState::Idle;

        match &result {
            Ok(output) => {
                info!(session = %session.id, output = ?output, "Recording finalised");
                let _ = self.events.send(SessionEvent::Finalized {
                    output: output.clone(),
                });
            }
            Err(e) => error!(session = %session.id, error = %e, "Finalisation failed"),
        }

        result
    }

    async fn launch_segment(&self, session: &mut ActiveSession) -> CoreResult<()> {
        let (index, path) = session.store.allocate();
        let args = CommandBuilder::new(&session.config, &session.encoder)
            .with_layer_files(&session.layers)
            .with_audio_offset(self.settings.audio_offset_secs)
            .build(&path);

        let mut process = SegmentProcess::spawn(SpawnRequest {
            binary: &self.binary,
            args,
            segment: index,
            debug_log: self
                .settings
                .debug_log
                .then(|| session.store.debug_log_path()),
            events: self.events.clone(),
        })?;

        match process.wait_for_start(self.settings.start_timeout).await {
            Ok(outcome) => {
                session.store.push(path.clone());
                session.process = Some(process);
                let _ = self.events.send(SessionEvent::SegmentStarted {
                    index,
                    path,
                    confirmed: outcome.is_confirmed(),
                });
                Ok(())
            }
            Err(e) => {
                process.force_stop(self.settings.stop_timeout).await;
                discard_file(&path);
                warn!(segment = index, error = %e, "Segment failed to start");
                Err(e)
            }
        }
    }

    async fn resolve_devices(&self, config: &mut RecordingConfig) -> CoreResult<()> {
        let needs_camera = config.captures_camera();
        if !needs_camera && config.microphone.is_none() {
            return Ok(());
        }

        let devices = self.catalog.list_devices().await;

        if needs_camera && let Some(camera) = config.camera.as_mut() {
            camera.label = resolve_label(DeviceKind::Video, &camera.label, &devices.video)?;
        }
        if let Some(microphone) = config.microphone.as_mut() {
            *microphone = resolve_label(DeviceKind::Audio, microphone, &devices.audio)?;
        }
        Ok(())
    }

    #[track_caller]
    fn invalid_state(&self, operation: &'static str) -> RecorderError {
        RecorderError::InvalidState {
            operation,
            state: self.state,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// `<folder>/<stem>.mp4`, or `<stem>_<n>.mp4` for the first free `n` when an
/// earlier session in the same second already owns the name.
fn unique_output_path(folder: &Path, stem: &str) -> PathBuf {
    let first = folder.join(format!("{}.mp4", stem));
    if !SegmentStore::is_claimed(&first) {
        return first;
    }
    (2usize..)
        .map(|n| folder.join(format!("{}_{}.mp4", stem, n)))
        .find(|path| !SegmentStore::is_claimed(path))
        .unwrap_or(first)
}

#[track_caller]
fn validate_output_folder(folder: &Path) -> CoreResult<()> {
    if folder.as_os_str().is_empty() || !folder.is_dir() {
        return Err(RecorderError::MissingOutputFolder {
            path: folder.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(())
}

#[track_caller]
fn validate_inputs(config: &RecordingConfig) -> CoreResult<()> {
    let problem = if config.output.fps == 0 {
        Some("frame rate must be positive")
    } else if config.output.fps > MAX_FPS {
        Some("frame rate must not exceed 240")
    } else if config.captures_screen() && config.screen.is_none() {
        Some("a screen source is required for screen recording")
    } else if matches!(
        config.mode,
        RecordingMode::Camera | RecordingMode::ScreenCamera
    ) && config.camera.is_none()
    {
        Some("a camera is required for camera recording")
    } else {
        None
    };

    match problem {
        Some(reason) => Err(RecorderError::InvalidConfig {
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
        None => Ok(()),
    }
}

#[track_caller]
fn resolve_label(kind: DeviceKind, label: &str, candidates: &[String]) -> CoreResult<String> {
    match match_device(label, candidates) {
        Some(found) => {
            info!(%kind, label, device = %found.name, tier = ?found.tier, "Device resolved");
            Ok(found.name)
        }
        None => Err(RecorderError::DeviceNotFound {
            kind,
            label: label.to_string(),
            available: candidates.to_vec(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
