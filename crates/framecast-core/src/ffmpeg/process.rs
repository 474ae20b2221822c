use crate::{
    CoreResult, FfmpegBinary, RecorderError, SessionEvent,
    ffmpeg::monitor::{DiagnosticLog, watch_stderr},
};

use std::{
    io::Write,
    panic::Location,
    path::PathBuf,
    process::Stdio,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{
    io::AsyncWriteExt,
    process::{Child, ChildStdin},
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// Diagnostic lines attached to errors and crash events.
const DETAIL_LINES: usize = 10;

/// Diagnostic lines written to the per-segment debug log.
const DEBUG_LOG_LINES: usize = 50;

/// Time allowed for the diagnostic reader to drain after exit.
const MONITOR_DRAIN: Duration = Duration::from_secs(1);

/// Everything needed to launch one recording segment.
pub(crate) struct SpawnRequest<'a> {
    pub(crate) binary: &'a FfmpegBinary,
    pub(crate) args: Vec<String>,
    pub(crate) segment: usize,
    pub(crate) debug_log: Option<PathBuf>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
}

/// How a segment process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExitReport {
    pub(crate) code: Option<i32>,
    pub(crate) success: bool,
}

const STARTING: u8 = 0;
const LIVE: u8 = 1;
const EXITED: u8 = 2;

/// Decides who reports an encoder exit.
///
/// Exactly one of the start waiter and the supervisor wins the transition out
/// of `STARTING`. A live segment reports its exit as a crash event; an exit
/// that lands first is returned by the start waiter instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct StartGate(Arc<AtomicU8>);

impl StartGate {
    /// Mark the segment live; false once the encoder has already exited.
    pub(crate) fn confirm(&self) -> bool {
        match self
            .0
            .compare_exchange(STARTING, LIVE, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(current) => current == LIVE,
        }
    }

    /// Record the exit; true if the segment had gone live.
    pub(crate) fn settle_exit(&self) -> bool {
        match self
            .0
            .compare_exchange(STARTING, EXITED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => false,
            Err(current) => current == LIVE,
        }
    }

    fn is_live(&self) -> bool {
        self.0.load(Ordering::SeqCst) == LIVE
    }
}

/// How startup was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartOutcome {
    /// A progress marker was seen.
    Confirmed,
    /// The start window elapsed without a device error.
    Presumed { buffer_warning: bool },
}

impl StartOutcome {
    pub(crate) fn is_confirmed(&self) -> bool {
        matches!(self, StartOutcome::Confirmed)
    }
}

/// Handle to a live encoder process.
///
/// The child itself is owned by a supervisor task so exits are observed even
/// while nobody is awaiting; the handle talks to it over channels.
pub(crate) struct SegmentProcess {
    segment: usize,
    stdin: Option<ChildStdin>,
    kill_tx: mpsc::Sender<()>,
    exit_rx: watch::Receiver<Option<ExitReport>>,
    ready_rx: Option<oneshot::Receiver<()>>,
    log: Arc<Mutex<DiagnosticLog>>,
    gate: StartGate,
    stop_requested: Arc<AtomicBool>,
}

struct Supervisor {
    segment: usize,
    command_line: String,
    debug_log: Option<PathBuf>,
    events: broadcast::Sender<SessionEvent>,
    log: Arc<Mutex<DiagnosticLog>>,
    gate: StartGate,
    stop_requested: Arc<AtomicBool>,
}

impl SegmentProcess {
    /// Launch the encoder and start consuming its diagnostic stream.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::SpawnFailed`] if the process cannot start.
    #[track_caller]
    #[instrument(skip(request), fields(segment = request.segment))]
    pub(crate) fn spawn(request: SpawnRequest<'_>) -> CoreResult<Self> {
        let SpawnRequest {
            binary,
            args,
            segment,
            debug_log,
            events,
        } = request;

        let command_line = binary.describe(&args);
        debug!(command = %command_line, "Spawning encoder");

        let mut child = binary
            .command()
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecorderError::SpawnFailed {
                reason: format!("{}: {}", binary.program().display(), e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take();

        let log = Arc::new(Mutex::new(DiagnosticLog::new()));
        let gate = StartGate::default();
        let (ready_tx, ready_rx) = oneshot::channel();
        let monitor = match stderr {
            Some(stderr) => Some(tokio::spawn(watch_stderr(
                stderr,
                Arc::clone(&log),
                gate.clone(),
                ready_tx,
                segment,
            ))),
            None => {
                warn!(segment, "Encoder diagnostic stream unavailable");
                None
            }
        };

        let (kill_tx, kill_rx) = mpsc::channel(1);
        let (exit_tx, exit_rx) = watch::channel(None);
        let stop_requested = Arc::new(AtomicBool::new(false));

        let supervisor = Supervisor {
            segment,
            command_line,
            debug_log,
            events,
            log: Arc::clone(&log),
            gate: gate.clone(),
            stop_requested: Arc::clone(&stop_requested),
        };
        tokio::spawn(supervisor.run(child, monitor, kill_rx, exit_tx));

        info!(segment, "Encoder spawned");

        Ok(Self {
            segment,
            stdin,
            kill_tx,
            exit_rx,
            ready_rx: Some(ready_rx),
            log,
            gate,
            stop_requested,
        })
    }

    pub(crate) fn segment(&self) -> usize {
        self.segment
    }

    /// Wait until the segment is known (or presumed) to be recording.
    ///
    /// Resolves on the first progress marker. If `limit` elapses first the
    /// segment is presumed started, unless the encoder reported a missing
    /// device, in which case it is killed.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::DeviceUnavailable`] on a missing device and
    /// [`RecorderError::ExitedDuringStartup`] if the encoder exits first.
    #[instrument(skip(self), fields(segment = self.segment))]
    pub(crate) async fn wait_for_start(&mut self, limit: Duration) -> CoreResult<StartOutcome> {
        let mut ready_rx = match self.ready_rx.take() {
            Some(rx) => rx,
            None => {
                return Ok(if self.gate.is_live() {
                    StartOutcome::Confirmed
                } else {
                    StartOutcome::Presumed {
                        buffer_warning: false,
                    }
                });
            }
        };

        let mut exit_rx = self.exit_rx.clone();
        let sleep = tokio::time::sleep(limit);
        tokio::pin!(sleep);

        let outcome = tokio::select! {
            biased;

            ready = &mut ready_rx => match ready {
                Ok(()) => Some(StartOutcome::Confirmed),
                // Reader finished without a marker; let the exit branch decide.
                Err(_) => None,
            },
            exited = exit_rx.wait_for(Option::is_some) => {
                if self.gate.is_live() {
                    // Went live first; the supervisor reports this exit as a crash.
                    Some(StartOutcome::Confirmed)
                } else {
                    let report = exited.ok().and_then(|r| *r);
                    return Err(self.startup_exit_error(report.and_then(|r| r.code)));
                }
            }
            _ = &mut sleep => {
                let (missing, buffer_warning) = {
                    let log = self.lock_log();
                    (log.could_not_find(), log.buffer_warning())
                };
                if missing {
                    warn!(segment = self.segment, "Device not found at startup, killing encoder");
                    self.force_stop(limit).await;
                    return Err(RecorderError::DeviceUnavailable {
                        details: self.lock_log().tail(DETAIL_LINES),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                Some(StartOutcome::Presumed { buffer_warning })
            }
        };

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                // Stream closed: the exit is imminent or the process lingers silently.
                match tokio::time::timeout(limit, self.wait_exit()).await {
                    Ok(report) => {
                        return Err(self.startup_exit_error(report.and_then(|r| r.code)));
                    }
                    Err(_) => StartOutcome::Presumed {
                        buffer_warning: self.lock_log().buffer_warning(),
                    },
                }
            }
        };

        if !self.gate.confirm() {
            // Exited before going live; the supervisor left reporting to us.
            let report = self.wait_exit().await;
            return Err(self.startup_exit_error(report.and_then(|r| r.code)));
        }
        match outcome {
            StartOutcome::Confirmed => info!(segment = self.segment, "Segment confirmed"),
            StartOutcome::Presumed { buffer_warning } => info!(
                segment = self.segment,
                buffer_warning, "No progress yet, presuming segment started"
            ),
        }
        Ok(outcome)
    }

    /// Ask the encoder to finish the file, killing it after `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Timeout`] if the process survives the kill.
    #[instrument(skip(self), fields(segment = self.segment))]
    pub(crate) async fn graceful_stop(&mut self, limit: Duration) -> CoreResult<ExitReport> {
        self.stop_requested.store(true, Ordering::SeqCst);

        if let Some(report) = *self.exit_rx.borrow() {
            return Ok(report);
        }

        if !self.send_quit().await {
            warn!(segment = self.segment, "Quit request unavailable, killing encoder");
            self.request_kill();
        }

        if let Ok(report) = tokio::time::timeout(limit, self.wait_exit()).await {
            let report = report.unwrap_or(ExitReport {
                code: None,
                success: false,
            });
            info!(
                segment = self.segment,
                code = ?report.code,
                success = report.success,
                "Encoder exited"
            );
            return Ok(report);
        }

        warn!(segment = self.segment, ?limit, "Encoder ignored quit request, killing");
        self.request_kill();

        match tokio::time::timeout(limit, self.wait_exit()).await {
            Ok(report) => Ok(report.unwrap_or(ExitReport {
                code: None,
                success: false,
            })),
            Err(_) => Err(RecorderError::Timeout {
                operation: "encoder shutdown",
                limit,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Kill the encoder and wait up to `limit` for the exit to be observed.
    pub(crate) async fn force_stop(&mut self, limit: Duration) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.stdin = None;
        self.request_kill();
        if tokio::time::timeout(limit, self.wait_exit()).await.is_err() {
            error!(segment = self.segment, "Encoder did not exit after kill");
        }
    }

    async fn send_quit(&mut self) -> bool {
        let Some(mut stdin) = self.stdin.take() else {
            return false;
        };
        if let Err(e) = stdin.write_all(b"q\n").await {
            debug!(segment = self.segment, error = %e, "Failed to write quit request");
            return false;
        }
        if let Err(e) = stdin.flush().await {
            debug!(segment = self.segment, error = %e, "Failed to flush quit request");
            return false;
        }
        true
    }

    fn request_kill(&self) {
        if self.kill_tx.try_send(()).is_err() {
            debug!(segment = self.segment, "Kill request dropped, supervisor finished");
        }
    }

    async fn wait_exit(&mut self) -> Option<ExitReport> {
        match self.exit_rx.wait_for(Option::is_some).await {
            Ok(report) => *report,
            Err(_) => None,
        }
    }

    #[track_caller]
    fn startup_exit_error(&self, code: Option<i32>) -> RecorderError {
        let log = self.lock_log();
        let details = log.tail(DETAIL_LINES);
        if log.could_not_find() {
            RecorderError::DeviceUnavailable {
                details,
                location: ErrorLocation::from(Location::caller()),
            }
        } else {
            RecorderError::ExitedDuringStartup {
                code,
                details,
                location: ErrorLocation::from(Location::caller()),
            }
        }
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, DiagnosticLog> {
        self.log.lock().unwrap_or_else(|e| {
            error!("Diagnostic log lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl Drop for SegmentProcess {
    fn drop(&mut self) {
        if self.exit_rx.borrow().is_none() {
            self.stop_requested.store(true, Ordering::SeqCst);
            let _ = self.kill_tx.try_send(());
        }
    }
}

impl Supervisor {
    async fn run(
        self,
        mut child: Child,
        monitor: Option<JoinHandle<()>>,
        mut kill_rx: mpsc::Receiver<()>,
        exit_tx: watch::Sender<Option<ExitReport>>,
    ) {
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                Some(()) = kill_rx.recv() => {
                    if let Err(e) = child.start_kill() {
                        debug!(segment = self.segment, error = %e, "Kill failed");
                    }
                }
            }
        };

        let report = match status {
            Ok(status) => ExitReport {
                code: status.code(),
                success: status.success(),
            },
            Err(e) => {
                error!(segment = self.segment, error = %e, "Failed to wait for encoder");
                ExitReport {
                    code: None,
                    success: false,
                }
            }
        };

        if let Some(monitor) = monitor
            && tokio::time::timeout(MONITOR_DRAIN, monitor).await.is_err()
        {
            debug!(segment = self.segment, "Diagnostic reader still open after exit");
        }

        let (tail, full) = {
            let log = self.log.lock().unwrap_or_else(|e| e.into_inner());
            (log.tail(DETAIL_LINES), log.tail(DEBUG_LOG_LINES))
        };

        if self.gate.settle_exit() && !self.stop_requested.load(Ordering::SeqCst) {
            error!(
                segment = self.segment,
                code = ?report.code,
                "Encoder exited unexpectedly"
            );
            // No subscribers is fine; nobody is listening.
            let _ = self.events.send(SessionEvent::Crashed {
                segment: self.segment,
                exit_code: report.code,
                last_lines: tail,
            });
        }

        if let Some(path) = &self.debug_log {
            let section = format!(
                "=== Segment {} ===\nCommand: {}\nExit code: {}\n--- ffmpeg output ---\n{}\n\n",
                self.segment,
                self.command_line,
                report
                    .code
                    .map_or_else(|| "killed".to_string(), |c| c.to_string()),
                full.join("\n"),
            );
            let path = path.clone();
            let written = tokio::task::spawn_blocking(move || append_section(&path, &section)).await;
            match written {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(segment = self.segment, error = %e, "Failed to write debug log"),
                Err(e) => warn!(segment = self.segment, error = %e, "Debug log task failed"),
            }
        }

        let _ = exit_tx.send(Some(report));
    }
}

fn append_section(path: &std::path::Path, section: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(section.as_bytes())
}
