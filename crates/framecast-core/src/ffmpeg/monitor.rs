use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::ffmpeg::process::StartGate;

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::oneshot,
};
use tracing::{debug, error, info};

/// Maximum non-progress diagnostic lines retained per segment.
const MAX_LOG_LINES: usize = 200;

/// Minimum interval between progress summaries in the log.
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);

const PROGRESS_MARKER: &str = "frame=";
const NOT_FOUND_MARKER: &str = "could not find";
const BUFFER_WARNING_MARKER: &str = "real-time buffer";

/// Values parsed from an ffmpeg progress line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressLine {
    /// Frames encoded so far.
    pub frame: Option<String>,
    /// Current encoding rate.
    pub fps: Option<String>,
    /// Output timestamp.
    pub time: Option<String>,
    /// Output bitrate.
    pub bitrate: Option<String>,
    /// Encoding speed relative to real time.
    pub speed: Option<String>,
    /// Duplicated frames.
    pub dup: Option<String>,
    /// Dropped frames.
    pub drop: Option<String>,
}

impl ProgressLine {
    /// Parse a line carrying the frame-count progress marker.
    pub fn parse(line: &str) -> Option<Self> {
        if !line.contains(PROGRESS_MARKER) {
            return None;
        }
        Some(Self {
            frame: extract_value(line, "frame="),
            fps: extract_value(line, "fps="),
            time: extract_value(line, "time="),
            bitrate: extract_value(line, "bitrate="),
            speed: extract_value(line, "speed="),
            dup: extract_value(line, "dup="),
            drop: extract_value(line, "drop="),
        })
    }

    fn summary(&self, segment: usize) -> String {
        let mut msg = format!(
            "Segment {} | Time: {} | FPS: {} | Bitrate: {} | Speed: {}",
            segment,
            self.time.as_deref().unwrap_or("??"),
            self.fps.as_deref().unwrap_or("??"),
            self.bitrate.as_deref().unwrap_or("N/A"),
            self.speed.as_deref().unwrap_or("??"),
        );
        if let Some(d) = &self.dup {
            msg.push_str(&format!(" | Dup: {}", d));
        }
        if let Some(d) = &self.drop {
            msg.push_str(&format!(" | Drop: {}", d));
        }
        msg
    }
}

fn extract_value(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)?;
    let after_key = &line[start + key.len()..];
    // Values may be padded: "frame=  123"
    let value_start = after_key
        .find(|c: char| !c.is_whitespace())
        .unwrap_or(after_key.len());
    let value_part = &after_key[value_start..];
    let end = value_part
        .find(char::is_whitespace)
        .unwrap_or(value_part.len());
    if end == 0 {
        None
    } else {
        Some(value_part[..end].to_string())
    }
}

/// Rolling capture of one segment's diagnostic stream.
///
/// Progress lines are kept separately so the ring of ordinary lines keeps the
/// errors visible.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticLog {
    lines: VecDeque<String>,
    last_progress: Option<String>,
    could_not_find: bool,
    buffer_warning: bool,
}

impl DiagnosticLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a line; returns the parsed progress if it carried the marker.
    pub(crate) fn record(&mut self, line: &str) -> Option<ProgressLine> {
        if let Some(progress) = ProgressLine::parse(line) {
            self.last_progress = Some(line.to_string());
            return Some(progress);
        }

        let lowered = line.to_lowercase();
        if lowered.contains(NOT_FOUND_MARKER) {
            self.could_not_find = true;
        }
        if lowered.contains(BUFFER_WARNING_MARKER) {
            self.buffer_warning = true;
        }

        self.lines.push_back(line.to_string());
        while self.lines.len() > MAX_LOG_LINES {
            self.lines.pop_front();
        }
        None
    }

    pub(crate) fn could_not_find(&self) -> bool {
        self.could_not_find
    }

    pub(crate) fn buffer_warning(&self) -> bool {
        self.buffer_warning
    }

    /// Last `count` lines, oldest first, ending with the latest progress line.
    pub(crate) fn tail(&self, count: usize) -> Vec<String> {
        let mut tail: Vec<String> = self
            .lines
            .iter()
            .skip(self.lines.len().saturating_sub(count))
            .cloned()
            .collect();
        if let Some(progress) = &self.last_progress {
            tail.push(progress.clone());
        }
        tail
    }
}

/// Splits a byte stream into lines on `\n` or `\r`.
///
/// ffmpeg rewrites its progress line in place with carriage returns.
#[derive(Debug, Default)]
pub(crate) struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &b in bytes {
            if b == b'\n' || b == b'\r' {
                if !self.pending.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.pending).trim().to_string());
                    self.pending.clear();
                }
            } else {
                self.pending.push(b);
            }
        }
        lines.retain(|l| !l.is_empty());
        lines
    }

    pub(crate) fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.pending).trim().to_string();
        (!rest.is_empty()).then_some(rest)
    }
}

/// Consume a segment's diagnostic stream until EOF.
///
/// Fires `ready` on the first progress marker.
pub(crate) async fn watch_stderr<R>(
    mut stream: R,
    log: Arc<Mutex<DiagnosticLog>>,
    gate: StartGate,
    ready: oneshot::Sender<()>,
    segment: usize,
) where
    R: AsyncRead + Unpin,
{
    let mut ready = Some(ready);
    let mut splitter = LineSplitter::new();
    let mut buf = [0u8; 4096];
    let mut last_summary: Option<Instant> = None;

    loop {
        let read = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!(segment, error = %e, "Diagnostic stream closed");
                break;
            }
        };

        for line in splitter.push(&buf[..read]) {
            handle_line(&line, &log, &gate, &mut ready, &mut last_summary, segment);
        }
    }

    if let Some(line) = splitter.finish() {
        handle_line(&line, &log, &gate, &mut ready, &mut last_summary, segment);
    }
}

fn handle_line(
    line: &str,
    log: &Arc<Mutex<DiagnosticLog>>,
    gate: &StartGate,
    ready: &mut Option<oneshot::Sender<()>>,
    last_summary: &mut Option<Instant>,
    segment: usize,
) {
    let progress = {
        // A poisoned lock still holds usable lines.
        let mut guard = log.lock().unwrap_or_else(|e| {
            error!("Diagnostic log lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        guard.record(line)
    };

    match progress {
        Some(progress) => {
            if let Some(tx) = ready.take() {
                // Live before anyone hears about it, so a quick exit is a crash.
                gate.confirm();
                let _ = tx.send(());
            }
            if last_summary.is_none_or(|t| t.elapsed() >= PROGRESS_LOG_INTERVAL) {
                info!("{}", progress.summary(segment));
                *last_summary = Some(Instant::now());
            }
        }
        None => debug!(segment, "ffmpeg: {}", line),
    }
}
