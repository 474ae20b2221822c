use crate::{AppCommand, AppResult};

use std::path::PathBuf;

use framecast_core::{SessionController, SessionEvent};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, instrument, warn};

/// Interactive recording session.
///
/// Owns the controller once the first segment is running and applies
/// console commands until a stop is requested, Ctrl-C arrives or the encoder
/// crashes. The recording is finalized in every case.
pub struct App {
    pub(crate) controller: SessionController,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) events: broadcast::Receiver<SessionEvent>,
}

impl App {
    /// Run until the recording ends; returns the final file.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<PathBuf> {
        println!("Recording. Commands: p = pause, r = resume, s = stop, ? = status");

        loop {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    if self.handle_command(command).await {
                        break;
                    }
                }

                event = self.events.recv() => {
                    match event {
                        Ok(SessionEvent::Crashed { segment, exit_code, last_lines }) => {
                            error!(segment, exit_code = ?exit_code, "Encoder crashed while recording");
                            eprintln!("Encoder stopped unexpectedly (segment {}, exit code {:?})", segment, exit_code);
                            for line in last_lines {
                                eprintln!("  {}", line);
                            }
                            break;
                        }
                        Ok(event) => report_event(&event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "Session events dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Session event channel closed");
                            break;
                        }
                    }
                }

                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for Ctrl-C");
                    }
                    info!("Ctrl-C received, stopping");
                    break;
                }
            }
        }

        println!("Finalizing...");
        let output = self.controller.stop().await?;
        println!("Saved {}", output.display());
        Ok(output)
    }

    /// Apply one console command; returns true when the session should end.
    async fn handle_command(&mut self, command: AppCommand) -> bool {
        let result = match command {
            AppCommand::Pause => self.controller.pause().await,
            AppCommand::Resume => self.controller.resume().await,
            AppCommand::Status => {
                println!(
                    "{} ({} segment(s))",
                    self.controller.state(),
                    self.controller.segments().len()
                );
                Ok(())
            }
            AppCommand::Stop => return true,
        };

        match result {
            Ok(()) => {
                if command != AppCommand::Status {
                    println!("{}", self.controller.state());
                }
            }
            Err(e) => {
                error!(%command, error = %e, "Command failed");
                eprintln!("{} failed: {}", command, e);
            }
        }

        false
    }
}

fn report_event(event: &SessionEvent) {
    match event {
        SessionEvent::SegmentStarted {
            index, confirmed, ..
        } => {
            if !confirmed {
                warn!(segment = index, "Segment start presumed without progress output");
            }
        }
        SessionEvent::SegmentClosed {
            index, exit_code, ..
        } => {
            info!(segment = index, exit_code = ?exit_code, "Segment closed");
        }
        SessionEvent::Crashed { .. } | SessionEvent::Finalized { .. } => {}
    }
}
