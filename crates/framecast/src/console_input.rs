use crate::AppCommand;

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Forward console commands into `command_tx`.
///
/// Reads stdin on a plain thread: a blocked read must not hold up runtime
/// shutdown. The thread ends at end of input or when the receiver is gone.
pub(crate) fn spawn_console_reader(command_tx: mpsc::Sender<AppCommand>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<AppCommand>() {
                    Ok(command) => {
                        if command_tx.blocking_send(command).is_err() {
                            break;
                        }
                    }
                    Err(message) => {
                        warn!(input = %line.trim(), "Unrecognised console command");
                        eprintln!("{}", message);
                    }
                }
            }
            debug!("Console reader finished");
        })?;
    Ok(())
}
