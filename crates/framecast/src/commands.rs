//! Handlers behind each subcommand.

use crate::{
    App, AppResult,
    cli::{OverlayArgs, RecordArgs},
    config::Config,
    console_input::spawn_console_reader,
    session_file::SessionFile,
};

use std::path::{Path, PathBuf};

use framecast_core::{
    DeviceCatalog, DeviceKind, EncoderInfo, EncoderPreference, EncoderProbe, PostProcessor,
    SessionController,
};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Print the capture devices ffmpeg reports.
#[instrument(skip(config))]
pub(crate) async fn list_devices(config: &Config) -> AppResult<()> {
    let catalog = DeviceCatalog::new(
        config.ffmpeg.binary(),
        config.tuning.controller_settings().probe_timeout,
    );
    let devices = catalog.list_devices().await;

    if devices.is_empty() {
        warn!("Device listing returned nothing");
        println!("No capture devices found. Is {:?} installed?", config.ffmpeg.program);
        return Ok(());
    }

    for kind in [DeviceKind::Video, DeviceKind::Audio] {
        println!("{} devices:", kind);
        for name in devices.names(kind) {
            println!("  {}", name);
        }
    }
    Ok(())
}

/// Print the encoder recordings would use.
#[instrument(skip(config))]
pub(crate) async fn show_encoder(config: &Config) -> AppResult<()> {
    let encoder = select_encoder(config).await;
    match config.tuning.encoder {
        EncoderPreference::Auto => println!("{} (probed)", encoder),
        EncoderPreference::Forced(_) => println!("{} (forced by configuration)", encoder),
    }
    Ok(())
}

/// Print where the configuration lives and what it contains.
pub(crate) fn show_config(config: &Config, path: &Path) -> AppResult<()> {
    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Run the overlay pass.
#[instrument(skip(config))]
pub(crate) async fn overlay(config: &Config, args: &OverlayArgs) -> AppResult<PathBuf> {
    let encoder = select_encoder(config).await;
    let processor = PostProcessor::new(
        config.ffmpeg.binary(),
        encoder,
        config.tuning.controller_settings().post_process_timeout,
    );

    let output = processor
        .overlay(&args.screen, &args.clip, &args.output_path(), args.geometry())
        .await?;
    println!("Saved {}", output.display());
    Ok(output)
}

/// Record interactively until stopped.
#[instrument(skip(config))]
pub(crate) async fn record(config: &Config, args: &RecordArgs) -> AppResult<PathBuf> {
    let recording = match &args.session {
        Some(path) => {
            let base_dir = path.parent().unwrap_or(Path::new("."));
            let mut recording = SessionFile::load(path)?.into_recording_config(base_dir)?;
            if let Some(folder) = &args.output {
                recording.output.folder = folder.clone();
            }
            recording
        }
        None => args.recording_config(config)?,
    };

    let mut controller =
        SessionController::new(config.ffmpeg.binary(), config.tuning.controller_settings());
    let events = controller.subscribe();

    let output = controller.start(recording).await?;
    info!(output = ?output, "Recording to file");
    println!("Recording to {}", output.display());

    let (command_tx, command_rx) = mpsc::channel(16);
    spawn_console_reader(command_tx)?;

    let app = App {
        controller,
        command_rx,
        events,
    };
    app.run().await
}

async fn select_encoder(config: &Config) -> EncoderInfo {
    match config.tuning.encoder {
        EncoderPreference::Forced(backend) => EncoderInfo::new(backend),
        EncoderPreference::Auto => {
            EncoderProbe::new(
                config.ffmpeg.binary(),
                config.tuning.controller_settings().probe_timeout,
            )
            .detect()
            .await
        }
    }
}
