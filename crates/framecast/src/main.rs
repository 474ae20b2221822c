//! Framecast: screen and camera recording through ffmpeg.

mod app;
mod app_command;
mod cli;
mod commands;
mod config;
mod console_input;
mod error;
mod logging;
mod session_file;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
};

use crate::{
    cli::{Cli, Command},
    config::Config,
};

use clap::Parser;
use tracing::error;

/// Application entry point.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_dir = Config::log_dir().ok();
    let log_guard = logging::init_tracing(log_dir.as_deref());

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = ?e, "framecast failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    // exit() skips destructors; flush the file writer first.
    drop(log_guard);
    std::process::exit(code);
}

async fn run(cli: Cli) -> AppResult<()> {
    let (config, config_path) = match &cli.config {
        Some(path) => (Config::load_from(path)?, path.clone()),
        None => (Config::load()?, Config::config_path()?),
    };

    match &cli.command {
        Command::Devices => commands::list_devices(&config).await,
        Command::Encoder => commands::show_encoder(&config).await,
        Command::Record(args) => commands::record(&config, args).await.map(|_| ()),
        Command::Overlay(args) => commands::overlay(&config, args).await.map(|_| ()),
        Command::Config => commands::show_config(&config, &config_path),
    }
}
