mod device_defaults;
#[allow(clippy::module_inception)]
mod config;
mod ffmpeg_config;
mod output_defaults;
mod tuning_config;

pub(crate) use {
    config::Config, device_defaults::DeviceDefaults, ffmpeg_config::FfmpegConfig,
    output_defaults::OutputDefaults, tuning_config::TuningConfig,
};

pub(crate) const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";
pub(crate) const DEFAULT_FPS: u32 = 30;

pub(crate) fn default_ffmpeg_program() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_FFMPEG_PROGRAM)
}

pub(crate) fn default_fps() -> u32 {
    DEFAULT_FPS
}
