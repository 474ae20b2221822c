use crate::config::default_ffmpeg_program;

use std::path::PathBuf;

use framecast_core::FfmpegBinary;
use serde::{Deserialize, Serialize};

/// Location of the encoder executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Program to run; a bare name is looked up on `PATH`.
    #[serde(default = "default_ffmpeg_program")]
    pub program: PathBuf,
    /// Arguments placed before the generated ones, for launchers and wrappers.
    #[serde(default)]
    pub leading_args: Vec<String>,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            program: default_ffmpeg_program(),
            leading_args: Vec::new(),
        }
    }
}

impl FfmpegConfig {
    /// Binary description handed to the recorder.
    pub fn binary(&self) -> FfmpegBinary {
        if self.leading_args.is_empty() {
            FfmpegBinary::new(&self.program)
        } else {
            FfmpegBinary::wrapped(&self.program, self.leading_args.iter())
        }
    }
}
