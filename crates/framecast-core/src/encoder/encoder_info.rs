use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Encoder implementations the command builder knows flag sets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderBackend {
    /// NVIDIA NVENC.
    Nvenc,
    /// AMD AMF.
    Amf,
    /// Intel Quick Sync.
    Qsv,
    /// Software x264.
    X264,
}

impl EncoderBackend {
    /// Hardware candidates in probe priority order.
    pub const HARDWARE_PRIORITY: [EncoderBackend; 3] =
        [EncoderBackend::Nvenc, EncoderBackend::Amf, EncoderBackend::Qsv];

    /// Codec name passed to `-c:v`.
    pub fn as_ffmpeg_codec(&self) -> &'static str {
        match self {
            EncoderBackend::Nvenc => "h264_nvenc",
            EncoderBackend::Amf => "h264_amf",
            EncoderBackend::Qsv => "h264_qsv",
            EncoderBackend::X264 => "libx264",
        }
    }

    /// Whether the backend runs on a GPU or media engine.
    pub fn kind(&self) -> EncoderKind {
        match self {
            EncoderBackend::X264 => EncoderKind::Software,
            _ => EncoderKind::Hardware,
        }
    }
}

impl fmt::Display for EncoderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncoderBackend::Nvenc => "nvenc",
            EncoderBackend::Amf => "amf",
            EncoderBackend::Qsv => "qsv",
            EncoderBackend::X264 => "x264",
        };
        f.write_str(name)
    }
}

impl FromStr for EncoderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nvenc" | "h264_nvenc" => Ok(EncoderBackend::Nvenc),
            "amf" | "h264_amf" => Ok(EncoderBackend::Amf),
            "qsv" | "h264_qsv" => Ok(EncoderBackend::Qsv),
            "x264" | "libx264" => Ok(EncoderBackend::X264),
            other => Err(format!("unknown encoder '{}'", other)),
        }
    }
}

/// Hardware or software encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    /// GPU or dedicated media engine.
    Hardware,
    /// CPU.
    Software,
}

/// The encoder selected for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncoderInfo {
    /// Backend whose flag set is used.
    pub backend: EncoderBackend,
    /// Hardware or software.
    pub kind: EncoderKind,
}

impl EncoderInfo {
    /// Info for `backend` with its natural kind.
    pub fn new(backend: EncoderBackend) -> Self {
        Self {
            backend,
            kind: backend.kind(),
        }
    }

    /// The software fallback, which cannot fail.
    pub fn software() -> Self {
        Self::new(EncoderBackend::X264)
    }

    /// Codec name passed to `-c:v`.
    pub fn codec(&self) -> &'static str {
        self.backend.as_ffmpeg_codec()
    }
}

impl fmt::Display for EncoderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            EncoderKind::Hardware => "hardware",
            EncoderKind::Software => "software",
        };
        write!(f, "{} ({}, {})", self.backend, self.codec(), kind)
    }
}
