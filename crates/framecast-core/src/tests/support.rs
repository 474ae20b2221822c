//! Scripted stand-in for the ffmpeg executable.
//!
//! The script is run through `/bin/sh`, records every invocation and answers
//! device listings, encoder trials, concatenations and overlay passes. Any
//! other invocation is treated as a recording segment.

use crate::FfmpegBinary;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// How a recording segment behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recording {
    /// Prints a progress line, then records until asked to quit.
    Progress,
    /// Records without ever printing progress.
    Silent,
    /// Reports a missing device and hangs.
    MissingDevice,
    /// Prints progress, then dies with exit code 3.
    Crash,
    /// Prints progress and dies with exit code 3 straight away.
    CrashAfterProgress,
    /// Exits with code 1 before producing anything.
    ExitAtStartup,
}

pub(crate) const DSHOW_LISTING: &str = r#"[dshow @ 000001] DirectShow video devices (some may be both video and audio devices)
[dshow @ 000001]  "Integrated Camera"
[dshow @ 000001]     Alternative name "@device_pnp_\\?\usb#vid_04f2&pid_b6d9"
[dshow @ 000001]  "Logi Webcam (R)"
[dshow @ 000001]     Alternative name "@device_pnp_\\?\usb#vid_046d&pid_0825"
[dshow @ 000001] DirectShow audio devices
[dshow @ 000001]  "Microphone Array (Realtek(R) Audio)"
[dshow @ 000001]     Alternative name "@device_cm_{33D9A762}\wave_{A1B2}"
[dshow @ 000001]  "Headset Microphone (Jabra EVOLVE 20)"
dummy: Immediate exit requested"#;

const PROGRESS_LINE: &str =
    "frame=   12 fps= 30 q=23.0 size=     256kB time=00:00:00.40 bitrate=5242.9kbits/s speed=1.01x";

pub(crate) struct FakeFfmpegBuilder {
    recording: Recording,
    listing: String,
    hardware: Vec<&'static str>,
    concat_ok: bool,
    overlay_ok: bool,
}

impl FakeFfmpegBuilder {
    pub(crate) fn recording(mut self, recording: Recording) -> Self {
        self.recording = recording;
        self
    }

    pub(crate) fn listing(mut self, listing: &str) -> Self {
        self.listing = listing.to_string();
        self
    }

    /// Hardware codecs whose trial encode succeeds.
    pub(crate) fn hardware(mut self, codecs: &[&'static str]) -> Self {
        self.hardware = codecs.to_vec();
        self
    }

    pub(crate) fn failing_concat(mut self) -> Self {
        self.concat_ok = false;
        self
    }

    pub(crate) fn failing_overlay(mut self) -> Self {
        self.overlay_ok = false;
        self
    }

    pub(crate) fn build(self) -> FakeFfmpeg {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("ffmpeg.sh");
        let log = dir.path().join("invocations.log");
        std::fs::write(&script, self.script(&log)).unwrap();
        FakeFfmpeg { dir, script, log }
    }

    fn script(&self, log: &Path) -> String {
        let recording = match self.recording {
            Recording::Progress => format!(
                "echo segment > \"$last\"\necho \"{}\" >&2\nread -r answer\nexit 0",
                PROGRESS_LINE
            ),
            Recording::Silent => "echo segment > \"$last\"\nread -r answer\nexit 0".to_string(),
            Recording::MissingDevice => concat!(
                "echo \"[dshow @ 000001] Could not find video device with name [Ghost Cam] ",
                "among source devices of type video.\" >&2\n",
                "exec sleep 30"
            )
            .to_string(),
            Recording::Crash => format!(
                "echo segment > \"$last\"\necho \"{}\" >&2\nsleep 1\necho \"Conversion failed!\" >&2\nexit 3",
                PROGRESS_LINE
            ),
            Recording::CrashAfterProgress => format!(
                "echo segment > \"$last\"\necho \"{}\" >&2\nexit 3",
                PROGRESS_LINE
            ),
            Recording::ExitAtStartup => {
                "echo \"Error opening input: Invalid argument\" >&2\nexit 1".to_string()
            }
        };

        let concat = if self.concat_ok {
            "echo joined > \"$last\"; exit 0"
        } else {
            "echo \"[concat @ 000001] Impossible to open segment\" >&2; exit 1"
        };
        let overlay = if self.overlay_ok {
            "echo composed > \"$last\"; exit 0"
        } else {
            "echo partial > \"$last\"; echo \"Error while filtering\" >&2; exit 1"
        };

        let mut codecs = self.hardware.join(" ");
        codecs.push_str(" libx264");

        format!(
            r#"#!/bin/sh
echo "$*" >> "{log}"
for last; do :; done
case "$*" in
  *-list_devices*)
    cat >&2 <<'LISTING'
{listing}
LISTING
    exit 1
    ;;
  *lavfi*)
    for codec in {codecs}; do
      case "$*" in
        *"-c:v $codec "*) exit 0 ;;
      esac
    done
    echo "Unknown encoder" >&2
    exit 1
    ;;
  *"-f concat"*)
    {concat}
    ;;
  *"0:a?"*)
    {overlay}
    ;;
esac
{recording}
"#,
            log = log.display(),
            listing = self.listing,
            codecs = codecs.trim(),
            concat = concat,
            overlay = overlay,
            recording = recording,
        )
    }
}

pub(crate) struct FakeFfmpeg {
    dir: TempDir,
    script: PathBuf,
    log: PathBuf,
}

impl FakeFfmpeg {
    pub(crate) fn builder() -> FakeFfmpegBuilder {
        FakeFfmpegBuilder {
            recording: Recording::Progress,
            listing: DSHOW_LISTING.to_string(),
            hardware: Vec::new(),
            concat_ok: true,
            overlay_ok: true,
        }
    }

    pub(crate) fn binary(&self) -> FfmpegBinary {
        FfmpegBinary::wrapped("/bin/sh", [self.script.clone()])
    }

    pub(crate) fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn count(&self, needle: &str) -> usize {
        self.invocations()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    pub(crate) fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Files in `dir` with the given extension.
pub(crate) fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    files
}
