use std::fmt;

use serde::{Deserialize, Serialize};

/// Video or audio capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Camera or other video source.
    Video,
    /// Microphone or other audio source.
    Audio,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Video => f.write_str("video"),
            DeviceKind::Audio => f.write_str("audio"),
        }
    }
}

/// Device names in the order the platform reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    /// Video device names.
    pub video: Vec<String>,
    /// Audio device names.
    pub audio: Vec<String>,
}

impl DeviceList {
    /// Names of the given kind.
    pub fn names(&self, kind: DeviceKind) -> &[String] {
        match kind {
            DeviceKind::Video => &self.video,
            DeviceKind::Audio => &self.audio,
        }
    }

    /// No devices of either kind.
    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }

    fn push(&mut self, kind: DeviceKind, name: String) {
        let names = match kind {
            DeviceKind::Video => &mut self.video,
            DeviceKind::Audio => &mut self.audio,
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
}

/// Arguments that make ffmpeg print the DirectShow device listing.
pub(crate) fn listing_args() -> Vec<String> {
    ["-hide_banner", "-list_devices", "true", "-f", "dshow", "-i", "dummy"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parse the device listing ffmpeg prints on its diagnostic stream.
///
/// Understands both the sectioned layout ("DirectShow video devices" header
/// followed by quoted names) and the per-line layout where each quoted name
/// carries a `(video)` or `(audio)` suffix. Alternative-name lines are skipped.
pub fn parse_device_listing(text: &str) -> DeviceList {
    let mut list = DeviceList::default();
    let mut section: Option<DeviceKind> = None;

    for line in text.lines() {
        let lowered = line.to_lowercase();

        if lowered.contains("alternative name") {
            continue;
        }
        if lowered.contains("video devices") {
            section = Some(DeviceKind::Video);
            continue;
        }
        if lowered.contains("audio devices") {
            section = Some(DeviceKind::Audio);
            continue;
        }

        let Some(name) = quoted_name(line) else {
            continue;
        };

        let rest = &lowered[lowered.rfind('"').unwrap_or(0)..];
        let kind = if rest.contains("(none)") {
            None
        } else if rest.contains("(video)") {
            Some(DeviceKind::Video)
        } else if rest.contains("(audio)") {
            Some(DeviceKind::Audio)
        } else {
            section
        };

        if let Some(kind) = kind {
            list.push(kind, name.to_string());
        }
    }

    list
}

fn quoted_name(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let len = line[start..].find('"')?;
    let name = &line[start..start + len];
    (!name.trim().is_empty()).then_some(name)
}
