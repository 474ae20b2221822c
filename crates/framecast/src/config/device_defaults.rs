use serde::{Deserialize, Serialize};

/// Capture devices used when a recording names none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDefaults {
    /// Camera label (None = no camera unless requested).
    #[serde(default)]
    pub camera: Option<String>,
    /// Microphone label (None = record without audio).
    #[serde(default)]
    pub microphone: Option<String>,
}
