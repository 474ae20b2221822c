use crate::Rect;

use serde::{Deserialize, Serialize};

/// Whether the screen source is a whole display or a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenSourceKind {
    /// A display, optionally constrained to its physical bounds.
    #[default]
    Display,
    /// A single window captured by title.
    Window,
}

/// Screen source chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSource {
    /// Logical identifier from the capture-request layer.
    #[serde(default)]
    pub id: String,
    /// Display or window.
    #[serde(default)]
    pub kind: ScreenSourceKind,
    /// Window title used for window capture. Falls back to `id`.
    #[serde(default)]
    pub title: Option<String>,
    /// Physical bounds of the display on the virtual desktop.
    #[serde(default)]
    pub bounds: Option<Rect>,
}

impl ScreenSource {
    /// The whole virtual desktop.
    pub fn desktop() -> Self {
        Self {
            id: "desktop".to_string(),
            kind: ScreenSourceKind::Display,
            title: None,
            bounds: None,
        }
    }

    /// A single display occupying `bounds` on the virtual desktop.
    pub fn display(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            kind: ScreenSourceKind::Display,
            title: None,
            bounds: Some(bounds),
        }
    }

    /// A window captured by its title.
    pub fn window(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: title.clone(),
            kind: ScreenSourceKind::Window,
            title: Some(title),
            bounds: None,
        }
    }

    /// Title passed to window capture.
    pub fn window_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}
