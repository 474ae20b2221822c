use crate::{CoreResult, Rect, RecorderError, Size};

use std::{fmt, panic::Location, path::Path};

use error_location::ErrorLocation;

/// Decoded RGBA pixels supplied by the compositing canvas.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl RasterImage {
    /// Wrap decoded RGBA pixels.
    ///
    /// # Errors
    ///
    /// Returns error if the buffer length does not match `width * height * 4`.
    #[track_caller]
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> CoreResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(RecorderError::Image {
                reason: format!(
                    "expected {} bytes for {}x{} RGBA, got {}",
                    expected,
                    width,
                    height,
                    rgba.len()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Decode an image file into RGBA pixels.
    #[track_caller]
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let decoded = image::open(path).map_err(|e| RecorderError::Image {
            reason: format!("Failed to decode {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// Image dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Raw RGBA bytes.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Pre-rendered layers for the background composite.
///
/// The background defines the output canvas; the live screen is scaled into
/// `content_area`, and the optional foreground is drawn on top of everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLayers {
    /// Static background; its size is the output canvas size.
    pub background: RasterImage,
    /// Optional decoration drawn above the composite.
    pub foreground: Option<RasterImage>,
    /// Area of the background reserved for the screen capture.
    pub content_area: Rect,
}

impl CompositeLayers {
    /// Output canvas size, rounded down to even dimensions.
    pub fn canvas(&self) -> Size {
        self.background.size().even()
    }
}
