use crate::{CompositeLayers, CoreResult, RasterImage, RecorderError, session::discard_file};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use image::ExtendedColorType;
use tracing::{debug, instrument};
use uuid::Uuid;

/// PNG files holding a session's background and foreground rasters.
///
/// Owned by the active session and removed when it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerFiles {
    background: Option<PathBuf>,
    foreground: Option<PathBuf>,
}

impl LayerFiles {
    /// Refer to existing image files.
    pub fn new(background: Option<PathBuf>, foreground: Option<PathBuf>) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Write the rasters of `layers` into `dir` as PNG files.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Image`] if encoding or writing fails. Files
    /// written before the failure are removed.
    #[instrument(skip(layers))]
    pub async fn persist(layers: &CompositeLayers, dir: &Path) -> CoreResult<Self> {
        let background = write_png(layers.background.clone(), dir, "bg").await?;
        let foreground = match layers.foreground.clone() {
            Some(image) => match write_png(image, dir, "fg").await {
                Ok(path) => Some(path),
                Err(e) => {
                    discard_file(&background);
                    return Err(e);
                }
            },
            None => None,
        };

        Ok(Self {
            background: Some(background),
            foreground,
        })
    }

    /// Background image, if any.
    pub fn background(&self) -> Option<&Path> {
        self.background.as_deref()
    }

    /// Foreground image, if any.
    pub fn foreground(&self) -> Option<&Path> {
        self.foreground.as_deref()
    }

    /// Delete both files, ignoring failures.
    pub fn cleanup(&mut self) {
        for path in [self.background.take(), self.foreground.take()]
            .into_iter()
            .flatten()
        {
            discard_file(&path);
        }
    }
}

async fn write_png(image: RasterImage, dir: &Path, role: &str) -> CoreResult<PathBuf> {
    let path = dir.join(format!("framecast_{}_{}.png", role, Uuid::new_v4()));
    let target = path.clone();
    let size = image.size();

    let written = tokio::task::spawn_blocking(move || {
        image::save_buffer(
            &target,
            image.rgba(),
            size.width,
            size.height,
            ExtendedColorType::Rgba8,
        )
    })
    .await;

    match written {
        Ok(Ok(())) => {
            debug!(path = ?path, %size, "Layer image written");
            Ok(path)
        }
        Ok(Err(e)) => {
            discard_file(&path);
            Err(RecorderError::Image {
                reason: format!("Failed to write {:?}: {}", path, e),
                location: ErrorLocation::from(Location::caller()),
            })
        }
        Err(e) => Err(RecorderError::Image {
            reason: format!("Layer writer task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
