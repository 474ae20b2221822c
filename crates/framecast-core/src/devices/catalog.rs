use crate::{
    DeviceList, FfmpegBinary,
    devices::{listing_args, parse_device_listing},
    ffmpeg::run_to_completion,
};

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Enumerates capture devices through ffmpeg and caches the result.
///
/// A listing that could not run or found nothing yields empty lists and is
/// not cached, so a later call retries.
#[derive(Debug)]
pub struct DeviceCatalog {
    binary: FfmpegBinary,
    timeout: Duration,
    cache: Mutex<Option<DeviceList>>,
}

impl DeviceCatalog {
    /// Empty catalog that lists on first use.
    pub fn new(binary: FfmpegBinary, timeout: Duration) -> Self {
        Self {
            binary,
            timeout,
            cache: Mutex::new(None),
        }
    }

    /// Catalog pre-seeded with `devices`; the listing is never run.
    pub fn with_devices(binary: FfmpegBinary, timeout: Duration, devices: DeviceList) -> Self {
        Self {
            binary,
            timeout,
            cache: Mutex::new(Some(devices)),
        }
    }

    /// Drop the cached listing.
    pub async fn invalidate(&self) {
        if self.cache.lock().await.take().is_some() {
            debug!("Device cache invalidated");
        }
    }

    /// Video and audio devices, listing them on first call.
    #[instrument(skip(self))]
    pub async fn list_devices(&self) -> DeviceList {
        let mut cache = self.cache.lock().await;
        if let Some(devices) = cache.as_ref() {
            return devices.clone();
        }

        // ffmpeg exits non-zero after listing because "dummy" is not a device.
        match run_to_completion(&self.binary, &listing_args(), "device listing", self.timeout).await {
            Ok(output) => {
                let devices = parse_device_listing(&output.stderr);
                if devices.is_empty() {
                    warn!(code = ?output.code, "Device listing reported no devices");
                    return devices;
                }
                info!(
                    video = devices.video.len(),
                    audio = devices.audio.len(),
                    "Capture devices listed"
                );
                *cache = Some(devices.clone());
                devices
            }
            Err(e) => {
                warn!(error = %e, "Device listing failed");
                DeviceList::default()
            }
        }
    }
}
