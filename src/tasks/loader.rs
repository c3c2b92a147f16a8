use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::placement::Placement;
use crate::platform::{ApplyMode, WallpaperFacility};
use crate::processing::decode;
use crate::processing::sample::{MAX_WALLPAPER_DIM, sample_size};

/// Decodes an image file and submits it to a [`WallpaperFacility`].
///
/// Holds no per-request state; each call probes, decodes, submits and
/// releases its own buffer.
#[derive(Clone)]
pub struct WallpaperLoader {
    facility: Arc<dyn WallpaperFacility>,
    max_dimension: u32,
}

impl WallpaperLoader {
    pub fn new(facility: Arc<dyn WallpaperFacility>) -> Self {
        Self {
            facility,
            max_dimension: MAX_WALLPAPER_DIM,
        }
    }

    /// Override the downsampling bound. Zero is treated as 1.
    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    #[must_use]
    pub const fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Set the wallpaper from `path`. Returns `true` only when the facility
    /// accepted the decoded image.
    ///
    /// Never panics: decode errors, facility errors and panics inside either
    /// all come back as `false`.
    pub fn set_wallpaper_from_image(&self, path: &Path, placement: Placement) -> bool {
        let attempt = AssertUnwindSafe(|| self.try_set_wallpaper(path, placement));
        let outcome = panic::catch_unwind(attempt)
            .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload.as_ref()))));
        match outcome {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    %placement,
                    flags = placement.flags(),
                    "wallpaper updated"
                );
                true
            }
            Err(err) => {
                warn!(path = %path.display(), %placement, "wallpaper not set: {err}");
                false
            }
        }
    }

    /// Fallible form of [`WallpaperLoader::set_wallpaper_from_image`].
    pub fn try_set_wallpaper(&self, path: &Path, placement: Placement) -> Result<(), Error> {
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }

        let probe = decode::probe(path)?;
        let sample = sample_size(probe.width, probe.height, self.max_dimension);
        debug!(
            width = probe.width,
            height = probe.height,
            sample,
            format = ?probe.format,
            "probed {}",
            path.display()
        );

        let buffer = decode::decode_sampled(&probe, sample)?;
        debug!(
            width = buffer.width(),
            height = buffer.height(),
            "decoded {}",
            path.display()
        );

        let submitted = self.submit(&buffer, placement);
        buffer.release();
        submitted
    }

    fn submit(&self, buffer: &PixelBuffer, placement: Placement) -> Result<(), Error> {
        if self.facility.supports_placement() {
            self.facility
                .set_bitmap(buffer, None, ApplyMode::Immediate, placement)
        } else {
            debug!(%placement, "facility has no placement support, using legacy submission");
            self.facility.set_bitmap_legacy(buffer)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
