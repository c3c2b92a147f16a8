use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ExtendedColorType;
use tracing::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::placement::Placement;
use crate::platform::{ApplyMode, VisibleRegion, WallpaperFacility};

const STAGED_PREFIX: &str = "wallpaper-";

/// Desktop-session facility backed by the `wallpaper` crate.
///
/// Desktops expose one surface and take wallpapers by path, so the buffer is
/// staged as a PNG first. Each update gets a fresh file name; some desktop
/// environments ignore a change when the path stays the same.
#[derive(Debug)]
pub struct DesktopWallpaper {
    staging_dir: PathBuf,
    serial: AtomicU64,
}

impl DesktopWallpaper {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            serial: AtomicU64::new(0),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn stage(&self, buffer: &PixelBuffer) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.staging_dir)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let serial = self.serial.fetch_add(1, Ordering::Relaxed);
        let path = self
            .staging_dir
            .join(format!("{STAGED_PREFIX}{stamp}-{serial}.png"));
        image::save_buffer(
            &path,
            buffer.as_bytes(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| Error::Platform(format!("staging {}: {err}", path.display())))?;
        Ok(path)
    }

    fn remove_stale(&self, keep: &Path) {
        let Ok(entries) = fs::read_dir(&self.staging_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let staged = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(STAGED_PREFIX));
            if staged && path != keep {
                if let Err(err) = fs::remove_file(&path) {
                    warn!("failed to remove stale wallpaper {}: {err}", path.display());
                }
            }
        }
    }

    fn apply(&self, buffer: &PixelBuffer) -> Result<(), Error> {
        let staged = self.stage(buffer)?;
        let staged_str = staged
            .to_str()
            .ok_or_else(|| Error::Platform(format!("non UTF-8 path {}", staged.display())))?;
        debug!(path = %staged.display(), "handing staged wallpaper to desktop");
        if let Err(err) = wallpaper::set_from_path(staged_str) {
            let _ = fs::remove_file(&staged);
            return Err(Error::Platform(err.to_string()));
        }
        self.remove_stale(&staged);
        Ok(())
    }
}

impl WallpaperFacility for DesktopWallpaper {
    fn supports_placement(&self) -> bool {
        false
    }

    fn set_bitmap(
        &self,
        buffer: &PixelBuffer,
        _visible: Option<VisibleRegion>,
        _mode: ApplyMode,
        _placement: Placement,
    ) -> Result<(), Error> {
        self.apply(buffer)
    }

    fn set_bitmap_legacy(&self, buffer: &PixelBuffer) -> Result<(), Error> {
        self.apply(buffer)
    }
}
