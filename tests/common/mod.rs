#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage};
use wallpaper_loader::Placement;
use wallpaper_loader::buffer::{AlphaMode, PixelBuffer};
use wallpaper_loader::error::Error;
use wallpaper_loader::platform::{ApplyMode, VisibleRegion, WallpaperFacility};

/// One accepted submission.
#[derive(Debug, Clone)]
pub struct Call {
    /// `None` for the legacy overload.
    pub placement: Option<Placement>,
    pub dimensions: (u32, u32),
    pub alpha: AlphaMode,
    pub first_pixel: [u8; 4],
    pub started: Instant,
    pub finished: Instant,
}

/// Fake facility that records every call and can be told to fail or stall.
#[derive(Default)]
pub struct RecordingFacility {
    pub placement_aware: bool,
    pub hold: Duration,
    pub fail: bool,
    pub panic: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingFacility {
    pub fn placement_aware() -> Self {
        Self {
            placement_aware: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, buffer: &PixelBuffer, placement: Option<Placement>) -> Result<(), Error> {
        let started = Instant::now();
        if self.panic {
            panic!("facility exploded");
        }
        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
        if self.fail {
            return Err(Error::Platform("permission denied".into()));
        }
        self.calls.lock().unwrap().push(Call {
            placement,
            dimensions: buffer.dimensions(),
            alpha: buffer.alpha(),
            first_pixel: buffer.pixel(0, 0).unwrap(),
            started,
            finished: Instant::now(),
        });
        Ok(())
    }
}

impl WallpaperFacility for RecordingFacility {
    fn supports_placement(&self) -> bool {
        self.placement_aware
    }

    fn set_bitmap(
        &self,
        buffer: &PixelBuffer,
        visible: Option<VisibleRegion>,
        mode: ApplyMode,
        placement: Placement,
    ) -> Result<(), Error> {
        assert!(visible.is_none(), "loader must not pass a crop hint");
        assert_eq!(mode, ApplyMode::Immediate);
        self.record(buffer, Some(placement))
    }

    fn set_bitmap_legacy(&self, buffer: &PixelBuffer) -> Result<(), Error> {
        self.record(buffer, None)
    }
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(&path)
        .unwrap();
    path
}
