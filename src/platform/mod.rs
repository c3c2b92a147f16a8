//! Seam to whatever actually owns the wallpaper surfaces.

pub mod desktop;

use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::placement::Placement;

/// Region of the buffer the platform should keep visible when cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Whether the facility returns once the request is accepted or only after
/// the new wallpaper is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    #[default]
    Immediate,
    Blocking,
}

/// Platform wallpaper-setting facility.
///
/// Both calls are atomic from the caller's point of view: on `Err` no surface
/// has been changed.
pub trait WallpaperFacility: Send + Sync {
    /// Whether [`WallpaperFacility::set_bitmap`] honours per-surface placement.
    fn supports_placement(&self) -> bool;

    fn set_bitmap(
        &self,
        buffer: &PixelBuffer,
        visible: Option<VisibleRegion>,
        mode: ApplyMode,
        placement: Placement,
    ) -> Result<(), Error>;

    /// Placement-agnostic submission; updates the combined surface.
    fn set_bitmap_legacy(&self, buffer: &PixelBuffer) -> Result<(), Error>;
}
