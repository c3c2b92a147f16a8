//! Decoded RGBA8 pixel buffer handed to the wallpaper facility.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

static LIVE_BUFFERS: AtomicUsize = AtomicUsize::new(0);

/// Number of [`PixelBuffer`]s currently allocated in this process.
#[must_use]
pub fn live_buffers() -> usize {
    LIVE_BUFFERS.load(Ordering::Acquire)
}

/// Alpha convention of the color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    /// RGB is independent of alpha.
    Straight,
    /// RGB has already been multiplied by alpha.
    Premultiplied,
}

/// Dense RGBA8 image, 4 bytes per pixel, row-major with no padding.
///
/// Not `Clone`: exactly one owner holds the pixels from decode until
/// [`PixelBuffer::release`].
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    alpha: AlphaMode,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 pixels. Returns `None` when `pixels` does not hold
    /// exactly `width * height` pixels or either dimension is zero.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, alpha: AlphaMode, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if pixels.len() != expected {
            return None;
        }
        LIVE_BUFFERS.fetch_add(1, Ordering::AcqRel);
        Some(Self {
            width,
            height,
            alpha,
            pixels,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub const fn alpha(&self) -> AlphaMode {
        self.alpha
    }

    /// Borrow the raw RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at `(x, y)`, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Free the pixel memory now.
    pub fn release(self) {
        trace!(width = self.width, height = self.height, "releasing pixel buffer");
        drop(self);
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        LIVE_BUFFERS.fetch_sub(1, Ordering::AcqRel);
    }
}
