use std::path::PathBuf;

use thiserror::Error;

/// Library error type for wallpaper operations.
///
/// Callers of [`crate::WallpaperLoader::set_wallpaper_from_image`] only ever
/// see a boolean; the variants exist so failures stay distinguishable in logs.
#[derive(Debug, Error)]
pub enum Error {
    /// The request carried an empty path.
    #[error("image path is empty")]
    EmptyPath,

    /// The image file does not exist.
    #[error("image file not found: {0}")]
    MissingFile(PathBuf),

    /// The header or pixel data could not be decoded.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The header parsed but reported a zero width or height.
    #[error("image {0} reports zero dimensions")]
    EmptyImage(PathBuf),

    /// The decoder returned a buffer that does not match its own dimensions.
    #[error("decoder produced no usable pixels for {0}")]
    NoPixels(PathBuf),

    /// Scaled JPEG decode failed.
    #[error(transparent)]
    Jpeg(#[from] jpeg_decoder::Error),

    /// Streaming PNG decode failed.
    #[error(transparent)]
    Png(#[from] png::DecodingError),

    /// The decoder recognised the file but cannot handle this variant.
    #[error("unsupported image: {0}")]
    Unsupported(String),

    /// Downsampling the decoded pixels failed.
    #[error("resize failed: {0}")]
    Resize(String),

    /// The platform wallpaper facility rejected the buffer.
    #[error("wallpaper facility failed: {0}")]
    Platform(String),

    /// A panic was caught while handling a request.
    #[error("unexpected fault: {0}")]
    Panicked(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
