use std::path::PathBuf;

use tokio::sync::oneshot;

use crate::placement::Placement;

/// Typed request accepted by the wallpaper worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperRequest {
    pub path: PathBuf,
    pub placement: Placement,
}

impl WallpaperRequest {
    pub fn new(path: impl Into<PathBuf>, placement: Placement) -> Self {
        Self {
            path: path.into(),
            placement,
        }
    }
}

/// Message queued on the worker: a request plus where to send its outcome.
#[derive(Debug)]
pub struct SetWallpaper {
    pub request: WallpaperRequest,
    pub reply: oneshot::Sender<bool>,
}
