mod common;

use std::sync::Arc;

use common::{RecordingFacility, write_png};
use tempfile::tempdir;
use wallpaper_loader::buffer::live_buffers;
use wallpaper_loader::{Placement, WallpaperLoader};

// Kept alone in its own test binary: the live-buffer counter is process-wide.
#[test]
fn buffers_are_released_after_every_outcome() {
    let tmp = tempdir().unwrap();
    let path = write_png(tmp.path(), "tiny.png", 2, 2, [255, 255, 255, 255]);

    let ok = Arc::new(RecordingFacility::placement_aware());
    let ok_loader = WallpaperLoader::new(ok.clone());
    let failing_loader = WallpaperLoader::new(Arc::new(RecordingFacility {
        fail: true,
        ..RecordingFacility::default()
    }));
    let panicking_loader = WallpaperLoader::new(Arc::new(RecordingFacility {
        panic: true,
        ..RecordingFacility::default()
    }));

    for _ in 0..50 {
        assert!(ok_loader.set_wallpaper_from_image(&path, Placement::Both));
        assert_eq!(live_buffers(), 0);
        assert!(!failing_loader.set_wallpaper_from_image(&path, Placement::Both));
        assert_eq!(live_buffers(), 0);
        assert!(!panicking_loader.set_wallpaper_from_image(&path, Placement::Both));
        assert_eq!(live_buffers(), 0);
    }
    assert_eq!(ok.calls().len(), 50);
}
