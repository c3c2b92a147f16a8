mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{RecordingFacility, write_png};
use tempfile::tempdir;
use wallpaper_loader::{Placement, WallpaperLoader, WallpaperRequest, WallpaperWorker};

#[test]
fn concurrent_requests_never_overlap() {
    let tmp = tempdir().unwrap();
    let a = write_png(tmp.path(), "a.png", 4, 4, [255, 0, 0, 255]);
    let b = write_png(tmp.path(), "b.png", 4, 4, [0, 0, 255, 255]);
    let facility = Arc::new(RecordingFacility {
        hold: Duration::from_millis(80),
        ..RecordingFacility::placement_aware()
    });
    let worker = Arc::new(WallpaperWorker::spawn(WallpaperLoader::new(facility.clone())).unwrap());

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [(a, Placement::Home), (b, Placement::Lock)]
        .into_iter()
        .map(|(path, placement)| {
            let worker = Arc::clone(&worker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                worker.submit(WallpaperRequest::new(path, placement)).wait()
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }

    let mut calls = facility.calls();
    assert_eq!(calls.len(), 2);
    calls.sort_by_key(|c| c.started);
    assert!(
        calls[0].finished <= calls[1].started,
        "second submission started before the first finished"
    );
}

#[test]
fn requests_run_in_submission_order() {
    let tmp = tempdir().unwrap();
    let facility = Arc::new(RecordingFacility::placement_aware());
    let worker = WallpaperWorker::spawn(WallpaperLoader::new(facility.clone())).unwrap();

    let colors = [[10, 0, 0, 255], [20, 0, 0, 255], [30, 0, 0, 255]];
    let pending: Vec<_> = colors
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let path = write_png(tmp.path(), &format!("{i}.png"), 1, 1, *color);
            worker.submit(WallpaperRequest::new(path, Placement::Both))
        })
        .collect();
    for p in pending {
        assert!(p.wait());
    }

    let seen: Vec<[u8; 4]> = facility.calls().iter().map(|c| c.first_pixel).collect();
    assert_eq!(seen, colors);
}

#[test]
fn worker_survives_a_panicking_request() {
    let tmp = tempdir().unwrap();
    let path = write_png(tmp.path(), "a.png", 2, 2, [1, 2, 3, 255]);
    let facility = Arc::new(RecordingFacility {
        panic: true,
        ..RecordingFacility::placement_aware()
    });
    let worker = WallpaperWorker::spawn(WallpaperLoader::new(facility)).unwrap();

    assert!(!worker.submit(WallpaperRequest::new(&path, Placement::Both)).wait());
    assert!(!worker.submit(WallpaperRequest::new(&path, Placement::Both)).wait());
    worker.shutdown();
}

#[test]
fn shutdown_drains_queued_requests() {
    let tmp = tempdir().unwrap();
    let path = write_png(tmp.path(), "a.png", 2, 2, [1, 2, 3, 255]);
    let facility = Arc::new(RecordingFacility {
        hold: Duration::from_millis(20),
        ..RecordingFacility::placement_aware()
    });
    let worker = WallpaperWorker::spawn(WallpaperLoader::new(facility.clone())).unwrap();

    let pending: Vec<_> = (0..3)
        .map(|_| worker.submit(WallpaperRequest::new(&path, Placement::Both)))
        .collect();
    worker.shutdown();

    assert_eq!(facility.calls().len(), 3);
    for p in pending {
        assert!(p.wait());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn outcome_can_be_awaited() {
    let tmp = tempdir().unwrap();
    let good = write_png(tmp.path(), "good.png", 2, 2, [9, 9, 9, 255]);
    let facility = Arc::new(RecordingFacility::placement_aware());
    let worker = WallpaperWorker::spawn(WallpaperLoader::new(facility)).unwrap();

    let ok = tokio::time::timeout(
        Duration::from_secs(5),
        worker.submit(WallpaperRequest::new(&good, Placement::Home)).outcome(),
    )
    .await
    .expect("timeout waiting for wallpaper outcome");
    assert!(ok);

    let missing = tmp.path().join("missing.png");
    assert!(
        !worker
            .submit(WallpaperRequest::new(missing, Placement::Home))
            .outcome()
            .await
    );
}
