//! Single background thread that applies wallpaper requests one at a time.
//!
//! Requests queue in FIFO order; the next one starts only after the previous
//! decode-and-submit has returned, so the platform facility never sees two
//! submissions at once. There is no cancellation and no timeout.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use tokio::sync::oneshot;
use tracing::{debug, instrument};

use crate::events::{SetWallpaper, WallpaperRequest};
use crate::tasks::loader::WallpaperLoader;

/// Handle to the wallpaper worker thread.
///
/// Dropping the handle closes the queue and waits for queued requests to
/// finish.
pub struct WallpaperWorker {
    tx: Option<Sender<SetWallpaper>>,
    thread: Option<JoinHandle<()>>,
}

/// Outcome of a queued request, delivered once the worker has run it.
#[derive(Debug)]
pub struct Pending(oneshot::Receiver<bool>);

impl Pending {
    /// Block the current thread until the outcome is known.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`Pending::outcome`] there.
    pub fn wait(self) -> bool {
        self.0.blocking_recv().unwrap_or(false)
    }

    pub async fn outcome(self) -> bool {
        self.0.await.unwrap_or(false)
    }
}

impl WallpaperWorker {
    /// Start the worker thread.
    pub fn spawn(loader: WallpaperLoader) -> io::Result<Self> {
        let (tx, rx) = unbounded::<SetWallpaper>();
        let thread = thread::Builder::new()
            .name("wallpaper-worker".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    handle(&loader, job);
                }
                debug!("wallpaper worker queue closed");
            })?;
        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    /// Queue `request` behind any requests already submitted.
    pub fn submit(&self, request: WallpaperRequest) -> Pending {
        let (reply, rx) = oneshot::channel();
        if let Some(tx) = &self.tx {
            // On a closed queue the reply sender is dropped with the job and
            // the receiver resolves to `false`.
            let _ = tx.send(SetWallpaper { request, reply });
        }
        Pending(rx)
    }

    /// Close the queue and wait for every queued request to finish.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WallpaperWorker {
    fn drop(&mut self) {
        self.close();
    }
}

#[instrument(skip_all, fields(path = %job.request.path.display(), placement = %job.request.placement))]
fn handle(loader: &WallpaperLoader, job: SetWallpaper) {
    let SetWallpaper { request, reply } = job;
    let ok = loader.set_wallpaper_from_image(&request.path, request.placement);
    if reply.send(ok).is_err() {
        debug!("requester went away before the outcome was ready");
    }
}
