pub mod bridge;
pub mod buffer;
pub mod config;
pub mod error;
pub mod events;
pub mod placement;
pub mod platform;
pub mod processing {
    pub mod decode;
    pub mod sample;
}
pub mod tasks {
    pub mod loader;
    pub mod worker;
}

pub use error::Error;
pub use events::WallpaperRequest;
pub use placement::Placement;
pub use tasks::loader::WallpaperLoader;
pub use tasks::worker::{Pending, WallpaperWorker};
