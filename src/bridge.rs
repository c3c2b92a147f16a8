//! Host-facing method dispatch.
//!
//! Hosts call in with a method name and an untyped argument map. This module
//! validates and translates that payload into a [`WallpaperRequest`]; the
//! loader itself only ever sees typed requests.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::events::WallpaperRequest;
use crate::placement::Placement;
use crate::tasks::worker::{Pending, WallpaperWorker};

/// Channel name hosts register the handler under.
pub const CHANNEL: &str = "wallpaper";
pub const SET_WALLPAPER_FROM_FILE: &str = "setWallpaperFromFile";

/// An untyped call as delivered by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

/// What the host should answer.
#[derive(Debug)]
pub enum MethodReply {
    /// Accepted and queued; resolves to the worker's outcome.
    Queued(Pending),
    /// Answered without touching the worker.
    Done(bool),
    NotImplemented,
}

impl MethodReply {
    /// Block for the final answer; `None` means "not implemented".
    pub fn wait(self) -> Option<bool> {
        match self {
            Self::Queued(pending) => Some(pending.wait()),
            Self::Done(ok) => Some(ok),
            Self::NotImplemented => None,
        }
    }

    pub async fn resolve(self) -> Option<bool> {
        match self {
            Self::Queued(pending) => Some(pending.outcome().await),
            Self::Done(ok) => Some(ok),
            Self::NotImplemented => None,
        }
    }
}

/// Routes host calls onto a [`WallpaperWorker`].
pub struct HostBridge {
    worker: WallpaperWorker,
}

impl HostBridge {
    pub fn new(worker: WallpaperWorker) -> Self {
        Self { worker }
    }

    pub fn handle(&self, call: &MethodCall) -> MethodReply {
        match call.method.as_str() {
            SET_WALLPAPER_FROM_FILE => match parse_request(&call.arguments) {
                Some(request) if request.path.exists() => {
                    MethodReply::Queued(self.worker.submit(request))
                }
                Some(request) => {
                    debug!(path = %request.path.display(), "wallpaper file does not exist");
                    MethodReply::Done(false)
                }
                None => MethodReply::Done(false),
            },
            other => {
                debug!(channel = CHANNEL, method = other, "unknown host method");
                MethodReply::NotImplemented
            }
        }
    }
}

/// Translate `{ filePath, wallpaperLocation }` into a typed request.
///
/// Returns `None` when the arguments are not a map or `filePath` is missing,
/// empty or not a string. A missing, non-numeric or out-of-range
/// `wallpaperLocation` becomes [`Placement::Both`].
pub fn parse_request(arguments: &Value) -> Option<WallpaperRequest> {
    let args = arguments.as_object()?;
    let path = args
        .get("filePath")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())?;
    let placement = args
        .get("wallpaperLocation")
        .and_then(location_number)
        .map_or(Placement::default(), Placement::from_flags_or_default);
    Some(WallpaperRequest::new(PathBuf::from(path), placement))
}

// numbers are truncated toward zero, so 2.9 selects the lock screen
fn location_number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_path_and_location() {
        let req = parse_request(&json!({"filePath": "/a.png", "wallpaperLocation": 1})).unwrap();
        assert_eq!(req, WallpaperRequest::new("/a.png", Placement::Home));
    }

    #[test]
    fn location_defaults_to_both() {
        for args in [
            json!({"filePath": "/a.png"}),
            json!({"filePath": "/a.png", "wallpaperLocation": null}),
            json!({"filePath": "/a.png", "wallpaperLocation": "2"}),
            json!({"filePath": "/a.png", "wallpaperLocation": 9}),
            json!({"filePath": "/a.png", "wallpaperLocation": -1}),
        ] {
            assert_eq!(parse_request(&args).unwrap().placement, Placement::Both, "{args}");
        }
    }

    #[test]
    fn fractional_location_truncates() {
        let req = parse_request(&json!({"filePath": "/a.png", "wallpaperLocation": 2.9})).unwrap();
        assert_eq!(req.placement, Placement::Lock);
    }

    #[test]
    fn rejects_bad_paths_and_shapes() {
        assert!(parse_request(&json!({"filePath": ""})).is_none());
        assert!(parse_request(&json!({"filePath": 12})).is_none());
        assert!(parse_request(&json!({"wallpaperLocation": 1})).is_none());
        assert!(parse_request(&json!(["/a.png", 1])).is_none());
        assert!(parse_request(&Value::Null).is_none());
    }

    #[test]
    fn method_call_deserializes_without_arguments() {
        let call: MethodCall = serde_json::from_str(r#"{"method": "ping"}"#).unwrap();
        assert_eq!(call.method, "ping");
        assert!(call.arguments.is_null());
    }
}
