//! Wire shapes exchanged with the user interface.

use crate::download::DownloadRequest;
use crate::error::{Error, Result};
use crate::events::{DownloadEvent, EventKind};

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const PROGRESS_CHANNEL: &str = "download.progress";
pub const COMPLETED_CHANNEL: &str = "download.completed";
pub const ERROR_CHANNEL: &str = "download.error";
pub const CANCELLED_CHANNEL: &str = "download.cancelled";

/// Arguments of `download.start`.
///
/// ```rust
/// use haul::bridge::StartPayload;
///
/// let payload: StartPayload = serde_json::from_str(
///     r#"{"id":"1","url":"https://example.com/a.zip","directory":"/tmp","filename":"a.zip"}"#,
/// )?;
/// assert!(payload.headers.is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPayload {
    pub id: String,
    pub url: String,
    /// Destination directory; empty selects the default downloads directory.
    #[serde(default)]
    pub directory: String,
    /// Destination file name; empty derives it from the URL.
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

impl StartPayload {
    /// Turn the payload into a validated request, storing into `fallback_dir`
    /// when no directory was given.
    pub fn into_request(self, fallback_dir: &Path) -> Result<DownloadRequest> {
        let directory = match self.directory.trim() {
            "" => fallback_dir.to_path_buf(),
            dir => PathBuf::from(dir),
        };
        let request = match self.filename.is_empty() {
            true => DownloadRequest::from_url(self.id, &self.url, directory)?,
            false => DownloadRequest::new(self.id, &self.url, directory, self.filename)?,
        };
        match self.headers {
            Some(headers) => request.with_headers(headers),
            None => Ok(request),
        }
    }
}

/// Channel name an event kind is published under.
pub fn channel_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Progress => PROGRESS_CHANNEL,
        EventKind::Completed => COMPLETED_CHANNEL,
        EventKind::Error => ERROR_CHANNEL,
        EventKind::Cancelled => CANCELLED_CHANNEL,
    }
}

/// Event kind published under `channel`.
pub fn channel_kind(channel: &str) -> Result<EventKind> {
    EventKind::ALL
        .into_iter()
        .find(|kind| channel_name(*kind) == channel)
        .ok_or_else(|| Error::InvalidRequest(format!("unknown event channel \"{}\"", channel)))
}

/// JSON payload of `event`.
pub fn event_payload(event: &DownloadEvent) -> serde_json::Result<Value> {
    match event {
        DownloadEvent::Progress(e) => serde_json::to_value(e),
        DownloadEvent::Completed(e) => serde_json::to_value(e),
        DownloadEvent::Error(e) => serde_json::to_value(e),
        DownloadEvent::Cancelled(e) => serde_json::to_value(e),
    }
}
