//! Boundary surface consumed by a user interface.
//!
//! [`DownloadBridge`] exposes the manager through string ids, JSON payloads
//! and named event channels (`download.progress`, `download.completed`,
//! `download.error`, `download.cancelled`).
//!
//! # Examples
//!
//! ```rust,no_run
//! use haul::bridge::DownloadBridge;
//! use haul::manager::DownloadManager;
//!
//! # async fn example() -> Result<(), haul::Error> {
//! let bridge = DownloadBridge::new(DownloadManager::builder().build()?);
//! let _progress = bridge.subscribe("download.progress", |payload| println!("{}", payload))?;
//!
//! bridge.start_json(r#"{"id":"1","url":"https://example.com/a.zip","directory":"","filename":""}"#)?;
//! bridge.cancel("1")?;
//! # Ok(())
//! # }
//! ```

mod dirs;
mod payload;

pub use dirs::{DownloadDirProvider, FolderChooser, SystemDownloadDir};
pub use payload::{
    channel_kind, channel_name, event_payload, StartPayload, CANCELLED_CHANNEL, COMPLETED_CHANNEL,
    ERROR_CHANNEL, PROGRESS_CHANNEL,
};

use crate::error::{Error, Result};
use crate::events::Disposer;
use crate::manager::DownloadManager;

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// String-typed facade over a [`DownloadManager`].
#[derive(Clone)]
pub struct DownloadBridge {
    manager: DownloadManager,
    dirs: Arc<dyn DownloadDirProvider>,
    chooser: Option<Arc<dyn FolderChooser>>,
}

impl fmt::Debug for DownloadBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadBridge")
            .field("manager", &self.manager)
            .field("chooser", &self.chooser.is_some())
            .finish()
    }
}

impl DownloadBridge {
    pub fn new(manager: DownloadManager) -> Self {
        Self {
            manager,
            dirs: Arc::new(SystemDownloadDir),
            chooser: None,
        }
    }

    /// Use `dirs` to resolve requests without a directory.
    pub fn with_dir_provider(mut self, dirs: impl DownloadDirProvider + 'static) -> Self {
        self.dirs = Arc::new(dirs);
        self
    }

    pub fn with_folder_chooser(mut self, chooser: impl FolderChooser + 'static) -> Self {
        self.chooser = Some(Arc::new(chooser));
        self
    }

    pub fn manager(&self) -> &DownloadManager {
        &self.manager
    }

    /// `download.start`
    pub fn start(&self, payload: StartPayload) -> Result<()> {
        let request = payload.into_request(&self.dirs.download_dir())?;
        self.manager.start(request)
    }

    /// `download.start` with the payload still encoded as JSON.
    pub fn start_json(&self, payload: &str) -> Result<()> {
        let payload: StartPayload = serde_json::from_str(payload)
            .map_err(|e| Error::InvalidRequest(format!("malformed start payload: {}", e)))?;
        self.start(payload)
    }

    /// `download.cancel`
    pub fn cancel(&self, id: &str) -> Result<()> {
        self.manager.cancel(id)
    }

    /// Deliver the JSON payload of every event published on `channel`.
    pub fn subscribe<F>(&self, channel: &str, callback: F) -> Result<Disposer>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let kind = channel_kind(channel)?;
        Ok(self
            .manager
            .events()
            .subscribe(kind, move |event| match event_payload(event) {
                Ok(payload) => callback(payload),
                Err(e) => warn!(id = event.id(), kind = %event.kind(), "Cannot encode event: {}", e),
            }))
    }

    /// Ask the user for a directory; `None` if declined or no chooser is set.
    pub fn choose_folder(&self) -> Option<PathBuf> {
        self.chooser.as_ref().and_then(|chooser| chooser.choose())
    }

    pub fn default_download_dir(&self) -> PathBuf {
        self.dirs.download_dir()
    }
}
