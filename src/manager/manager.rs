//! Core download manager.
//!
//! [`DownloadManager`] is the entry point for starting and cancelling
//! downloads. It keeps the registry of active downloads, enforces a single
//! active download per id and runs every download as its own Tokio task.
//!
//! # Examples
//!
//! ```rust,no_run
//! use haul::download::DownloadRequest;
//! use haul::manager::DownloadManager;
//!
//! # async fn example() -> Result<(), haul::Error> {
//! let manager = DownloadManager::builder().build()?;
//! let _completed = manager.events().on_completed(|c| println!("{} -> {:?}", c.id, c.path));
//!
//! manager.start(DownloadRequest::new(
//!     "reqwest",
//!     "https://github.com/seanmonstar/reqwest/archive/refs/tags/v0.11.9.zip",
//!     "downloads",
//!     "reqwest.zip",
//! )?)?;
//!
//! manager.cancel("reqwest")?;
//! # Ok(())
//! # }
//! ```

use super::builder::DownloadManagerBuilder;
use super::config::ManagerConfig;
use super::registry::Registry;
use crate::download::task::DownloadTask;
use crate::download::{DownloadRequest, TaskSnapshot};
use crate::error::{Error, Result};
use crate::events::EventChannel;
use crate::http::Transport;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

/// Registry and entry point of all downloads.
///
/// Cloning is cheap; clones share the same registry and event channel.
#[derive(Clone)]
pub struct DownloadManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: ManagerConfig,
    transport: Arc<dyn Transport>,
    events: EventChannel,
    registry: Arc<Registry>,
    tracker: TaskTracker,
}

impl fmt::Debug for DownloadManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadManager")
            .field("config", &self.inner.config)
            .field("active", &self.inner.registry.len())
            .field("events", &self.inner.events)
            .finish()
    }
}

impl DownloadManager {
    /// Creates a builder with the default options.
    pub fn builder() -> DownloadManagerBuilder {
        DownloadManagerBuilder::new()
    }

    pub(crate) fn new(
        config: ManagerConfig,
        transport: Arc<dyn Transport>,
        events: EventChannel,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                events,
                registry: Arc::new(Registry::default()),
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Gets the configuration the manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// The channel all lifecycle events are published on.
    pub fn events(&self) -> &EventChannel {
        &self.inner.events
    }

    /// Accept `request` and start downloading it in the background.
    ///
    /// Returns as soon as the download is registered; its outcome is reported
    /// through [`DownloadManager::events`]. Fails with
    /// [`Error::DuplicateActiveDownload`] when the id is already active, in
    /// which case nothing is started. Must be called from within a Tokio
    /// runtime.
    pub fn start(&self, request: DownloadRequest) -> Result<()> {
        let handle = Handle::try_current().map_err(|e| {
            Error::Internal(format!("downloads must be started within a Tokio runtime: {}", e))
        })?;

        // Held from before the registry accepts the id until the task is
        // spawned, so `shutdown` cannot finish waiting in between.
        let tracked = self.inner.tracker.token();
        let (token, snapshot) = self
            .inner
            .registry
            .insert(request.id(), &request.destination())
            .inspect_err(|e| {
                debug!(id = request.id(), "Rejected start: {}", e);
            })?;
        info!(
            id = request.id(),
            url = %request.url(),
            destination = ?request.destination(),
            "Download accepted"
        );

        let task = DownloadTask::new(
            request,
            token,
            snapshot,
            Arc::clone(&self.inner.transport),
            self.inner.events.clone(),
            Arc::clone(&self.inner.registry),
            &self.inner.config,
        );
        self.inner.tracker.spawn_on(task.run(), &handle);
        drop(tracked);
        Ok(())
    }

    /// Ask the download bound to `id` to stop.
    ///
    /// Returns immediately; the `cancelled` event is the authoritative
    /// completion signal. A download whose `cancel` returned `Ok` always ends
    /// with `cancelled`. Fails with [`Error::NotFound`] when no active
    /// download has this id.
    pub fn cancel(&self, id: &str) -> Result<()> {
        self.inner.registry.cancel(id).inspect_err(|e| {
            debug!(id, "Rejected cancel: {}", e);
        })?;
        info!(id, "Cancellation requested");
        Ok(())
    }

    /// Current state of the download bound to `id`, if it is active.
    pub fn snapshot(&self, id: &str) -> Option<TaskSnapshot> {
        self.inner.registry.snapshot(id)
    }

    /// Copy of the registry: id to current state of every active download.
    pub fn active(&self) -> HashMap<String, TaskSnapshot> {
        self.inner.registry.snapshots()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.inner.registry.snapshot(id).is_some()
    }

    /// Number of active downloads.
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting downloads, cancel the active ones and wait until each
    /// of them has delivered its terminal event.
    pub async fn shutdown(&self) {
        let cancelled = self.inner.registry.close();
        info!(cancelled, "Shutting down download manager");
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
    }

    /// Whether [`DownloadManager::shutdown`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.registry.is_closed()
    }
}
