//! Configuration structures and defaults for the download manager.
//!
//! This module provides the configuration used by [`DownloadManager`] and
//! [`DownloadManagerBuilder`]: HTTP client settings, progress throttling and
//! the handling of partially written files.
//!
//! # Examples
//!
//! ```rust
//! use haul::manager::{ManagerConfig, PartialFilePolicy};
//! use std::time::Duration;
//!
//! let config = ManagerConfig {
//!     progress_interval: Duration::from_millis(500),
//!     partial_files: PartialFilePolicy::Keep,
//!     ..ManagerConfig::default()
//! };
//! assert_eq!(config.speed_smoothing, Duration::from_secs(1));
//! ```
//!
//! [`DownloadManager`]: crate::manager::DownloadManager
//! [`DownloadManagerBuilder`]: crate::manager::DownloadManagerBuilder

use crate::http::HttpClientConfig;

use std::time::Duration;

/// What happens to the destination file of a download that does not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialFilePolicy {
    /// Delete whatever was written after `Failed` or `Cancelled`.
    #[default]
    Remove,
    /// Leave the partial file on disk.
    Keep,
}

/// Configuration structure for the download manager
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// HTTP client and per-call timeout settings.
    pub http: HttpClientConfig,
    /// Minimum spacing between two progress events of one download.
    pub progress_interval: Duration,
    /// Time constant of the smoothed throughput estimate.
    pub speed_smoothing: Duration,
    /// Handling of partially written files.
    pub partial_files: PartialFilePolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            http: HttpClientConfig::default(),
            progress_interval: Duration::from_millis(200),
            speed_smoothing: Duration::from_secs(1),
            partial_files: PartialFilePolicy::Remove,
        }
    }
}
