//! Haul runs concurrent HTTP(S) file downloads, each bound to a
//! caller-chosen id, and reports their lifecycle through subscribable events.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use haul::{DownloadManager, DownloadRequest, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let manager = DownloadManager::builder().build()?;
//! let _done = manager
//!     .events()
//!     .on_completed(|c| println!("{} saved to {}", c.id, c.path.display()));
//!
//! let reqwest_rs = "https://github.com/seanmonstar/reqwest/archive/refs/tags/v0.11.9.zip";
//! manager.start(DownloadRequest::from_url("reqwest", reqwest_rs, "output")?)?;
//!
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`manager`] - The `DownloadManager` registry and its builder
//! - [`download`] - Requests, lifecycle states and the per-download worker
//! - [`events`] - Event payloads and the publish/subscribe `EventChannel`
//! - [`http`] - HTTP client construction and the `Transport` abstraction
//! - [`sink`] - Writing downloaded bytes to disk
//! - [`progress`] - Throughput estimation, progress throttling and console bars
//! - [`bridge`] - JSON/string facade for a user interface
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`utils`] - Shared utility functions

pub mod bridge;
pub mod download;
pub mod error;
pub mod events;
pub mod http;
pub mod manager;
pub mod progress;
pub mod sink;
pub mod utils;

pub use bridge::{DownloadBridge, StartPayload};
pub use download::{DownloadRequest, DownloadState, TaskSnapshot, Total};
pub use error::{Error, FailureKind, Result};
pub use events::{Disposer, DownloadEvent, EventChannel, EventKind};
pub use http::{create_http_client, HttpClientConfig, HttpTransport, Transport};
pub use manager::{DownloadManager, DownloadManagerBuilder, ManagerConfig, PartialFilePolicy};
pub use progress::{ConsoleProgress, ProgressBarOpts, StyleOptions};
