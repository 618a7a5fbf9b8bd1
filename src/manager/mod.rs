//! Manager module containing the download registry, its builder and configuration.
//!
//! This module provides the [`DownloadManager`], the single entry point for
//! starting and cancelling downloads, along with the builder pattern used to
//! configure it.
//!
//! # Overview
//!
//! - `manager` - Core DownloadManager: registry access, `start`, `cancel`, shutdown
//! - `builder` - DownloadManagerBuilder for flexible configuration
//! - `config` - Configuration structures and the partial file policy
//!
//! # Examples
//!
//! ```rust,no_run
//! use haul::download::DownloadRequest;
//! use haul::manager::DownloadManagerBuilder;
//!
//! # async fn example() -> Result<(), haul::Error> {
//! let manager = DownloadManagerBuilder::new().build()?;
//!
//! let _errors = manager
//!     .events()
//!     .on_error(|e| eprintln!("{} failed: {}", e.id, e.message));
//!
//! manager.start(DownloadRequest::from_url("1", "https://example.com/file1.zip", "downloads")?)?;
//! manager.start(DownloadRequest::from_url("2", "https://example.com/file2.pdf", "downloads")?)?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod manager;
pub(crate) mod registry;

pub use builder::DownloadManagerBuilder;
pub use config::{ManagerConfig, PartialFilePolicy};
pub use manager::DownloadManager;
