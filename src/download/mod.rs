//! Download module containing the request, lifecycle state and worker of a
//! single download.
//!
//! # Overview
//!
//! - [`request`] - Validated description of what to fetch and where to store it
//! - [`state`] - Lifecycle states, totals and snapshots
//! - `task` - The worker driving one download from transport to disk
//!
//! # Examples
//!
//! ## Creating a Request
//!
//! ```rust
//! use haul::download::DownloadRequest;
//!
//! let request = DownloadRequest::from_url(
//!     "iso",
//!     "https://example.com/images/debian%2012.iso",
//!     "downloads",
//! )?;
//! assert_eq!(request.filename(), "debian 12.iso");
//! # Ok::<(), haul::Error>(())
//! ```
//!
//! ## Working with States
//!
//! ```rust
//! use haul::download::DownloadState;
//!
//! let state = DownloadState::Downloading;
//! assert!(state.can_transition_to(DownloadState::Completed));
//! assert!(!DownloadState::Completed.can_transition_to(DownloadState::Failed));
//! ```

pub mod request;
pub mod state;
pub(crate) mod task;

pub use request::DownloadRequest;
pub use state::{DownloadState, TaskSnapshot, Total};
