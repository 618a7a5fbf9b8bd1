//! Events module containing the lifecycle notifications of downloads.
//!
//! Every download reports through an [`EventChannel`]: zero or more
//! `progress` events followed by exactly one of `completed`, `error` or
//! `cancelled`. Events carry the id of their download, so one subscriber can
//! follow many concurrent downloads. No ordering is promised across ids.
//!
//! # Overview
//!
//! - `event` - Event payloads and the [`EventKind`] used to subscribe
//! - `channel` - The [`EventChannel`] registry and its [`Disposer`] handles
//!
//! # Examples
//!
//! ```rust
//! use haul::events::{DownloadEvent, EventChannel, EventKind};
//!
//! let events = EventChannel::new();
//! let terminal = events.subscribe(EventKind::Error, |event| {
//!     if let DownloadEvent::Error(e) = event {
//!         eprintln!("{} failed: {}", e.id, e.message);
//!     }
//! });
//! terminal.dispose();
//! ```

mod channel;
mod event;

pub use channel::{Disposer, EventChannel};
pub use event::{
    CancelledEvent, CompletedEvent, DownloadEvent, ErrorEvent, EventKind, ProgressEvent,
};
