//! HTTP module containing the network side of a download.
//!
//! This module provides HTTP client setup and the [`Transport`] abstraction
//! the download tasks read from.
//!
//! # Overview
//!
//! - [`client`] - HTTP client creation and middleware configuration
//! - [`transport`] - The [`Transport`] trait and its reqwest implementation
//!
//! # Examples
//!
//! ```rust
//! use haul::http::{HttpClientConfig, HttpTransport};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), haul::Error> {
//! let transport = HttpTransport::new(HttpClientConfig {
//!     read_timeout: Duration::from_secs(5),
//!     ..HttpClientConfig::default()
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
pub use transport::{ByteStream, HttpTransport, Transport, TransportStream};
