//! Builder pattern implementation for creating DownloadManager instances.
//!
//! # Examples
//!
//! ## Basic Builder Usage
//!
//! ```rust
//! use haul::manager::{DownloadManagerBuilder, PartialFilePolicy};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), haul::Error> {
//! let manager = DownloadManagerBuilder::new()
//!     .read_timeout(Duration::from_secs(15))
//!     .progress_interval(Duration::from_millis(500))
//!     .partial_files(PartialFilePolicy::Keep)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Headers
//!
//! ```rust
//! use haul::manager::DownloadManagerBuilder;
//! use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = DownloadManagerBuilder::new()
//!     .header(AUTHORIZATION, HeaderValue::from_static("Bearer token"))
//!     .user_agent("gallery/2.0")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::ManagerConfig, config::PartialFilePolicy, manager::DownloadManager};
use crate::error::Result;
use crate::events::EventChannel;
use crate::http::{HttpTransport, Transport};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Proxy;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`DownloadManager`].
///
/// ```rust
/// # fn main() -> Result<(), haul::Error> {
/// use haul::manager::DownloadManagerBuilder;
/// use std::time::Duration;
///
/// let manager = DownloadManagerBuilder::new()
///     .connect_timeout(Duration::from_secs(3))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DownloadManagerBuilder {
    config: ManagerConfig,
    transport: Option<Arc<dyn Transport>>,
    events: Option<EventChannel>,
}

impl DownloadManagerBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloadManagerBuilder::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the ceiling for establishing a connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.connect_timeout = timeout;
        self
    }

    /// Set the ceiling for receiving the response headers.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.request_timeout = timeout;
        self
    }

    /// Set the ceiling for each individual body read.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.read_timeout = timeout;
        self
    }

    /// Set the minimum spacing between two progress events of one download.
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Set the time constant of the throughput estimate.
    pub fn speed_smoothing(mut self, smoothing: Duration) -> Self {
        self.config.speed_smoothing = smoothing;
        self
    }

    /// Choose what happens to files of failed or cancelled downloads.
    pub fn partial_files(mut self, policy: PartialFilePolicy) -> Self {
        self.config.partial_files = policy;
        self
    }

    /// Route requests through `proxy`.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.http.proxy = Some(proxy);
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.http.user_agent = user_agent.into();
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.http.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add default http headers, sent with every download.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one. Headers of a request override these.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.http.headers = Some(new);
        self
    }

    /// Add one default http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.http.headers = Some(new);
        self
    }

    /// Use `transport` instead of the HTTP transport built from the
    /// configuration.
    pub fn transport<T: Transport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Publish events on an existing channel instead of a new one.
    pub fn events(mut self, events: EventChannel) -> Self {
        self.events = Some(events);
        self
    }

    /// Create the [`DownloadManager`] with the specified options.
    pub fn build(self) -> Result<DownloadManager> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.http.clone())?),
        };
        Ok(DownloadManager::new(
            self.config,
            transport,
            self.events.unwrap_or_default(),
        ))
    }
}
