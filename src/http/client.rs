//! HTTP client setup and middleware configuration.
//!
//! This module builds the reqwest client every [`HttpTransport`] uses:
//! request tracing middleware, optional proxy, default headers and a connect
//! timeout. The request and read timeouts are enforced by the transport
//! itself, per call. Failed requests are never retried here; retrying is
//! left to the caller issuing a new download.
//!
//! # Examples
//!
//! ```rust
//! use haul::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, ACCEPT};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(ACCEPT, "*/*".parse()?);
//!
//! let config = HttpClientConfig {
//!     headers: Some(headers),
//!     connect_timeout: Duration::from_secs(5),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`HttpTransport`]: crate::http::HttpTransport

use reqwest::{header::HeaderMap, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Ceiling for establishing a connection.
    pub connect_timeout: Duration,
    /// Ceiling for receiving the response headers of a request.
    pub request_timeout: Duration,
    /// Ceiling for each individual body read.
    pub read_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            headers: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// This function sets up a reqwest client with:
/// - Tracing middleware for request/response logging
/// - A bounded connect timeout
/// - Optional proxy support
/// - Optional default headers
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut inner_client_builder = reqwest::Client::builder()
        .user_agent(config.user_agent)
        .connect_timeout(config.connect_timeout);

    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    if let Some(headers) = config.headers {
        inner_client_builder = inner_client_builder.default_headers(headers);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}
