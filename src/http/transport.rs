//! Network side of a download.
//!
//! A [`Transport`] performs one GET for a [`DownloadRequest`] and hands back
//! the body as a stream of byte chunks, together with the total-size hint
//! found in the response metadata. [`HttpTransport`] is the reqwest-backed
//! implementation; every call it makes is bounded by a timeout and fails with
//! [`Error::Timeout`] instead of hanging.

use super::client::{create_http_client, HttpClientConfig};
use crate::download::{DownloadRequest, Total};
use crate::error::{describe, Error, Result};
use crate::utils::content_length::total_from_headers;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Body of a response, chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// An opened transfer.
pub struct TransportStream {
    /// Size hint from the response metadata.
    pub total: Total,
    /// Remaining body bytes.
    pub body: ByteStream,
}

impl TransportStream {
    pub fn new(total: Total, body: ByteStream) -> Self {
        Self { total, body }
    }
}

impl fmt::Debug for TransportStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportStream")
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// Opens the byte stream of a download.
///
/// Dropping the returned stream must abort the underlying transfer.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn open(&self, request: &DownloadRequest) -> Result<TransportStream>;
}

/// [`Transport`] performing HTTP(S) GET requests with reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
    connect_timeout: Duration,
    request_timeout: Duration,
    read_timeout: Duration,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Creates a transport and its HTTP client from `config`.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let connect_timeout = config.connect_timeout;
        let request_timeout = config.request_timeout;
        let read_timeout = config.read_timeout;
        let client = create_http_client(config)?;
        Ok(Self {
            client,
            connect_timeout,
            request_timeout,
            read_timeout,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &DownloadRequest) -> Result<TransportStream> {
        debug!(id = request.id(), url = %request.url(), "Fetching");
        let send = self
            .client
            .get(request.url().clone())
            .headers(request.headers().clone())
            .send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| Error::Timeout(self.request_timeout))?
            .map_err(|e| match e {
                reqwest_middleware::Error::Reqwest(e) => classify(&e, self.connect_timeout),
                other => Error::Network(other.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status,
                url: request.url().to_string(),
            });
        }

        let total = total_from_headers(response.headers());
        debug!(id = request.id(), ?total, %status, "Response received");
        Ok(TransportStream::new(
            total,
            with_read_timeout(response.bytes_stream(), self.read_timeout),
        ))
    }
}

/// Bound every `next()` of `body` by `limit`. The stream ends after the
/// first error.
fn with_read_timeout<S>(body: S, limit: Duration) -> ByteStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    stream::unfold(Some(Box::pin(body)), move |state| async move {
        let mut body = state?;
        match tokio::time::timeout(limit, body.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(body))),
            Ok(Some(Err(e))) => Some((Err(classify(&e, limit)), None)),
            Ok(None) => None,
            Err(_) => Some((Err(Error::Timeout(limit)), None)),
        }
    })
    .boxed()
}

fn classify(err: &reqwest::Error, limit: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(limit)
    } else {
        Error::Network(describe(err))
    }
}
