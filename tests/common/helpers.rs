#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::Path as UrlPath;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::stream;
use futures::StreamExt;
use haul::http::TransportStream;
use haul::{
    Disposer, DownloadEvent, DownloadManager, DownloadManagerBuilder, DownloadRequest,
    EventChannel, Total, Transport,
};
use rand::RngCore;
use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

pub const TEST_USER_AGENT: &str = "haul-test-agent";
pub const MIB: usize = 1024 * 1024;
/// Number of chunks the slow routes split their body into.
pub const SLOW_CHUNKS: usize = 8;
pub const SLOW_CHUNK_DELAY: Duration = Duration::from_millis(50);

static TRACING: Once = Once::new();

/// Route logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Deterministic content of `size` bytes; the fixture serves the same bytes.
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

pub fn create_random_content(size: usize) -> Vec<u8> {
    let mut content = vec![0; size];
    rand::rng().fill_bytes(&mut content);
    content
}

/// Asserts that a file has the expected content
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = fs::read(path).expect("Failed to read downloaded file");
    assert_eq!(content.len(), expected.len(), "File size mismatch at {:?}", path);
    assert!(content == expected, "File content mismatch at {:?}", path);
}

/// Manager with a short progress interval, for quick tests.
pub fn test_manager_builder() -> DownloadManagerBuilder {
    init_tracing();
    DownloadManager::builder()
        .user_agent(TEST_USER_AGENT)
        .connect_timeout(Duration::from_secs(2))
        .request_timeout(Duration::from_secs(5))
        .read_timeout(Duration::from_secs(5))
        .progress_interval(Duration::from_millis(20))
}

pub fn request(id: &str, url: &str, dir: &Path, filename: &str) -> DownloadRequest {
    DownloadRequest::new(id, url, dir, filename).expect("Invalid test request")
}

// === HTTP fixture ===

/// Local HTTP server with routes for every transfer outcome.
///
/// - `/bytes/{n}`: `n` bytes with `Content-Length`
/// - `/chunked/{n}`: `n` bytes without a size hint
/// - `/slow/{n}`: `n` bytes in [`SLOW_CHUNKS`] chunks, [`SLOW_CHUNK_DELAY`] apart
/// - `/stall`: announces 1 MiB, sends 16 bytes, then stops sending
/// - `/truncated/{n}`: announces `n` bytes but sends half of them
/// - `/status/{code}`: empty response with the given status
/// - `/echo/{header}`: the value of the request header as body
pub struct TestServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/bytes/{n}", get(bytes))
            .route("/chunked/{n}", get(chunked))
            .route("/slow/{n}", get(slow))
            .route("/stall", get(stall))
            .route("/truncated/{n}", get(truncated))
            .route("/status/{code}", get(status))
            .route("/echo/{header}", get(echo));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn bytes(UrlPath(n): UrlPath<usize>) -> Vec<u8> {
    create_test_content(n)
}

async fn chunked(UrlPath(n): UrlPath<usize>) -> Body {
    let chunks: Vec<Result<Bytes, Infallible>> = create_test_content(n)
        .chunks(4096)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    Body::from_stream(stream::iter(chunks))
}

async fn slow(UrlPath(n): UrlPath<usize>) -> Response {
    let content = create_test_content(n);
    let chunk_size = n.div_ceil(SLOW_CHUNKS).max(1);
    let chunks: Vec<Bytes> = content.chunks(chunk_size).map(Bytes::copy_from_slice).collect();
    let body = stream::unfold(chunks.into_iter(), |mut chunks| async move {
        let chunk = chunks.next()?;
        tokio::time::sleep(SLOW_CHUNK_DELAY).await;
        Some((Ok::<_, Infallible>(chunk), chunks))
    });
    ([(header::CONTENT_LENGTH, n.to_string())], Body::from_stream(body)).into_response()
}

async fn stall() -> Response {
    let first = stream::once(async { Ok::<_, Infallible>(Bytes::from_static(&[7; 16])) });
    let body = first.chain(stream::pending());
    ([(header::CONTENT_LENGTH, MIB.to_string())], Body::from_stream(body)).into_response()
}

async fn truncated(UrlPath(n): UrlPath<usize>) -> Response {
    let half = Bytes::from(create_test_content(n / 2));
    let body = stream::once(async move { Ok::<_, Infallible>(half) });
    ([(header::CONTENT_LENGTH, n.to_string())], Body::from_stream(body)).into_response()
}

async fn status(UrlPath(code): UrlPath<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn echo(UrlPath(name): UrlPath<String>, headers: HeaderMap) -> String {
    headers
        .get(name.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// === In-memory transport ===

/// Serves `chunks` copies of one random chunk, `delay` apart, without any network.
#[derive(Clone)]
pub struct ScriptedTransport {
    pub chunks: usize,
    pub chunk_size: usize,
    pub delay: Duration,
    pub announce_total: bool,
}

impl ScriptedTransport {
    pub fn total_len(&self) -> usize {
        self.chunks * self.chunk_size
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, _request: &DownloadRequest) -> haul::Result<TransportStream> {
        let total = match self.announce_total {
            true => Total::Known(self.total_len() as u64),
            false => Total::Unknown,
        };
        let (chunk, delay) = (Bytes::from(create_random_content(self.chunk_size)), self.delay);
        let body = stream::iter(0..self.chunks).then(move |_| {
            let chunk = chunk.clone();
            async move {
                tokio::time::sleep(delay).await;
                Ok::<_, haul::Error>(chunk)
            }
        });
        Ok(TransportStream::new(total, body.boxed()))
    }
}

// === Event recording ===

/// Collects every event published on a channel.
pub struct EventRecorder {
    rx: mpsc::UnboundedReceiver<DownloadEvent>,
    _subscription: Disposer,
}

impl EventRecorder {
    pub fn attach(events: &EventChannel) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = events.subscribe_all(move |event| {
            let _ = tx.send(event.clone());
        });
        Self {
            rx,
            _subscription: subscription,
        }
    }

    /// Receive events until `count` terminal events have arrived.
    pub async fn until_terminals(&mut self, count: usize) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        let mut terminals = 0;
        while terminals < count {
            let event = tokio::time::timeout(Duration::from_secs(20), self.rx.recv())
                .await
                .expect("Timed out waiting for a terminal event")
                .expect("Event channel closed");
            if event.is_terminal() {
                terminals += 1;
            }
            events.push(event);
        }
        events
    }

    /// Receive events until the terminal event of `id`.
    pub async fn until_terminal_of(&mut self, id: &str) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(20), self.rx.recv())
                .await
                .expect("Timed out waiting for a terminal event")
                .expect("Event channel closed");
            let done = event.is_terminal() && event.id() == id;
            events.push(event);
            if done {
                return events;
            }
        }
    }

    /// Events that arrive within `wait`.
    pub async fn drain_for(&mut self, wait: Duration) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        let deadline = tokio::time::Instant::now() + wait;
        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, self.rx.recv()).await {
            events.push(event);
        }
        events
    }
}

/// Events of one id, in delivery order.
pub fn events_of<'a>(events: &'a [DownloadEvent], id: &'a str) -> impl Iterator<Item = &'a DownloadEvent> {
    events.iter().filter(move |e| e.id() == id)
}

/// The single terminal event of `id`; panics if there is not exactly one.
pub fn terminal_of<'a>(events: &'a [DownloadEvent], id: &'a str) -> &'a DownloadEvent {
    let terminals: Vec<&DownloadEvent> = events_of(events, id).filter(|e| e.is_terminal()).collect();
    assert_eq!(terminals.len(), 1, "expected exactly one terminal event for {}", id);
    terminals[0]
}

/// Asserts the per-id ordering: progress only, monotonic, then one terminal event last.
pub fn assert_well_ordered(events: &[DownloadEvent], id: &str) {
    let own: Vec<&DownloadEvent> = events_of(events, id).collect();
    let (last, progress) = own.split_last().expect("no events for id");
    assert!(last.is_terminal(), "last event of {} must be terminal", id);
    let mut previous = 0;
    for event in progress {
        match event {
            DownloadEvent::Progress(p) => {
                assert!(p.downloaded >= previous, "progress of {} went backwards", id);
                if let Some(total) = p.total.known() {
                    assert!(p.downloaded <= total, "progress of {} exceeds total", id);
                }
                previous = p.downloaded;
            }
            other => panic!("event after terminal for {}: {:?}", id, other),
        }
    }
}
