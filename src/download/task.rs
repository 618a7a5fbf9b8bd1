//! The per-download state machine.
//!
//! A [`DownloadTask`] owns one transport stream and one [`FileSink`] for
//! exactly its own lifetime. It moves `Pending -> Downloading` once the
//! transport is open and ends in `Completed`, `Failed` or `Cancelled`.
//! Cancellation is cooperative: the token is checked while waiting for the
//! transport and before every chunk read, never in the middle of a write.

use super::request::DownloadRequest;
use super::state::{DownloadState, Total};
use crate::error::{describe, Error, FailureKind, Result};
use crate::events::{CancelledEvent, CompletedEvent, DownloadEvent, ErrorEvent, EventChannel};
use crate::http::{Transport, TransportStream};
use crate::manager::registry::{Registry, SharedSnapshot};
use crate::manager::{ManagerConfig, PartialFilePolicy};
use crate::progress::ProgressReporter;
use crate::sink::{remove_partial, FileSink};

use futures::{FutureExt, StreamExt};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One download from acceptance to its terminal event.
pub(crate) struct DownloadTask {
    request: DownloadRequest,
    token: CancellationToken,
    snapshot: SharedSnapshot,
    transport: Arc<dyn Transport>,
    events: EventChannel,
    registry: Arc<Registry>,
    reporter: ProgressReporter,
    partial_files: PartialFilePolicy,
    opened: bool,
    total: Total,
    downloaded: u64,
    partial: Option<PathBuf>,
}

impl DownloadTask {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        request: DownloadRequest,
        token: CancellationToken,
        snapshot: SharedSnapshot,
        transport: Arc<dyn Transport>,
        events: EventChannel,
        registry: Arc<Registry>,
        config: &ManagerConfig,
    ) -> Self {
        let reporter = ProgressReporter::new(
            request.id(),
            config.progress_interval,
            config.speed_smoothing,
        );
        Self {
            request,
            token,
            snapshot,
            transport,
            events,
            registry,
            reporter,
            partial_files: config.partial_files,
            opened: false,
            total: Total::Unknown,
            downloaded: 0,
            partial: None,
        }
    }

    /// Drive the download to its terminal state, emit the terminal event and
    /// release the id.
    pub(crate) async fn run(mut self) {
        let result = AssertUnwindSafe(self.transfer())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(Error::Internal("download task panicked".into())));
        self.finish(result).await;
    }

    async fn transfer(&mut self) -> Result<PathBuf> {
        if self.token.is_cancelled() {
            return Err(Error::CancelledByUser);
        }

        let TransportStream { total, mut body } = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(Error::CancelledByUser),
            opened = self.transport.open(&self.request) => opened?,
        };

        self.opened = true;
        self.total = total;
        {
            let mut snapshot = self.snapshot.write();
            snapshot.advance(DownloadState::Downloading);
            snapshot.total = total;
        }
        info!(id = self.request.id(), ?total, "Download started");
        self.reporter.start(Instant::now());

        let mut sink = FileSink::create(self.request.directory(), self.request.filename()).await?;
        self.partial = Some(sink.path().to_path_buf());

        debug!(id = self.request.id(), "Retrieving chunks...");
        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(Error::CancelledByUser),
                next = body.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            let downloaded = self.downloaded + chunk.len() as u64;
            if let Total::Known(expected) = total {
                if downloaded > expected {
                    return Err(Error::Network(format!(
                        "received more than the {} bytes announced by the server",
                        expected
                    )));
                }
            }

            sink.write(&chunk).await?;
            self.downloaded = downloaded;
            self.snapshot.write().record(downloaded);

            if let Some(event) = self.reporter.update(downloaded, total, Instant::now()) {
                self.snapshot.write().speed = event.speed;
                self.events.emit(&DownloadEvent::Progress(event));
            }
        }

        if let Total::Known(expected) = total {
            if self.downloaded < expected {
                return Err(Error::Network(format!(
                    "connection closed after {} of {} bytes",
                    self.downloaded, expected
                )));
            }
        }

        sink.finish().await
    }

    async fn finish(mut self, result: Result<PathBuf>) {
        let id = self.request.id().to_string();
        let proposed = match &result {
            Ok(_) => DownloadState::Completed,
            Err(e) if e.is_cancelled() => DownloadState::Cancelled,
            Err(_) => DownloadState::Failed,
        };
        let state = self.registry.settle(&id, proposed);

        let event = match (state, result) {
            (DownloadState::Completed, Ok(path)) => {
                info!(id = %id, path = ?path, downloaded = self.downloaded, "Download completed");
                self.snapshot.write().path = Some(path.clone());
                DownloadEvent::Completed(CompletedEvent {
                    id: id.clone(),
                    path,
                })
            }
            (DownloadState::Cancelled, result) => {
                info!(id = %id, downloaded = self.downloaded, "Download cancelled");
                if let Ok(path) = result {
                    self.partial = Some(path);
                }
                self.discard_partial().await;
                DownloadEvent::Cancelled(CancelledEvent { id: id.clone() })
            }
            (_, result) => {
                let (message, kind) = match result {
                    Err(e) => (describe(&e), e.failure_kind().unwrap_or(FailureKind::Internal)),
                    Ok(_) => ("download settled in an inconsistent state".to_string(), FailureKind::Internal),
                };
                warn!(id = %id, error = %message, "Download failed");
                self.snapshot.write().error = Some(message.clone());
                self.discard_partial().await;
                DownloadEvent::Error(ErrorEvent {
                    id: id.clone(),
                    message,
                    kind,
                })
            }
        };

        if self.opened {
            if let Some(progress) = self.reporter.flush(self.downloaded, self.total, Instant::now()) {
                self.snapshot.write().speed = progress.speed;
                self.events.emit(&DownloadEvent::Progress(progress));
            }
        }
        self.events.emit(&event);
        self.registry.remove(&id);
    }

    async fn discard_partial(&mut self) {
        if self.partial_files == PartialFilePolicy::Keep {
            return;
        }
        if let Some(path) = self.partial.take() {
            remove_partial(&path).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use parking_lot::Mutex;

    /// Serves a fixed list of chunks.
    struct Chunks {
        total: Total,
        chunks: Vec<std::result::Result<Bytes, String>>,
    }

    #[async_trait]
    impl Transport for Chunks {
        async fn open(&self, _request: &DownloadRequest) -> Result<TransportStream> {
            let chunks: Vec<Result<Bytes>> = self
                .chunks
                .iter()
                .map(|c| c.clone().map_err(Error::Network))
                .collect();
            Ok(TransportStream::new(self.total, stream::iter(chunks).boxed()))
        }
    }

    struct Harness {
        registry: Arc<Registry>,
        events: EventChannel,
        seen: Arc<Mutex<Vec<DownloadEvent>>>,
        dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let events = EventChannel::new();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = seen.clone();
            let _all = events.subscribe_all(move |e| sink.lock().push(e.clone()));
            Self {
                registry: Arc::new(Registry::default()),
                events,
                seen,
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn task(&self, id: &str, transport: impl Transport) -> (DownloadTask, CancellationToken) {
            let request = DownloadRequest::new(id, "http://example.com/f", self.dir.path(), "f.bin")
                .unwrap();
            let (token, snapshot) = self.registry.insert(id, &request.destination()).unwrap();
            let task = DownloadTask::new(
                request,
                token.clone(),
                snapshot,
                Arc::new(transport),
                self.events.clone(),
                Arc::clone(&self.registry),
                &ManagerConfig::default(),
            );
            (task, token)
        }

        fn kinds(&self) -> Vec<EventKind> {
            self.seen.lock().iter().map(DownloadEvent::kind).collect()
        }
    }

    #[tokio::test]
    async fn test_completes_and_reports_final_counters() {
        let harness = Harness::new();
        let transport = Chunks {
            total: Total::Known(6),
            chunks: vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))],
        };
        let (task, _) = harness.task("a", transport);
        task.run().await;

        let seen = harness.seen.lock().clone();
        let last_progress = seen
            .iter()
            .rev()
            .find_map(|e| match e {
                DownloadEvent::Progress(p) => Some(p.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_progress.downloaded, 6);
        match seen.last().unwrap() {
            DownloadEvent::Completed(c) => {
                assert!(c.path.ends_with("f.bin"));
                assert_eq!(std::fs::read(&c.path).unwrap(), b"abcdef");
            }
            other => panic!("unexpected terminal event {other:?}"),
        }
        assert_eq!(harness.registry.len(), 0);
    }

    #[tokio::test]
    async fn test_cancel_before_start_does_no_work() {
        let harness = Harness::new();
        let transport = Chunks {
            total: Total::Known(3),
            chunks: vec![Ok(Bytes::from_static(b"abc"))],
        };
        let (task, token) = harness.task("a", transport);
        token.cancel();
        task.run().await;

        assert_eq!(harness.kinds(), vec![EventKind::Cancelled]);
        assert!(!harness.dir.path().join("f.bin").exists());
    }

    #[tokio::test]
    async fn test_short_body_fails_and_removes_partial_file() {
        let harness = Harness::new();
        let transport = Chunks {
            total: Total::Known(10),
            chunks: vec![Ok(Bytes::from_static(b"abc"))],
        };
        let (task, _) = harness.task("a", transport);
        task.run().await;

        match harness.seen.lock().last().unwrap() {
            DownloadEvent::Error(e) => {
                assert_eq!(e.kind, FailureKind::Network);
                assert!(e.message.contains("3 of 10"), "{}", e.message);
            }
            other => panic!("unexpected terminal event {other:?}"),
        }
        assert!(!harness.dir.path().join("f.bin").exists());
    }

    #[tokio::test]
    async fn test_oversized_body_fails_without_exceeding_total() {
        let harness = Harness::new();
        let transport = Chunks {
            total: Total::Known(4),
            chunks: vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))],
        };
        let (task, _) = harness.task("a", transport);
        task.run().await;

        let seen = harness.seen.lock().clone();
        for event in &seen {
            if let DownloadEvent::Progress(p) = event {
                assert!(p.downloaded <= 4);
            }
        }
        assert_eq!(seen.last().unwrap().kind(), EventKind::Error);
    }

    #[tokio::test]
    async fn test_unknown_total_completes_with_whatever_arrives() {
        let harness = Harness::new();
        let transport = Chunks {
            total: Total::Unknown,
            chunks: vec![Ok(Bytes::from_static(b"abcd"))],
        };
        let (task, _) = harness.task("a", transport);
        task.run().await;

        let seen = harness.seen.lock().clone();
        assert!(seen.iter().any(|e| matches!(
            e,
            DownloadEvent::Progress(p) if p.total == Total::Unknown && p.downloaded == 4
        )));
        assert_eq!(seen.last().unwrap().kind(), EventKind::Completed);
    }

    #[tokio::test]
    async fn test_stream_error_is_reported_once() {
        let harness = Harness::new();
        let transport = Chunks {
            total: Total::Unknown,
            chunks: vec![
                Ok(Bytes::from_static(b"abc")),
                Err("connection reset".to_string()),
            ],
        };
        let (task, _) = harness.task("a", transport);
        task.run().await;

        let kinds = harness.kinds();
        assert_eq!(kinds.iter().filter(|k| **k != EventKind::Progress).count(), 1);
        assert_eq!(kinds.last(), Some(&EventKind::Error));
    }
}
