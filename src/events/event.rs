//! Lifecycle events of a download.

use crate::download::Total;
use crate::error::FailureKind;

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Periodic byte counters of one download.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub id: String,
    pub downloaded: u64,
    pub total: Total,
    /// Smoothed throughput in bytes per second.
    pub speed: f64,
}

/// The file is complete on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedEvent {
    pub id: String,
    /// Serialized lossily; paths that are not valid UTF-8 still produce a payload.
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
}

fn lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// The download failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub id: String,
    /// Human-readable description of the failure.
    pub message: String,
    pub kind: FailureKind,
}

/// The download stopped on user request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledEvent {
    pub id: String,
}

/// Any event emitted for a download.
///
/// For a given id, zero or more `Progress` events are followed by exactly one
/// terminal event, after which nothing else is emitted for that id.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress(ProgressEvent),
    Completed(CompletedEvent),
    Error(ErrorEvent),
    Cancelled(CancelledEvent),
}

impl DownloadEvent {
    /// Id of the originating download.
    pub fn id(&self) -> &str {
        match self {
            DownloadEvent::Progress(e) => &e.id,
            DownloadEvent::Completed(e) => &e.id,
            DownloadEvent::Error(e) => &e.id,
            DownloadEvent::Cancelled(e) => &e.id,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            DownloadEvent::Progress(_) => EventKind::Progress,
            DownloadEvent::Completed(_) => EventKind::Completed,
            DownloadEvent::Error(_) => EventKind::Error,
            DownloadEvent::Cancelled(_) => EventKind::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind() != EventKind::Progress
    }
}

/// Kind of a [`DownloadEvent`], the unit of subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Progress,
    Completed,
    Error,
    Cancelled,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Progress,
        EventKind::Completed,
        EventKind::Error,
        EventKind::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Progress => "progress",
            EventKind::Completed => "completed",
            EventKind::Error => "error",
            EventKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
