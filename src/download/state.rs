//! Download lifecycle state and the observable snapshot of a task.
//!
//! A task starts in [`DownloadState::Pending`], moves to
//! [`DownloadState::Downloading`] once its transport is open and ends in
//! exactly one terminal state. Terminal states are final.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle state of a download task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadState {
    /// Accepted, transport not opened yet.
    Pending,
    /// Transport open, bytes flowing to disk.
    Downloading,
    /// Stream exhausted and file flushed.
    Completed,
    /// Transport or sink failure.
    Failed,
    /// Stopped on user request.
    Cancelled,
}

impl DownloadState {
    /// Returns `true` for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DownloadState::Completed | DownloadState::Failed | DownloadState::Cancelled
        )
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `Pending -> Failed` covers a transport that cannot be opened at all.
    pub fn can_transition_to(self, next: DownloadState) -> bool {
        use DownloadState::*;
        matches!(
            (self, next),
            (Pending, Downloading)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Downloading, Completed)
                | (Downloading, Failed)
                | (Downloading, Cancelled)
        )
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DownloadState::Pending => "pending",
            DownloadState::Downloading => "downloading",
            DownloadState::Completed => "completed",
            DownloadState::Failed => "failed",
            DownloadState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Total size of a download, when the source advertises one.
///
/// Serialized as a plain integer, or `null` when unknown. Consumers must treat
/// `Unknown` as indeterminate, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Total {
    Known(u64),
    #[default]
    Unknown,
}

impl Total {
    /// The known size, if any.
    pub fn known(self) -> Option<u64> {
        match self {
            Total::Known(n) => Some(n),
            Total::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Total::Known(_))
    }
}

impl From<Option<u64>> for Total {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Total::Unknown, Total::Known)
    }
}

impl Serialize for Total {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.known().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Total {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<u64>::deserialize(deserializer).map(Total::from)
    }
}

/// Point-in-time view of a download task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: String,
    pub state: DownloadState,
    /// Bytes written so far. Never decreases.
    pub downloaded: u64,
    pub total: Total,
    /// Smoothed throughput in bytes per second.
    pub speed: f64,
    /// Present only in the `Failed` state.
    pub error: Option<String>,
    /// Present only in the `Completed` state.
    pub path: Option<PathBuf>,
}

impl TaskSnapshot {
    /// Snapshot of a freshly accepted task.
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DownloadState::Pending,
            downloaded: 0,
            total: Total::Unknown,
            speed: 0.0,
            error: None,
            path: None,
        }
    }

    /// Move to `next` if the transition is legal. Returns whether it happened.
    pub(crate) fn advance(&mut self, next: DownloadState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }

    /// Record the byte counter, never letting it go backwards.
    pub(crate) fn record(&mut self, downloaded: u64) {
        self.downloaded = self.downloaded.max(downloaded);
    }

    /// Fraction complete in `[0.0, 1.0]`, `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Total::Known(0) => Some(1.0),
            Total::Known(total) => Some((self.downloaded as f64 / total as f64).min(1.0)),
            Total::Unknown => None,
        }
    }
}
