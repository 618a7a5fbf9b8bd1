//! Error handling for the haul library.
//!
//! This module provides centralized error handling for everything that can go
//! wrong around a download: synchronous rejections of `start`/`cancel` calls
//! and the transfer-level failures reported asynchronously through the
//! `error` event.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can happen when using haul.
#[derive(Error, Debug)]
pub enum Error {
    /// `start` was called with an id already bound to an active download.
    #[error("a download with id `{0}` is already active")]
    DuplicateActiveDownload(String),

    /// `cancel` was called with an id that names no active download.
    #[error("no active download with id `{0}`")]
    NotFound(String),

    /// `start` was called with a destination file another active download
    /// is already writing.
    #[error("{} is already the destination of active download `{id}`", path.display())]
    DestinationInUse {
        /// Destination path claimed twice.
        path: PathBuf,
        /// Id of the download holding it.
        id: String,
    },

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request was rejected before any work was scheduled.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, DNS or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// A single network call exceeded its wall-clock ceiling.
    #[error("network call timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream server answered with a non-success status.
    #[error("server responded with {status} for {url}")]
    HttpStatus {
        /// Status returned by the server.
        status: StatusCode,
        /// URL that was requested.
        url: String,
    },

    /// The destination could not be created or written.
    #[error("cannot write {}: {source}", path.display())]
    Filesystem {
        /// Destination path involved in the failure.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The user asked for the download to stop.
    ///
    /// Never reported through the `error` event, only through `cancelled`.
    #[error("download cancelled by user")]
    CancelledByUser,

    /// The manager has been shut down and accepts no new downloads.
    #[error("the download manager is shut down")]
    ManagerClosed,

    /// Error from the Reqwest library while building the HTTP client.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from an underlying system.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of the failures reported via the `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    Network,
    Timeout,
    HttpStatus,
    Filesystem,
    Internal,
}

impl Error {
    /// Build a [`Error::Filesystem`] for `path`.
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Returns the failure class of a transfer-level error.
    ///
    /// Synchronous rejections and user cancellation return `None`: they never
    /// end up in an `error` event.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Network(_) | Error::Reqwest { .. } => Some(FailureKind::Network),
            Error::Timeout(_) => Some(FailureKind::Timeout),
            Error::HttpStatus { .. } => Some(FailureKind::HttpStatus),
            Error::Filesystem { .. } => Some(FailureKind::Filesystem),
            Error::Internal(_) => Some(FailureKind::Internal),
            Error::DuplicateActiveDownload(_)
            | Error::NotFound(_)
            | Error::DestinationInUse { .. }
            | Error::InvalidUrl(_)
            | Error::InvalidRequest(_)
            | Error::CancelledByUser
            | Error::ManagerClosed => None,
        }
    }

    /// Whether this error stands for a user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::CancelledByUser)
    }
}

/// Renders an error and its source chain on a single line.
pub fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Result type alias for operations that can fail with a haul error.
pub type Result<T> = std::result::Result<T, Error>;
