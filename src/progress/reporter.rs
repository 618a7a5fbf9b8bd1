//! Throttling of byte counters into progress events.

use super::speed::SpeedEstimator;
use crate::download::Total;
use crate::events::ProgressEvent;

use std::time::{Duration, Instant};

/// Turns the per-chunk byte counter of one download into a bounded number of
/// [`ProgressEvent`]s.
///
/// At most one event is produced per `interval`; the first update always
/// produces one. [`ProgressReporter::flush`] produces the final counters so
/// that they can be emitted right before the terminal event.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    id: String,
    interval: Duration,
    speed: SpeedEstimator,
    last_emit: Option<Instant>,
    reported: Option<u64>,
}

impl ProgressReporter {
    pub fn new(id: impl Into<String>, interval: Duration, smoothing: Duration) -> Self {
        Self {
            id: id.into(),
            interval,
            speed: SpeedEstimator::new(smoothing),
            last_emit: None,
            reported: None,
        }
    }

    /// Mark the moment bytes start flowing; throughput is measured from here.
    pub fn start(&mut self, now: Instant) {
        self.speed.sample(now, 0);
    }

    /// Record the counter after a chunk. Returns an event when one is due.
    pub fn update(&mut self, downloaded: u64, total: Total, now: Instant) -> Option<ProgressEvent> {
        if let Some(last) = self.last_emit {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        Some(self.emit(downloaded, total, now))
    }

    /// Final counters, unless the last emitted event already carried them.
    pub fn flush(&mut self, downloaded: u64, total: Total, now: Instant) -> Option<ProgressEvent> {
        if self.reported == Some(downloaded) {
            return None;
        }
        Some(self.emit(downloaded, total, now))
    }

    /// Latest smoothed throughput in bytes per second.
    pub fn speed(&self) -> f64 {
        self.speed.rate()
    }

    fn emit(&mut self, downloaded: u64, total: Total, now: Instant) -> ProgressEvent {
        let speed = self.speed.sample(now, downloaded);
        self.last_emit = Some(now);
        self.reported = Some(downloaded);
        ProgressEvent {
            id: self.id.clone(),
            downloaded,
            total,
            speed,
        }
    }
}
