//! Smoothed throughput estimation.

use std::time::{Duration, Instant};

/// Exponentially weighted transfer rate.
///
/// Each sample computes the rate over the bytes observed since the previous
/// sample and blends it into the running estimate with a weight that depends
/// on the elapsed time: `alpha = 1 - exp(-dt / time_constant)`. Short gaps
/// barely move the estimate, long gaps mostly replace it, so the reported
/// speed does not jump around with per-chunk noise.
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    time_constant: Duration,
    last: Option<(Instant, u64)>,
    rate: Option<f64>,
}

impl SpeedEstimator {
    pub fn new(time_constant: Duration) -> Self {
        Self {
            time_constant,
            last: None,
            rate: None,
        }
    }

    /// Feed the byte counter observed at `now` and return the updated rate in
    /// bytes per second.
    pub fn sample(&mut self, now: Instant, downloaded: u64) -> f64 {
        let Some((then, previous)) = self.last else {
            self.last = Some((now, downloaded));
            return self.rate();
        };

        let dt = now.saturating_duration_since(then).as_secs_f64();
        if dt <= 0.0 {
            return self.rate();
        }

        let observed = downloaded.saturating_sub(previous) as f64 / dt;
        let tau = self.time_constant.as_secs_f64();
        let rate = match self.rate {
            Some(rate) if tau > 0.0 => {
                let alpha = 1.0 - (-dt / tau).exp();
                rate + alpha * (observed - rate)
            }
            _ => observed,
        };

        self.rate = Some(rate);
        self.last = Some((now, downloaded));
        rate
    }

    /// Current estimate, `0.0` until two samples have been seen.
    pub fn rate(&self) -> f64 {
        self.rate.unwrap_or(0.0)
    }
}
