//! Write pacing
//!
//! The pacing interval is the minimum time between two write attempts.
//! Acknowledged links derive it from the observed acknowledgement latency;
//! fire-and-forget links derive it from the animation speed.

use embassy_time::Duration;

/// Latency band: averages below `below` map to `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBand {
    pub below: Duration,
    pub interval: Duration,
}

/// Speed bucket: cycles up to `up_to` map to `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedBucket {
    pub up_to: Duration,
    pub interval: Duration,
}

/// Tuning of the transport writer
///
/// The defaults are empirically tuned for BLE links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingConfig {
    /// Pacing interval before any speed or latency is known
    pub initial_interval: Duration,
    /// Pause after an acknowledged write before the next one may start
    pub settle_delay: Duration,
    /// Starting point of the latency average
    pub initial_ack_latency: Duration,
    /// Weight of the previous average when a new sample arrives (0.0-1.0)
    pub history_weight: f64,
    /// Latency bands, checked in order
    pub latency_bands: [LatencyBand; 4],
    /// Interval for averages above every band
    pub slowest_interval: Duration,
    /// Lower bound of the adaptive interval
    pub min_interval: Duration,
    /// Upper bound of the adaptive interval
    pub max_interval: Duration,
    /// Fire-and-forget speed buckets, checked in order
    pub speed_buckets: [SpeedBucket; 2],
    /// Fire-and-forget interval for cycles longer than every bucket
    pub slow_cycle_interval: Duration,
}

impl PacingConfig {
    pub const DEFAULT: Self = Self {
        initial_interval: Duration::from_millis(50),
        settle_delay: Duration::from_millis(25),
        initial_ack_latency: Duration::from_millis(200),
        history_weight: 0.7,
        latency_bands: [
            LatencyBand {
                below: Duration::from_millis(60),
                interval: Duration::from_millis(120),
            },
            LatencyBand {
                below: Duration::from_millis(120),
                interval: Duration::from_millis(180),
            },
            LatencyBand {
                below: Duration::from_millis(200),
                interval: Duration::from_millis(250),
            },
            LatencyBand {
                below: Duration::from_millis(300),
                interval: Duration::from_millis(300),
            },
        ],
        slowest_interval: Duration::from_millis(350),
        min_interval: Duration::from_millis(120),
        max_interval: Duration::from_millis(350),
        speed_buckets: [
            SpeedBucket {
                up_to: Duration::from_millis(300),
                interval: Duration::from_millis(30),
            },
            SpeedBucket {
                up_to: Duration::from_millis(600),
                interval: Duration::from_millis(40),
            },
        ],
        slow_cycle_interval: Duration::from_millis(50),
    };

    /// Map an average acknowledgement latency to a pacing interval
    ///
    /// The result is clamped to `min_interval..=max_interval`.
    pub fn interval_for_latency(&self, average: Duration) -> Duration {
        let interval = self
            .latency_bands
            .iter()
            .find(|band| average < band.below)
            .map_or(self.slowest_interval, |band| band.interval);
        interval.max(self.min_interval).min(self.max_interval)
    }

    /// Map a requested cycle length to a fire-and-forget pacing interval
    pub fn interval_for_cycle(&self, cycle: Duration) -> Duration {
        self.speed_buckets
            .iter()
            .find(|bucket| cycle <= bucket.up_to)
            .map_or(self.slow_cycle_interval, |bucket| bucket.interval)
            .max(Duration::from_millis(1))
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Exponential moving average of acknowledgement latency
#[derive(Debug, Clone, Copy)]
pub struct LatencyEstimator {
    average_us: f64,
    history_weight: f64,
}

impl LatencyEstimator {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(initial: Duration, history_weight: f64) -> Self {
        Self {
            average_us: initial.as_micros() as f64,
            history_weight: history_weight.clamp(0.0, 1.0),
        }
    }

    /// Fold a new sample into the average and return the updated average
    #[allow(clippy::cast_precision_loss)]
    pub fn observe(&mut self, sample: Duration) -> Duration {
        self.average_us = self.history_weight * self.average_us
            + (1.0 - self.history_weight) * sample.as_micros() as f64;
        self.average()
    }

    /// Current average
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn average(&self) -> Duration {
        Duration::from_micros(libm::round(self.average_us).max(0.0) as u64)
    }
}
