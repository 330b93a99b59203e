//! Frame scheduling
//!
//! The engine asks a [`FrameClock`] for the next frame and ticks once per
//! frame. Dropping the returned future cancels the scheduled frame.

use core::future::Future;

use embassy_time::{Duration, Instant, Timer};

/// Default target frame rate (60 FPS, one display refresh).
pub const DEFAULT_FPS: u32 = 60;

/// Default frame duration based on target FPS.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_FPS as u64);

/// Per-frame scheduling primitive
pub trait FrameClock {
    /// Wait for the next frame and return its timestamp
    fn next_frame(&mut self) -> impl Future<Output = Instant>;
}

/// Timer-driven frame clock with drift correction
///
/// If the caller falls more than two frames behind, the backlog is skipped
/// instead of being caught up in a burst.
#[derive(Debug, Clone)]
pub struct TimerFrameClock {
    next_frame: Option<Instant>,
    frame_duration: Duration,
}

impl TimerFrameClock {
    /// Create a clock running at [`DEFAULT_FPS`]
    pub const fn new() -> Self {
        Self::with_frame_duration(DEFAULT_FRAME_DURATION)
    }

    /// Create a clock with a custom frame duration
    pub const fn with_frame_duration(frame_duration: Duration) -> Self {
        Self {
            next_frame: None,
            frame_duration,
        }
    }

    /// Create a clock running at `fps` frames per second
    pub fn with_fps(fps: u32) -> Self {
        Self::with_frame_duration(Duration::from_millis(1000 / u64::from(fps.max(1))))
    }

    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Compute and store the deadline of the frame after `now`
    pub fn advance(&mut self, now: Instant) -> Instant {
        let max_drift = self.frame_duration * 2;
        let base = match self.next_frame {
            Some(deadline) if now <= deadline + max_drift => deadline,
            _ => now,
        };
        let deadline = base + self.frame_duration;
        self.next_frame = Some(deadline);
        deadline
    }
}

impl Default for TimerFrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for TimerFrameClock {
    async fn next_frame(&mut self) -> Instant {
        let deadline = self.advance(Instant::now());
        Timer::at(deadline).await;
        deadline
    }
}
