//! Shared test infrastructure for the integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arm_light_animator::{ARM_COUNT, DeviceLink, Frame, Rgb};
use embassy_time::{Duration, Timer};

// ============================================================================
// Colors
// ============================================================================

pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

// ============================================================================
// Mock Device Link
// ============================================================================

/// Write as seen by the mock device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub frame: Frame,
    pub acked: bool,
}

/// State shared between a [`MockLink`] and the test
#[derive(Debug, Default)]
pub struct LinkProbe {
    writes: Mutex<Vec<Written>>,
    /// Acknowledged writes never resolve while set
    hang: AtomicBool,
    /// Every write is refused while set
    reject: AtomicBool,
    /// Delay before acknowledging, in milliseconds
    ack_delay_ms: AtomicUsize,
}

impl LinkProbe {
    pub fn writes(&self) -> Vec<Written> {
        self.writes.lock().unwrap().clone()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.writes().into_iter().map(|w| w.frame).collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn set_ack_delay(&self, delay: Duration) {
        self.ack_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    fn record(&self, frame: Frame, acked: bool) -> Result<(), MockLinkError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(MockLinkError);
        }
        self.writes.lock().unwrap().push(Written { frame, acked });
        Ok(())
    }

    async fn acknowledge(&self) {
        let delay = self.ack_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            Timer::after(Duration::from_millis(delay as u64)).await;
        }
        if self.hang.load(Ordering::SeqCst) {
            core::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLinkError;

/// Device link that records every write
pub struct MockLink {
    probe: Arc<LinkProbe>,
}

impl MockLink {
    pub fn new() -> (Self, Arc<LinkProbe>) {
        let probe = Arc::new(LinkProbe::default());
        (
            Self {
                probe: Arc::clone(&probe),
            },
            probe,
        )
    }
}

impl DeviceLink for MockLink {
    type Error = MockLinkError;

    fn write_color_unacked(&mut self, color: Rgb) -> Result<(), Self::Error> {
        self.probe.record(Frame::Single(color), false)
    }

    async fn write_color_acked(&mut self, color: Rgb) -> Result<(), Self::Error> {
        self.probe.record(Frame::Single(color), true)?;
        self.probe.acknowledge().await;
        Ok(())
    }

    fn write_arms_unacked(&mut self, arms: &[Rgb; ARM_COUNT]) -> Result<(), Self::Error> {
        self.probe.record(Frame::Arms(*arms), false)
    }

    async fn write_arms_acked(&mut self, arms: &[Rgb; ARM_COUNT]) -> Result<(), Self::Error> {
        self.probe.record(Frame::Arms(*arms), true)?;
        self.probe.acknowledge().await;
        Ok(())
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two colors channel by channel with a tolerance
pub fn colors_close(a: Rgb, b: Rgb, tolerance: u8) -> bool {
    a.r.abs_diff(b.r) <= tolerance && a.g.abs_diff(b.g) <= tolerance && a.b.abs_diff(b.b) <= tolerance
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
