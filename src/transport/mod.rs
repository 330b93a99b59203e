//! Transport writer
//!
//! Owns the hardware write discipline for one connected device and hides the
//! difference between acknowledged and fire-and-forget links from the
//! animation engine.

mod discipline;
mod pacing;
pub mod payload;
mod writer;

use core::fmt::Debug;
use core::future::Future;

pub use discipline::TransportDiscipline;
pub use pacing::{LatencyBand, LatencyEstimator, PacingConfig, SpeedBucket};
pub use writer::TransportWriter;

use crate::color::Rgb;
use crate::frame::ARM_COUNT;

/// Connected-device handle
///
/// Implement this trait on top of the platform BLE stack. Unacknowledged
/// writes return once the write is queued; acknowledged writes resolve when
/// the device confirms the write.
pub trait DeviceLink {
    /// Error raised when the link refuses a write
    type Error: Debug;

    /// Write one color without waiting for an acknowledgement
    fn write_color_unacked(&mut self, color: Rgb) -> Result<(), Self::Error>;

    /// Write one color and wait for the acknowledgement
    fn write_color_acked(&mut self, color: Rgb) -> impl Future<Output = Result<(), Self::Error>>;

    /// Write all arm colors without waiting for an acknowledgement
    fn write_arms_unacked(&mut self, arms: &[Rgb; ARM_COUNT]) -> Result<(), Self::Error>;

    /// Write all arm colors and wait for the acknowledgement
    fn write_arms_acked(
        &mut self,
        arms: &[Rgb; ARM_COUNT],
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Result of a successful write call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Issued without acknowledgement
    Sent,
    /// Acknowledged by the device and settled
    Acknowledged,
    /// Skipped or cut short by cancellation; nothing to do
    Canceled,
}
