use embassy_time::Duration;

use super::pacing::PacingConfig;

/// How writes reach the hardware
///
/// Chosen once when the writer is created for a connected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportDiscipline {
    /// Writes are issued without waiting for an acknowledgement.
    ///
    /// Many writes may be outstanding; the hardware silently drops the ones
    /// it cannot process.
    FireAndForget,
    /// Writes are strictly serialized.
    ///
    /// Each write starts only after the previous one was acknowledged (or
    /// canceled) and its settle delay has passed.
    OrderedAcknowledged,
}

impl TransportDiscipline {
    /// Whether callers should await each write before issuing the next
    pub const fn waits_for_ack(self) -> bool {
        matches!(self, Self::OrderedAcknowledged)
    }

    /// Pacing interval to use when an animation asks for `cycle`
    ///
    /// Acknowledged links restart from the slowest interval and let
    /// acknowledgement latency tune it down.
    pub fn pacing_for_cycle(self, cycle: Duration, config: &PacingConfig) -> Duration {
        match self {
            Self::FireAndForget => config.interval_for_cycle(cycle),
            Self::OrderedAcknowledged => config.max_interval,
        }
    }
}
