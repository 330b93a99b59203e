use embassy_time::Duration;

/// Cycle length at 0% speed
pub const SLOWEST_CYCLE: Duration = Duration::from_millis(2000);
/// Cycle length at 100% speed
pub const FASTEST_CYCLE: Duration = Duration::from_millis(200);

/// Map a speed percentage (0-100) to a cycle length
///
/// 0% is the slowest cycle, 100% the fastest; values above 100 are clamped.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn cycle_for_percent(percent: u8) -> Duration {
    let slowest = SLOWEST_CYCLE.as_millis() as f64;
    let fastest = FASTEST_CYCLE.as_millis() as f64;
    let fraction = f64::from(percent.min(100)) / 100.0;
    Duration::from_millis(libm::round(slowest - fraction * (slowest - fastest)) as u64)
}
