//! Frame math
//!
//! Pure functions that turn an animation kind, a base color, a brightness and
//! a position inside the current cycle into the color(s) of one frame.
//! Nothing in here reads a clock or touches hardware: identical inputs always
//! produce identical frames.

mod arms;
mod strip;

use embassy_time::Duration;

pub use arms::{ARM_COUNT, ArmPreset, chase_index};
pub use strip::StripEffect;

use crate::color::Rgb;

/// Colors of a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// One color for the whole strip
    Single(Rgb),
    /// One color per arm of the fixture
    Arms([Rgb; ARM_COUNT]),
}

impl Frame {
    /// All colors of the frame, in arm order
    pub fn colors(&self) -> &[Rgb] {
        match self {
            Self::Single(color) => core::slice::from_ref(color),
            Self::Arms(arms) => arms,
        }
    }
}

/// What a run animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Single-strip effect, one color per frame
    SingleStrip(StripEffect),
    /// Multi-arm preset, four colors per frame
    MultiArm(ArmPreset),
}

impl AnimationKind {
    /// Number of independently addressable zones driven by this kind
    pub const fn arm_count(self) -> usize {
        match self {
            Self::SingleStrip(_) => 1,
            Self::MultiArm(_) => ARM_COUNT,
        }
    }
}

/// Normalized position of `elapsed` inside a cycle, capped at 1.0
#[allow(clippy::cast_precision_loss)]
pub fn cycle_position(elapsed: Duration, cycle: Duration) -> f64 {
    let cycle_us = cycle.as_micros();
    if cycle_us == 0 {
        return 1.0;
    }
    (elapsed.as_micros() as f64 / cycle_us as f64).min(1.0)
}

/// Compute the color(s) of one frame
///
/// # Arguments
/// * `kind` - Strip effect or arm preset
/// * `base` - Base color of the run
/// * `brightness` - Brightness percentage (0-100), used by arm presets only
/// * `t` - Normalized position inside the cycle (0.0-1.0)
/// * `elapsed` - Time since the cycle started
/// * `cycle` - Cycle length
pub fn compute_frame(
    kind: AnimationKind,
    base: Rgb,
    brightness: u8,
    t: f64,
    elapsed: Duration,
    cycle: Duration,
) -> Frame {
    match kind {
        AnimationKind::SingleStrip(effect) => Frame::Single(effect.color_at(base, t)),
        AnimationKind::MultiArm(preset) => {
            Frame::Arms(preset.arms_at(base, brightness, t, elapsed, cycle))
        }
    }
}
