//! Multi-arm presets
//!
//! Presets render four colors at once. Except for [`ArmPreset::Solid`], every
//! preset uses its own palette scaled by `brightness / 100`; the base color of
//! the run is ignored.

use core::f64::consts::PI;

use embassy_time::Duration;

use crate::color::{Rgb, clamp_channel, rgb_from_u32, scaled};

/// Number of arms on the fixture
pub const ARM_COUNT: usize = 4;

/// Chase steps per cycle for the chase presets
const CHASE_STEPS_PER_CYCLE: u64 = 16;
/// Kalahari runs its channel waves this many times per cycle
const KALAHARI_SPEED_FACTOR: f64 = 6.0;
/// Phase offsets of the red, green and blue waves (radians)
const KALAHARI_PHASES: [f64; 3] = [0.0, 2.0, 4.0];

const PRESET_NAME_KALAHARI: &str = "kalahari";
const PRESET_NAME_PATAGONIAN: &str = "patagonian";
const PRESET_NAME_CHALBI: &str = "chalbi";
const PRESET_NAME_THAR: &str = "thar";
const PRESET_NAME_SOLID: &str = "solid";

// Unscaled palette shared by the chase presets
const PURPLE: Rgb = rgb_from_u32(0x80_00_80);
const RED: Rgb = rgb_from_u32(0xff_00_00);
const DARK_BLUE: Rgb = rgb_from_u32(0x00_00_50);
const AQUA: Rgb = rgb_from_u32(0x00_b4_b4);
const GREEN: Rgb = rgb_from_u32(0x00_ff_00);
const DARK_PURPLE: Rgb = rgb_from_u32(0x46_14_5a);
const SKY_BLUE: Rgb = rgb_from_u32(0x00_32_ff);
const SUN_YELLOW: Rgb = rgb_from_u32(0xff_dc_00);
const BLUE: Rgb = rgb_from_u32(0x00_00_ff);
const AMBER: Rgb = rgb_from_u32(0xff_c8_00);

/// (background, chase) per quarter of the cycle
const PATAGONIAN_PHASES: [(Rgb, Rgb); 4] = [
    (PURPLE, RED),
    (RED, DARK_PURPLE),
    (DARK_BLUE, RED),
    (AQUA, GREEN),
];

/// (background, chase) per half of the cycle
const CHALBI_PHASES: [(Rgb, Rgb); 2] = [(SKY_BLUE, SUN_YELLOW), (SUN_YELLOW, SKY_BLUE)];

/// Alternating color pairs per third of the cycle
const THAR_COMBOS: [(Rgb, Rgb); 3] = [(BLUE, RED), (GREEN, PURPLE), (RED, AMBER)];

/// Known multi-arm presets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmPreset {
    /// Independent sine waves per channel, same color on every arm
    Kalahari,
    /// Four background/chase phases with a single chasing arm
    Patagonian,
    /// Blue/yellow chase that swaps halfway through the cycle
    Chalbi,
    /// Alternating color pairs rotating around the fixture
    Thar,
    /// Base color on every arm, brightness ignored
    Solid,
}

impl ArmPreset {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kalahari => PRESET_NAME_KALAHARI,
            Self::Patagonian => PRESET_NAME_PATAGONIAN,
            Self::Chalbi => PRESET_NAME_CHALBI,
            Self::Thar => PRESET_NAME_THAR,
            Self::Solid => PRESET_NAME_SOLID,
        }
    }

    /// Parse a preset name, ignoring ASCII case
    pub fn parse_from_str(s: &str) -> Option<Self> {
        [
            Self::Kalahari,
            Self::Patagonian,
            Self::Chalbi,
            Self::Thar,
            Self::Solid,
        ]
        .into_iter()
        .find(|preset| preset.as_str().eq_ignore_ascii_case(s))
    }

    /// Parse a preset name; unknown names render as [`ArmPreset::Solid`]
    pub fn from_name(s: &str) -> Self {
        Self::parse_from_str(s).unwrap_or(Self::Solid)
    }

    /// Colors of all arms at cycle position `t`
    pub fn arms_at(
        self,
        base: Rgb,
        brightness: u8,
        t: f64,
        elapsed: Duration,
        cycle: Duration,
    ) -> [Rgb; ARM_COUNT] {
        let scale = f64::from(brightness) / 100.0;
        match self {
            Self::Kalahari => [kalahari(scale, t); ARM_COUNT],
            Self::Patagonian => {
                let (background, chase) = PATAGONIAN_PHASES[phase_index(t, 4).min(3)];
                chase_arms(
                    scaled(background, scale),
                    scaled(chase, scale),
                    chase_index(elapsed, cycle),
                )
            }
            Self::Chalbi => {
                let (background, chase) = CHALBI_PHASES[phase_index(t, 2).min(1)];
                chase_arms(
                    scaled(background, scale),
                    scaled(chase, scale),
                    chase_index(elapsed, cycle),
                )
            }
            Self::Thar => {
                // end of cycle wraps back to the first pair
                let (first, second) = THAR_COMBOS[phase_index(t, 3) % 3];
                rotated_pairs(
                    scaled(first, scale),
                    scaled(second, scale),
                    chase_index(elapsed, cycle),
                )
            }
            Self::Solid => [base; ARM_COUNT],
        }
    }
}

/// Arm highlighted by the chase presets
///
/// Advances every `cycle / 16` and wraps around the four arms.
#[allow(clippy::cast_possible_truncation)]
pub fn chase_index(elapsed: Duration, cycle: Duration) -> usize {
    let cycle_us = cycle.as_micros().max(1);
    let step = elapsed.as_micros() * CHASE_STEPS_PER_CYCLE / cycle_us;
    (step % ARM_COUNT as u64) as usize
}

/// `floor(t * phases)`; `t == 1.0` yields `phases`
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn phase_index(t: f64, phases: usize) -> usize {
    libm::floor(t.max(0.0) * phases as f64) as usize
}

fn kalahari(scale: f64, t: f64) -> Rgb {
    let angle = 2.0 * PI * t * KALAHARI_SPEED_FACTOR;
    let [r, g, b] = KALAHARI_PHASES.map(|phase| {
        let level = clamp_channel((libm::sin(angle + phase) * 0.5 + 0.5) * 255.0);
        clamp_channel(f64::from(level) * scale)
    });
    Rgb { r, g, b }
}

fn chase_arms(background: Rgb, chase: Rgb, index: usize) -> [Rgb; ARM_COUNT] {
    let mut arms = [background; ARM_COUNT];
    arms[index] = chase;
    arms
}

fn rotated_pairs(first: Rgb, second: Rgb, shift: usize) -> [Rgb; ARM_COUNT] {
    let pattern = [first, second, first, second];
    core::array::from_fn(|i| pattern[(i + ARM_COUNT - shift) % ARM_COUNT])
}
