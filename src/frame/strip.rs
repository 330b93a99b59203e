//! Single-strip effects
//!
//! Each effect maps a base color and a cycle position to one color.
//! Effects never brighten the base: every channel stays within
//! `0..=base` for all `t` in `0.0..=1.0`.

use core::f64::consts::PI;

use crate::color::{BLACK, Rgb, scaled};

const EFFECT_NAME_PULSE: &str = "pulse";
const EFFECT_NAME_WAVE: &str = "wave";
const EFFECT_NAME_STROBE: &str = "strobe";
const EFFECT_NAME_MIX: &str = "mix";
const EFFECT_NAME_SOLID: &str = "solid";

/// Strobe stays dark up to this cycle position
const STROBE_DARK_UNTIL: f64 = 0.2;
/// Exponent applied to the wave envelope
const WAVE_GAMMA: f64 = 1.05;

/// Known single-strip effects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripEffect {
    /// Raised-cosine fade in and out
    Pulse,
    /// Sine envelope with a slight gamma
    Wave,
    /// Dark for the first fifth of the cycle, then full color
    Strobe,
    /// Pulse, wave and strobe, one third of the cycle each
    Mix,
    /// Base color, unchanged
    Solid,
}

impl StripEffect {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pulse => EFFECT_NAME_PULSE,
            Self::Wave => EFFECT_NAME_WAVE,
            Self::Strobe => EFFECT_NAME_STROBE,
            Self::Mix => EFFECT_NAME_MIX,
            Self::Solid => EFFECT_NAME_SOLID,
        }
    }

    /// Parse an effect name, ignoring ASCII case
    pub fn parse_from_str(s: &str) -> Option<Self> {
        [
            Self::Pulse,
            Self::Wave,
            Self::Strobe,
            Self::Mix,
            Self::Solid,
        ]
        .into_iter()
        .find(|effect| effect.as_str().eq_ignore_ascii_case(s))
    }

    /// Parse an effect name, falling back to [`StripEffect::Solid`]
    pub fn from_name(s: &str) -> Self {
        Self::parse_from_str(s).unwrap_or(Self::Solid)
    }

    /// Color of the effect at cycle position `t`
    pub fn color_at(self, base: Rgb, t: f64) -> Rgb {
        match self {
            Self::Pulse => pulse(base, t),
            Self::Wave => wave(base, t),
            Self::Strobe => strobe(base, t),
            Self::Mix => mix(base, t),
            Self::Solid => base,
        }
    }
}

fn pulse(base: Rgb, t: f64) -> Rgb {
    let level = 0.5 * (1.0 - libm::cos(2.0 * PI * t));
    scaled(base, level)
}

fn wave(base: Rgb, t: f64) -> Rgb {
    let level = (libm::sin(2.0 * PI * t - PI / 2.0) + 1.0) / 2.0;
    // powf of a tiny negative rounding error would be NaN
    scaled(base, libm::pow(level.clamp(0.0, 1.0), WAVE_GAMMA))
}

fn strobe(base: Rgb, t: f64) -> Rgb {
    if t <= STROBE_DARK_UNTIL { BLACK } else { base }
}

fn mix(base: Rgb, t: f64) -> Rgb {
    let scaled_t = t * 3.0;
    let segment = libm::floor(scaled_t);
    let local = scaled_t - segment;

    #[allow(clippy::cast_possible_truncation)]
    match segment as i64 {
        0 => pulse(base, local),
        1 => wave(base, local),
        _ => strobe(base, local),
    }
}
