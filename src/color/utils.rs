use core::fmt::Write;

use heapless::String;

use crate::color::Rgb;

/// Fully dark color
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Round a channel value to the nearest integer and clamp it to `0..=255`
///
/// Every color produced by the frame math passes through this step.
/// `NaN` maps to 0.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    libm::round(value).clamp(0.0, 255.0) as u8
}

/// Scale every channel of a color by `factor`
///
/// The result is rounded and clamped, so factors above 1.0 saturate at 255.
#[inline]
pub fn scaled(color: Rgb, factor: f64) -> Rgb {
    Rgb {
        r: clamp_channel(f64::from(color.r) * factor),
        g: clamp_channel(f64::from(color.g) * factor),
        b: clamp_channel(f64::from(color.b) * factor),
    }
}

/// Mix a color with its grey level
///
/// `percent` is the remaining saturation: 100 keeps the color unchanged,
/// 0 yields the grey with the same channel average.
pub fn with_saturation(color: Rgb, percent: u8) -> Rgb {
    let saturation = f64::from(percent.min(100)) / 100.0;
    let (r, g, b) = (f64::from(color.r), f64::from(color.g), f64::from(color.b));
    let gray = (r + g + b) / 3.0;

    Rgb {
        r: clamp_channel(gray + (r - gray) * saturation),
        g: clamp_channel(gray + (g - gray) * saturation),
        b: clamp_channel(gray + (b - gray) * saturation),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Format a color as `#rrggbb`
pub fn hex_code(color: Rgb) -> String<7> {
    let mut out = String::new();
    // 7 bytes always fit
    let _ = write!(out, "#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
    out
}
