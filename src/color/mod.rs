mod utils;

use smart_leds::RGB8;

pub use utils::{BLACK, clamp_channel, hex_code, rgb_from_u32, scaled, with_saturation};

pub type Rgb = RGB8;
