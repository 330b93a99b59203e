//! Byte payloads written to the fixture
//!
//! Helpers for [`DeviceLink`](super::DeviceLink) implementations.

use crate::color::{BLACK, Rgb};
use crate::error::PayloadError;
use crate::frame::ARM_COUNT;

/// Length of a single-color payload
pub const COLOR_PAYLOAD_LEN: usize = 5;
/// Length of an all-arms payload
pub const ARMS_PAYLOAD_LEN: usize = ARM_COUNT * 3;

/// Encode a single color as `[r, g, b, 0, 0]`
pub const fn encode_color(color: Rgb) -> [u8; COLOR_PAYLOAD_LEN] {
    [color.r, color.g, color.b, 0, 0]
}

/// Encode arm colors as consecutive `r, g, b` triplets
///
/// Missing arms are padded with black.
pub fn encode_arms(arms: &[Rgb]) -> Result<[u8; ARMS_PAYLOAD_LEN], PayloadError> {
    if arms.len() > ARM_COUNT {
        return Err(PayloadError::TooManyArms(arms.len()));
    }

    let mut payload = [0; ARMS_PAYLOAD_LEN];
    for (i, chunk) in payload.chunks_exact_mut(3).enumerate() {
        let arm = arms.get(i).copied().unwrap_or(BLACK);
        chunk.copy_from_slice(&[arm.r, arm.g, arm.b]);
    }
    Ok(payload)
}
