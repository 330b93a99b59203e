//! Error types
//!
//! None of these are fatal: the worst outcome of any of them is a skipped
//! frame write.

use core::fmt::Debug;

use thiserror::Error;

/// Error returned by the transport writer
#[derive(Debug, Error)]
pub enum TransportError<E: Debug> {
    /// The device link refused the write. The writer does not retry.
    #[error("device rejected the write: {0:?}")]
    Rejected(E),
}

/// Error reported by a frame observer
///
/// Observer failures are logged and never stop the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame observer failed: {0}")]
pub struct ObserverError(pub &'static str);

/// Error returned when a run cannot be started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Palette rotation needs at least one color.
    #[error("palette is empty")]
    EmptyPalette,
    /// Palette holds more colors than a run can store.
    #[error("palette has {len} colors, at most {max} are supported")]
    PaletteTooLong { len: usize, max: usize },
}

/// Error returned when encoding a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// More arm colors than the fixture has arms.
    #[error("{0} arm colors given, the fixture has 4 arms")]
    TooManyArms(usize),
}
