#![no_std]

pub mod color;
pub mod engine;
pub mod error;
pub mod frame;
pub mod frame_clock;
pub mod speed;
pub mod transport;

pub use color::Rgb;
pub use engine::{
    AnimationEngine, AnimationSpec, EngineConfig, EngineState, FrameObserver, TickOutcome,
};
pub use error::{EngineError, ObserverError, PayloadError, TransportError};
pub use frame::{ARM_COUNT, AnimationKind, ArmPreset, Frame, StripEffect};
pub use frame_clock::{FrameClock, TimerFrameClock};
pub use speed::cycle_for_percent;
pub use transport::{
    DeviceLink, PacingConfig, TransportDiscipline, TransportWriter, WriteOutcome,
};

pub use embassy_time::{Duration, Instant};
