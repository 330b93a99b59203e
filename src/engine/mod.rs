//! Animation engine
//!
//! Owns the running flag and drives the per-frame tick loop for one device.
//! Each tick computes a frame, hands it to the observer and, when the pacing
//! gate allows, writes it through the transport writer.

mod observer;
mod run;

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};
use log::{debug, trace, warn};

pub use observer::{FrameObserver, ObserverRef};
pub use run::{AnimationSpec, MAX_PALETTE, Palette};

use run::RunState;

use crate::color::Rgb;
use crate::error::EngineError;
use crate::frame::{AnimationKind, ArmPreset, Frame, StripEffect, compute_frame, cycle_position};
use crate::frame_clock::FrameClock;
use crate::transport::{DeviceLink, TransportWriter};

/// Shortest cycle accepted by the engine
pub const MIN_CYCLE: Duration = Duration::from_millis(50);

/// Brightness used when a run does not specify one
pub const FULL_BRIGHTNESS: u8 = 100;

/// Configuration for the animation engine
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Requested cycles below this are raised to it
    pub min_cycle: Duration,
}

impl EngineConfig {
    pub const DEFAULT: Self = Self {
        min_cycle: MIN_CYCLE,
    };
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the engine is currently animating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    SingleStrip,
    MultiArm,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule the next frame
    Continue,
    /// The run ended; do not schedule another frame
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Started,
    Stopped,
}

struct EngineInner<'a> {
    run: Option<RunState<'a>>,
    next_run_id: u32,
}

/// Frame computed by a tick, carried across the write
struct TickFrame<'a> {
    run_id: u32,
    frame: Frame,
    observer: Option<ObserverRef<'a>>,
    elapsed: Duration,
    cycle: Duration,
}

/// Animation engine for one connected device
///
/// At most one run is active at a time. Starting a run while another is
/// active hard-stops the old one first, so its frames never interleave with
/// the new run's.
pub struct AnimationEngine<'a, L: DeviceLink> {
    writer: &'a TransportWriter<L>,
    config: EngineConfig,
    inner: Mutex<RefCell<EngineInner<'a>>>,
    control: Signal<CriticalSectionRawMutex, Control>,
}

impl<'a, L: DeviceLink> AnimationEngine<'a, L> {
    pub fn new(writer: &'a TransportWriter<L>) -> Self {
        Self::with_config(writer, EngineConfig::DEFAULT)
    }

    pub fn with_config(writer: &'a TransportWriter<L>, config: EngineConfig) -> Self {
        Self {
            writer,
            config,
            inner: Mutex::new(RefCell::new(EngineInner {
                run: None,
                next_run_id: 0,
            })),
            control: Signal::new(),
        }
    }

    pub const fn writer(&self) -> &'a TransportWriter<L> {
        self.writer
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a single-strip effect
    pub fn start_single_strip(
        &self,
        effect: StripEffect,
        base: Rgb,
        cycle: Duration,
        observer: Option<ObserverRef<'a>>,
    ) {
        let spec = AnimationSpec {
            kind: AnimationKind::SingleStrip(effect),
            base,
            cycle,
            brightness: FULL_BRIGHTNESS,
        };
        self.start(spec, Palette::new(), observer);
    }

    /// Start a multi-arm preset
    pub fn start_multi_arm(
        &self,
        preset: ArmPreset,
        base: Rgb,
        cycle: Duration,
        brightness: u8,
        observer: Option<ObserverRef<'a>>,
    ) {
        let spec = AnimationSpec {
            kind: AnimationKind::MultiArm(preset),
            base,
            cycle,
            brightness,
        };
        self.start(spec, Palette::new(), observer);
    }

    /// Start a single-strip effect that moves to the next palette color at
    /// the end of every cycle
    ///
    /// # Errors
    /// Returns an error if the palette is empty or longer than [`MAX_PALETTE`].
    pub fn start_palette_rotation(
        &self,
        effect: StripEffect,
        palette: &[Rgb],
        cycle: Duration,
        observer: Option<ObserverRef<'a>>,
    ) -> Result<(), EngineError> {
        let first = *palette.first().ok_or(EngineError::EmptyPalette)?;
        let colors = Palette::from_slice(palette).map_err(|()| EngineError::PaletteTooLong {
            len: palette.len(),
            max: MAX_PALETTE,
        })?;
        let spec = AnimationSpec {
            kind: AnimationKind::SingleStrip(effect),
            base: first,
            cycle,
            brightness: FULL_BRIGHTNESS,
        };
        self.start(spec, colors, observer);
        Ok(())
    }

    fn start(&self, spec: AnimationSpec, palette: Palette, observer: Option<ObserverRef<'a>>) {
        let spec = AnimationSpec {
            cycle: spec.cycle.max(self.config.min_cycle),
            brightness: spec.brightness.min(FULL_BRIGHTNESS),
            ..spec
        };

        if self.is_running() {
            self.stop(true);
        }
        self.writer.set_queue_canceled(false);
        self.writer.set_pacing_interval(spec.cycle);

        let run_id = self.with_inner(|inner| {
            inner.next_run_id = inner.next_run_id.wrapping_add(1);
            inner.run = Some(RunState::new(inner.next_run_id, spec, palette, observer));
            inner.next_run_id
        });
        self.control.signal(Control::Started);
        debug!(
            "[engine] run {} started: {:?}, {}ms cycle",
            run_id,
            spec.kind,
            spec.cycle.as_millis()
        );
    }

    /// Stop the current run
    ///
    /// The run is over when this returns: no later tick writes a frame for
    /// it. A hard stop also cancels the writer's pending and in-flight
    /// writes. Stopping an idle engine does nothing.
    pub fn stop(&self, hard: bool) {
        let Some(run) = self.with_inner(|inner| inner.run.take()) else {
            trace!("[engine] stop while idle");
            return;
        };
        self.writer.stop(hard);
        self.control.signal(Control::Stopped);
        debug!("[engine] run {} stopped (hard: {})", run.id, hard);
    }

    pub fn is_running(&self) -> bool {
        self.with_inner(|inner| inner.run.is_some())
    }

    pub fn state(&self) -> EngineState {
        self.with_inner(|inner| match inner.run.as_ref().map(|run| run.spec.kind) {
            None => EngineState::Idle,
            Some(AnimationKind::SingleStrip(_)) => EngineState::SingleStrip,
            Some(AnimationKind::MultiArm(_)) => EngineState::MultiArm,
        })
    }

    /// Parameters of the current run
    pub fn current_spec(&self) -> Option<AnimationSpec> {
        self.with_inner(|inner| inner.run.as_ref().map(|run| run.spec))
    }

    /// Change the brightness of a running multi-arm preset
    ///
    /// Values above 100 are clamped. Single-strip runs and an idle engine
    /// ignore the call.
    pub fn update_brightness(&self, brightness: u8) {
        let brightness = brightness.min(FULL_BRIGHTNESS);
        let applied = self.with_inner(|inner| match inner.run.as_mut() {
            Some(run) if matches!(run.spec.kind, AnimationKind::MultiArm(_)) => {
                run.spec.brightness = brightness;
                true
            }
            _ => false,
        });
        if applied {
            debug!("[engine] brightness {}%", brightness);
        }
    }

    /// Change the cycle length of the current run
    ///
    /// Takes effect on the next tick; the current cycle start is kept.
    pub fn update_speed(&self, cycle: Duration) {
        let cycle = cycle.max(self.config.min_cycle);
        let applied = self.with_inner(|inner| match inner.run.as_mut() {
            Some(run) => {
                run.spec.cycle = cycle;
                true
            }
            None => false,
        });
        if applied {
            self.writer.set_pacing_interval(cycle);
            debug!("[engine] cycle {}ms", cycle.as_millis());
        }
    }

    /// Run one animation step at `now`
    ///
    /// Computes the frame, notifies the observer and, if the pacing gate
    /// allows, writes the frame. The write may suspend; the running flag is
    /// checked again afterwards so a stop during the write ends the run
    /// without touching its state.
    pub async fn tick(&self, now: Instant) -> TickOutcome {
        let Some(tick) = self.with_inner(|inner| {
            let run = inner.run.as_mut()?;
            let cycle_start = *run.cycle_start.get_or_insert(now);
            let elapsed = now.saturating_duration_since(cycle_start);
            let cycle = run.spec.cycle;
            let t = cycle_position(elapsed, cycle);
            Some(TickFrame {
                run_id: run.id,
                frame: compute_frame(run.spec.kind, run.base(), run.spec.brightness, t, elapsed, cycle),
                observer: run.observer,
                elapsed,
                cycle,
            })
        }) else {
            trace!("[engine] tick while idle");
            return TickOutcome::Finished;
        };

        if let Some(observer) = tick.observer
            && let Err(err) = observer.on_frame(&tick.frame)
        {
            warn!("[engine] {}", err);
        }

        // The observer may have stopped or replaced the run
        if self.is_current(tick.run_id)
            && self.writer.can_attempt_write(now)
            && let Err(err) = self.writer.write_frame(&tick.frame).await
        {
            warn!("[engine] frame write failed: {}", err);
        }

        self.with_inner(|inner| match inner.run.as_mut() {
            None => {
                trace!("[engine] run {} ended during tick", tick.run_id);
                TickOutcome::Finished
            }
            // Replaced by a newer run; leave its state alone
            Some(run) if run.id != tick.run_id => TickOutcome::Continue,
            Some(run) => {
                if tick.elapsed >= tick.cycle {
                    run.restart_cycle(now);
                }
                TickOutcome::Continue
            }
        })
    }

    /// Drive the current run until it ends
    ///
    /// Ticks once per frame of `clock`. A start or stop wakes the loop early
    /// and drops the pending frame wait. Returns immediately if the engine
    /// is idle.
    pub async fn run_until_stopped<C: FrameClock>(&self, clock: &mut C) {
        while self.tick(Instant::now()).await == TickOutcome::Continue {
            select(clock.next_frame(), self.control.wait()).await;
        }
    }

    /// Drive the engine forever, sleeping while idle
    pub async fn run<C: FrameClock>(&self, clock: &mut C) -> ! {
        loop {
            while !self.is_running() {
                self.control.wait().await;
            }
            self.run_until_stopped(clock).await;
        }
    }

    fn is_current(&self, run_id: u32) -> bool {
        self.with_inner(|inner| inner.run.as_ref().is_some_and(|run| run.id == run_id))
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut EngineInner<'a>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow(cs).borrow_mut()))
    }
}
