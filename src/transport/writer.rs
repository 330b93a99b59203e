use core::cell::RefCell;

use critical_section::Mutex;
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use log::{debug, trace, warn};

use super::{DeviceLink, LatencyEstimator, PacingConfig, TransportDiscipline, WriteOutcome};
use crate::color::Rgb;
use crate::error::TransportError;
use crate::frame::{ARM_COUNT, Frame};

/// Per-device transport session state
#[derive(Debug)]
struct Session {
    /// Last write attempt (gate opening, fire-and-forget write or acknowledgement)
    last_attempt: Option<Instant>,
    /// Minimum time between write attempts
    pacing_interval: Duration,
    /// Refuse new writes until reset
    canceled: bool,
    /// Bumped by every hard stop; writes admitted under an older epoch are dropped
    epoch: u32,
    latency: LatencyEstimator,
}

/// Transport writer for one connected device
///
/// Created when the device connects and kept until it disconnects. A hard
/// stop resets pending work but the writer keeps serving later runs.
///
/// Ordered-acknowledged writes go through a single write slot: a write holds
/// the slot from issue until its settle delay ends, and every wait inside the
/// slot races the hard-stop signal, so a hard stop unblocks it without waiting
/// for the hardware.
pub struct TransportWriter<L: DeviceLink> {
    discipline: TransportDiscipline,
    config: PacingConfig,
    /// Single write slot guarding the link
    link: AsyncMutex<CriticalSectionRawMutex, L>,
    session: Mutex<RefCell<Session>>,
    hard_stop: Signal<CriticalSectionRawMutex, ()>,
}

impl<L: DeviceLink> TransportWriter<L> {
    /// Create a writer with the default pacing configuration
    pub fn new(link: L, discipline: TransportDiscipline) -> Self {
        Self::with_config(link, discipline, PacingConfig::DEFAULT)
    }

    /// Create a writer with a custom pacing configuration
    pub fn with_config(link: L, discipline: TransportDiscipline, config: PacingConfig) -> Self {
        Self {
            discipline,
            config,
            link: AsyncMutex::new(link),
            session: Mutex::new(RefCell::new(Session {
                last_attempt: None,
                pacing_interval: config.initial_interval,
                canceled: false,
                epoch: 0,
                latency: LatencyEstimator::new(config.initial_ack_latency, config.history_weight),
            })),
            hard_stop: Signal::new(),
        }
    }

    pub const fn discipline(&self) -> TransportDiscipline {
        self.discipline
    }

    pub const fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Consume the writer and return the device link
    pub fn into_link(self) -> L {
        self.link.into_inner()
    }

    /// Write one color to the whole strip
    pub async fn write_color(&self, color: Rgb) -> Result<WriteOutcome, TransportError<L::Error>> {
        self.write_frame(&Frame::Single(color)).await
    }

    /// Write one color per arm
    pub async fn write_arm_colors(
        &self,
        arms: &[Rgb; ARM_COUNT],
    ) -> Result<WriteOutcome, TransportError<L::Error>> {
        self.write_frame(&Frame::Arms(*arms)).await
    }

    /// Write a frame using the writer's discipline
    ///
    /// Fire-and-forget writes complete without suspending and record the
    /// attempt, closing the pacing gate. Ordered writes resolve once this
    /// write's settle delay ends, or early with [`WriteOutcome::Canceled`]
    /// on a hard stop.
    pub async fn write_frame(
        &self,
        frame: &Frame,
    ) -> Result<WriteOutcome, TransportError<L::Error>> {
        match self.discipline {
            TransportDiscipline::FireAndForget => self.write_unacked(frame).await,
            TransportDiscipline::OrderedAcknowledged => self.write_ordered(frame).await,
        }
    }

    /// Pacing gate
    ///
    /// Returns `true` if the writer is not canceled and at least one pacing
    /// interval passed since the last attempt. A `true` result records `now`
    /// as the last attempt.
    pub fn can_attempt_write(&self, now: Instant) -> bool {
        self.with_session(|session| {
            if session.canceled {
                return false;
            }
            let due = session.last_attempt.is_none_or(|last| {
                now.saturating_duration_since(last) >= session.pacing_interval
            });
            if due {
                session.last_attempt = Some(now);
            }
            due
        })
    }

    /// Stop writing
    ///
    /// A soft stop clears the cancellation flag and lets pending writes
    /// finish. A hard stop unblocks any in-flight wait, drops queued writes
    /// and refuses new ones until the writer is reset.
    pub fn stop(&self, hard: bool) {
        if hard {
            let epoch = self.with_session(|session| {
                session.canceled = true;
                session.epoch = session.epoch.wrapping_add(1);
                session.epoch
            });
            self.hard_stop.signal(());
            debug!("[writer] hard stop, epoch {}", epoch);
        } else {
            self.set_queue_canceled(false);
            debug!("[writer] soft stop");
        }
    }

    /// Set the cancellation flag directly
    pub fn set_queue_canceled(&self, canceled: bool) {
        self.with_session(|session| session.canceled = canceled);
    }

    pub fn is_canceled(&self) -> bool {
        self.with_session(|session| session.canceled)
    }

    /// Adjust pacing to a requested animation cycle
    pub fn set_pacing_interval(&self, cycle: Duration) {
        let interval = self.discipline.pacing_for_cycle(cycle, &self.config);
        self.with_session(|session| session.pacing_interval = interval);
        debug!(
            "[writer] pacing interval {}ms for {}ms cycle",
            interval.as_millis(),
            cycle.as_millis()
        );
    }

    pub fn pacing_interval(&self) -> Duration {
        self.with_session(|session| session.pacing_interval)
    }

    /// Current acknowledgement latency average
    pub fn ack_latency(&self) -> Duration {
        self.with_session(|session| session.latency.average())
    }

    /// Fold an acknowledgement latency sample into the average and retune pacing
    ///
    /// Only acknowledged links retune; fire-and-forget pacing follows the
    /// animation speed.
    pub fn record_ack_latency(&self, latency: Duration) {
        if !self.discipline.waits_for_ack() {
            return;
        }
        let (average, interval) = self.with_session(|session| {
            let average = session.latency.observe(latency);
            session.pacing_interval = self.config.interval_for_latency(average);
            (average, session.pacing_interval)
        });
        debug!(
            "[writer] ack {}us avg {}us -> interval {}ms",
            latency.as_micros(),
            average.as_micros(),
            interval.as_millis()
        );
    }

    async fn write_unacked(&self, frame: &Frame) -> Result<WriteOutcome, TransportError<L::Error>> {
        if self.is_canceled() {
            return Ok(WriteOutcome::Canceled);
        }
        // Never held across an await under this discipline
        let mut link = self.link.lock().await;

        self.with_session(|session| session.last_attempt = Some(Instant::now()));
        let result = match frame {
            Frame::Single(color) => link.write_color_unacked(*color),
            Frame::Arms(arms) => link.write_arms_unacked(arms),
        };

        result.map(|()| WriteOutcome::Sent).map_err(|err| {
            warn!("[writer] write rejected: {:?}", err);
            TransportError::Rejected(err)
        })
    }

    async fn write_ordered(&self, frame: &Frame) -> Result<WriteOutcome, TransportError<L::Error>> {
        let Some(epoch) = self.admit() else {
            return Ok(WriteOutcome::Canceled);
        };

        let mut link = self.link.lock().await;
        // The previous holder may have been hard-stopped while we waited
        if !self.is_current(epoch) {
            return Ok(WriteOutcome::Canceled);
        }
        // Drop signals from hard stops that found the slot idle
        self.hard_stop.reset();

        let started = Instant::now();
        trace!("[writer] ordered write start {:?}", frame);
        let write = async {
            match frame {
                Frame::Single(color) => link.write_color_acked(*color).await,
                Frame::Arms(arms) => link.write_arms_acked(arms).await,
            }
        };
        let acked = match select(write, self.hard_stop.wait()).await {
            Either::First(result) => result,
            Either::Second(()) => {
                debug!("[writer] in-flight write canceled");
                return Ok(WriteOutcome::Canceled);
            }
        };
        if let Err(err) = acked {
            warn!("[writer] ordered write rejected: {:?}", err);
            return Err(TransportError::Rejected(err));
        }

        let acked_at = Instant::now();
        let latency = acked_at.saturating_duration_since(started);
        trace!("[writer] ack after {}us", latency.as_micros());
        self.record_ack_latency(latency);
        self.with_session(|session| session.last_attempt = Some(acked_at));

        if let Either::Second(()) =
            select(Timer::after(self.config.settle_delay), self.hard_stop.wait()).await
        {
            debug!("[writer] settle delay cut short");
        }
        drop(link);

        Ok(WriteOutcome::Acknowledged)
    }

    /// Admit a write unless the writer is canceled, returning its epoch
    fn admit(&self) -> Option<u32> {
        self.with_session(|session| (!session.canceled).then_some(session.epoch))
    }

    fn is_current(&self, epoch: u32) -> bool {
        self.with_session(|session| !session.canceled && session.epoch == epoch)
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        critical_section::with(|cs| f(&mut self.session.borrow(cs).borrow_mut()))
    }
}
