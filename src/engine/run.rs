use embassy_time::{Duration, Instant};
use heapless::Vec;

use super::observer::ObserverRef;
use crate::color::Rgb;
use crate::frame::AnimationKind;

/// Maximum number of colors in a rotating palette
pub const MAX_PALETTE: usize = 16;

/// Colors rotated by a palette run
pub type Palette = Vec<Rgb, MAX_PALETTE>;

/// Parameters of a running animation
///
/// `kind` and `base` are fixed for the life of a run; `cycle` and
/// `brightness` can change while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub kind: AnimationKind,
    pub base: Rgb,
    /// Length of one cycle
    pub cycle: Duration,
    /// Brightness percentage (0-100)
    pub brightness: u8,
}

impl AnimationSpec {
    /// 1 for a single strip, 4 for the multi-arm fixture
    pub const fn arm_count(&self) -> usize {
        self.kind.arm_count()
    }
}

/// State of one run, built fresh by every start
pub(crate) struct RunState<'a> {
    pub(crate) id: u32,
    pub(crate) spec: AnimationSpec,
    /// Start of the current cycle, set by the first tick
    pub(crate) cycle_start: Option<Instant>,
    pub(crate) observer: Option<ObserverRef<'a>>,
    /// Empty unless the run rotates through a palette
    pub(crate) palette: Palette,
    pub(crate) palette_index: usize,
}

impl<'a> RunState<'a> {
    pub(crate) fn new(
        id: u32,
        spec: AnimationSpec,
        palette: Palette,
        observer: Option<ObserverRef<'a>>,
    ) -> Self {
        Self {
            id,
            spec,
            cycle_start: None,
            observer,
            palette,
            palette_index: 0,
        }
    }

    /// Base color of the current cycle
    pub(crate) fn base(&self) -> Rgb {
        self.palette
            .get(self.palette_index)
            .copied()
            .unwrap_or(self.spec.base)
    }

    /// Start the next cycle at `now`
    pub(crate) fn restart_cycle(&mut self, now: Instant) {
        self.cycle_start = Some(now);
        if !self.palette.is_empty() {
            self.palette_index = (self.palette_index + 1) % self.palette.len();
        }
    }
}
