//! Time source abstraction.
//!
//! All timing is done in wrapping millisecond ticks. The firmware backs a
//! [`Clock`] with its SysTick counter; tests and simulations use a
//! [`ManualClock`] and step it by hand.

use core::cell::Cell;

/// Millisecond timestamp
pub type Instant = fugit::TimerInstantU32<1000>;
/// Millisecond duration
pub type Duration = fugit::MillisDurationU32;

/// Monotonic millisecond time source
///
/// Must not go backwards during the lifetime of the inputs using it.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Time elapsed from `earlier` to `now`, saturating at zero if the clock
/// appears to have gone backwards.
pub(crate) fn elapsed(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier)
        .unwrap_or(Duration::from_ticks(0))
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    ticks: Cell<u32>,
}

impl ManualClock {
    pub const fn new(start_ms: u32) -> Self {
        Self {
            ticks: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.ticks.set(ms);
    }

    pub fn advance(&self, by: Duration) {
        self.ticks.set(self.ticks.get().wrapping_add(by.ticks()));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.ticks.get())
    }
}
