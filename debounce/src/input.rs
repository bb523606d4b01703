//! A debounced input bound to a pin and a clock.

use core::fmt::Debug;

use embedded_hal::digital::InputPin;
use log::{debug, trace};

use crate::clock::{Clock, Duration};
use crate::debouncer::Debouncer;
use crate::{Edge, Events, InputConfig, DEFAULT_INPUT_CONFIG};

/// Event callback, called with the input's id
pub type Callback<I> = fn(I);

/// One physical button
///
/// The pin must already be configured with the pull returned by
/// [`InputConfig::pull`]: pull-up for active-low wiring, plain input otherwise.
///
/// [`poll`](Self::poll) must be called once per control loop iteration. Any
/// registered callbacks run inline, before `poll` returns, so they must not
/// block.
pub struct DebouncedInput<P, C, I> {
    pin: P,
    clock: C,
    id: I,
    config: InputConfig,
    state: Debouncer,
    press: Option<Callback<I>>,
    release: Option<Callback<I>>,
    hold: Option<Callback<I>>,
}

impl<P, C, I> DebouncedInput<P, C, I>
where
    P: InputPin,
    C: Clock,
    I: Copy + Debug,
{
    /// Bind an input. The current level of the pin becomes the initial state
    /// without firing any event.
    pub fn new(mut pin: P, clock: C, id: I, config: &InputConfig) -> Result<Self, P::Error> {
        let initial = config.is_active_level(pin.is_high()?);
        let mut state = Debouncer::new(initial, clock.now(), config);
        // Hold detection is only armed once a hold callback is registered
        state.set_hold(None);

        debug!("input {:?}: bound, initially active: {}", id, initial);

        Ok(Self {
            pin,
            clock,
            id,
            config: *config,
            state,
            press: None,
            release: None,
            hold: None,
        })
    }

    /// Bind an active-low input with the default timing
    pub fn with_defaults(pin: P, clock: C, id: I) -> Result<Self, P::Error> {
        Self::new(pin, clock, id, &DEFAULT_INPUT_CONFIG)
    }

    /// Sample the pin and advance the debounce and hold timers
    ///
    /// If reading the pin fails the error is returned and the state is left as
    /// it was.
    pub fn poll(&mut self) -> Result<Events, P::Error> {
        let raw = self.config.is_active_level(self.pin.is_high()?);
        let events = self.state.update(raw, self.clock.now());

        match events.edge {
            Some(Edge::Press) => {
                trace!("input {:?}: press", self.id);
                if let Some(f) = self.press {
                    f(self.id);
                }
            }
            Some(Edge::Release) => {
                trace!("input {:?}: release", self.id);
                if let Some(f) = self.release {
                    f(self.id);
                }
            }
            None => {}
        }

        if events.hold {
            trace!("input {:?}: hold", self.id);
            if let Some(f) = self.hold {
                f(self.id);
            }
        }

        Ok(events)
    }

    /// Current debounced state
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn id(&self) -> I {
        self.id
    }

    /// Effective configuration, including the current hold threshold
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Replace the press callback. None disables press notification.
    pub fn on_press(&mut self, f: Option<Callback<I>>) {
        self.press = f;
    }

    /// Replace the release callback. None disables release notification.
    pub fn on_release(&mut self, f: Option<Callback<I>>) {
        self.release = f;
    }

    /// Replace the hold callback and its threshold
    ///
    /// The threshold is evaluated against the running press on every poll. A
    /// zero threshold fires on the same poll as the press.
    pub fn on_hold(&mut self, f: Option<Callback<I>>, hold: Duration) {
        self.hold = f;
        self.config.hold = hold;
        self.state.set_hold(f.map(|_| hold));
    }

    /// Give back the pin and clock
    pub fn release(self) -> (P, C) {
        (self.pin, self.clock)
    }
}
