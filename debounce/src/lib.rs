#![cfg_attr(not(test), no_std)]

//! Debounced digital inputs for polled control loops.
//!
//! A [`DebouncedInput`] owns one input pin and turns its bouncy electrical
//! level into a clean logical state plus press, release and hold events. It is
//! driven by calling [`DebouncedInput::poll`] once per loop iteration; matching
//! callbacks run inline before `poll` returns.
//!
//! The timing core is [`Debouncer`], which knows nothing about pins and can be
//! fed raw samples directly.

pub mod clock;
pub mod debouncer;
pub mod input;

pub use clock::{Clock, Duration, Instant, ManualClock};
pub use debouncer::Debouncer;
pub use input::DebouncedInput;

/// Pull resistor an input pin has to be configured with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Plain input, the line is driven externally
    None,
    /// Internal pull-up, the line idles high
    Up,
}

/// Configuration for a single debounced input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// When true the input is active while the line is pulled low (button wired to ground).
    pub active_low: bool,
    /// How long a raw level must stay unchanged before it is accepted as the debounced state
    pub debounce: Duration,
    /// How long the debounced state must stay active before a hold event fires
    pub hold: Duration,
}

impl InputConfig {
    pub const fn default() -> Self {
        Self {
            active_low: true,
            debounce: Duration::millis(15),
            hold: Duration::millis(600),
        }
    }

    /// The pull the pin must be configured with for this polarity
    pub const fn pull(&self) -> Pull {
        if self.active_low {
            Pull::Up
        } else {
            Pull::None
        }
    }

    /// Map an electrical level to the logical "active" level
    pub const fn is_active_level(&self, is_high: bool) -> bool {
        is_high != self.active_low
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        DEFAULT_INPUT_CONFIG
    }
}

pub const DEFAULT_INPUT_CONFIG: InputConfig = InputConfig::default();

/// A transition of the debounced state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// idle -> active
    Press,
    /// active -> idle
    Release,
}

/// Everything a single poll produced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Events {
    pub edge: Option<Edge>,
    pub hold: bool,
}

impl Events {
    pub const NONE: Events = Events {
        edge: None,
        hold: false,
    };

    pub fn is_empty(&self) -> bool {
        self.edge.is_none() && !self.hold
    }

    pub fn pressed(&self) -> bool {
        self.edge == Some(Edge::Press)
    }

    pub fn released(&self) -> bool {
        self.edge == Some(Edge::Release)
    }
}
