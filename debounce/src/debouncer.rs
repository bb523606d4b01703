use crate::clock::{elapsed, Duration, Instant};
use crate::{Edge, Events, InputConfig};

/// Debounce and hold state machine for one logical input
///
/// Fed with logical (already polarity-corrected) raw samples and the time they
/// were taken. At most one debounced transition is accepted per update.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    raw: bool,
    active: bool,
    previous: bool,
    last_change: Instant,
    active_since: Option<Instant>,
    hold_fired: bool,
    debounce: Duration,
    hold: Option<Duration>,
}

impl Debouncer {
    /// Start in the given state. No edge is reported for the initial level, even
    /// if it is already active.
    pub fn new(initial: bool, now: Instant, config: &InputConfig) -> Self {
        Self {
            raw: initial,
            active: initial,
            previous: initial,
            last_change: now,
            active_since: None,
            hold_fired: false,
            debounce: config.debounce,
            hold: Some(config.hold),
        }
    }

    /// Current debounced state
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Debounced state before the most recent transition
    pub fn was_active(&self) -> bool {
        self.previous
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Hold threshold, or None if hold detection is disarmed
    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }

    /// Arm hold detection with a new threshold, or disarm it with None.
    ///
    /// The threshold is compared against the running press on every update, so
    /// lowering it below the time already held fires on the next update.
    pub fn set_hold(&mut self, hold: Option<Duration>) {
        self.hold = hold;
    }

    /// Process a new raw sample
    pub fn update(&mut self, raw: bool, now: Instant) -> Events {
        let mut events = Events::NONE;

        if raw != self.raw {
            // Bounce: restart the debounce window
            self.last_change = now;
            self.raw = raw;
        }

        if elapsed(now, self.last_change) >= self.debounce && raw != self.active {
            self.previous = self.active;
            self.active = raw;
            self.hold_fired = false;

            if self.active {
                self.active_since = Some(now);
                events.edge = Some(Edge::Press);
            } else {
                self.active_since = None;
                events.edge = Some(Edge::Release);
            }
        }

        if self.active && !self.hold_fired {
            if let (Some(hold), Some(since)) = (self.hold, self.active_since) {
                if elapsed(now, since) >= hold {
                    self.hold_fired = true;
                    events.hold = true;
                }
            }
        }

        events
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::DEFAULT_INPUT_CONFIG;

    fn at(ms: u32) -> Instant {
        Instant::from_ticks(ms)
    }

    /// Feed one sample per millisecond from `from` to `to` inclusive, collecting events
    fn run(
        d: &mut Debouncer,
        from: u32,
        to: u32,
        level: impl Fn(u32) -> bool,
    ) -> Vec<(u32, Events)> {
        (from..=to)
            .map(|t| (t, d.update(level(t), at(t))))
            .filter(|(_, e)| !e.is_empty())
            .collect()
    }

    #[test]
    pub fn test_accepts_after_debounce() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        assert!(d.update(true, at(1)).is_empty());
        assert!(d.update(true, at(15)).is_empty());
        assert!(!d.is_active());

        let e = d.update(true, at(16));
        assert_eq!(e.edge, Some(Edge::Press));
        assert!(d.is_active());
        assert!(!d.was_active());

        // Stable, nothing more to report
        assert!(d.update(true, at(17)).is_empty());
    }

    #[test]
    pub fn test_bounce_restarts_window() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        // Flip every ms for 10ms, then hold high. The last flip is at t=11.
        let events = run(&mut d, 1, 40, |t| if t <= 10 { t % 2 == 1 } else { true });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, 26);
        assert!(events[0].1.pressed());
    }

    #[test]
    pub fn test_bounces_inside_window_produce_nothing() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        // press - release - press, each shorter than the debounce window
        d.update(true, at(1));
        d.update(true, at(5));
        d.update(false, at(6));
        d.update(false, at(12));
        d.update(true, at(13));
        assert!(!d.is_active());

        // Then release for good: the raw level matches the debounced state again
        let events = run(&mut d, 14, 100, |_| false);
        assert!(events.is_empty());
        assert!(!d.is_active());
    }

    #[test]
    pub fn test_no_event_for_initial_active_level() {
        let mut d = Debouncer::new(true, at(0), &DEFAULT_INPUT_CONFIG);
        assert!(d.is_active());

        // Hold never fires for a press that started before construction
        let events = run(&mut d, 1, 1000, |_| true);
        assert!(events.is_empty());

        // But releasing it is a real edge
        let events = run(&mut d, 1001, 1020, |_| false);
        assert_eq!(events.len(), 1);
        assert!(events[0].1.released());
    }

    #[test]
    pub fn test_press_release_alternate() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);
        let events = run(&mut d, 1, 1000, |t| (t / 100) % 2 == 1);
        assert!(!events.is_empty());

        let mut expect = Edge::Press;
        for (_, e) in events.iter().filter(|(_, e)| e.edge.is_some()) {
            assert_eq!(e.edge, Some(expect));
            expect = match expect {
                Edge::Press => Edge::Release,
                Edge::Release => Edge::Press,
            };
        }
    }

    #[test]
    pub fn test_hold_fires_once() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        let mut holds = 0;
        let mut hold_at = 0;
        let mut t = 10;
        while t <= 1010 {
            let e = d.update(true, at(t));
            if e.hold {
                holds += 1;
                hold_at = t;
            }
            t += 10;
        }

        // Pressed at t=30 (first sample 20ms after the raw change at t=10)
        assert_eq!(holds, 1);
        assert_eq!(hold_at, 630);
    }

    #[test]
    pub fn test_no_hold_after_release() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        d.update(true, at(1));
        assert!(d.update(true, at(16)).pressed());
        d.update(false, at(300));
        assert!(d.update(false, at(315)).released());

        let events = run(&mut d, 316, 2000, |_| false);
        assert!(events.is_empty());
    }

    #[test]
    pub fn test_hold_rearms_on_next_press() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        let events = run(&mut d, 1, 3000, |t| t < 1000 || t >= 2000);
        let holds: Vec<u32> = events
            .iter()
            .filter(|(_, e)| e.hold)
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(holds, vec![616, 2615]);
    }

    #[test]
    pub fn test_zero_hold_fires_with_press() {
        let config = InputConfig {
            hold: Duration::millis(0),
            ..DEFAULT_INPUT_CONFIG
        };
        let mut d = Debouncer::new(false, at(0), &config);

        d.update(true, at(1));
        let e = d.update(true, at(16));
        assert!(e.pressed());
        assert!(e.hold);
    }

    #[test]
    pub fn test_disarmed_hold() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);
        d.set_hold(None);

        let events = run(&mut d, 1, 1000, |_| true);
        assert_eq!(events.len(), 1);
        assert!(!events[0].1.hold);

        // Arming mid-press with an already elapsed threshold fires straight away
        d.set_hold(Some(Duration::millis(600)));
        assert!(d.update(true, at(1001)).hold);
        assert!(!d.update(true, at(1002)).hold);
    }

    #[test]
    pub fn test_hold_threshold_is_live() {
        let mut d = Debouncer::new(false, at(0), &DEFAULT_INPUT_CONFIG);

        let events = run(&mut d, 1, 300, |_| true);
        assert_eq!(events.len(), 1);

        d.set_hold(Some(Duration::millis(200)));
        assert!(d.update(true, at(301)).hold);
    }

    #[test]
    pub fn test_zero_debounce_follows_raw() {
        let config = InputConfig {
            debounce: Duration::millis(0),
            ..DEFAULT_INPUT_CONFIG
        };
        let mut d = Debouncer::new(false, at(0), &config);

        assert!(d.update(true, at(1)).pressed());
        assert!(d.update(false, at(2)).released());
    }

    #[test]
    pub fn test_survives_timer_wrap() {
        let start = u32::MAX - 5;
        let mut d = Debouncer::new(false, at(start), &DEFAULT_INPUT_CONFIG);

        assert!(d.update(true, at(start.wrapping_add(1))).is_empty());
        assert!(d.update(true, at(start.wrapping_add(15))).is_empty());
        assert!(d.update(true, at(start.wrapping_add(16))).pressed());
    }
}
