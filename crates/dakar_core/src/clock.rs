//! Wall-clock source for round deadlines.

use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;

    /// Called once after every physics step.
    fn on_frame(&self) {}
}

/// The process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to, advancing by a fixed amount on each
/// tick and on every frame. Lets timeouts be tested without sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::cell::Cell<Instant>,
    step: Duration,
}

impl ManualClock {
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self {
            now: std::cell::Cell::new(Instant::now()),
            step,
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Moves the clock forward by one step.
    pub fn tick(&self) {
        self.advance(self.step);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn on_frame(&self) {
        self.tick();
    }
}
