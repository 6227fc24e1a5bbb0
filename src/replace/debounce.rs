//! Leading-edge debounce with a trailing run
//!
//! The first event in a burst runs immediately; later events within the
//! window collapse into one deferred run at the window's end. Kept free of
//! timers so the policy is testable with plain instants.

use std::time::{Duration, Instant};

/// What the caller should do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Outside any active window; run immediately.
    RunNow,
    /// Inside a window; schedule (or reschedule) a trailing run at the
    /// given instant.
    Defer(Instant),
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    last_run: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_run: None,
        }
    }

    /// Record an event at `now` and decide whether to run.
    pub fn on_event(&mut self, now: Instant) -> Decision {
        match self.last_run {
            Some(last) if now.duration_since(last) < self.delay => Decision::Defer(last + self.delay),
            _ => {
                self.last_run = Some(now);
                Decision::RunNow
            }
        }
    }

    /// Record the trailing run firing at `now`, opening a fresh window.
    pub fn on_trailing(&mut self, now: Instant) {
        self.last_run = Some(now);
    }
}
