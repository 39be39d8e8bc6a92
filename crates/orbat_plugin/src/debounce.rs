//! Deadline-based debouncing.
//!
//! Camera notifications arrive in bursts while the operator drags the view;
//! re-leveling and re-clustering only want the last one. A [`Debounce`] is
//! the engine's replacement for host timers: every poke moves the deadline
//! out (cancel-on-reschedule), and the engine polls [`Debounce::fire`] at
//! the top of each tick. No callbacks, no threads, nothing mutated outside
//! the tick that observes the deadline pass.

/// One coalescing deadline.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: f64,
    due: Option<f64>,
}

impl Debounce {
    /// A debounce firing `delay` seconds after the last poke.
    pub fn new(delay: f64) -> Self {
        Self { delay, due: None }
    }

    /// Arms (or re-arms) the deadline at `now + delay`. An earlier pending
    /// deadline is discarded.
    pub fn poke(&mut self, now: f64) {
        self.due = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True exactly once per armed burst: the first call at or past the
    /// deadline. Disarms on fire.
    pub fn fire(&mut self, now: f64) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
