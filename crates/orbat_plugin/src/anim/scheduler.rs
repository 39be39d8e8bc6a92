//! The animation scheduler.
//!
//! One queue of flight records, advanced once per render tick. There is no
//! parallelism anywhere in here: the host loop calls
//! [`AnimationScheduler::advance`] with the current time, each active record
//! interpolates its actor through the registry, finished records are
//! finalized and dropped. When the last record finishes, the outcome
//! reports the queue went idle, which is what unblocks the declutter pass
//! and the LOD machine's mutual-exclusion guard.
//!
//! Records whose `start` lies in the future simply hold their start state,
//! which is how a transition expresses its phases (travel first, settle
//! fades after, commander/staff last) with a single flat queue.

use glam::DVec3;

use crate::actor::registry::ActorRegistry;
use crate::actor::ActorKey;
use crate::anim::ease::{arc_point, ease_in_out_cubic, pop_scale};
use crate::constants::{ARC_RATIO, LABEL_WINDOW, POP_BULGE};

/// Direction of an alpha fade.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FadeDir {
    In,
    Out,
}

/// Alpha fade within a flight.
///
/// The window `[delay, delay + duration]` is relative to the flight's own
/// start and must fit inside its duration. Billboard alpha follows the
/// whole window; label alpha is keyed to a trailing (fade-in) or leading
/// (fade-out) slice so labels never flash mid-transition.
#[derive(Clone, Debug)]
pub struct Fade {
    pub dir: FadeDir,
    pub delay: f64,
    pub duration: f64,
}

impl Fade {
    /// Fade spanning an entire flight of the given duration.
    pub fn across(dir: FadeDir, duration: f64) -> Self {
        Self {
            dir,
            delay: 0.0,
            duration,
        }
    }
}

/// What happens to the actor when its flight finalizes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Completion {
    /// Snap to the destination and rest there, fully opaque at unit scale.
    Settle,
    /// Hide the actor and snap it back to its home position for next time.
    HideAndRehome,
}

/// One scheduled animation record.
#[derive(Clone, Debug)]
pub struct Flight {
    pub key: ActorKey,
    pub from: DVec3,
    pub to: DVec3,
    /// Absolute start time, seconds. May lie in the future.
    pub start: f64,
    pub duration: f64,
    pub fade: Option<Fade>,
    /// Apply a pop-scale in the fade's direction.
    pub pop: bool,
    pub done: Completion,
}

impl Flight {
    fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Counters across the scheduler's lifetime.
#[derive(Clone, Copy, Default, Debug)]
pub struct SchedulerStats {
    pub scheduled: u64,
    pub completed: u64,
}

/// Result of one [`AnimationScheduler::advance`] call.
#[derive(Clone, Copy, Default, Debug)]
pub struct AdvanceOutcome {
    /// Records finalized this tick.
    pub completed: usize,
    /// True exactly once per burst: the tick that emptied the queue.
    pub became_idle: bool,
}

pub struct AnimationScheduler {
    queue: Vec<Flight>,
    arc_ratio: f64,
    pop_bulge: f32,
    stats: SchedulerStats,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(ARC_RATIO, POP_BULGE)
    }
}

impl AnimationScheduler {
    pub fn new(arc_ratio: f64, pop_bulge: f32) -> Self {
        Self {
            queue: Vec::new(),
            arc_ratio,
            pop_bulge,
            stats: SchedulerStats::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn schedule(&mut self, flight: Flight) {
        self.stats.scheduled += 1;
        self.queue.push(flight);
    }

    pub fn schedule_all(&mut self, flights: impl IntoIterator<Item = Flight>) {
        for flight in flights {
            self.schedule(flight);
        }
    }

    /// Advances every record to `now`, finalizing the finished ones.
    pub fn advance(&mut self, now: f64, registry: &mut ActorRegistry) -> AdvanceOutcome {
        if self.queue.is_empty() {
            return AdvanceOutcome::default();
        }
        let mut completed = 0;
        let mut i = 0;
        while i < self.queue.len() {
            if now >= self.queue[i].end() {
                let flight = self.queue.swap_remove(i);
                finalize(&flight, registry);
                completed += 1;
            } else {
                self.apply(&self.queue[i], now, registry);
                i += 1;
            }
        }
        self.stats.completed += completed as u64;
        let became_idle = completed > 0 && self.queue.is_empty();
        if became_idle {
            tracing::trace!(completed, "animation queue went idle");
        }
        AdvanceOutcome {
            completed,
            became_idle,
        }
    }

    fn apply(&self, flight: &Flight, now: f64, registry: &mut ActorRegistry) {
        let elapsed = (now - flight.start).clamp(0.0, flight.duration);
        let t = if flight.duration > 0.0 {
            elapsed / flight.duration
        } else {
            1.0
        };

        if flight.from != flight.to {
            let eased = ease_in_out_cubic(t);
            let position = arc_point(flight.from, flight.to, eased, self.arc_ratio);
            registry.set_position(flight.key, position);
        }

        if let Some(fade) = &flight.fade {
            let ft = if fade.duration > 0.0 {
                ((elapsed - fade.delay) / fade.duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let eased = ease_in_out_cubic(ft);
            let (billboard, label) = match fade.dir {
                FadeDir::In => {
                    let label_t = ((ft - (1.0 - LABEL_WINDOW)) / LABEL_WINDOW).clamp(0.0, 1.0);
                    (eased, label_t)
                }
                FadeDir::Out => {
                    let label_t = 1.0 - (ft / LABEL_WINDOW).clamp(0.0, 1.0);
                    (1.0 - eased, label_t)
                }
            };
            registry.set_alpha(flight.key, billboard as f32, label as f32);
        }

        if flight.pop {
            let grow = matches!(
                flight.fade,
                Some(Fade {
                    dir: FadeDir::In,
                    ..
                })
            );
            registry.set_scale(flight.key, pop_scale(t, grow, self.pop_bulge));
        }
    }
}

/// Rest state: destination position, opaque, unit scale. Vacating actors
/// additionally hide and go home so the next transition finds them there.
fn finalize(flight: &Flight, registry: &mut ActorRegistry) {
    registry.set_position(flight.key, flight.to);
    registry.set_alpha(flight.key, 1.0, 1.0);
    registry.set_scale(flight.key, 1.0);
    if flight.done == Completion::HideAndRehome {
        registry.set_shown(flight.key, false);
        registry.snap_home(flight.key);
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
