//! The LOD state machine.
//!
//! Owns the displayed level and the flags around it, and turns level or
//! branch requests into applied plans. At most one transition is in flight
//! at a time: requests that arrive while `animating` is set are dropped
//! outright, which is the engine's entire mutual-exclusion story. The
//! engine clears `animating` when the scheduler reports idle.

use tracing::debug;

use crate::actor::registry::ActorRegistry;
use crate::anim::scheduler::{AnimationScheduler, FadeDir};
use crate::config::EngineConfig;
use crate::lod::planner::{
    plan_branch_collapse, plan_branch_expand, plan_level_change, TransitionPlan, VisibilityView,
};
use crate::orbat::echelon::Level;
use crate::orbat::tree::{OrbatTree, UnitId};

/// Mutable engine-wide state, owned by the controller. No ambient globals:
/// several engines can coexist, one per layer.
#[derive(Clone, Copy, Debug)]
pub struct EngineState {
    /// The single globally displayed level.
    pub level: Level,
    /// Set by manual branch operations; suspends automatic re-leveling until
    /// an explicit level selection resets it.
    pub manual_override: bool,
    /// True from plan application until the scheduler drains.
    pub animating: bool,
    /// The declutter pass wants to run once the scheduler is idle.
    pub cluster_dirty: bool,
    /// Master switch for camera-driven leveling.
    pub auto_level: bool,
}

impl EngineState {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            manual_override: false,
            animating: false,
            cluster_dirty: true,
            auto_level: true,
        }
    }
}

/// Requests a global level change. False when dropped (animating, same or
/// unreachable level).
pub fn request_level(
    state: &mut EngineState,
    tree: &OrbatTree,
    registry: &mut ActorRegistry,
    scheduler: &mut AnimationScheduler,
    target: Level,
    cfg: &EngineConfig,
    now: f64,
) -> bool {
    if state.animating {
        debug!(target = target.0, "level change dropped, transition in flight");
        return false;
    }
    if target == state.level {
        return false;
    }
    let view = VisibilityView::capture(tree, registry);
    let Some(plan) = plan_level_change(tree, &view, state.level, target, cfg, now) else {
        return false;
    };
    state.level = target;
    apply(plan, state, registry, scheduler);
    true
}

/// Requests a one-level manual expand of `unit` and flags the override.
pub fn request_branch_expand(
    state: &mut EngineState,
    tree: &OrbatTree,
    registry: &mut ActorRegistry,
    scheduler: &mut AnimationScheduler,
    unit: UnitId,
    cfg: &EngineConfig,
    now: f64,
) -> bool {
    if state.animating {
        debug!("branch expand dropped, transition in flight");
        return false;
    }
    let view = VisibilityView::capture(tree, registry);
    let Some(plan) = plan_branch_expand(tree, &view, unit, cfg, now) else {
        return false;
    };
    state.manual_override = true;
    apply(plan, state, registry, scheduler);
    true
}

/// Requests a subtree collapse of `unit` and flags the override.
pub fn request_branch_collapse(
    state: &mut EngineState,
    tree: &OrbatTree,
    registry: &mut ActorRegistry,
    scheduler: &mut AnimationScheduler,
    unit: UnitId,
    cfg: &EngineConfig,
    now: f64,
) -> bool {
    if state.animating {
        debug!("branch collapse dropped, transition in flight");
        return false;
    }
    let view = VisibilityView::capture(tree, registry);
    let Some(plan) = plan_branch_collapse(tree, &view, unit, cfg, now) else {
        return false;
    };
    state.manual_override = true;
    apply(plan, state, registry, scheduler);
    true
}

/// Applies a plan: immediate hides first, then every fade-in actor is
/// presented at its start state so the first scheduler tick has a marker to
/// drive, then the flights go into the queue.
fn apply(
    plan: TransitionPlan,
    state: &mut EngineState,
    registry: &mut ActorRegistry,
    scheduler: &mut AnimationScheduler,
) {
    for key in &plan.hide_now {
        registry.set_shown(*key, false);
    }
    for flight in &plan.flights {
        if matches!(&flight.fade, Some(fade) if fade.dir == FadeDir::In) {
            registry.set_shown(flight.key, true);
            registry.set_position(flight.key, flight.from);
            registry.set_alpha(flight.key, 0.0, 0.0);
            if flight.pop {
                registry.set_scale(flight.key, 0.0);
            }
        }
    }
    state.animating = !plan.flights.is_empty();
    state.cluster_dirty = true;
    scheduler.schedule_all(plan.flights);
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod machine_test;
