//! Transition planning.
//!
//! Planners are pure: they read the tree plus an immutable visibility
//! snapshot and emit the flight records and immediate hides that realize a
//! transition. The machine applies the result to the registry and the
//! scheduler.
//!
//! Working from a snapshot rather than an assumed uniform depth is what
//! keeps multi-level jumps and manual branch overrides honest: whatever
//! shape visibility is currently in, the plan diffs it against the desired
//! shape at the target level, walking to the nearest shown ancestor where
//! a unit's origin is not its direct parent.
//!
//! Transition choreography:
//! - Shown primaries below the target travel up into their target-level
//!   ancestor while fading out. Shown primaries above the target pop-scale
//!   out in place.
//! - Target-level primaries expanding out of a coarser marker travel from
//!   it while fading in; target-level primaries receiving collapsing
//!   children instead settle in place with a delayed pop, once the travel
//!   window has passed.
//! - Commander/staff sets diff the same way: whoever stops being exploded
//!   fades out (delayed to the settle window when their own primary is
//!   arriving), whoever becomes exploded fades in last.

use std::collections::HashSet;

use glam::DVec3;
use smallvec::SmallVec;
use tracing::debug;

use crate::actor::registry::ActorRegistry;
use crate::actor::{staff_slot, ActorKey, ActorKind};
use crate::anim::scheduler::{Completion, Fade, FadeDir, Flight};
use crate::config::EngineConfig;
use crate::orbat::echelon::Level;
use crate::orbat::tree::{OrbatTree, Unit, UnitId};

/// Immutable snapshot of which primaries are shown and which units are
/// exploded (commander/staff visible), taken before planning.
pub struct VisibilityView {
    shown: HashSet<UnitId>,
    exploded: HashSet<UnitId>,
}

impl VisibilityView {
    /// Reads the logical show flags out of the registry. Any clustering
    /// overlay must be restored first or suppressed actors would read as
    /// hidden.
    pub fn capture(tree: &OrbatTree, registry: &ActorRegistry) -> Self {
        let mut shown = HashSet::new();
        let mut exploded = HashSet::new();
        for unit in tree.iter() {
            if registry.is_shown(ActorKey::primary(unit.id)) {
                shown.insert(unit.id);
            }
            if registry.is_shown(ActorKey::commander(unit.id))
                || ActorKind::STAFF
                    .iter()
                    .any(|kind| registry.is_shown(ActorKey { unit: unit.id, kind: *kind }))
            {
                exploded.insert(unit.id);
            }
        }
        Self { shown, exploded }
    }

    pub fn is_shown(&self, unit: UnitId) -> bool {
        self.shown.contains(&unit)
    }

    pub fn is_exploded(&self, unit: UnitId) -> bool {
        self.exploded.contains(&unit)
    }

    #[cfg(test)]
    pub fn synthetic(
        shown: impl IntoIterator<Item = UnitId>,
        exploded: impl IntoIterator<Item = UnitId>,
    ) -> Self {
        Self {
            shown: shown.into_iter().collect(),
            exploded: exploded.into_iter().collect(),
        }
    }
}

/// Everything the machine needs to run one transition.
pub struct TransitionPlan {
    pub flights: Vec<Flight>,
    /// Actors hidden immediately, without animation. Normalizes levels the
    /// transition skips over.
    pub hide_now: Vec<ActorKey>,
}

impl TransitionPlan {
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty() && self.hide_now.is_empty()
    }
}

/// Plans a global level change. `None` when `target == current`.
#[tracing::instrument(skip_all, fields(from = current.0, to = target.0))]
pub fn plan_level_change(
    tree: &OrbatTree,
    view: &VisibilityView,
    current: Level,
    target: Level,
    cfg: &EngineConfig,
    now: f64,
) -> Option<TransitionPlan> {
    if target == current {
        return None;
    }
    let merging = target > current;
    let travel = cfg.travel_secs;
    let settle = cfg.settle_fade_secs;

    let mut flights = Vec::new();
    let mut hide_now = Vec::new();
    // Target units whose primary settles in place; their ending exploded
    // state waits out the travel window.
    let mut settled_arrivals: HashSet<UnitId> = HashSet::new();

    // Shown primaries off the target level vacate.
    for unit in tree.iter() {
        if !view.is_shown(unit.id) {
            continue;
        }
        let Some(level) = unit.level() else { continue };
        if level == target {
            continue;
        }
        if level < target {
            let Some(ancestor) = tree.ancestor_at(unit.id, target) else {
                continue;
            };
            flights.push(Flight {
                key: ActorKey::primary(unit.id),
                from: unit.home,
                to: tree.unit(ancestor).home,
                start: now,
                duration: travel,
                fade: Some(Fade::across(FadeDir::Out, travel)),
                pop: false,
                done: Completion::HideAndRehome,
            });
        } else {
            flights.push(Flight {
                key: ActorKey::primary(unit.id),
                from: unit.home,
                to: unit.home,
                start: now,
                duration: travel,
                fade: Some(Fade::across(FadeDir::Out, travel)),
                pop: true,
                done: Completion::HideAndRehome,
            });
        }
    }

    // Hidden target-level primaries arrive.
    for unit in tree.units_at(target) {
        if view.is_shown(unit.id) {
            continue;
        }
        if let Some(origin) = nearest_shown_ancestor(tree, view, unit.id) {
            flights.push(Flight {
                key: ActorKey::primary(unit.id),
                from: tree.unit(origin).home,
                to: unit.home,
                start: now,
                duration: travel,
                fade: Some(Fade::across(FadeDir::In, travel)),
                pop: false,
                done: Completion::Settle,
            });
        } else {
            settled_arrivals.insert(unit.id);
            flights.push(Flight {
                key: ActorKey::primary(unit.id),
                from: unit.home,
                to: unit.home,
                start: now + travel,
                duration: settle,
                fade: Some(Fade::across(FadeDir::In, settle)),
                pop: true,
                done: Completion::Settle,
            });
        }
    }

    // Levels the jump skips over were already hidden; normalize them anyway.
    let (lo, hi) = if merging {
        (current, target)
    } else {
        (target, current)
    };
    for unit in tree.iter() {
        let Some(level) = unit.level() else { continue };
        if level > lo && level < hi && !view.is_shown(unit.id) {
            hide_now.push(ActorKey::primary(unit.id));
        }
    }

    // Commander/staff diff against the desired exploded level. At the ladder
    // top there is none: the levels above sit outside the LOD system.
    let exploded_level = target.up();
    for unit in tree.iter() {
        let Some(level) = unit.level() else { continue };
        let want = Some(level) == exploded_level;
        let have = view.is_exploded(unit.id);
        if want == have {
            continue;
        }
        let keys = person_keys(unit);
        if keys.is_empty() {
            continue;
        }
        if want {
            let delay = cfg.staff_delay(merging);
            for key in keys {
                flights.push(person_fade(tree, key, FadeDir::In, now + delay, settle));
            }
        } else {
            let delay = if settled_arrivals.contains(&unit.id) {
                travel
            } else {
                0.0
            };
            for key in keys {
                flights.push(person_fade(tree, key, FadeDir::Out, now + delay, settle));
            }
        }
    }

    debug!(
        from = current.0,
        to = target.0,
        flights = flights.len(),
        hides = hide_now.len(),
        "planned level change"
    );
    Some(TransitionPlan { flights, hide_now })
}

/// Plans a one-level manual expand of `unit`: its marker pops out while its
/// children travel to their homes. `None` for leaves and for units that are
/// not currently shown.
#[tracing::instrument(skip_all)]
pub fn plan_branch_expand(
    tree: &OrbatTree,
    view: &VisibilityView,
    unit_id: UnitId,
    cfg: &EngineConfig,
    now: f64,
) -> Option<TransitionPlan> {
    let unit = tree.unit(unit_id);
    if unit.is_leaf() || !view.is_shown(unit_id) {
        return None;
    }
    let travel = cfg.travel_secs;
    let settle = cfg.settle_fade_secs;

    let mut flights = vec![Flight {
        key: ActorKey::primary(unit_id),
        from: unit.home,
        to: unit.home,
        start: now,
        duration: travel,
        fade: Some(Fade::across(FadeDir::Out, travel)),
        pop: true,
        done: Completion::HideAndRehome,
    }];
    for child in &unit.children {
        let child = tree.unit(*child);
        flights.push(Flight {
            key: ActorKey::primary(child.id),
            from: unit.home,
            to: child.home,
            start: now,
            duration: travel,
            fade: Some(Fade::across(FadeDir::In, travel)),
            pop: false,
            done: Completion::Settle,
        });
    }
    let delay = cfg.staff_delay(false);
    for key in person_keys(unit) {
        flights.push(person_fade(tree, key, FadeDir::In, now + delay, settle));
    }

    debug!(
        unit = %unit.source_id,
        children = unit.children.len(),
        "planned branch expand"
    );
    Some(TransitionPlan {
        flights,
        hide_now: Vec::new(),
    })
}

/// Plans a manual collapse of `unit`'s whole subtree: every shown
/// descendant travels into it, however deep manual expansion went. `None`
/// when the unit is already collapsed or nothing below it is shown.
#[tracing::instrument(skip_all)]
pub fn plan_branch_collapse(
    tree: &OrbatTree,
    view: &VisibilityView,
    unit_id: UnitId,
    cfg: &EngineConfig,
    now: f64,
) -> Option<TransitionPlan> {
    if view.is_shown(unit_id) {
        return None;
    }
    let unit = tree.unit(unit_id);
    let travel = cfg.travel_secs;
    let settle = cfg.settle_fade_secs;

    let mut flights = Vec::new();
    for descendant in tree.descendants(unit_id) {
        if view.is_shown(descendant.id) {
            flights.push(Flight {
                key: ActorKey::primary(descendant.id),
                from: descendant.home,
                to: unit.home,
                start: now,
                duration: travel,
                fade: Some(Fade::across(FadeDir::Out, travel)),
                pop: false,
                done: Completion::HideAndRehome,
            });
        }
        if view.is_exploded(descendant.id) {
            for key in person_keys(descendant) {
                flights.push(person_fade(tree, key, FadeDir::Out, now, settle));
            }
        }
    }
    if flights.is_empty() {
        return None;
    }

    // The unit settles back in once its subtree has landed.
    if view.is_exploded(unit_id) {
        for key in person_keys(unit) {
            flights.push(person_fade(tree, key, FadeDir::Out, now + travel, settle));
        }
    }
    flights.push(Flight {
        key: ActorKey::primary(unit_id),
        from: unit.home,
        to: unit.home,
        start: now + travel,
        duration: settle,
        fade: Some(Fade::across(FadeDir::In, settle)),
        pop: true,
        done: Completion::Settle,
    });

    debug!(
        unit = %unit.source_id,
        flights = flights.len(),
        "planned branch collapse"
    );
    Some(TransitionPlan {
        flights,
        hide_now: Vec::new(),
    })
}

fn nearest_shown_ancestor(
    tree: &OrbatTree,
    view: &VisibilityView,
    unit: UnitId,
) -> Option<UnitId> {
    let mut cursor = tree.unit(unit).parent;
    while let Some(current) = cursor {
        if view.is_shown(current) {
            return Some(current);
        }
        cursor = tree.unit(current).parent;
    }
    None
}

/// Commander/staff keys a unit actually owns.
fn person_keys(unit: &Unit) -> SmallVec<[ActorKey; 3]> {
    let mut keys = SmallVec::new();
    if unit.commander.is_some() {
        keys.push(ActorKey::commander(unit.id));
    }
    if unit.staff.is_some() {
        for kind in ActorKind::STAFF {
            keys.push(ActorKey {
                unit: unit.id,
                kind,
            });
        }
    }
    keys
}

fn person_home(unit: &Unit, kind: ActorKind) -> DVec3 {
    match kind {
        ActorKind::StaffA | ActorKind::StaffB => unit
            .staff
            .as_ref()
            .map(|staff| staff[staff_slot(kind)].home)
            .unwrap_or(unit.home),
        _ => unit.home,
    }
}

/// Stationary fade for a commander/staff marker at its own post.
fn person_fade(
    tree: &OrbatTree,
    key: ActorKey,
    dir: FadeDir,
    start: f64,
    duration: f64,
) -> Flight {
    let home = person_home(tree.unit(key.unit), key.kind);
    Flight {
        key,
        from: home,
        to: home,
        start,
        duration,
        fade: Some(Fade::across(dir, duration)),
        pop: false,
        done: match dir {
            FadeDir::In => Completion::Settle,
            FadeDir::Out => Completion::HideAndRehome,
        },
    }
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod planner_test;
