//! Pointer-hit resolution.
//!
//! Turns a screen click into a branch request against the LOD machine.
//! Hit-testing is delegated to the renderer with drill semantics so
//! decorative overlays never shadow a marker; hits are walked topmost
//! first, markers the engine doesn't own are skipped, and a declutter
//! proxy resolves to its representative's real unit.
//!
//! An outcome with `handled` set must consume the host event even when no
//! action came out of it: a click on a leaf or on the root still landed on
//! a military marker and must not fall through to, say, waypoint placement.

use glam::DVec2;
use tracing::debug;

use crate::actor::registry::ActorRegistry;
use crate::actor::{ActorKey, ActorKind};
use crate::cluster::proxy::ProxyPool;
use crate::orbat::tree::{OrbatTree, UnitId};
use crate::renderer::SceneRenderer;

/// Pointer button of a click, as the command surface defines them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerButton {
    /// Unmerge (expand) the clicked branch one level.
    Left,
    /// Merge (collapse) the clicked subtree.
    Right,
}

/// Branch request a click resolved to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClickAction {
    ExpandBranch(UnitId),
    CollapseBranch(UnitId),
}

/// Result of resolving one click.
#[derive(Clone, Copy, Default, Debug)]
pub struct ClickOutcome {
    /// An engine-owned marker sat under the pointer. The host must consume
    /// the event even when `action` is `None`.
    pub handled: bool,
    pub action: Option<ClickAction>,
    /// The hit went through a declutter proxy; the overlay has to be cleared
    /// before the action can animate real actors.
    pub via_proxy: bool,
}

/// Resolves `point` against the current marker set.
pub fn resolve_click<R: SceneRenderer>(
    tree: &OrbatTree,
    registry: &ActorRegistry,
    pool: &ProxyPool,
    renderer: &R,
    point: DVec2,
    button: PointerButton,
) -> ClickOutcome {
    for marker in renderer.hit_test(point, true) {
        if let Some(slot) = pool.owner_of(marker) {
            let Some(representative) = pool.slot(slot).and_then(|s| s.representative()) else {
                continue;
            };
            let mut outcome = outcome_for(tree, representative, button);
            outcome.via_proxy = true;
            debug!(slot, ?outcome.action, "click resolved through proxy");
            return outcome;
        }
        if let Some(key) = registry.owner_of(marker) {
            let outcome = outcome_for(tree, key, button);
            debug!(?outcome.action, "click resolved");
            return outcome;
        }
        // Foreign marker; keep drilling.
    }
    ClickOutcome::default()
}

/// Maps a resolved actor to its branch request.
///
/// A commander or staff hit addresses its owning unit directly; a primary
/// hit collapses towards the parent, since the unit itself is the thing on
/// screen. The root has no parent and resolves to a consumed no-op.
fn outcome_for(tree: &OrbatTree, key: ActorKey, button: PointerButton) -> ClickOutcome {
    let person_hit = key.kind != ActorKind::Primary;
    let action = match button {
        PointerButton::Left => Some(ClickAction::ExpandBranch(key.unit)),
        PointerButton::Right if person_hit => Some(ClickAction::CollapseBranch(key.unit)),
        PointerButton::Right => tree
            .unit(key.unit)
            .parent
            .map(ClickAction::CollapseBranch),
    };
    ClickOutcome {
        handled: true,
        action,
        via_proxy: false,
    }
}
