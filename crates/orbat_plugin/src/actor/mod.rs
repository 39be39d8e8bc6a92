//! Renderable actor state.
//!
//! An actor is the mutable visual state behind one marker: shown flag,
//! current position, alphas, scale. Actors for commander and staff markers
//! are keyed by their owning unit, not by their person ids, since at most
//! one set is meaningful per unit at a time.

pub mod registry;

use glam::DVec3;

use crate::orbat::tree::{OrbatTree, UnitId};

/// Which of a unit's markers an actor backs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ActorKind {
    /// The unit's own symbol.
    Primary,
    Commander,
    /// First staff entry.
    StaffA,
    /// Second staff entry.
    StaffB,
}

impl ActorKind {
    /// The two staff kinds, in document order.
    pub const STAFF: [ActorKind; 2] = [ActorKind::StaffA, ActorKind::StaffB];
}

/// Stable actor address: owning unit plus marker kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ActorKey {
    pub unit: UnitId,
    pub kind: ActorKind,
}

impl ActorKey {
    pub fn primary(unit: UnitId) -> Self {
        Self {
            unit,
            kind: ActorKind::Primary,
        }
    }

    pub fn commander(unit: UnitId) -> Self {
        Self {
            unit,
            kind: ActorKind::Commander,
        }
    }
}

/// Mutable visual state of one marker.
#[derive(Clone, Debug)]
pub struct Actor {
    pub key: ActorKey,
    /// Rest position, never changes after load.
    pub home: DVec3,
    /// Rendered position, overwritten while animating and snapped back to
    /// `home` when the actor settles or is hidden away.
    pub position: DVec3,
    pub shown: bool,
    pub billboard_alpha: f32,
    pub label_alpha: f32,
    pub scale: f32,
    pub(crate) dirty: bool,
}

/// Display name of the person or unit an actor stands for.
pub fn display_name(tree: &OrbatTree, key: ActorKey) -> &str {
    let unit = tree.unit(key.unit);
    match key.kind {
        ActorKind::Primary => &unit.name,
        ActorKind::Commander => unit
            .commander
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(&unit.name),
        ActorKind::StaffA | ActorKind::StaffB => unit
            .staff
            .as_ref()
            .map(|s| s[staff_slot(key.kind)].name.as_str())
            .unwrap_or(&unit.name),
    }
}

/// Index into a unit's staff pair for a staff kind.
pub(crate) fn staff_slot(kind: ActorKind) -> usize {
    match kind {
        ActorKind::StaffB => 1,
        _ => 0,
    }
}
