//! The declutter pass.
//!
//! Projects every shown actor to screen space, buckets by pixel cell, and
//! swaps over-populated cells for single pooled proxy markers. The pass
//! only ever runs between transitions (scheduler idle, dirty flag set) and
//! always restores the previous overlay completely before recomputing, so
//! no actor can be lost to clustering across passes: the overlay is a
//! temporary layer on top of the visibility invariant, never part of it.

use std::collections::HashMap;

use glam::{DVec2, DVec3};
use smallvec::SmallVec;
use tracing::debug;
use web_time::Instant;

use super::grid::{cell_of, CellKey};
use super::proxy::ProxyPool;
use crate::actor::registry::ActorRegistry;
use crate::actor::{display_name, ActorKey, ActorKind};
use crate::orbat::tree::OrbatTree;
use crate::renderer::{MarkerIcon, SceneRenderer};

/// Suppressions applied by the last pass, with each actor's prior show
/// state so restore is exact.
#[derive(Default)]
pub struct ClusterOverlay {
    suppressed: Vec<(ActorKey, bool)>,
}

impl ClusterOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.suppressed.is_empty()
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Returns every suppressed actor to its prior show state and parks the
    /// proxy pool.
    pub fn restore<R: SceneRenderer>(
        &mut self,
        registry: &mut ActorRegistry,
        pool: &mut ProxyPool,
        renderer: &mut R,
    ) {
        for (key, was_shown) in self.suppressed.drain(..) {
            registry.set_shown(key, was_shown);
        }
        pool.reset(renderer);
    }
}

/// Counters for one declutter pass.
#[derive(Clone, Copy, Default, Debug)]
pub struct ClusterStats {
    /// Logically shown actors considered.
    pub shown: usize,
    /// Actors that projected onto the screen.
    pub projected: usize,
    /// Actors skipped because they project off-screen or behind the camera.
    pub offscreen: usize,
    /// Actors hidden behind proxies, representatives included.
    pub clustered: usize,
    /// Proxies activated.
    pub proxies: usize,
    pub pass_micros: u64,
}

struct Candidate {
    key: ActorKey,
    position: DVec3,
    screen: DVec2,
    rank: u32,
}

/// Restores the previous overlay, then hides every over-populated cell
/// behind one pooled proxy.
#[tracing::instrument(skip_all)]
pub fn run_pass<R: SceneRenderer>(
    tree: &OrbatTree,
    registry: &mut ActorRegistry,
    pool: &mut ProxyPool,
    overlay: &mut ClusterOverlay,
    renderer: &mut R,
    cell_px: f64,
) -> ClusterStats {
    let started = Instant::now();
    overlay.restore(registry, pool, renderer);

    let mut stats = ClusterStats::default();
    if !registry.layer_visible() {
        stats.pass_micros = started.elapsed().as_micros() as u64;
        return stats;
    }

    let mut candidates = Vec::new();
    for actor in registry.shown_actors() {
        stats.shown += 1;
        match renderer.project(actor.position) {
            None => stats.offscreen += 1,
            Some(screen) => candidates.push(Candidate {
                key: actor.key,
                position: actor.position,
                screen,
                rank: rank_of(tree, actor.key),
            }),
        }
    }
    stats.projected = candidates.len();

    let mut cells: HashMap<CellKey, SmallVec<[usize; 4]>> = HashMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        cells
            .entry(cell_of(candidate.screen, cell_px))
            .or_default()
            .push(index);
    }

    for members in cells.into_values() {
        if members.len() < 2 {
            continue;
        }
        // Highest rank wins; creation order (tree preorder) breaks ties, which
        // keeps the pass deterministic frame to frame.
        let representative = members
            .iter()
            .copied()
            .max_by_key(|i| (candidates[*i].rank, std::cmp::Reverse(*i)))
            .unwrap_or(members[0]);
        let rep = &candidates[representative];

        for index in &members {
            overlay.suppressed.push((candidates[*index].key, true));
            registry.set_shown(candidates[*index].key, false);
            stats.clustered += 1;
        }
        let label = format!("{} +{}", display_name(tree, rep.key), members.len() - 1);
        pool.activate(
            renderer,
            icon_of(tree, rep.key),
            &label,
            rep.position,
            rep.key,
            members.iter().map(|i| candidates[*i].screen).collect(),
        );
        stats.proxies += 1;
    }

    stats.pass_micros = started.elapsed().as_micros() as u64;
    debug!(
        shown = stats.shown,
        offscreen = stats.offscreen,
        clustered = stats.clustered,
        proxies = stats.proxies,
        micros = stats.pass_micros,
        "declutter pass"
    );
    stats
}

/// Fixed priority for representative election: unit symbols beat people,
/// coarser echelons beat finer ones.
fn rank_of(tree: &OrbatTree, key: ActorKey) -> u32 {
    match key.kind {
        ActorKind::Primary => 100 + tree.unit(key.unit).echelon.rank() as u32,
        ActorKind::Commander => 50,
        ActorKind::StaffA | ActorKind::StaffB => 10,
    }
}

fn icon_of(tree: &OrbatTree, key: ActorKey) -> MarkerIcon {
    match key.kind {
        ActorKind::Primary => MarkerIcon::Unit(tree.unit(key.unit).echelon),
        ActorKind::Commander => MarkerIcon::Commander,
        ActorKind::StaffA | ActorKind::StaffB => MarkerIcon::Staff,
    }
}

#[cfg(test)]
#[path = "pass_test.rs"]
mod pass_test;
