//! The visual-actor registry.
//!
//! Owns every marker the engine ever creates and is the single mutation
//! point for marker state: the scheduler, the LOD machine, and the
//! declutter pass all write actor state here, and [`ActorRegistry::flush`]
//! pushes whatever changed to the renderer once per tick. No other
//! component talks to renderer markers directly.

use std::collections::HashMap;

use glam::DVec3;

use super::{display_name, staff_slot, Actor, ActorKey, ActorKind};
use crate::constants::MIN_VISIBLE_ALPHA;
use crate::orbat::echelon::{Echelon, Level};
use crate::orbat::tree::OrbatTree;
use crate::renderer::{MarkerDesc, MarkerIcon, MarkerId, SceneRenderer};

pub struct ActorRegistry {
    actors: Vec<Actor>,
    markers: Vec<MarkerId>,
    index: HashMap<ActorKey, usize>,
    owners: HashMap<MarkerId, ActorKey>,
    layer_visible: bool,
    labels_visible: bool,
    /// Forces a full repaint on the next flush after a master toggle.
    repaint_all: bool,
}

impl ActorRegistry {
    /// Creates one marker per unit, plus commander/staff markers where the
    /// data carries them. Only primaries at `default_level` start shown.
    pub fn build<R: SceneRenderer>(
        tree: &OrbatTree,
        renderer: &mut R,
        default_level: Level,
    ) -> Self {
        let mut registry = Self {
            actors: Vec::new(),
            markers: Vec::new(),
            index: HashMap::new(),
            owners: HashMap::new(),
            layer_visible: true,
            labels_visible: true,
            repaint_all: true,
        };

        for unit in tree.iter() {
            let shown = unit.level() == Some(default_level);
            registry.insert(
                renderer,
                tree,
                ActorKey::primary(unit.id),
                MarkerIcon::Unit(unit.echelon),
                primary_size(unit.echelon),
                unit.home,
                shown,
            );
            if unit.commander.is_some() {
                // The commander stands in for the unit at its command post.
                registry.insert(
                    renderer,
                    tree,
                    ActorKey::commander(unit.id),
                    MarkerIcon::Commander,
                    PERSON_SIZE,
                    unit.home,
                    false,
                );
            }
            if let Some(staff) = &unit.staff {
                for kind in ActorKind::STAFF {
                    let key = ActorKey {
                        unit: unit.id,
                        kind,
                    };
                    registry.insert(
                        renderer,
                        tree,
                        key,
                        MarkerIcon::Staff,
                        PERSON_SIZE,
                        staff[staff_slot(kind)].home,
                        false,
                    );
                }
            }
        }
        tracing::debug!(actors = registry.actors.len(), "actor registry built");
        registry
    }

    #[allow(clippy::too_many_arguments)]
    fn insert<R: SceneRenderer>(
        &mut self,
        renderer: &mut R,
        tree: &OrbatTree,
        key: ActorKey,
        icon: MarkerIcon,
        size: f32,
        home: DVec3,
        shown: bool,
    ) {
        let marker = renderer.create_marker(&MarkerDesc {
            icon,
            size,
            label: display_name(tree, key).to_owned(),
            interactive: true,
        });
        self.index.insert(key, self.actors.len());
        self.owners.insert(marker, key);
        self.markers.push(marker);
        self.actors.push(Actor {
            key,
            home,
            position: home,
            shown,
            billboard_alpha: 1.0,
            label_alpha: 1.0,
            scale: 1.0,
            dirty: true,
        });
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actor(&self, key: ActorKey) -> Option<&Actor> {
        self.index.get(&key).map(|i| &self.actors[*i])
    }

    /// True when the actor exists and is logically shown, ignoring the master
    /// layer switch.
    pub fn is_shown(&self, key: ActorKey) -> bool {
        self.actor(key).is_some_and(|a| a.shown)
    }

    /// Logically shown actors, in creation (tree preorder) order.
    pub fn shown_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|a| a.shown)
    }

    pub fn marker_of(&self, key: ActorKey) -> Option<MarkerId> {
        self.index.get(&key).map(|i| self.markers[*i])
    }

    /// Actor behind a marker, `None` for foreign markers.
    pub fn owner_of(&self, marker: MarkerId) -> Option<ActorKey> {
        self.owners.get(&marker).copied()
    }

    fn actor_mut(&mut self, key: ActorKey) -> Option<&mut Actor> {
        let i = *self.index.get(&key)?;
        Some(&mut self.actors[i])
    }

    pub fn set_shown(&mut self, key: ActorKey, shown: bool) {
        if let Some(actor) = self.actor_mut(key) {
            if actor.shown != shown {
                actor.shown = shown;
                actor.dirty = true;
            }
        }
    }

    /// Sets billboard and label opacity. The billboard is floored at a small
    /// epsilon so renderers that cull fully transparent markers keep it alive
    /// mid-fade.
    pub fn set_alpha(&mut self, key: ActorKey, billboard: f32, label: f32) {
        if let Some(actor) = self.actor_mut(key) {
            actor.billboard_alpha = billboard.max(MIN_VISIBLE_ALPHA);
            actor.label_alpha = label.clamp(0.0, 1.0);
            actor.dirty = true;
        }
    }

    pub fn set_scale(&mut self, key: ActorKey, scale: f32) {
        if let Some(actor) = self.actor_mut(key) {
            actor.scale = scale;
            actor.dirty = true;
        }
    }

    pub fn set_position(&mut self, key: ActorKey, position: DVec3) {
        if let Some(actor) = self.actor_mut(key) {
            actor.position = position;
            actor.dirty = true;
        }
    }

    /// Snaps the rendered position back to the rest position.
    pub fn snap_home(&mut self, key: ActorKey) {
        if let Some(actor) = self.actor_mut(key) {
            actor.position = actor.home;
            actor.dirty = true;
        }
    }

    pub fn layer_visible(&self) -> bool {
        self.layer_visible
    }

    /// Master switch for the whole layer. Logical show flags are untouched so
    /// the layer comes back exactly as it was.
    pub fn set_layer_visible(&mut self, visible: bool) {
        if self.layer_visible != visible {
            self.layer_visible = visible;
            self.repaint_all = true;
        }
    }

    pub fn labels_visible(&self) -> bool {
        self.labels_visible
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        if self.labels_visible != visible {
            self.labels_visible = visible;
            self.repaint_all = true;
        }
    }

    /// Pushes every change since the last flush to the renderer.
    pub fn flush<R: SceneRenderer>(&mut self, renderer: &mut R) {
        let repaint_all = std::mem::take(&mut self.repaint_all);
        for (actor, marker) in self.actors.iter_mut().zip(&self.markers) {
            if !actor.dirty && !repaint_all {
                continue;
            }
            renderer.set_shown(*marker, actor.shown && self.layer_visible);
            renderer.set_position(*marker, actor.position);
            renderer.set_alpha(*marker, actor.billboard_alpha, actor.label_alpha);
            renderer.set_scale(*marker, actor.scale);
            if repaint_all {
                renderer.set_label_shown(*marker, self.labels_visible);
            }
            actor.dirty = false;
        }
    }
}

/// Billboard size of a unit symbol, individuals smaller than formations.
fn primary_size(echelon: Echelon) -> f32 {
    match echelon {
        Echelon::Individual => 14.0,
        other => 20.0 + 4.0 * (other.rank() as f32 - 1.0),
    }
}

/// Billboard size of commander and staff figures.
const PERSON_SIZE: f32 = 16.0;

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
