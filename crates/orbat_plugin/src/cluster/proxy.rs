//! Pooled proxy markers.
//!
//! A fixed-growth arena of renderer markers reused across declutter passes.
//! Reset deactivates every slot but keeps the marker objects; activation
//! takes the first free slot, or grows the arena when none is free. Only
//! the icon and label track the current representative; the billboard size
//! is fixed so pooled markers never need recreating.

use std::collections::HashMap;

use glam::{DVec2, DVec3};

use crate::actor::ActorKey;
use crate::renderer::{MarkerDesc, MarkerIcon, MarkerId, SceneRenderer};

const PROXY_SIZE: f32 = 30.0;

/// One pooled marker and what it currently stands in for.
pub struct ProxySlot {
    marker: MarkerId,
    active: bool,
    representative: Option<ActorKey>,
    represented: usize,
    members_screen: Vec<DVec2>,
}

impl ProxySlot {
    pub fn marker(&self) -> MarkerId {
        self.marker
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The real actor this proxy resolves to for picking.
    pub fn representative(&self) -> Option<ActorKey> {
        self.representative
    }

    /// Total actors hidden behind this proxy, representative included.
    pub fn represented(&self) -> usize {
        self.represented
    }

    /// Screen positions of the represented actors at activation time.
    pub fn members_screen(&self) -> &[DVec2] {
        &self.members_screen
    }
}

pub struct ProxyPool {
    slots: Vec<ProxySlot>,
    owners: HashMap<MarkerId, usize>,
    labels_shown: bool,
}

impl Default for ProxyPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyPool {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            owners: HashMap::new(),
            labels_shown: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn slot(&self, index: usize) -> Option<&ProxySlot> {
        self.slots.get(index)
    }

    pub fn active_slots(&self) -> impl Iterator<Item = (usize, &ProxySlot)> {
        self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
    }

    /// Slot behind a marker, `None` for foreign markers and parked slots.
    pub fn owner_of(&self, marker: MarkerId) -> Option<usize> {
        let index = *self.owners.get(&marker)?;
        self.slots[index].active.then_some(index)
    }

    /// Parks every slot, hiding its marker. Marker objects stay allocated.
    pub fn reset<R: SceneRenderer>(&mut self, renderer: &mut R) {
        for slot in &mut self.slots {
            if slot.active {
                renderer.set_shown(slot.marker, false);
                slot.active = false;
                slot.representative = None;
                slot.represented = 0;
                slot.members_screen.clear();
            }
        }
    }

    /// Activates a slot for one cluster and paints its marker.
    pub fn activate<R: SceneRenderer>(
        &mut self,
        renderer: &mut R,
        icon: MarkerIcon,
        label: &str,
        position: DVec3,
        representative: ActorKey,
        members_screen: Vec<DVec2>,
    ) -> usize {
        let index = match self.slots.iter().position(|slot| !slot.active) {
            Some(free) => {
                renderer.set_icon(self.slots[free].marker, icon);
                renderer.set_label(self.slots[free].marker, label);
                free
            }
            None => {
                let marker = renderer.create_marker(&MarkerDesc {
                    icon,
                    size: PROXY_SIZE,
                    label: label.to_owned(),
                    interactive: true,
                });
                self.owners.insert(marker, self.slots.len());
                self.slots.push(ProxySlot {
                    marker,
                    active: false,
                    representative: None,
                    represented: 0,
                    members_screen: Vec::new(),
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        slot.active = true;
        slot.representative = Some(representative);
        slot.represented = members_screen.len();
        slot.members_screen = members_screen;
        renderer.set_position(slot.marker, position);
        renderer.set_alpha(slot.marker, 1.0, 1.0);
        renderer.set_scale(slot.marker, 1.0);
        // The labels toggle may have flipped while this slot was parked, or
        // before its marker even existed.
        renderer.set_label_shown(slot.marker, self.labels_shown);
        renderer.set_shown(slot.marker, true);
        index
    }

    /// Applies the global labels toggle to every pooled marker, current and
    /// future.
    pub fn set_labels_shown<R: SceneRenderer>(&mut self, renderer: &mut R, shown: bool) {
        self.labels_shown = shown;
        for slot in &self.slots {
            renderer.set_label_shown(slot.marker, shown);
        }
    }
}
