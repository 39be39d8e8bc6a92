//! Shared test fixtures: a recording mock renderer and canned unit trees.

use std::collections::HashMap;

use glam::{DVec2, DVec3};
use serde_json::json;
use smallvec::SmallVec;

use crate::actor::registry::ActorRegistry;
use crate::actor::{ActorKey, ActorKind};
use crate::config::EngineConfig;
use crate::orbat::echelon::Level;
use crate::orbat::tree::OrbatTree;
use crate::renderer::{MarkerDesc, MarkerId, SceneRenderer};

/// Everything the mock knows about one marker.
#[derive(Clone, Debug)]
pub struct MarkerState {
    pub desc: MarkerDesc,
    pub shown: bool,
    pub position: DVec3,
    pub billboard_alpha: f32,
    pub label_alpha: f32,
    pub scale: f32,
    pub label: String,
    pub label_shown: bool,
}

/// Records every mutation and answers projection queries with a top-down
/// orthographic camera: screen = (x, z) * pixels_per_meter, y ignored.
pub struct MockRenderer {
    next_id: u64,
    created: Vec<MarkerId>,
    pub markers: HashMap<MarkerId, MarkerState>,
    pub camera_distance: f64,
    pub pixels_per_meter: f64,
    /// Projections beyond these half-extents return `None`.
    pub viewport_half: DVec2,
    pub pick_radius: f64,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            created: Vec::new(),
            markers: HashMap::new(),
            camera_distance: 50_000.0,
            pixels_per_meter: 1.0,
            viewport_half: DVec2::new(1.0e6, 1.0e6),
            pick_radius: 8.0,
        }
    }

    pub fn marker(&self, id: MarkerId) -> &MarkerState {
        &self.markers[&id]
    }

    /// Screen position of a world point, ignoring the viewport clip. Tests
    /// use this to aim clicks.
    pub fn screen_of(&self, world: DVec3) -> DVec2 {
        DVec2::new(world.x, world.z) * self.pixels_per_meter
    }

    pub fn shown_markers(&self) -> impl Iterator<Item = (&MarkerId, &MarkerState)> {
        self.markers.iter().filter(|(_, m)| m.shown)
    }
}

impl SceneRenderer for MockRenderer {
    fn create_marker(&mut self, desc: &MarkerDesc) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.created.push(id);
        self.markers.insert(
            id,
            MarkerState {
                desc: desc.clone(),
                shown: false,
                position: DVec3::ZERO,
                billboard_alpha: 1.0,
                label_alpha: 1.0,
                scale: 1.0,
                label: desc.label.clone(),
                label_shown: true,
            },
        );
        id
    }

    fn set_shown(&mut self, id: MarkerId, shown: bool) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.shown = shown;
        }
    }

    fn set_position(&mut self, id: MarkerId, position: DVec3) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.position = position;
        }
    }

    fn set_alpha(&mut self, id: MarkerId, billboard: f32, label: f32) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.billboard_alpha = billboard;
            m.label_alpha = label;
        }
    }

    fn set_scale(&mut self, id: MarkerId, scale: f32) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.scale = scale;
        }
    }

    fn set_icon(&mut self, id: MarkerId, icon: crate::renderer::MarkerIcon) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.desc.icon = icon;
        }
    }

    fn set_label(&mut self, id: MarkerId, text: &str) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.label = text.to_owned();
        }
    }

    fn set_label_shown(&mut self, id: MarkerId, shown: bool) {
        if let Some(m) = self.markers.get_mut(&id) {
            m.label_shown = shown;
        }
    }

    fn project(&self, world: DVec3) -> Option<DVec2> {
        let screen = self.screen_of(world);
        (screen.x.abs() <= self.viewport_half.x && screen.y.abs() <= self.viewport_half.y)
            .then_some(screen)
    }

    fn camera_distance(&self) -> f64 {
        self.camera_distance
    }

    fn hit_test(&self, point: DVec2, drill: bool) -> SmallVec<[MarkerId; 4]> {
        // Latest-created draws on top, matching how proxies overlay real markers.
        self
            .created
            .iter()
            .rev()
            .filter(|id| {
                let m = &self.markers[id];
                m.shown
                    && (drill || m.desc.interactive)
                    && self
                        .project(m.position)
                        .is_some_and(|s| s.distance(point) <= self.pick_radius)
            })
            .copied()
            .collect()
    }
}

// =============================================================================
// Canned trees
// =============================================================================

const LADDER_NAMES: [&str; 7] = [
    "individual",
    "squad",
    "platoon",
    "company",
    "battalion",
    "regiment",
    "brigade",
];

/// Degrees of longitude per meter-ish step at the fixture latitude; spacing
/// below is chosen so sibling markers land hundreds of meters apart.
const ANCHOR_LAT: f64 = 48.0;
const ANCHOR_LON: f64 = 35.0;

fn person(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name })
}

fn staff_pair(prefix: &str, lat: f64, lon: f64) -> serde_json::Value {
    json!([
        {
            "id": format!("{prefix}-s1"),
            "name": format!("{prefix} ops"),
            "position": { "lat": lat + 0.002, "lon": lon - 0.002, "alt": 0.0 },
        },
        {
            "id": format!("{prefix}-s2"),
            "name": format!("{prefix} log"),
            "position": { "lat": lat - 0.002, "lon": lon + 0.002, "alt": 0.0 },
        },
    ])
}

/// The reference scenario: one battalion, three companies, three platoons
/// each, everything at distinct positions, commander and staff on the
/// battalion and on every company.
pub fn battalion_json() -> String {
    let mut companies = Vec::new();
    for c in 0..3 {
        let clat = ANCHOR_LAT + 0.02 * (c as f64 - 1.0);
        let clon = ANCHOR_LON + 0.03;
        let platoons: Vec<_> = (0..3)
            .map(|p| {
                json!({
                    "id": format!("co-{c}-plt-{p}"),
                    "name": format!("Platoon {c}/{p}"),
                    "type": "platoon",
                    "position": { "lat": clat + 0.004 * (p as f64 - 1.0), "lon": clon + 0.012, "alt": 0.0 },
                    "children": [],
                })
            })
            .collect();
        let mut company = json!({
            "id": format!("co-{c}"),
            "name": format!("Company {c}"),
            "type": "company",
            "position": { "lat": clat, "lon": clon, "alt": 0.0 },
            "children": platoons,
        });
        company["commander"] = person(&format!("co-{c}-cdr"), &format!("Company {c} CO"));
        company["staff"] = staff_pair(&format!("co-{c}"), clat, clon);
        companies.push(company);
    }
    let mut root = json!({
        "id": "bn-1",
        "name": "1st Battalion",
        "type": "battalion",
        "position": { "lat": ANCHOR_LAT, "lon": ANCHOR_LON, "alt": 0.0 },
        "children": companies,
    });
    root["commander"] = person("bn-1-cdr", "Battalion CO");
    root["staff"] = staff_pair("bn-1", ANCHOR_LAT, ANCHOR_LON);
    root.to_string()
}

pub fn battalion_tree() -> OrbatTree {
    OrbatTree::from_json(&battalion_json(), 12.0).unwrap()
}

/// A full-depth tree rooted above the LOD ladder: one brigade, two of each
/// echelon below, down to individuals. Commander/staff only from company
/// upward, so lower echelons exercise the no-persons paths.
pub fn brigade_json() -> String {
    build_unit(6, "u", ANCHOR_LAT, ANCHOR_LON, 0.4).to_string()
}

fn build_unit(rank: usize, id: &str, lat: f64, lon: f64, spread: f64) -> serde_json::Value {
    let children: Vec<_> = if rank == 0 {
        Vec::new()
    } else {
        (0..2)
            .map(|i| {
                let offset = spread * (i as f64 - 0.5);
                build_unit(
                    rank - 1,
                    &format!("{id}-{i}"),
                    lat + offset,
                    lon + spread * 0.35,
                    spread * 0.45,
                )
            })
            .collect()
    };
    let mut unit = json!({
        "id": id,
        "name": id.to_uppercase(),
        "type": LADDER_NAMES[rank],
        "position": { "lat": lat, "lon": lon, "alt": 0.0 },
        "children": children,
    });
    if rank >= 3 {
        unit["commander"] = person(&format!("{id}-cdr"), &format!("{id} CO"));
        unit["staff"] = staff_pair(id, lat, lon);
    }
    unit
}

pub fn brigade_tree() -> OrbatTree {
    OrbatTree::from_json(&brigade_json(), 12.0).unwrap()
}

/// Short durations so tests drive whole transitions in a few ticks.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        travel_secs: 0.2,
        settle_fade_secs: 0.1,
        camera_debounce_secs: 0.05,
        ..EngineConfig::default()
    }
}

/// Asserts the steady-state visibility rule for a uniform display level:
/// primaries shown exactly at `level`, commander/staff shown exactly one
/// step above it, nothing else shown anywhere.
pub fn assert_uniform_level(tree: &OrbatTree, registry: &ActorRegistry, level: Level) {
    for unit in tree.iter() {
        let primary = registry.is_shown(ActorKey::primary(unit.id));
        let persons: Vec<bool> = [ActorKind::Commander, ActorKind::StaffA, ActorKind::StaffB]
            .into_iter()
            .map(|kind| ActorKey { unit: unit.id, kind })
            .filter(|key| registry.actor(*key).is_some())
            .map(|key| registry.is_shown(key))
            .collect();
        let label = &unit.source_id;

        match unit.level() {
            Some(l) if l == level => {
                assert!(primary, "{label}: displayed level primary must be shown");
                assert!(
                    persons.iter().all(|shown| !shown),
                    "{label}: displayed level must not be exploded"
                );
            }
            Some(l) if Some(l) == level.up() => {
                assert!(!primary, "{label}: exploded level primary must be hidden");
                assert!(
                    persons.iter().all(|shown| *shown),
                    "{label}: commander/staff must all be shown one level up"
                );
            }
            _ => {
                assert!(!primary, "{label}: off-level primary must be hidden");
                assert!(
                    persons.iter().all(|shown| !shown),
                    "{label}: off-level persons must be hidden"
                );
            }
        }
    }
}
