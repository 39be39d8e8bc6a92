//! Renderer abstraction.
//!
//! The engine never talks to a scene graph directly. Everything it needs
//! from the host (marker objects, projection, picking) goes through
//! [`SceneRenderer`], which keeps the core testable against a mock and free
//! of any particular 3D stack.

use glam::{DVec2, DVec3};
use smallvec::SmallVec;

use crate::orbat::echelon::Echelon;

/// Opaque handle to one billboard marker owned by the renderer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MarkerId(pub u64);

/// Which glyph a marker renders.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MarkerIcon {
    /// Unit symbol for the given echelon.
    Unit(Echelon),
    /// Commander figure.
    Commander,
    /// Staff figure.
    Staff,
}

/// Creation-time description of a marker.
#[derive(Clone, Debug)]
pub struct MarkerDesc {
    pub icon: MarkerIcon,
    /// Billboard size in screen points at reference distance.
    pub size: f32,
    /// Text shown next to the billboard.
    pub label: String,
    /// Whether the marker participates in default picking. Drill picks see it
    /// either way.
    pub interactive: bool,
}

/// Host-side scene services the engine drives.
///
/// Markers are created once and mutated afterwards; the engine batches its
/// mutations per tick through [`ActorRegistry::flush`]. Projection returning
/// `None` means the point is off-screen or behind the camera.
///
/// [`ActorRegistry::flush`]: crate::actor::registry::ActorRegistry::flush
pub trait SceneRenderer {
    /// Creates a marker and returns its handle.
    fn create_marker(&mut self, desc: &MarkerDesc) -> MarkerId;
    fn set_shown(&mut self, id: MarkerId, shown: bool);
    fn set_position(&mut self, id: MarkerId, position: DVec3);
    /// Sets billboard and label opacity independently.
    fn set_alpha(&mut self, id: MarkerId, billboard: f32, label: f32);
    fn set_scale(&mut self, id: MarkerId, scale: f32);
    fn set_icon(&mut self, id: MarkerId, icon: MarkerIcon);
    fn set_label(&mut self, id: MarkerId, text: &str);
    fn set_label_shown(&mut self, id: MarkerId, shown: bool);

    /// Projects a render-space point to physical-pixel screen coordinates.
    fn project(&self, world: DVec3) -> Option<DVec2>;
    /// Distance from the camera to its focus point, in meters.
    fn camera_distance(&self) -> f64;
    /// Markers under `point`, topmost first. `drill` includes markers flagged
    /// non-interactive.
    fn hit_test(&self, point: DVec2, drill: bool) -> SmallVec<[MarkerId; 4]>;
}
