//! Shared tuning constants for LOD transitions and the declutter pass.
//!
//! Everything here is a presentation default; per-engine overrides live in
//! [`crate::config::EngineConfig`].

/// Alpha floor for shown markers.
///
/// Some renderers cull fully transparent billboards, which would also drop
/// them from hit-testing mid-fade. Any shown actor keeps at least this much
/// billboard alpha.
pub const MIN_VISIBLE_ALPHA: f32 = 1.0 / 255.0;

/// Travel time of a merge/unmerge flight, seconds.
pub const TRAVEL_SECS: f64 = 1.2;

/// Duration of the settle fade that follows a travel window, seconds.
pub const SETTLE_FADE_SECS: f64 = 0.45;

/// Fraction of the settle fade that must elapse before commander/staff
/// markers may start fading in.
pub const STAFF_DELAY_RATIO: f64 = 0.75;

/// Perpendicular control-point offset of a flight arc, as a fraction of the
/// straight-line path length. Purely aesthetic.
pub const ARC_RATIO: f64 = 0.18;

/// Trailing fraction of a fade window that drives label alpha.
///
/// Billboard alpha spans the whole window; the label only appears in this
/// last slice so it cannot flash during rapid transitions.
pub const LABEL_WINDOW: f64 = 0.3;

/// Peak overshoot of a pop-scale, relative to rest scale 1.0.
pub const POP_BULGE: f32 = 0.25;

/// Declutter grid cell edge, pixels.
pub const CLUSTER_CELL_PX: f64 = 48.0;

/// Debounce delay for camera-driven recomputation, seconds.
pub const CAMERA_DEBOUNCE_SECS: f64 = 0.30;

/// Height bias added to every home position so markers float clear of the
/// terrain relief, meters.
pub const MARKER_HEIGHT_BIAS_M: f64 = 12.0;

/// Mean Earth radius for the spherical local-tangent-plane mapping, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
