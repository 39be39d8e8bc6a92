//! Engine configuration.

use crate::constants::*;
use crate::lod::leveling::LevelBands;
use crate::orbat::echelon::Level;
use crate::outline::OutlineConfig;

/// Tuning knobs for one engine instance.
///
/// `Default` mirrors the production layer. Tests shorten the durations so
/// transitions finish within a few simulated ticks.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Display level shown right after load.
    pub default_level: Level,
    /// Duration of the travel window of a transition, in seconds.
    pub travel_secs: f64,
    /// Duration of the settle fades that follow the travel window.
    pub settle_fade_secs: f64,
    /// Fraction of the preceding fade that must elapse before commander/staff
    /// markers start appearing.
    pub staff_delay_ratio: f64,
    /// Sideways bow of travel paths, as a fraction of path length.
    pub arc_ratio: f64,
    /// Transient scale swell applied to pop-in/pop-out markers.
    pub pop_bulge: f32,
    /// Edge length of one declutter bucket, in physical pixels.
    pub cluster_cell_px: f64,
    /// Quiet period after the last camera notification before the engine
    /// re-levels and re-clusters.
    pub camera_debounce_secs: f64,
    /// Vertical offset applied to every marker so billboards clear the terrain.
    pub marker_height_bias_m: f64,
    /// Camera-distance ceilings mapping distance to a display level.
    pub bands: LevelBands,
    /// Field and contour tuning for aggregate outlines.
    pub outline: OutlineConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_level: Level::COARSEST,
            travel_secs: TRAVEL_SECS,
            settle_fade_secs: SETTLE_FADE_SECS,
            staff_delay_ratio: STAFF_DELAY_RATIO,
            arc_ratio: ARC_RATIO,
            pop_bulge: POP_BULGE,
            cluster_cell_px: CLUSTER_CELL_PX,
            camera_debounce_secs: CAMERA_DEBOUNCE_SECS,
            marker_height_bias_m: MARKER_HEIGHT_BIAS_M,
            bands: LevelBands::default(),
            outline: OutlineConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Delay before commander/staff fades start, relative to transition begin.
    ///
    /// `after_travel` is true when the preceding primary fade itself starts
    /// after the travel window (coarsening transitions).
    pub fn staff_delay(&self, after_travel: bool) -> f64 {
        if after_travel {
            self.travel_secs + self.settle_fade_secs * self.staff_delay_ratio
        } else {
            self.travel_secs * self.staff_delay_ratio
        }
    }
}
