//! Camera-distance driven level selection.

use crate::orbat::echelon::{Level, LADDER_LEVELS};

/// Monotonic table of camera-to-focus distance ceilings.
///
/// `ceilings[i]` is the distance below which level `i` is appropriate; past
/// the last ceiling the coarsest level applies.
#[derive(Clone, Copy, Debug)]
pub struct LevelBands {
    ceilings: [f64; LADDER_LEVELS - 1],
}

impl Default for LevelBands {
    fn default() -> Self {
        Self::new([2_500.0, 9_000.0, 28_000.0, 90_000.0])
    }
}

impl LevelBands {
    pub fn new(ceilings: [f64; LADDER_LEVELS - 1]) -> Self {
        debug_assert!(ceilings.windows(2).all(|w| w[0] < w[1]));
        Self { ceilings }
    }

    /// Display level for a camera distance in meters.
    pub fn level_for(&self, distance: f64) -> Level {
        for (i, ceiling) in self.ceilings.iter().enumerate() {
            if distance < *ceiling {
                return Level(i as u8);
            }
        }
        Level::COARSEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_map_distance_to_levels() {
        let bands = LevelBands::default();
        assert_eq!(bands.level_for(0.0), Level(0));
        assert_eq!(bands.level_for(2_499.0), Level(0));
        assert_eq!(bands.level_for(2_500.0), Level(1));
        assert_eq!(bands.level_for(50_000.0), Level(3));
        assert_eq!(bands.level_for(1.0e9), Level::COARSEST);
    }

    #[test]
    fn levels_never_get_finer_as_the_camera_pulls_back() {
        let bands = LevelBands::default();
        let mut last = Level(0);
        for step in 0..200 {
            let level = bands.level_for(step as f64 * 1_000.0);
            assert!(level >= last);
            last = level;
        }
    }
}
