//! The echelon ladder.
//!
//! Echelons are ordered finest to coarsest. The lower five form the LOD
//! ladder the display level walks; `Regiment` and `Brigade` exist in the
//! data, carry commander/staff entries, and parent-link the battalions, but
//! never own visible markers and can never be selected as a display level.

use serde::Deserialize;

/// Number of echelons that participate in the LOD ladder.
pub const LADDER_LEVELS: usize = 5;

/// Military echelon of a unit, finest to coarsest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Echelon {
    Individual,
    Squad,
    Platoon,
    Company,
    Battalion,
    Regiment,
    Brigade,
}

impl Echelon {
    const ORDER: [Echelon; 7] = [
        Echelon::Individual,
        Echelon::Squad,
        Echelon::Platoon,
        Echelon::Company,
        Echelon::Battalion,
        Echelon::Regiment,
        Echelon::Brigade,
    ];

    /// Position in the full ordering, `Individual` = 0.
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Ladder index of this echelon, or `None` above `Battalion`.
    pub fn level(self) -> Option<Level> {
        let rank = self.rank();
        (rank < LADDER_LEVELS).then(|| Level(rank as u8))
    }

    /// Echelon at a ladder level.
    pub fn at_level(level: Level) -> Echelon {
        Self::ORDER[level.0 as usize]
    }

    /// One step finer, `None` at `Individual`.
    pub fn step_below(self) -> Option<Echelon> {
        self.rank().checked_sub(1).map(|r| Self::ORDER[r])
    }

    /// One step coarser, `None` at `Brigade`.
    pub fn step_above(self) -> Option<Echelon> {
        Self::ORDER.get(self.rank() + 1).copied()
    }
}

/// A display level: an index into the LOD ladder.
///
/// 0 is `Individual`, [`Level::COARSEST`] is `Battalion`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Level(pub u8);

impl Level {
    /// Finest selectable level.
    pub const FINEST: Level = Level(0);
    /// Coarsest selectable level.
    pub const COARSEST: Level = Level(LADDER_LEVELS as u8 - 1);

    /// Builds a level from an untrusted index, `None` when outside the ladder.
    pub fn from_index(raw: i64) -> Option<Level> {
        (0..LADDER_LEVELS as i64)
            .contains(&raw)
            .then_some(Level(raw as u8))
    }

    /// One step coarser, `None` at the ladder top.
    pub fn up(self) -> Option<Level> {
        (self < Level::COARSEST).then_some(Level(self.0 + 1))
    }

    /// One step finer, `None` at the ladder bottom.
    pub fn down(self) -> Option<Level> {
        self.0.checked_sub(1).map(Level)
    }

    /// All ladder levels, finest first.
    pub fn all() -> impl Iterator<Item = Level> {
        (0..LADDER_LEVELS as u8).map(Level)
    }
}
