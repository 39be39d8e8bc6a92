//! Level-of-detail state and transition planning.

pub mod leveling;
pub mod machine;
pub mod planner;
