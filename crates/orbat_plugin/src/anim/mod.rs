//! Time-sliced marker animation.

pub mod ease;
pub mod scheduler;
