//! Screen-space proximity clustering (decluttering).

pub mod grid;
pub mod pass;
pub mod proxy;
