//! Unit hierarchy: echelon ladder, document parsing, and the flat tree index.

pub mod echelon;
pub mod geo;
pub mod load;
pub mod tree;
