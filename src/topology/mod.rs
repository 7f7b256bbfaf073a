//! Process identity, grid axes and the slab decomposition.

pub mod axis;
pub mod decomposition;
