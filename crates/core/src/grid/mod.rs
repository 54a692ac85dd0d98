//! Lattice storage and neighbourhood queries

pub mod layer;
pub mod neighbourhood;
pub mod water;

// Re-export main types
pub use layer::{FillMode, Grid};
pub use neighbourhood::{extended_offsets, neighbour_offsets, Neighbourhood, Offset, MOORE_OFFSETS};
pub use water::WaterMask;
