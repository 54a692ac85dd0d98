//! Forest Fire Core Library
//!
//! A stochastic forest-fire cellular automaton. Each cell of a bounded 2D
//! lattice is empty ground, a tree of some age, or water. Every step all cells
//! are updated synchronously from the previous step's snapshot under rules for
//! ignition, wind-driven spread, humidity damping, growth and burnout.
//!
//! ## Rule variants
//!
//! One engine covers every variant through [`Features`]:
//! - binary (all off): burning trees die in one step, any burning neighbour ignites
//! - `aging`: trees age up to a cap and old trees burn longer
//! - `humidity`: ignition and growth depend on humidity, fires can be put out
//! - `water`: rivers and lakes of cells that never burn
//!
//! ## Percolation
//!
//! [`PercolationExperiment`] sweeps the initial tree density and measures how
//! much of the forest a single seeded fire destroys.

// Configuration, cell view, statistics and errors
pub mod core_types;

// Double-buffered lattice, neighbourhoods and water
pub mod grid;

// Transition rules, forest state and the percolation harness
pub mod simulation;

// Re-export core types
pub use core_types::{Cell, CellState, ConfigError, ForestStats};
pub use core_types::{Features, ForestConfig, GridDims, RiverShape, Wind, WindDirection};
pub use core_types::{TREE_MAX_AGE, WIND_MAX};

// Re-export grid types
pub use grid::{FillMode, Grid, Neighbourhood, WaterMask};

// Re-export simulation types
pub use simulation::{ForestState, PercolationConfig, PercolationExperiment, PercolationSample};
