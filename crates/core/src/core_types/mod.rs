//! Core types shared by the grid and simulation modules

pub mod cell;
pub mod config;
pub mod error;

pub use cell::{Cell, CellState, ForestStats};
pub use config::{
    Axis, Features, ForestConfig, GridDims, RiverShape, Wind, WindDirection, TREE_MAX_AGE,
    WIND_MAX,
};
pub use error::ConfigError;
