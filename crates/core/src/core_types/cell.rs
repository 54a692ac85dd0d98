//! Per-cell view and aggregate counters read by renderers

use serde::{Deserialize, Serialize};

/// Values of every layer at one lattice position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// 0 = empty, 1..=max age = tree of that age
    pub tree_age: u8,
    /// 0 = not burning, otherwise the burn counter
    pub burn_state: u8,
    pub is_water: bool,
}

impl Cell {
    /// Classify the cell
    pub fn state(&self) -> CellState {
        if self.is_water {
            CellState::Water
        } else if self.tree_age == 0 {
            CellState::Empty
        } else if self.burn_state > 0 {
            CellState::Burning {
                age: self.tree_age,
                burn: self.burn_state,
            }
        } else {
            CellState::Tree { age: self.tree_age }
        }
    }

    pub fn is_burning(&self) -> bool {
        self.burn_state > 0
    }
}

/// Logical state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Empty,
    Tree { age: u8 },
    Burning { age: u8, burn: u8 },
    /// Terminal; never transitions
    Water,
}

/// Running counters maintained by the transition rules
///
/// Floating aggregates updated incrementally each step rather than recounted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForestStats {
    /// Cells holding a tree (burning or not)
    pub tree_count: f64,
    /// Trees currently burning
    pub burnt_count: f64,
    /// Non-water cells without a tree
    pub empty_count: f64,
}

impl ForestStats {
    /// Fraction of `total` cells a counter represents, as a percentage
    pub fn percent_of(count: f64, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            count / total as f64 * 100.0
        }
    }
}
