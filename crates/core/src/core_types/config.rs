//! Simulation parameters
//!
//! Everything the transition rules read lives in [`ForestConfig`]. The
//! construction-time values (dimensions, tree ratio, water layout, feature flags)
//! are fixed for the life of a `ForestState`; the weather values (humidity,
//! lightning, growth, wind) can be changed between steps through the setters on
//! `ForestState`.

use crate::core_types::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Maximum wind strength (hops of extended fire reach)
pub const WIND_MAX: u8 = 3;

/// Default maximum tree age
pub const TREE_MAX_AGE: u8 = 10;

/// Lattice dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub nx: usize,
    pub ny: usize,
}

impl GridDims {
    pub fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }

    /// Dimensions of a square area split into square cells (900 / 10 → 90).
    pub fn from_area(area_size: f32, cell_size: f32) -> Self {
        let n = (area_size / cell_size) as usize;
        Self { nx: n, ny: n }
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::from_area(900.0, 10.0)
    }
}

/// Axis a wind blows along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Wind direction, named after where the fire is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindDirection {
    #[default]
    None,
    North,
    East,
    South,
    West,
}

impl WindDirection {
    /// Axis and offset sign that fire cannot come from.
    ///
    /// A neighbour offset whose component on the axis equals the sign lies
    /// downwind of the cell, so its fire cannot reach the cell against the wind.
    pub fn blocked(self) -> Option<(Axis, i32)> {
        match self {
            WindDirection::None => None,
            WindDirection::North => Some((Axis::Y, -1)),
            WindDirection::East => Some((Axis::X, 1)),
            WindDirection::South => Some((Axis::Y, 1)),
            WindDirection::West => Some((Axis::X, -1)),
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            WindDirection::None => "No wind",
            WindDirection::North => "North",
            WindDirection::East => "East",
            WindDirection::South => "South",
            WindDirection::West => "West",
        }
    }
}

/// Wind direction and strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub direction: WindDirection,
    /// 0..=[`WIND_MAX`]; 0 means plain 8-neighbour spread
    pub strength: u8,
}

impl Wind {
    pub fn new(direction: WindDirection, strength: u8) -> Self {
        Self {
            direction,
            strength,
        }
    }

    /// Whether spread is wind-filtered and extended this step
    pub fn is_active(&self) -> bool {
        self.direction != WindDirection::None && self.strength > 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strength > WIND_MAX {
            return Err(ConfigError::WindStrengthOutOfRange(self.strength));
        }
        Ok(())
    }
}

/// River layout drawn into the water mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiverShape {
    None,
    /// Straight vertical band through the middle of the grid
    #[default]
    Line,
    /// Band meandering along one sine period
    Sine,
}

/// Rule-set switches
///
/// All off is the binary automaton: burning trees die in one step and any
/// burning neighbour ignites a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Rivers and lakes of permanently non-flammable cells
    pub water: bool,
    /// Trees age up to `tree_max_age`; old trees take longer to burn
    pub aging: bool,
    /// Humidity damps ignition, can put fires out and boosts growth
    pub humidity: bool,
}

impl Features {
    /// Every rule enabled
    pub fn all() -> Self {
        Self {
            water: true,
            aging: true,
            humidity: true,
        }
    }
}

/// Forest simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub dims: GridDims,
    /// Fraction of cells holding a tree at start
    pub tree_ratio: f64,
    /// Relative humidity, 0-1 (read only with `features.humidity`)
    pub humidity: f64,
    /// Per-step probability a tree is struck by lightning
    pub lightning: f64,
    /// Per-step probability an empty cell grows a tree
    pub new_growth: f64,
    pub wind: Wind,
    pub tree_max_age: u8,
    pub features: Features,
    pub river: RiverShape,
    /// River width in cells
    pub river_width: usize,
    /// Number of circular lakes
    pub lakes: usize,
    /// Lake radius in cells
    pub lake_radius: usize,
    /// Recount counters from the grids every N steps (`None` never)
    pub reconcile_interval: Option<u64>,
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            dims: GridDims::default(),
            tree_ratio: 0.5,
            humidity: 1.0,
            lightning: 0.00002,
            new_growth: 0.002,
            wind: Wind::default(),
            tree_max_age: TREE_MAX_AGE,
            features: Features::default(),
            river: RiverShape::Line,
            river_width: 2,
            lakes: 0,
            lake_radius: 5,
            reconcile_interval: Some(100),
            seed: None,
        }
    }
}

impl ForestConfig {
    /// Config with lightning, growth and humidity at zero, so only existing fires act
    pub fn quiet(nx: usize, ny: usize) -> Self {
        Self {
            dims: GridDims::new(nx, ny),
            lightning: 0.0,
            new_growth: 0.0,
            humidity: 0.0,
            ..Self::default()
        }
    }

    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dims.nx == 0 || self.dims.ny == 0 {
            return Err(ConfigError::EmptyGrid {
                nx: self.dims.nx,
                ny: self.dims.ny,
            });
        }
        check_unit("tree_ratio", self.tree_ratio)?;
        check_unit("humidity", self.humidity)?;
        check_unit("lightning", self.lightning)?;
        check_unit("new_growth", self.new_growth)?;
        self.wind.validate()?;
        if self.tree_max_age == 0 {
            return Err(ConfigError::ZeroMaxAge);
        }
        if self.features.water
            && self.river != RiverShape::None
            && (self.river_width == 0 || self.river_width > self.dims.nx)
        {
            return Err(ConfigError::RiverWidth {
                width: self.river_width,
                nx: self.dims.nx,
            });
        }
        Ok(())
    }

    /// Copy with every bounded value clamped to its range.
    ///
    /// For input layers that clamp at the boundary instead of rejecting. NaN
    /// probabilities become 0.
    pub fn clamped(&self) -> Self {
        Self {
            tree_ratio: clamp_unit(self.tree_ratio),
            humidity: clamp_unit(self.humidity),
            lightning: clamp_unit(self.lightning),
            new_growth: clamp_unit(self.new_growth),
            wind: Wind::new(self.wind.direction, self.wind.strength.min(WIND_MAX)),
            tree_max_age: self.tree_max_age.max(1),
            river_width: self.river_width.clamp(1, self.dims.nx.max(1)),
            ..self.clone()
        }
    }

    /// Largest age a tree can reach under the active rules
    pub fn effective_max_age(&self) -> u8 {
        if self.features.aging {
            self.tree_max_age
        } else {
            1
        }
    }
}

/// Reject NaN and anything outside [0, 1]
pub(crate) fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dims_from_area() {
        let dims = GridDims::default();
        assert_eq!(dims, GridDims::new(90, 90));
        assert_eq!(dims.cell_count(), 8100);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ForestConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ForestConfig {
            tree_ratio: 1.5,
            ..ForestConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "tree_ratio",
                ..
            })
        ));

        let config = ForestConfig {
            humidity: f64::NAN,
            ..ForestConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ForestConfig {
            wind: Wind::new(WindDirection::East, 4),
            ..ForestConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::WindStrengthOutOfRange(4))
        );

        let config = ForestConfig {
            dims: GridDims::new(0, 10),
            ..ForestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid { .. })));
    }

    #[test]
    fn test_river_width_checked_only_with_water() {
        let mut config = ForestConfig::quiet(4, 4);
        config.river_width = 10;
        assert!(config.validate().is_ok());

        config.features.water = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RiverWidth { width: 10, nx: 4 })
        ));
    }

    #[test]
    fn test_clamped_brings_values_into_range() {
        let config = ForestConfig {
            humidity: 2.0,
            lightning: -0.5,
            new_growth: f64::NAN,
            wind: Wind::new(WindDirection::North, 9),
            ..ForestConfig::default()
        };

        let clamped = config.clamped();
        assert_eq!(clamped.humidity, 1.0);
        assert_eq!(clamped.lightning, 0.0);
        assert_eq!(clamped.new_growth, 0.0);
        assert_eq!(clamped.wind.strength, WIND_MAX);
        assert!(clamped.validate().is_ok());
    }

    #[test]
    fn test_wind_blocked_components() {
        assert_eq!(WindDirection::None.blocked(), None);
        assert_eq!(WindDirection::North.blocked(), Some((Axis::Y, -1)));
        assert_eq!(WindDirection::East.blocked(), Some((Axis::X, 1)));
        assert_eq!(WindDirection::South.blocked(), Some((Axis::Y, 1)));
        assert_eq!(WindDirection::West.blocked(), Some((Axis::X, -1)));
        assert!(!Wind::new(WindDirection::East, 0).is_active());
        assert!(!Wind::new(WindDirection::None, 2).is_active());
        assert!(Wind::new(WindDirection::East, 1).is_active());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ForestConfig =
            serde_json::from_str(r#"{"tree_ratio": 0.7, "wind": {"direction": "west"}}"#)
                .expect("valid json");
        assert_eq!(config.tree_ratio, 0.7);
        assert_eq!(config.wind, Wind::new(WindDirection::West, 0));
        assert_eq!(config.dims, GridDims::new(90, 90));
    }
}
