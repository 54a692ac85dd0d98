//! Configuration errors

/// Errors raised when a configuration value is outside its allowed range
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid has a zero dimension
    EmptyGrid { nx: usize, ny: usize },
    /// Probability or ratio outside [0, 1] (or NaN)
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    /// Wind strength above `WIND_MAX`
    WindStrengthOutOfRange(u8),
    /// Maximum tree age of zero
    ZeroMaxAge,
    /// River width zero or wider than the grid
    RiverWidth { width: usize, nx: usize },
    /// Percolation sweep with a non-positive step or reversed bounds
    DensitySweep { start: f64, end: f64, step: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyGrid { nx, ny } => {
                write!(f, "Grid dimensions must be non-zero, got {nx}x{ny}")
            }
            ConfigError::ProbabilityOutOfRange { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            ConfigError::WindStrengthOutOfRange(strength) => write!(
                f,
                "Wind strength must be within [0, {}], got {strength}",
                crate::core_types::WIND_MAX
            ),
            ConfigError::ZeroMaxAge => write!(f, "Maximum tree age must be at least 1"),
            ConfigError::RiverWidth { width, nx } => {
                write!(f, "River width must be within [1, {nx}], got {width}")
            }
            ConfigError::DensitySweep { start, end, step } => write!(
                f,
                "Invalid density sweep {start}..={end} step {step}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
