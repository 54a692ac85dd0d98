//! Percolation sweep over initial tree density
//!
//! For every density sample a fresh forest is built with lightning, growth and
//! wind switched off, so the single seeded fire is the only ignition source. The
//! run ends when nothing burns; with no new ignitions and no regrowth every chain
//! of burning trees dies out, so each trial terminates. Humidity can leave the
//! burnt counter stale, so trials always recount periodically.

use crate::core_types::config::check_unit;
use crate::core_types::{ConfigError, ForestConfig, Wind};
use crate::simulation::ForestState;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Upper bound on the samples one sweep may request
pub const MAX_DENSITIES: usize = 1_000_000;

/// Recount interval for trials whose base config never recounts
const TRIAL_RECONCILE_INTERVAL: u64 = 100;

/// Density sweep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercolationConfig {
    /// First density sampled
    pub start: f64,
    /// Last density sampled (inclusive)
    pub end: f64,
    pub step: f64,
    /// Trial `i` runs with seed `seed + i`
    pub seed: u64,
    /// Grid size, feature flags and humidity for every trial
    pub base: ForestConfig,
}

impl Default for PercolationConfig {
    fn default() -> Self {
        Self {
            start: 0.01,
            end: 0.99,
            step: 0.01,
            seed: 0,
            base: ForestConfig::default(),
        }
    }
}

impl PercolationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("start", self.start)?;
        check_unit("end", self.end)?;
        if self.step.is_nan()
            || self.step <= 0.0
            || self.start > self.end
            || (self.end - self.start) / self.step >= MAX_DENSITIES as f64
        {
            return Err(ConfigError::DensitySweep {
                start: self.start,
                end: self.end,
                step: self.step,
            });
        }
        self.base.validate()
    }

    /// Sampled densities, `start` upward in `step` increments up to `end`
    pub fn densities(&self) -> Vec<f64> {
        let count = ((self.end - self.start) / self.step + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| (self.start + i as f64 * self.step).min(1.0))
            .collect()
    }

    /// Forest config for trial `index` at `density`
    pub fn trial_config(&self, index: usize, density: f64) -> ForestConfig {
        ForestConfig {
            tree_ratio: density,
            lightning: 0.0,
            new_growth: 0.0,
            wind: Wind::default(),
            reconcile_interval: Some(
                self.base
                    .reconcile_interval
                    .filter(|&interval| interval > 0)
                    .unwrap_or(TRIAL_RECONCILE_INTERVAL),
            ),
            seed: Some(self.seed.wrapping_add(index as u64)),
            ..self.base.clone()
        }
    }
}

/// Result of one density trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercolationSample {
    pub density: f64,
    /// Percentage of the initial trees lost when the fire went out
    pub percent_burnt: f64,
    /// Steps until nothing was burning
    pub steps: u64,
    pub initial_trees: f64,
}

/// Percolation experiment harness
#[derive(Debug, Clone)]
pub struct PercolationExperiment {
    config: PercolationConfig,
}

impl PercolationExperiment {
    pub fn new(config: PercolationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PercolationConfig {
        &self.config
    }

    /// Lazy sequence of samples, one per density, in density order
    pub fn run(&self) -> PercolationRuns<'_> {
        let densities = self.config.densities();
        info!(
            "Percolation sweep: {} densities from {:.2} to {:.2}",
            densities.len(),
            self.config.start,
            self.config.end
        );
        PercolationRuns {
            experiment: self,
            densities,
            next: 0,
        }
    }

    /// Every sample, trials run on the rayon pool.
    ///
    /// Seeds depend only on the trial index, so the result equals collecting
    /// [`Self::run`].
    pub fn run_parallel(&self) -> Result<Vec<PercolationSample>, ConfigError> {
        let densities = self.config.densities();
        info!(
            "Parallel percolation sweep: {} densities on {} threads",
            densities.len(),
            rayon::current_num_threads()
        );
        densities
            .par_iter()
            .enumerate()
            .map(|(index, &density)| self.run_trial(index, density))
            .collect()
    }

    /// Burn one forest at `density` until the fire is out
    pub fn run_trial(&self, index: usize, density: f64) -> Result<PercolationSample, ConfigError> {
        let mut forest = ForestState::new(self.config.trial_config(index, density))?;

        while !forest.is_quiescent() {
            forest.update();
        }

        let sample = PercolationSample {
            density,
            percent_burnt: forest.percent_burnt(),
            steps: forest.step_count(),
            initial_trees: forest.initial_tree_count(),
        };
        debug!(
            "For density {:.2}, {:.2}% of the trees have burnt ({} steps)",
            sample.density, sample.percent_burnt, sample.steps
        );
        Ok(sample)
    }
}

/// Iterator returned by [`PercolationExperiment::run`]
pub struct PercolationRuns<'a> {
    experiment: &'a PercolationExperiment,
    densities: Vec<f64>,
    next: usize,
}

impl Iterator for PercolationRuns<'_> {
    type Item = Result<PercolationSample, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        let density = *self.densities.get(index)?;
        self.next += 1;
        Some(self.experiment.run_trial(index, density))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.densities.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PercolationRuns<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Features, GridDims, WindDirection};
    use approx::assert_abs_diff_eq;

    fn small(start: f64, end: f64, step: f64) -> PercolationConfig {
        PercolationConfig {
            start,
            end,
            step,
            seed: 17,
            base: ForestConfig {
                dims: GridDims::new(20, 20),
                ..ForestConfig::default()
            },
        }
    }

    #[test]
    fn test_default_sweep_densities() {
        let densities = PercolationConfig::default().densities();
        assert_eq!(densities.len(), 99);
        assert_abs_diff_eq!(densities[0], 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(densities[98], 0.99, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_sweep() {
        assert!(PercolationExperiment::new(small(0.5, 0.2, 0.1)).is_err());
        assert!(PercolationExperiment::new(small(0.1, 0.2, 0.0)).is_err());
        assert!(PercolationExperiment::new(small(0.1, 1.2, 0.1)).is_err());
    }

    #[test]
    fn test_rejects_oversized_sweep() {
        assert!(matches!(
            small(0.0, 1.0, 1e-300).validate(),
            Err(ConfigError::DensitySweep { .. })
        ));
        assert!(small(0.0, 1.0, 1e-7).validate().is_err());

        let fine = small(0.0, 1.0, 1e-5);
        assert!(fine.validate().is_ok());
        assert_eq!(fine.densities().len(), 100_001);
    }

    #[test]
    fn test_trial_config_forces_pure_percolation() {
        let mut config = small(0.1, 0.2, 0.1);
        config.base.lightning = 0.3;
        config.base.new_growth = 0.2;
        config.base.wind = Wind::new(WindDirection::North, 3);

        let trial = config.trial_config(4, 0.6);
        assert_eq!(trial.tree_ratio, 0.6);
        assert_eq!(trial.lightning, 0.0);
        assert_eq!(trial.new_growth, 0.0);
        assert_eq!(trial.wind, Wind::default());
        assert_eq!(trial.seed, Some(21));
        assert_eq!(trial.reconcile_interval, Some(100));

        config.base.reconcile_interval = None;
        assert_eq!(config.trial_config(0, 0.6).reconcile_interval, Some(100));
        config.base.reconcile_interval = Some(0);
        assert_eq!(config.trial_config(0, 0.6).reconcile_interval, Some(100));
        config.base.reconcile_interval = Some(7);
        assert_eq!(config.trial_config(0, 0.6).reconcile_interval, Some(7));
    }

    #[test]
    fn test_stale_burnt_counter_still_terminates() {
        // floor(0.1 * 10) = 1 drops fresh fires exactly to zero, leaving the
        // burnt counter stale until the trial's recount
        let mut config = small(0.7, 0.7, 0.1);
        config.base.humidity = 0.1;
        config.base.features = Features {
            humidity: true,
            ..Features::default()
        };
        config.base.reconcile_interval = None;

        let experiment = PercolationExperiment::new(config).unwrap();
        let sample = experiment.run().next().unwrap().unwrap();
        assert!(sample.steps > 0);
        assert!((0.0..=100.0).contains(&sample.percent_burnt));
    }

    #[test]
    fn test_zero_density_burns_nothing() {
        let experiment = PercolationExperiment::new(small(0.0, 0.0, 0.1)).unwrap();
        let samples: Vec<PercolationSample> = experiment.run().collect::<Result<_, _>>().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].percent_burnt, 0.0);
        assert_eq!(samples[0].steps, 0);
        assert_eq!(samples[0].initial_trees, 0.0);
    }

    #[test]
    fn test_full_density_burns_everything() {
        let experiment = PercolationExperiment::new(small(1.0, 1.0, 0.1)).unwrap();
        let sample = experiment.run().next().unwrap().unwrap();
        assert_eq!(sample.initial_trees, 400.0);
        assert_abs_diff_eq!(sample.percent_burnt, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lazy_iterator_reports_length() {
        let experiment = PercolationExperiment::new(small(0.1, 0.5, 0.1)).unwrap();
        let mut runs = experiment.run();
        assert_eq!(runs.len(), 5);
        runs.next();
        assert_eq!(runs.len(), 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let experiment = PercolationExperiment::new(small(0.2, 0.8, 0.2)).unwrap();
        let sequential: Vec<PercolationSample> = experiment.run().collect::<Result<_, _>>().unwrap();
        let parallel = experiment.run_parallel().unwrap();
        assert_eq!(sequential, parallel);
    }
}
