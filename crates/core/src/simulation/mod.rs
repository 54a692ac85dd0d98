//! Forest-fire cellular automaton
//!
//! `ForestState` combines:
//! - a tree-age layer and a burn-counter layer, both double-buffered
//! - an immutable water mask
//! - running tree / burning / empty counters
//!
//! Each [`ForestState::update`] sweeps every cell in row-major order, applying
//! [`rules::transition`] to the committed snapshots, then commits both layers.

pub mod percolation;
pub mod rules;

pub use percolation::{
    PercolationConfig, PercolationExperiment, PercolationRuns, PercolationSample, MAX_DENSITIES,
};
pub use rules::{CounterDelta, NeighbourCount, Outcome, StepParams};

use crate::core_types::config::check_unit;
use crate::core_types::{Cell, ConfigError, ForestConfig, ForestStats, GridDims, Wind};
use crate::grid::{FillMode, Grid, Neighbourhood, WaterMask};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Forest simulation state
pub struct ForestState<R: Rng = StdRng> {
    config: ForestConfig,

    /// Tree age per cell (0 = empty)
    trees: Grid,
    /// Burn counter per cell (0 = not burning)
    burning: Grid,
    water: WaterMask,

    stats: ForestStats,
    initial_tree_count: f64,

    /// Offsets fire can arrive from, cached for the current wind
    neighbourhood: Neighbourhood,
    step_count: u64,

    rng: R,
}

impl ForestState<StdRng> {
    /// Create a forest seeded from `config.seed`, or from the OS when unset
    pub fn new(config: ForestConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> ForestState<R> {
    /// Create a randomly populated forest using `rng` for every draw.
    ///
    /// Draws the water mask, then `round(tree_ratio * nx * ny)` trees (zeroed on
    /// water). When `lightning == 0` one random tree is set burning so the run
    /// has a fire to follow.
    pub fn with_rng(config: ForestConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let water = WaterMask::build(&config, &mut rng);
        let trees = Grid::init(
            config.dims,
            FillMode::RandomRatio {
                ratio: config.tree_ratio,
                max_value: config.effective_max_age(),
            },
            Some(&water),
            &mut rng,
        );
        let burning = Grid::new(config.dims);

        let mut state = Self::assemble(config, trees, burning, water, rng);
        if state.config.lightning == 0.0 {
            state.seed_fire();
        }

        info!(
            "Forest initialized: {}x{} grid, {} trees, {} water cells, features={:?}",
            state.config.dims.nx,
            state.config.dims.ny,
            state.stats.tree_count,
            state.water.count(),
            state.config.features
        );

        Ok(state)
    }

    /// Create a forest from explicit layers.
    ///
    /// The working snapshot of each layer is committed first and no fire is
    /// seeded. Water cells are cleared and burn counters on empty cells are
    /// dropped. Without the humidity rules a burn counter is a flag, so larger
    /// values are stored as 1.
    pub fn from_layers(
        config: ForestConfig,
        trees: Grid,
        burning: Grid,
        water: WaterMask,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        assert!(
            trees.dims() == config.dims && burning.dims() == config.dims && water.dims() == config.dims,
            "layer dimensions do not match {}x{} config",
            config.dims.nx,
            config.dims.ny
        );

        let mut trees = trees;
        let mut burning = burning;
        trees.commit();
        burning.commit();
        let flag_only = !config.features.humidity;
        for y in 0..config.dims.ny {
            for x in 0..config.dims.nx {
                let clear_tree = water.is_water(x, y);
                let clear_burn = clear_tree || trees.read_previous(x, y) == 0;
                if clear_tree {
                    trees.set_committed(x, y, 0);
                }
                if clear_burn {
                    burning.set_committed(x, y, 0);
                } else if flag_only && burning.read_previous(x, y) > 1 {
                    burning.set_committed(x, y, 1);
                }
            }
        }

        Ok(Self::assemble(config, trees, burning, water, rng))
    }

    fn assemble(config: ForestConfig, trees: Grid, burning: Grid, water: WaterMask, rng: R) -> Self {
        let neighbourhood = Neighbourhood::for_wind(config.wind);
        let mut state = Self {
            config,
            trees,
            burning,
            water,
            stats: ForestStats::default(),
            initial_tree_count: 0.0,
            neighbourhood,
            step_count: 0,
            rng,
        };
        state.stats = state.count_layers();
        state.initial_tree_count = state.stats.tree_count;
        state
    }

    /// Force one random tree to burn.
    ///
    /// Picks uniform coordinates until one holds a tree. Skipped with a warning
    /// when the forest has no trees, since the search could never end.
    fn seed_fire(&mut self) {
        if self.stats.tree_count <= 0.0 {
            warn!("No trees to ignite; starting without a fire");
            return;
        }

        let GridDims { nx, ny } = self.config.dims;
        loop {
            let x = self.rng.random_range(0..nx);
            let y = self.rng.random_range(0..ny);
            if self.trees.read_previous(x, y) > 0 {
                self.burning.set_committed(x, y, 1);
                self.stats.burnt_count = 1.0;
                debug!("Seeded fire at ({}, {})", x, y);
                return;
            }
        }
    }

    /// Advance one synchronous step.
    ///
    /// Reads only committed snapshots, writes the working snapshots, then
    /// commits both layers.
    pub fn update(&mut self) {
        let params = StepParams::from_config(&self.config);
        let GridDims { nx, ny } = self.config.dims;
        let mut delta = CounterDelta::default();

        for y in 0..ny {
            for x in 0..nx {
                if self.water.is_water(x, y) {
                    continue;
                }

                let tree_age = self.trees.read_previous(x, y);
                let burn_state = self.burning.read_previous(x, y);
                let burning = &self.burning;
                let offsets = self.neighbourhood.offsets();
                let neighbours = || {
                    let mut count = NeighbourCount::default();
                    for value in burning.values_at(x, y, offsets) {
                        count.total += 1;
                        if value > 0 {
                            count.burning += 1;
                        }
                    }
                    count
                };

                let outcome = rules::transition(tree_age, burn_state, neighbours, &params, &mut self.rng);
                self.trees.set(x, y, outcome.tree_age);
                self.burning.set(x, y, outcome.burn_state);
                delta += outcome.delta;
            }
        }

        self.trees.commit();
        self.burning.commit();
        self.apply_delta(delta);
        self.step_count += 1;

        if let Some(interval) = self.config.reconcile_interval {
            if interval > 0 && self.step_count % interval == 0 {
                self.reconcile_counters();
            }
        }

        debug!(
            "Step {}: trees={}, burning={}, empty={}",
            self.step_count, self.stats.tree_count, self.stats.burnt_count, self.stats.empty_count
        );
    }

    fn apply_delta(&mut self, delta: CounterDelta) {
        self.stats.tree_count += f64::from(delta.tree);
        self.stats.burnt_count += f64::from(delta.burnt);
        self.stats.empty_count += f64::from(delta.empty);
    }

    /// Recount every layer
    fn count_layers(&self) -> ForestStats {
        let mut stats = ForestStats::default();
        let cells = self
            .trees
            .previous_values()
            .iter()
            .zip(self.burning.previous_values())
            .zip(self.water.cells());
        for ((&tree, &burn), &water) in cells {
            if water {
                continue;
            }
            if tree > 0 {
                stats.tree_count += 1.0;
                if burn > 0 {
                    stats.burnt_count += 1.0;
                }
            } else {
                stats.empty_count += 1.0;
            }
        }
        stats
    }

    /// Replace the running counters with a full recount.
    ///
    /// Returns `true` if the counters had drifted.
    pub fn reconcile_counters(&mut self) -> bool {
        let counted = self.count_layers();
        if counted == self.stats {
            return false;
        }
        warn!(
            "Counter drift corrected at step {}: {:?} -> {:?}",
            self.step_count, self.stats, counted
        );
        self.stats = counted;
        true
    }

    /// Committed state of a cell
    pub fn get_cell(&self, x: usize, y: usize) -> Cell {
        Cell {
            tree_age: self.trees.read_previous(x, y),
            burn_state: self.burning.read_previous(x, y),
            is_water: self.water.is_water(x, y),
        }
    }

    pub fn stats(&self) -> ForestStats {
        self.stats
    }

    /// Trees present at construction
    pub fn initial_tree_count(&self) -> f64 {
        self.initial_tree_count
    }

    /// Percentage of the initial trees lost so far (0 for a treeless start)
    pub fn percent_burnt(&self) -> f64 {
        if self.initial_tree_count <= 0.0 {
            0.0
        } else {
            (1.0 - self.stats.tree_count / self.initial_tree_count) * 100.0
        }
    }

    /// No tree is burning
    pub fn is_quiescent(&self) -> bool {
        self.stats.burnt_count <= 0.0
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn dims(&self) -> GridDims {
        self.config.dims
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn water(&self) -> &WaterMask {
        &self.water
    }

    pub fn water_cell_count(&self) -> usize {
        self.water.count()
    }

    /// Tree-age layer
    pub fn trees(&self) -> &Grid {
        &self.trees
    }

    /// Burn-counter layer
    pub fn burning(&self) -> &Grid {
        &self.burning
    }

    pub fn set_humidity(&mut self, humidity: f64) -> Result<(), ConfigError> {
        check_unit("humidity", humidity)?;
        self.config.humidity = humidity;
        Ok(())
    }

    pub fn set_lightning(&mut self, lightning: f64) -> Result<(), ConfigError> {
        check_unit("lightning", lightning)?;
        self.config.lightning = lightning;
        Ok(())
    }

    pub fn set_new_growth(&mut self, new_growth: f64) -> Result<(), ConfigError> {
        check_unit("new_growth", new_growth)?;
        self.config.new_growth = new_growth;
        Ok(())
    }

    /// Change the wind, rebuilding the cached neighbourhood when it differs
    pub fn set_wind(&mut self, wind: Wind) -> Result<(), ConfigError> {
        wind.validate()?;
        self.config.wind = wind;
        if self.neighbourhood.key() != wind {
            self.neighbourhood = Neighbourhood::for_wind(wind);
        }
        Ok(())
    }
}
