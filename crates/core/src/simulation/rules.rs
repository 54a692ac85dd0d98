//! Per-cell transition rules
//!
//! [`transition`] maps one cell's committed state (and, for idle trees, its
//! burning-neighbour count) to the cell's next state plus the counter changes
//! the move implies. It never looks at another cell's new value, so the sweep
//! order cannot change the outcome for a fixed sequence of random draws.

use crate::core_types::{Features, ForestConfig};
use rand::Rng;
use std::cmp::Ordering;

/// Parameters read by the rules, snapshotted once per step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub humidity: f64,
    pub lightning: f64,
    pub new_growth: f64,
    pub max_age: u8,
    pub features: Features,
}

impl StepParams {
    pub fn from_config(config: &ForestConfig) -> Self {
        Self {
            humidity: config.humidity,
            lightning: config.lightning,
            new_growth: config.new_growth,
            max_age: config.effective_max_age(),
            features: config.features,
        }
    }

    /// Burn counter reduction applied when humidity damps a fire
    fn damping(&self) -> i32 {
        (self.humidity * 10.0).floor() as i32
    }
}

/// Burning cells among the neighbours a tree can catch fire from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighbourCount {
    pub burning: usize,
    pub total: usize,
}

impl NeighbourCount {
    /// Fraction of neighbours burning; 0 for a cell with no neighbours
    pub fn burning_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.burning as f64 / self.total as f64
        }
    }
}

/// Counter changes caused by one cell's transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDelta {
    pub tree: i32,
    pub burnt: i32,
    pub empty: i32,
}

impl CounterDelta {
    const IGNITE: Self = Self {
        tree: 0,
        burnt: 1,
        empty: 0,
    };
    const EXTINGUISH: Self = Self {
        tree: 0,
        burnt: -1,
        empty: 0,
    };
    const BURN_OUT: Self = Self {
        tree: -1,
        burnt: -1,
        empty: 1,
    };
    const GROW: Self = Self {
        tree: 1,
        burnt: 0,
        empty: -1,
    };
}

impl std::ops::AddAssign for CounterDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.tree += rhs.tree;
        self.burnt += rhs.burnt;
        self.empty += rhs.empty;
    }
}

/// Next state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub tree_age: u8,
    pub burn_state: u8,
    pub delta: CounterDelta,
}

impl Outcome {
    /// Next state with no counter change
    fn quiet(tree_age: u8, burn_state: u8) -> Self {
        Self {
            tree_age,
            burn_state,
            delta: CounterDelta::default(),
        }
    }

    fn with(tree_age: u8, burn_state: u8, delta: CounterDelta) -> Self {
        Self {
            tree_age,
            burn_state,
            delta,
        }
    }
}

/// Bernoulli trial: `u < p` with `u` uniform in `[0, 1)`
#[inline]
fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Transition of a non-water cell.
///
/// `neighbours` is evaluated only for idle trees.
pub fn transition<R, F>(
    tree_age: u8,
    burn_state: u8,
    neighbours: F,
    params: &StepParams,
    rng: &mut R,
) -> Outcome
where
    R: Rng + ?Sized,
    F: FnOnce() -> NeighbourCount,
{
    if tree_age == 0 {
        grow(params, rng)
    } else if burn_state > 0 {
        burn(tree_age, burn_state, params, rng)
    } else {
        ignite_or_age(tree_age, neighbours(), params, rng)
    }
}

/// A burning tree burns out, erodes, or (with humidity) is put out
fn burn<R: Rng + ?Sized>(tree_age: u8, burn_state: u8, params: &StepParams, rng: &mut R) -> Outcome {
    if params.features.humidity {
        if chance(rng, params.humidity) {
            return damp(tree_age, burn_state, params.damping());
        }
        return erode(tree_age, burn_state.saturating_add(1));
    }

    if params.features.aging {
        erode(tree_age, burn_state)
    } else {
        Outcome::with(0, 0, CounterDelta::BURN_OUT)
    }
}

/// Humidity knocks `damping` off the burn counter.
///
/// The fire is put out only when the counter drops below zero. A counter that
/// lands exactly on zero stops burning without touching the burnt counter; the
/// periodic recount in `ForestState` absorbs that drift.
fn damp(tree_age: u8, burn_state: u8, damping: i32) -> Outcome {
    let reduced = i32::from(burn_state) - damping;
    match reduced.cmp(&0) {
        Ordering::Less => Outcome::with(tree_age, 0, CounterDelta::EXTINGUISH),
        Ordering::Equal => Outcome::quiet(tree_age, 0),
        Ordering::Greater => Outcome::quiet(tree_age, reduced as u8),
    }
}

/// Old trees lose a year and keep burning with `burn_state`; saplings burn out
fn erode(tree_age: u8, burn_state: u8) -> Outcome {
    if tree_age > 1 {
        Outcome::quiet(tree_age - 1, burn_state)
    } else {
        Outcome::with(0, 0, CounterDelta::BURN_OUT)
    }
}

/// An idle tree catches from its neighbours or from lightning, otherwise ages.
///
/// Neighbour spread and lightning are two independent trials, neighbours first.
fn ignite_or_age<R: Rng + ?Sized>(
    tree_age: u8,
    neighbours: NeighbourCount,
    params: &StepParams,
    rng: &mut R,
) -> Outcome {
    let caught = if params.features.humidity {
        let p = (1.0 - params.humidity) * neighbours.burning_fraction();
        chance(rng, p)
    } else {
        // Without humidity every burn counter is 1, so this is "a neighbour is at 1"
        neighbours.burning > 0
    };

    if caught || chance(rng, params.lightning) {
        return Outcome::with(tree_age, 1, CounterDelta::IGNITE);
    }

    if tree_age < params.max_age {
        Outcome::quiet(tree_age + 1, 0)
    } else {
        Outcome::quiet(tree_age, 0)
    }
}

/// An empty cell may sprout a sapling
fn grow<R: Rng + ?Sized>(params: &StepParams, rng: &mut R) -> Outcome {
    let p = if params.features.humidity {
        params.new_growth * (1.0 + params.humidity)
    } else {
        params.new_growth
    };

    if chance(rng, p) {
        Outcome::with(1, 0, CounterDelta::GROW)
    } else {
        Outcome::quiet(0, 0)
    }
}
