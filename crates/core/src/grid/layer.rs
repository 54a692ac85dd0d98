//! Double-buffered scalar field over a bounded 2D lattice
//!
//! A step reads neighbours from the frozen `previous` snapshot and writes new
//! values into `current`; [`Grid::commit`] then copies `current` over `previous`.
//! No value written during a sweep is visible to reads in the same sweep.

use crate::core_types::{GridDims, WindDirection};
use crate::grid::neighbourhood::{extended_offsets, neighbour_offsets, Offset};
use crate::grid::water::WaterMask;
use rand::seq::SliceRandom;
use rand::Rng;

/// How a new grid is populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillMode {
    /// Every cell 0
    Empty,
    /// `round(ratio * nx * ny)` cells get a value uniform in `1..=max_value`
    RandomRatio { ratio: f64, max_value: u8 },
}

/// Scalar field with `current` and `previous` snapshots, row-major `y * nx + x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dims: GridDims,
    current: Vec<u8>,
    previous: Vec<u8>,
}

impl Grid {
    /// All-zero grid
    pub fn new(dims: GridDims) -> Self {
        let total = dims.cell_count();
        Self {
            dims,
            current: vec![0; total],
            previous: vec![0; total],
        }
    }

    /// Build a grid from a fill mode.
    ///
    /// Forbidden cells are zeroed after the random fill, so they still count in
    /// the ratio's denominator and the non-zero count can fall short of the
    /// target when the two overlap.
    pub fn init<R: Rng + ?Sized>(
        dims: GridDims,
        fill: FillMode,
        forbidden: Option<&WaterMask>,
        rng: &mut R,
    ) -> Self {
        let FillMode::RandomRatio { ratio, max_value } = fill else {
            return Self::new(dims);
        };

        let total = dims.cell_count();
        let target = ((ratio * total as f64).round() as usize).min(total);
        let max_value = max_value.max(1);

        let mut values: Vec<u8> = vec![0; total];
        for value in values.iter_mut().take(target) {
            *value = if max_value == 1 {
                1
            } else {
                rng.random_range(1..=max_value)
            };
        }
        values.shuffle(rng);

        if let Some(mask) = forbidden {
            for (value, &water) in values.iter_mut().zip(mask.cells()) {
                if water {
                    *value = 0;
                }
            }
        }

        Self {
            dims,
            previous: values.clone(),
            current: values,
        }
    }

    /// Grid from explicit row-major values, committed to both snapshots
    pub fn from_values(dims: GridDims, values: Vec<u8>) -> Self {
        assert_eq!(
            values.len(),
            dims.cell_count(),
            "value count does not match {}x{} grid",
            dims.nx,
            dims.ny
        );
        Self {
            dims,
            previous: values.clone(),
            current: values,
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.dims.nx && (y as usize) < self.dims.ny
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.dims.nx && y < self.dims.ny,
            "cell ({x}, {y}) outside {}x{} grid",
            self.dims.nx,
            self.dims.ny
        );
        y * self.dims.nx + x
    }

    /// Value being written this step
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.current[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        let idx = self.index(x, y);
        self.current[idx] = value;
    }

    /// Value from the frozen snapshot
    #[inline]
    pub fn read_previous(&self, x: usize, y: usize) -> u8 {
        self.previous[self.index(x, y)]
    }

    /// Write both snapshots (setup outside a sweep)
    pub fn set_committed(&mut self, x: usize, y: usize, value: u8) {
        let idx = self.index(x, y);
        self.current[idx] = value;
        self.previous[idx] = value;
    }

    /// Previous-snapshot values at the in-bounds cells of `offsets` around `(x, y)`
    pub fn values_at<'a>(
        &'a self,
        x: usize,
        y: usize,
        offsets: &'a [Offset],
    ) -> impl Iterator<Item = u8> + 'a {
        // Fail fast on a bad origin even when every offset would be dropped
        let _ = self.index(x, y);
        offsets.iter().filter_map(move |&(dx, dy)| {
            let nx = x as i64 + i64::from(dx);
            let ny = y as i64 + i64::from(dy);
            self.in_bounds(nx, ny)
                .then(|| self.previous[ny as usize * self.dims.nx + nx as usize])
        })
    }

    /// Previous-snapshot values of the wind-filtered unit neighbours
    pub fn neighbour_values(&self, x: usize, y: usize, direction: WindDirection) -> Vec<u8> {
        let offsets = neighbour_offsets(direction);
        self.values_at(x, y, &offsets).collect()
    }

    /// Previous-snapshot values of every cell within `reach` hops
    pub fn extended_neighbour_values(
        &self,
        x: usize,
        y: usize,
        direction: WindDirection,
        reach: u8,
    ) -> Vec<u8> {
        let offsets = extended_offsets(direction, reach);
        self.values_at(x, y, &offsets).collect()
    }

    /// `previous := current`
    pub fn commit(&mut self) {
        self.previous.copy_from_slice(&self.current);
    }

    /// Committed snapshot, row-major
    pub fn previous_values(&self) -> &[u8] {
        &self.previous
    }

    /// Working snapshot, row-major
    pub fn current_values(&self) -> &[u8] {
        &self.current
    }
}
