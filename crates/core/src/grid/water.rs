//! Permanently non-flammable cells (rivers and lakes)

use crate::core_types::{ForestConfig, GridDims, RiverShape};
use rand::Rng;
use std::f64::consts::TAU;

/// Immutable water layout, row-major `y * nx + x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterMask {
    dims: GridDims,
    cells: Vec<bool>,
}

impl WaterMask {
    /// Mask with no water
    pub fn none(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![false; dims.cell_count()],
        }
    }

    /// Draw the configured river and lakes.
    ///
    /// Returns an empty mask when `features.water` is off. Lake centres consume
    /// random draws; the river is deterministic.
    pub fn build<R: Rng + ?Sized>(config: &ForestConfig, rng: &mut R) -> Self {
        let dims = config.dims;
        let mut mask = Self::none(dims);
        if !config.features.water {
            return mask;
        }

        let width = config.river_width.min(dims.nx);
        match config.river {
            RiverShape::None => {}
            RiverShape::Line => {
                let left = (dims.nx / 2).saturating_sub(width / 2);
                for y in 0..dims.ny {
                    mask.fill_band(left, width, y);
                }
            }
            RiverShape::Sine => {
                let amplitude = dims.nx as f64 / 6.0;
                for y in 0..dims.ny {
                    let phase = TAU * y as f64 / dims.ny as f64;
                    let centre = dims.nx as f64 / 2.0 + amplitude * phase.sin();
                    let left = (centre - width as f64 / 2.0).round().max(0.0) as usize;
                    mask.fill_band(left, width, y);
                }
            }
        }

        let radius = config.lake_radius as i64;
        for _ in 0..config.lakes {
            let cx = rng.random_range(0..dims.nx) as i64;
            let cy = rng.random_range(0..dims.ny) as i64;
            mask.fill_disc(cx, cy, radius);
        }

        mask
    }

    fn fill_band(&mut self, left: usize, width: usize, y: usize) {
        let right = (left + width).min(self.dims.nx);
        for x in left..right {
            self.cells[y * self.dims.nx + x] = true;
        }
    }

    fn fill_disc(&mut self, cx: i64, cy: i64, radius: i64) {
        for y in (cy - radius)..=(cy + radius) {
            for x in (cx - radius)..=(cx + radius) {
                let inside = (x - cx).pow(2) + (y - cy).pow(2) <= radius * radius;
                if inside
                    && x >= 0
                    && y >= 0
                    && (x as usize) < self.dims.nx
                    && (y as usize) < self.dims.ny
                {
                    self.cells[y as usize * self.dims.nx + x as usize] = true;
                }
            }
        }
    }

    /// Bounds-checked lookup
    #[inline]
    pub fn is_water(&self, x: usize, y: usize) -> bool {
        assert!(
            x < self.dims.nx && y < self.dims.ny,
            "cell ({x}, {y}) outside {}x{} grid",
            self.dims.nx,
            self.dims.ny
        );
        self.cells[y * self.dims.nx + x]
    }

    /// Number of water cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&w| w).count()
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }
}
