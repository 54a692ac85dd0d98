//! Neighbour offsets with wind filtering and extended reach
//!
//! Offsets are pure values computed from `(direction, reach)`. Because the
//! filtered unit offsets always form a box minus the origin, every cell reached
//! in `k` hops has a monotone path inside the bounding box of the origin and
//! itself. The expansion can therefore be done once in offset space and bounds
//! applied per query, which gives the same set as expanding hop by hop over
//! in-bounds cells.

use crate::core_types::{Axis, Wind, WindDirection, WIND_MAX};
use rustc_hash::FxHashSet;

/// Relative lattice offset `(dx, dy)`
pub type Offset = (i32, i32);

/// The 8 Moore-neighbourhood offsets in scan order
pub const MOORE_OFFSETS: [Offset; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Unit offsets fire can come from under `direction`.
///
/// Drops offsets whose component on the wind axis equals the blocked sign.
pub fn neighbour_offsets(direction: WindDirection) -> Vec<Offset> {
    match direction.blocked() {
        None => MOORE_OFFSETS.to_vec(),
        Some((axis, sign)) => MOORE_OFFSETS
            .iter()
            .copied()
            .filter(|&(dx, dy)| {
                let component = match axis {
                    Axis::X => dx,
                    Axis::Y => dy,
                };
                component != sign
            })
            .collect(),
    }
}

/// Breadth-first expansion of the unit offsets for `reach` hops.
///
/// `reach` is clamped to `1..=WIND_MAX`. The result is deduplicated, excludes the
/// origin and is sorted so iteration order is stable.
pub fn extended_offsets(direction: WindDirection, reach: u8) -> Vec<Offset> {
    let unit = neighbour_offsets(direction);
    let reach = reach.clamp(1, WIND_MAX);

    let mut seen: FxHashSet<Offset> = FxHashSet::default();
    seen.insert((0, 0));
    let mut frontier: Vec<Offset> = vec![(0, 0)];

    for _ in 0..reach {
        let mut next = Vec::new();
        for &(fx, fy) in &frontier {
            for &(dx, dy) in &unit {
                let candidate = (fx + dx, fy + dy);
                if seen.insert(candidate) {
                    next.push(candidate);
                }
            }
        }
        frontier = next;
    }

    seen.remove(&(0, 0));
    let mut offsets: Vec<Offset> = seen.into_iter().collect();
    offsets.sort_unstable();
    offsets
}

/// Cached offset set for one wind setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbourhood {
    key: Wind,
    offsets: Vec<Offset>,
}

impl Neighbourhood {
    /// Plain 8-neighbourhood
    pub fn moore() -> Self {
        Self {
            key: Wind::default(),
            offsets: MOORE_OFFSETS.to_vec(),
        }
    }

    /// Offsets for a wind setting.
    ///
    /// Inactive wind (no direction or zero strength) falls back to the plain
    /// 8-neighbourhood.
    pub fn for_wind(wind: Wind) -> Self {
        if wind.is_active() {
            Self {
                key: wind,
                offsets: extended_offsets(wind.direction, wind.strength),
            }
        } else {
            Self {
                key: wind,
                offsets: MOORE_OFFSETS.to_vec(),
            }
        }
    }

    /// Wind setting these offsets were built for
    pub fn key(&self) -> Wind {
        self.key
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }
}
