//! Cellular-automaton cavern generation.
//!
//! Seeding fills the map with random wall, then repeated smoothing passes pull
//! each cell toward its neighbourhood majority until the noise settles into
//! connected caverns. The whole process reads only from the supplied RNG, so a
//! fixed seed always produces the same grid.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::grid::Grid;

/// Knobs for one generated cavern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CavernParams {
    pub width: usize,
    pub height: usize,
    /// Probability that a non-border cell starts as wall
    pub wall_percent: f32,
    pub smoothing_iterations: u32,
    /// Carve the middle row open before smoothing
    pub open_middle_row: bool,
}

impl Default for CavernParams {
    fn default() -> Self {
        Self {
            width: CAVERN_DEFAULT_WIDTH,
            height: CAVERN_DEFAULT_HEIGHT,
            wall_percent: CAVERN_WALL_PERCENT,
            smoothing_iterations: CAVERN_SMOOTHING_ITERATIONS,
            open_middle_row: false,
        }
    }
}

/// Seed and smooth a cavern.
pub fn generate(params: &CavernParams, rng: &mut impl Rng) -> Grid {
    puffin::profile_function!();

    let mut grid = seed(params, rng);
    for _ in 0..params.smoothing_iterations {
        grid = smooth(&grid);
    }
    debug!(
        width = grid.width,
        height = grid.height,
        floor = grid.floor_count(),
        "cavern generated"
    );
    grid
}

/// Random initial fill. Border cells are always wall.
pub fn seed(params: &CavernParams, rng: &mut impl Rng) -> Grid {
    let wall_percent = params.wall_percent.clamp(0.0, 1.0) as f64;
    let mut grid = Grid::filled(params.width, params.height, true);
    let middle = params.height as i32 / 2;
    for y in 0..params.height as i32 {
        for x in 0..params.width as i32 {
            if grid.is_border(x, y) {
                continue;
            }
            let wall = if params.open_middle_row && y == middle {
                false
            } else {
                rng.gen_bool(wall_percent)
            };
            grid.set(x, y, wall);
        }
    }
    grid
}

/// One smoothing pass. Reads the old grid only, so cell order never matters.
pub fn smooth(grid: &Grid) -> Grid {
    let mut next = grid.clone();
    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            if grid.is_border(x, y) {
                continue;
            }
            next.set(x, y, next_cell(grid.is_wall(x, y), grid.wall_neighbours(x, y)));
        }
    }
    next
}

/// Cell rule. A wall with between the crumble and survive thresholds also
/// opens up; only the listed cases produce wall.
fn next_cell(wall: bool, neighbours: u8) -> bool {
    if wall {
        if neighbours >= WALL_SURVIVE_NEIGHBOURS {
            return true;
        }
        if neighbours < WALL_CRUMBLE_NEIGHBOURS {
            return false;
        }
        false
    } else {
        neighbours >= FLOOR_FILL_NEIGHBOURS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(width: usize, height: usize) -> CavernParams {
        CavernParams {
            width,
            height,
            ..CavernParams::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic_for_seed() {
        let a = generate(&params(40, 30), &mut StdRng::seed_from_u64(77));
        let b = generate(&params(40, 30), &mut StdRng::seed_from_u64(77));
        let c = generate(&params(40, 30), &mut StdRng::seed_from_u64(78));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_all_wall_grid_stays_wall() {
        let grid = Grid::filled(12, 9, true);
        let mut smoothed = grid.clone();
        for _ in 0..CAVERN_SMOOTHING_ITERATIONS {
            smoothed = smooth(&smoothed);
        }
        assert_eq!(smoothed, grid);
    }

    #[test]
    fn test_borders_are_wall() {
        let mut p = params(30, 20);
        p.wall_percent = 0.0;
        let grid = generate(&p, &mut StdRng::seed_from_u64(1));
        for x in 0..30 {
            assert!(grid.is_wall(x, 0));
            assert!(grid.is_wall(x, 19));
        }
        for y in 0..20 {
            assert!(grid.is_wall(0, y));
            assert!(grid.is_wall(29, y));
        }
        // An empty interior stays open apart from the cells hugging the border
        assert!(grid.is_floor(15, 10));
    }

    #[test]
    fn test_open_middle_row_is_seeded_floor() {
        let mut p = params(20, 11);
        p.wall_percent = 1.0;
        p.open_middle_row = true;
        let grid = seed(&p, &mut StdRng::seed_from_u64(3));
        for x in 1..19 {
            assert!(grid.is_floor(x, 5));
        }
        assert!(grid.is_wall(0, 5));
        assert!(grid.is_wall(5, 4));
    }

    #[test]
    fn test_cell_rule() {
        assert!(next_cell(true, 4));
        assert!(!next_cell(true, 3));
        assert!(!next_cell(true, 1));
        assert!(next_cell(false, 5));
        assert!(!next_cell(false, 4));
    }

    #[test]
    fn test_isolated_wall_crumbles() {
        let grid = Grid::from_rows(&[
            "#####",
            "#...#",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        assert!(smooth(&grid).is_floor(2, 2));
    }
}
