use glam::Vec2;

/// Wall/floor occupancy of a cavern, row-major.
///
/// A grid is only ever produced whole by the generator (or by the test helpers);
/// nothing mutates it once a level is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    walls: Vec<bool>,
}

/// Offsets of the 8-neighbourhood, clockwise from north.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Grid {
    /// Create a grid with every cell set to `wall`.
    pub fn filled(width: usize, height: usize, wall: bool) -> Self {
        Self {
            width,
            height,
            walls: vec![wall; width * height],
        }
    }

    /// Build a grid from text rows, `#` for wall and anything else for floor.
    /// Short rows are padded with wall.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::filled(width, height, true);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.walls[y * width + x] = ch == '#';
            }
        }
        grid
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Wall state of a cell, `None` when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<bool> {
        self.index(x, y).map(|idx| self.walls[idx])
    }

    /// Out-of-bounds cells count as wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.get(x, y).unwrap_or(true)
    }

    pub fn is_floor(&self, x: i32, y: i32) -> bool {
        !self.is_wall(x, y)
    }

    pub(crate) fn set(&mut self, x: i32, y: i32, wall: bool) {
        if let Some(idx) = self.index(x, y) {
            self.walls[idx] = wall;
        }
    }

    pub fn is_border(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.width as i32 - 1 || y == self.height as i32 - 1
    }

    /// Number of walls among the 8 neighbours, out-of-bounds counting as wall.
    pub fn wall_neighbours(&self, x: i32, y: i32) -> u8 {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter(|(dx, dy)| self.is_wall(x + dx, y + dy))
            .count() as u8
    }

    /// Neighbourhood as a bitmask, bit `i` set when `NEIGHBOUR_OFFSETS[i]` is wall.
    pub fn neighbour_mask(&self, x: i32, y: i32) -> u8 {
        NEIGHBOUR_OFFSETS
            .iter()
            .enumerate()
            .fold(0u8, |mask, (bit, (dx, dy))| {
                if self.is_wall(x + dx, y + dy) {
                    mask | (1 << bit)
                } else {
                    mask
                }
            })
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| **w).count()
    }

    pub fn floor_count(&self) -> usize {
        self.walls.len() - self.wall_count()
    }

    /// True when the `size`×`size` square with top-left `(x, y)` is all floor.
    pub fn is_open_square(&self, x: i32, y: i32, size: usize) -> bool {
        let size = size as i32;
        (y..y + size).all(|cy| (x..x + size).all(|cx| self.get(cx, cy) == Some(false)))
    }

    /// First all-floor `size`×`size` square in row-major scan order, starting the
    /// scan at `start` and wrapping around. Returns its top-left cell.
    ///
    /// Every candidate is visited at most once, so the search terminates even on
    /// a grid with no open square.
    pub fn find_spawn_region(&self, size: usize, start: (i32, i32)) -> Option<(i32, i32)> {
        if size == 0 || size > self.width || size > self.height {
            return None;
        }
        let cols = self.width - size + 1;
        let rows = self.height - size + 1;
        let total = cols * rows;
        let sx = (start.0.max(0) as usize).min(cols - 1);
        let sy = (start.1.max(0) as usize).min(rows - 1);
        let first = sy * cols + sx;

        (0..total)
            .map(|step| (first + step) % total)
            .map(|candidate| ((candidate % cols) as i32, (candidate / cols) as i32))
            .find(|&(x, y)| self.is_open_square(x, y, size))
    }

    /// World-space centre of the first open square found from `start`, or the
    /// map centre when the cavern has no such square.
    pub fn spawn_point(&self, size: usize, start: (i32, i32)) -> Vec2 {
        match self.find_spawn_region(size, start) {
            Some((x, y)) => region_center(x, y, size),
            None => self.center(),
        }
    }

    /// Centre of the map in world units; the fallback spawn position.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

/// World-space centre of a square region of cells.
pub fn region_center(x: i32, y: i32, size: usize) -> Vec2 {
    let half = size as f32 / 2.0;
    Vec2::new(x as f32 + half, y as f32 + half)
}

/// World-space centre of a single cell.
pub fn cell_center(x: i32, y: i32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}
