//! Cell edge classification and level tiles.
//!
//! Every cell gets an [`EdgeType`] from its 8-neighbourhood. Wall shapes are
//! matched against [`WALL_PATTERNS`] in order and the first match wins; the
//! order matters because broad patterns (the opposite-diagonal pair, say)
//! also match cells that a later, narrower entry describes.

use glam::Vec2;

use crate::grid::{cell_center, Grid};
use crate::resources::TextureId;

const N: u8 = 1 << 0;
const NE: u8 = 1 << 1;
const E: u8 = 1 << 2;
const SE: u8 = 1 << 3;
const S: u8 = 1 << 4;
const SW: u8 = 1 << 5;
const W: u8 = 1 << 6;
const NW: u8 = 1 << 7;

const CARDINALS: u8 = N | E | S | W;
const DIAGONALS: u8 = NE | SE | SW | NW;

/// Art variant of a cell, 0 through 28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EdgeType {
    Floor = 0,
    Isolated = 1,
    EndNorth = 2,
    EndSouth = 3,
    EndEast = 4,
    EndWest = 5,
    ThinHorizontal = 6,
    ThinVertical = 7,
    OuterCornerNorthEast = 8,
    OuterCornerNorthWest = 9,
    OuterCornerSouthEast = 10,
    OuterCornerSouthWest = 11,
    EdgeNorth = 12,
    EdgeSouth = 13,
    EdgeEast = 14,
    EdgeWest = 15,
    Cross = 16,
    DiagonalNorthEastSouthWest = 17,
    DiagonalNorthWestSouthEast = 18,
    InnerPairNorth = 19,
    InnerPairSouth = 20,
    InnerPairEast = 21,
    InnerPairWest = 22,
    InnerCornerNorthEast = 23,
    InnerCornerSouthEast = 24,
    InnerCornerSouthWest = 25,
    InnerCornerNorthWest = 26,
    Enclosed = 27,
    /// Floor walled in on all four sides
    FloorPocket = 28,
}

impl EdgeType {
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn is_wall(self) -> bool {
        !matches!(self, EdgeType::Floor | EdgeType::FloorPocket)
    }

    /// Every wall cell carries a static fixture, dead interior walls included.
    pub fn needs_fixture(self) -> bool {
        self.is_wall()
    }
}

/// One row of the priority table: neighbours in `wall` must be wall, those
/// in `floor` must be floor, the rest are ignored.
#[derive(Debug, Clone, Copy)]
pub struct WallPattern {
    pub wall: u8,
    pub floor: u8,
    pub edge: EdgeType,
}

impl WallPattern {
    const fn new(wall: u8, floor: u8, edge: EdgeType) -> Self {
        Self { wall, floor, edge }
    }

    pub fn matches(&self, mask: u8) -> bool {
        mask & self.wall == self.wall && mask & self.floor == 0
    }
}

/// Wall shapes in priority order.
pub const WALL_PATTERNS: [WallPattern; 27] = [
    WallPattern::new(0, CARDINALS, EdgeType::Isolated),
    WallPattern::new(S, N | E | W, EdgeType::EndNorth),
    WallPattern::new(N, S | E | W, EdgeType::EndSouth),
    WallPattern::new(W, N | E | S, EdgeType::EndEast),
    WallPattern::new(E, N | W | S, EdgeType::EndWest),
    WallPattern::new(E | W, N | S, EdgeType::ThinHorizontal),
    WallPattern::new(N | S, E | W, EdgeType::ThinVertical),
    WallPattern::new(S | W, N | E, EdgeType::OuterCornerNorthEast),
    WallPattern::new(S | E, N | W, EdgeType::OuterCornerNorthWest),
    WallPattern::new(N | W, S | E, EdgeType::OuterCornerSouthEast),
    WallPattern::new(N | E, S | W, EdgeType::OuterCornerSouthWest),
    WallPattern::new(E | S | W, N, EdgeType::EdgeNorth),
    WallPattern::new(N | E | W, S, EdgeType::EdgeSouth),
    WallPattern::new(N | S | W, E, EdgeType::EdgeEast),
    WallPattern::new(N | E | S, W, EdgeType::EdgeWest),
    WallPattern::new(CARDINALS, DIAGONALS, EdgeType::Cross),
    WallPattern::new(CARDINALS, NE | SW, EdgeType::DiagonalNorthEastSouthWest),
    WallPattern::new(CARDINALS, NW | SE, EdgeType::DiagonalNorthWestSouthEast),
    WallPattern::new(CARDINALS, NE | NW, EdgeType::InnerPairNorth),
    WallPattern::new(CARDINALS, SE | SW, EdgeType::InnerPairSouth),
    WallPattern::new(CARDINALS, NE | SE, EdgeType::InnerPairEast),
    WallPattern::new(CARDINALS, NW | SW, EdgeType::InnerPairWest),
    WallPattern::new(CARDINALS, NE, EdgeType::InnerCornerNorthEast),
    WallPattern::new(CARDINALS, SE, EdgeType::InnerCornerSouthEast),
    WallPattern::new(CARDINALS, SW, EdgeType::InnerCornerSouthWest),
    WallPattern::new(CARDINALS, NW, EdgeType::InnerCornerNorthWest),
    WallPattern::new(CARDINALS | DIAGONALS, 0, EdgeType::Enclosed),
];

/// Classify one cell. Out-of-bounds neighbours count as wall.
pub fn classify(grid: &Grid, x: i32, y: i32) -> EdgeType {
    let mask = grid.neighbour_mask(x, y);
    if grid.is_floor(x, y) {
        return if mask & CARDINALS == CARDINALS {
            EdgeType::FloorPocket
        } else {
            EdgeType::Floor
        };
    }
    classify_wall(mask)
}

/// First matching wall pattern. The table covers every mask, so the fallback
/// is never reached.
pub fn classify_wall(mask: u8) -> EdgeType {
    WALL_PATTERNS
        .iter()
        .find(|pattern| pattern.matches(mask))
        .map(|pattern| pattern.edge)
        .unwrap_or(EdgeType::Enclosed)
}

/// A static cell of the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub edge: EdgeType,
    pub texture: TextureId,
}

impl Tile {
    pub fn new(x: i32, y: i32, edge: EdgeType, texture: TextureId) -> Self {
        Self { x, y, edge, texture }
    }

    pub fn center(&self) -> Vec2 {
        cell_center(self.x, self.y)
    }

    pub fn is_wall(&self) -> bool {
        self.edge.is_wall()
    }

    /// Per-frame hook; tiles carry no behaviour yet.
    pub fn update(&mut self, _dt_ms: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_wall_mask_matches_some_pattern() {
        for mask in 0..=u8::MAX {
            assert!(
                WALL_PATTERNS.iter().any(|p| p.matches(mask)),
                "mask {mask:#010b} unmatched"
            );
        }
    }

    #[test]
    fn test_indices_cover_zero_to_twenty_eight() {
        let mut seen: Vec<u8> = WALL_PATTERNS.iter().map(|p| p.edge.index()).collect();
        seen.push(EdgeType::Floor.index());
        seen.push(EdgeType::FloorPocket.index());
        seen.sort_unstable();
        assert_eq!(seen, (0..=28).collect::<Vec<u8>>());
    }

    #[test]
    fn test_classify_simple_shapes() {
        let grid = Grid::from_rows(&[
            ".....",
            ".#...",
            ".....",
            ".###.",
            ".....",
        ]);
        assert_eq!(classify(&grid, 1, 1), EdgeType::Isolated);
        assert_eq!(classify(&grid, 2, 3), EdgeType::ThinHorizontal);
        assert_eq!(classify(&grid, 1, 3), EdgeType::EndWest);
        assert_eq!(classify(&grid, 3, 3), EdgeType::EndEast);
        assert_eq!(classify(&grid, 0, 0), EdgeType::Floor);
    }

    #[test]
    fn test_classify_edges_and_corners() {
        let grid = Grid::from_rows(&[
            ".....",
            ".###.",
            ".###.",
            ".###.",
            ".....",
        ]);
        assert_eq!(classify(&grid, 1, 1), EdgeType::OuterCornerNorthWest);
        assert_eq!(classify(&grid, 3, 1), EdgeType::OuterCornerNorthEast);
        assert_eq!(classify(&grid, 1, 3), EdgeType::OuterCornerSouthWest);
        assert_eq!(classify(&grid, 3, 3), EdgeType::OuterCornerSouthEast);
        assert_eq!(classify(&grid, 2, 1), EdgeType::EdgeNorth);
        assert_eq!(classify(&grid, 2, 3), EdgeType::EdgeSouth);
        assert_eq!(classify(&grid, 1, 2), EdgeType::EdgeWest);
        assert_eq!(classify(&grid, 3, 2), EdgeType::EdgeEast);
        assert_eq!(classify(&grid, 2, 2), EdgeType::Enclosed);
    }

    #[test]
    fn test_diagonal_priority() {
        // Three open diagonals match the opposite-pair row before any
        // adjacent-pair row
        assert_eq!(classify_wall(CARDINALS | SW), EdgeType::DiagonalNorthWestSouthEast);
        assert_eq!(classify_wall(CARDINALS | NW), EdgeType::DiagonalNorthEastSouthWest);
        assert_eq!(classify_wall(CARDINALS), EdgeType::Cross);
        assert_eq!(classify_wall(CARDINALS | SE | SW), EdgeType::InnerPairNorth);
        assert_eq!(classify_wall(CARDINALS | (DIAGONALS & !NE)), EdgeType::InnerCornerNorthEast);
    }

    #[test]
    fn test_floor_pocket() {
        let grid = Grid::from_rows(&[
            "###",
            "#.#",
            "###",
        ]);
        assert_eq!(classify(&grid, 1, 1), EdgeType::FloorPocket);
        assert!(!EdgeType::FloorPocket.needs_fixture());
        assert!(EdgeType::Enclosed.needs_fixture());
    }
}
