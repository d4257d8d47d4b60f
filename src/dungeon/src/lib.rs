//src/dungeon/src/lib.rs
//! Tile layer of the dungeon: what a cell looks like and whether it can be
//! walked on. Level generation proper lives outside this crate; `Level`
//! only stores tiles.

pub mod glyph;
pub mod level;

pub use crate::glyph::{Color, Glyph};
pub use crate::level::Level;
pub use crate::level::tiles::Tile;

/// Cell coordinate; `z` is the dungeon depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Chebyshev distance on the same depth; `None` across depths.
    pub fn distance_to(&self, other: &Position) -> Option<i32> {
        if self.z != other.z {
            return None;
        }
        Some((self.x - other.x).abs().max((self.y - other.y).abs()))
    }

    /// 同层且上下左右相邻
    pub fn is_cardinal_neighbour(&self, other: &Position) -> bool {
        self.z == other.z && (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

/// Tile queries a map provider answers.
pub trait TileMap {
    fn tile(&self, pos: Position) -> Tile;

    fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).is_walkable()
    }
}
