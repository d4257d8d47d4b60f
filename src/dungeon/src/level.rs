//src/dungeon/src/level.rs
pub mod tiles;

use rand::Rng;

use crate::{Position, TileMap};
use tiles::Tile;

/// A stack of tile layers, one per depth. Entities are not stored here.
#[derive(Debug, Clone)]
pub struct Level {
    width: i32,
    height: i32,
    depth: i32,
    tiles: Vec<Tile>,
}

impl Level {
    /// 创建填充同一种地形的层
    pub fn new(width: i32, height: i32, depth: i32, fill: Tile) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let depth = depth.max(0);
        Self {
            width,
            height,
            depth,
            tiles: vec![fill; (width * height * depth) as usize],
        }
    }

    /// Walled rectangle per depth with one stair pair linking each depth to
    /// the next. Stand-in for a real generator.
    pub fn bordered<R: Rng>(width: i32, height: i32, depth: i32, rng: &mut R) -> Self {
        let mut level = Self::new(width, height, depth, Tile::Wall);
        for z in 0..level.depth {
            for y in 1..level.height - 1 {
                for x in 1..level.width - 1 {
                    level.set_tile(Position::new(x, y, z), Tile::Floor);
                }
            }
        }

        if level.width < 3 || level.height < 3 {
            return level;
        }

        for z in 0..level.depth - 1 {
            // 上下两层同一坐标都必须是普通地板
            let candidates: Vec<(i32, i32)> = (1..level.height - 1)
                .flat_map(|y| (1..level.width - 1).map(move |x| (x, y)))
                .filter(|&(x, y)| {
                    level.tile(Position::new(x, y, z)) == Tile::Floor
                        && level.tile(Position::new(x, y, z + 1)) == Tile::Floor
                })
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let (x, y) = candidates[rng.random_range(0..candidates.len())];
            level.set_tile(Position::new(x, y, z), Tile::StairsDown);
            level.set_tile(Position::new(x, y, z + 1), Tile::StairsUp);
        }
        level
    }

    /// Build from ASCII layers (`.` floor, `#` wall, `<`/`>` stairs).
    /// Short rows are padded with `Tile::Null`.
    pub fn from_layers(layers: &[&[&str]]) -> Self {
        let depth = layers.len() as i32;
        let height = layers.iter().map(|rows| rows.len()).max().unwrap_or(0) as i32;
        let width = layers
            .iter()
            .flat_map(|rows| rows.iter().map(|r| r.chars().count()))
            .max()
            .unwrap_or(0) as i32;

        let mut level = Self::new(width, height, depth, Tile::Null);
        for (z, rows) in layers.iter().enumerate() {
            for (y, row) in rows.iter().enumerate() {
                for (x, ch) in row.chars().enumerate() {
                    let pos = Position::new(x as i32, y as i32, z as i32);
                    level.set_tile(pos, Tile::from_char(ch));
                }
            }
        }
        level
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && pos.x < self.width
            && pos.y < self.height
            && pos.z < self.depth
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        Some(((pos.z * self.height + pos.y) * self.width + pos.x) as usize)
    }

    /// Out-of-range writes are ignored.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = tile;
        }
    }

    /// All walkable cells on one depth, row-major.
    pub fn walkable_cells(&self, z: i32) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y, z);
                if self.tile(pos).is_walkable() {
                    cells.push(pos);
                }
            }
        }
        cells
    }
}

impl TileMap for Level {
    fn tile(&self, pos: Position) -> Tile {
        self.index(pos).map_or(Tile::Null, |i| self.tiles[i])
    }
}
