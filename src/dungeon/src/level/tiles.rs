// src/dungeon/src/level/tiles.rs
use crate::glyph::{Color, Glyph};

/// 表示游戏中的一个地图格子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// 地图范围之外
    Null,
    Floor,
    Wall,
    StairsUp,
    StairsDown,
}

impl Tile {
    /// 检查格子是否可通行(不考虑实体)
    pub fn is_walkable(&self) -> bool {
        matches!(self, Tile::Floor | Tile::StairsUp | Tile::StairsDown)
    }

    /// 格子自身的外观，实体移开后用它重绘
    pub fn glyph(&self) -> Glyph {
        match self {
            Tile::Null => Glyph::new(' ', Color::Black, Color::Black),
            Tile::Floor => Glyph::new('.', Color::Gray, Color::Black),
            Tile::Wall => Glyph::new('#', Color::Brown, Color::Black),
            Tile::StairsUp => Glyph::new('<', Color::White, Color::Black),
            Tile::StairsDown => Glyph::new('>', Color::White, Color::Black),
        }
    }

    pub fn from_char(ch: char) -> Tile {
        match ch {
            '.' => Tile::Floor,
            '#' => Tile::Wall,
            '<' => Tile::StairsUp,
            '>' => Tile::StairsDown,
            _ => Tile::Null,
        }
    }
}
