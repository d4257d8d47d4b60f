//src/items/src/lib.rs
//! Things that lie on the floor and fit in an inventory.

use dungeon::{Color, Glyph};

/// 腐烂前尸体提供的饱食度
pub const CORPSE_FOOD_VALUE: u32 = 75;

#[derive(PartialEq, Debug, Clone)]
pub struct Item {
    pub name: String,
    pub glyph: Glyph,
    pub kind: ItemKind,
}

#[derive(PartialEq, Debug, Clone)]
pub enum ItemKind {
    Corpse { food_value: u32 },
    Food { food_value: u32 },
    Misc,
}

impl Item {
    pub fn new(name: impl Into<String>, glyph: Glyph, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            glyph,
            kind,
        }
    }

    /// The corpse a slain being leaves behind, coloured like its owner.
    pub fn corpse(owner: &str, fg: Color) -> Self {
        Self::new(
            format!("{} corpse", owner),
            Glyph::new('%', fg, Color::Black),
            ItemKind::Corpse {
                food_value: CORPSE_FOOD_VALUE,
            },
        )
    }

    pub fn describe(&self) -> &str {
        &self.name
    }

    pub fn food_value(&self) -> Option<u32> {
        match self.kind {
            ItemKind::Corpse { food_value } | ItemKind::Food { food_value } => Some(food_value),
            ItemKind::Misc => None,
        }
    }

    pub fn is_edible(&self) -> bool {
        self.food_value().is_some()
    }
}
