//! ECS components and the `Map` that owns one level's entities.
//!
//! Capabilities are plain components; "can this entity do X" is answered by
//! asking the world whether the component is there.

use std::collections::HashMap;

use hecs::{Entity, EntityBuilder, World};
use rand::Rng;
use strum::{Display, EnumString};

use dungeon::{Color, Glyph, Level, Tile, TileMap};
use items::Item;

pub use dungeon::Position;

/// Energy a scheduled actor needs to take one action.
pub const ACTION_COST: u32 = 1000;

#[derive(Clone, Debug)]
pub struct Actor {
    pub name: String,
    pub faction: Faction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    pub symbol: char,
    pub fg_color: Color,
    pub bg_color: Color,
}

impl Renderable {
    pub fn glyph(&self) -> Glyph {
        Glyph::new(self.symbol, self.fg_color, self.bg_color)
    }
}

/// Health-bearing entity. Health may go negative; anything at or below
/// zero is removed from the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Being {
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defence: i32,
}

impl Being {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

// Capability components

/// Human-controlled; input reaches it through the session only.
#[derive(Clone, Copy, Debug)]
pub struct PlayerActor;

#[derive(Clone, Debug)]
pub struct TaskActor {
    pub tasks: Vec<Task>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Task {
    Hunt,
    Wander,
}

#[derive(Clone, Copy, Debug)]
pub struct Attacker;

#[derive(Clone, Copy, Debug)]
pub struct Destructible;

#[derive(Clone, Copy, Debug)]
pub struct Sight {
    pub radius: i32,
}

#[derive(Clone, Debug)]
pub struct InventoryHolder {
    pub items: Vec<Item>,
    pub slots: usize,
}

impl InventoryHolder {
    pub fn new(slots: usize) -> Self {
        Self {
            items: Vec::new(),
            slots,
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.slots
    }

    /// Returns the item back when there is no room.
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MessageRecipient {
    pub messages: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
pub struct FoodConsumer {
    pub fullness: i32,
    pub max_fullness: i32,
    pub depletion_rate: i32,
}

impl FoodConsumer {
    pub fn hunger_state(&self) -> &'static str {
        let per_percent = (self.max_fullness / 100).max(1);
        if self.fullness <= per_percent * 5 {
            "Starving"
        } else if self.fullness <= per_percent * 25 {
            "Hungry"
        } else if self.fullness >= per_percent * 95 {
            "Oversatiated"
        } else if self.fullness >= per_percent * 75 {
            "Full"
        } else {
            "Not Hungry"
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CorpseDropper {
    /// Percent chance, 0..=100.
    pub rate: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct Energy {
    pub current: u32,
    pub speed: u32,
}

/// One dungeon: its tiles, the entities standing on them and the items
/// lying around. Every entity in `world` belongs to this map only.
pub struct Map {
    pub world: World,
    level: Level,
    items: HashMap<Position, Vec<Item>>,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("entities", &self.world.len())
            .field("item_cells", &self.items.len())
            .finish()
    }
}

impl Map {
    pub fn new(level: Level) -> Self {
        Self {
            world: World::new(),
            level,
            items: HashMap::new(),
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn spawn(&mut self, builder: &mut EntityBuilder) -> Entity {
        self.world.spawn(builder.build())
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// 查询格子上的实体
    pub fn entity_at(&self, pos: Position) -> Option<Entity> {
        self.world
            .query::<&Position>()
            .iter()
            .find(|(_, p)| **p == pos)
            .map(|(entity, _)| entity)
    }

    pub fn position_of(&self, entity: Entity) -> Option<Position> {
        self.world.get::<&Position>(entity).ok().map(|p| *p)
    }

    pub fn set_position(&mut self, entity: Entity, pos: Position) {
        if let Ok(mut p) = self.world.get::<&mut Position>(entity) {
            *p = pos;
        }
    }

    pub fn being(&self, entity: Entity) -> Option<Being> {
        self.world.get::<&Being>(entity).ok().map(|b| *b)
    }

    pub fn name_of(&self, entity: Entity) -> String {
        self.world
            .get::<&Actor>(entity)
            .map(|a| a.name.clone())
            .unwrap_or_else(|_| "something".to_string())
    }

    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.world
            .entity(entity)
            .map(|e| e.has::<T>())
            .unwrap_or(false)
    }

    pub fn player(&self) -> Option<Entity> {
        self.world
            .query::<&PlayerActor>()
            .iter()
            .next()
            .map(|(entity, _)| entity)
    }

    pub fn is_player(&self, entity: Entity) -> bool {
        self.has::<PlayerActor>(entity)
    }

    /// Take the entity off the map. Returns `false` when it was already
    /// gone, so repeated calls are harmless.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if !self.world.contains(entity) {
            return false;
        }
        self.world.despawn(entity).is_ok()
    }

    pub fn is_empty_floor(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Floor && self.entity_at(pos).is_none()
    }

    pub fn random_empty_floor<R: Rng>(&self, z: i32, rng: &mut R) -> Option<Position> {
        let cells: Vec<Position> = self
            .level
            .walkable_cells(z)
            .into_iter()
            .filter(|p| self.is_empty_floor(*p))
            .collect();
        if cells.is_empty() {
            return None;
        }
        Some(cells[rng.random_range(0..cells.len())])
    }

    /// Number of living enemies left on the map.
    pub fn hostile_count(&self) -> usize {
        self.world
            .query::<(&Actor, &Being)>()
            .iter()
            .filter(|(_, (actor, _))| actor.faction == Faction::Enemy)
            .count()
    }

    pub fn items_at(&self, pos: Position) -> &[Item] {
        self.items.get(&pos).map_or(&[], |v| v.as_slice())
    }

    pub fn add_item(&mut self, pos: Position, item: Item) {
        self.items.entry(pos).or_default().push(item);
    }

    /// Remove the items at the given indices (any order) from a cell.
    pub fn take_items(&mut self, pos: Position, indices: &[usize]) -> Vec<Item> {
        let Some(pile) = self.items.get_mut(&pos) else {
            return Vec::new();
        };
        let mut sorted: Vec<usize> = indices.iter().copied().filter(|i| *i < pile.len()).collect();
        sorted.sort_unstable();
        sorted.dedup();
        let taken: Vec<Item> = sorted.iter().rev().map(|&i| pile.remove(i)).collect();
        if pile.is_empty() {
            self.items.remove(&pos);
        }
        taken.into_iter().rev().collect()
    }

    /// Append to the entity's message log if it keeps one.
    pub fn send_message(&mut self, entity: Entity, message: impl Into<String>) {
        if let Ok(mut recipient) = self.world.get::<&mut MessageRecipient>(entity) {
            recipient.messages.push(message.into());
        }
    }

    pub fn clear_messages(&mut self, entity: Entity) {
        if let Ok(mut recipient) = self.world.get::<&mut MessageRecipient>(entity) {
            recipient.messages.clear();
        }
    }
}

impl TileMap for Map {
    fn tile(&self, pos: Position) -> Tile {
        self.level.tile(pos)
    }
}
