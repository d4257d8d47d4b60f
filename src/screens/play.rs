//! The game itself: map, player commands and the world scheduler.

use rand::seq::IndexedRandom;
use tracing::{info, warn};

use dungeon::{Level, TileMap};
use items::Item;

use super::item_list::{ItemListScreen, Selection};
use super::{GameWorld, Screen, ScreenContext, ScreenId};
use crate::ecs::{FoodConsumer, InventoryHolder, MessageRecipient, Position, Renderable};
use crate::input::{InputEvent, KeyCode};
use crate::movement;
use crate::renderer::Display;
use crate::turn_system::{TurnGate, TurnScheduler};
use error::{GameError, GameResult};

const PLAYER_TEMPLATE: &str = "player";

/// Message rows drawn over the top of the map; older lines are hidden.
pub const MESSAGE_ROWS: usize = 5;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Won,
    Lost,
}

impl Ending {
    fn screen(self) -> ScreenId {
        match self {
            Ending::Won => ScreenId::Win,
            Ending::Lost => ScreenId::Lose,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Ending::Won => "%c{green}You have slain every monster! Press [Enter] to continue.",
            Ending::Lost => "%c{red}You have died... Press [Enter] to continue.",
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayScreen {
    scheduler: TurnScheduler,
    ending: Option<Ending>,
    /// Viewport centre; kept after the player is gone.
    focus: Position,
}

impl PlayScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    fn build_world(ctx: &mut ScreenContext) -> GameResult<GameWorld> {
        let config = &ctx.config;
        let level = Level::bordered(config.width, config.height, config.depth, &mut ctx.rng);
        let mut map = crate::ecs::Map::new(level);

        let start = map
            .random_empty_floor(0, &mut ctx.rng)
            .ok_or(GameError::NoFreeCell { depth: 0 })?;
        let player = ctx.factory.spawn(&mut map, PLAYER_TEMPLATE, start)?;

        for z in 0..config.depth {
            for _ in 0..config.monsters_per_level {
                let Some(key) = config.monster_templates.choose(&mut ctx.rng) else {
                    break;
                };
                let Some(pos) = map.random_empty_floor(z, &mut ctx.rng) else {
                    warn!(depth = z, "level_full");
                    break;
                };
                ctx.factory.spawn(&mut map, key, pos)?;
            }
        }

        map.send_message(player, "Welcome to the dungeon! Use the arrow keys to move.");
        Ok(GameWorld { map, player })
    }

    /// Attempt a player move and hand the turn to the world.
    fn move_player(&mut self, ctx: &mut ScreenContext, dx: i32, dy: i32, dz: i32) {
        let policy = ctx.config.retaliation;
        let Some(game) = ctx.game.as_mut() else {
            return;
        };
        let Some(from) = game.map.position_of(game.player) else {
            return;
        };

        let target = from.offset(dx, dy, dz);
        let outcome = movement::try_move(&mut game.map, game.player, target, policy, &mut ctx.rng);
        if outcome.is_free() {
            movement::deplete_fullness(&mut game.map, game.player, &mut ctx.rng);
        }
        ctx.gate.unlock();
        self.check_ending(ctx);
    }

    fn check_ending(&mut self, ctx: &mut ScreenContext) {
        if self.ending.is_some() {
            return;
        }
        let Some(game) = ctx.game.as_ref() else {
            return;
        };
        let player_alive = game
            .map
            .being(game.player)
            .is_some_and(|b| b.is_alive());
        let ending = if !player_alive {
            Ending::Lost
        } else if game.map.hostile_count() == 0 {
            Ending::Won
        } else {
            return;
        };

        // 游戏结束后闸门永久关闭
        ctx.gate.cancel();
        self.ending = Some(ending);
        ctx.request_refresh();
        info!(ending = ?ending, "game_over");
    }

    fn show_inventory(&mut self, ctx: &mut ScreenContext) {
        let Some(game) = ctx.game.as_mut() else {
            return;
        };
        let items = inventory_of(game);
        if items.is_empty() {
            game.map.send_message(game.player, "You are not carrying anything.");
            ctx.request_refresh();
            return;
        }
        let mut list = ItemListScreen::viewer("Your inventory");
        list.setup(game.player, items.into_iter().map(Some).collect());
        ctx.open_sub_screen(Box::new(list));
    }

    fn drop_item(&mut self, ctx: &mut ScreenContext) {
        let Some(game) = ctx.game.as_mut() else {
            return;
        };
        let items = inventory_of(game);
        if items.is_empty() {
            game.map.send_message(game.player, "You have nothing to drop.");
            ctx.request_refresh();
            return;
        }
        let caption = "Choose the item you wish to drop";
        let mut list = ItemListScreen::new(caption, true, false, drop_selected);
        list.setup(game.player, items.into_iter().map(Some).collect());
        ctx.open_sub_screen(Box::new(list));
    }

    fn pick_up(&mut self, ctx: &mut ScreenContext) {
        let Some(game) = ctx.game.as_mut() else {
            return;
        };
        let Some(pos) = game.map.position_of(game.player) else {
            return;
        };
        let here = game.map.items_at(pos).to_vec();
        match here.len() {
            0 => {
                game.map.send_message(game.player, "There is nothing here to pick up.");
                ctx.request_refresh();
            }
            1 => {
                let selection: Selection = here.into_iter().enumerate().collect();
                let player = game.player;
                if pick_up_selected(ctx, player, &selection) {
                    ctx.gate.unlock();
                }
                self.check_ending(ctx);
                ctx.request_refresh();
            }
            _ => {
                let caption = "Choose the items you wish to pick up";
                let mut list = ItemListScreen::new(caption, true, true, pick_up_selected);
                list.setup(game.player, here.into_iter().map(Some).collect());
                ctx.open_sub_screen(Box::new(list));
            }
        }
    }

    fn eat(&mut self, ctx: &mut ScreenContext) {
        let Some(game) = ctx.game.as_mut() else {
            return;
        };
        let edible: Vec<Option<Item>> = inventory_of(game)
            .into_iter()
            .map(|item| item.is_edible().then_some(item))
            .collect();
        if edible.iter().all(Option::is_none) {
            game.map.send_message(game.player, "You have nothing to eat.");
            ctx.request_refresh();
            return;
        }
        let caption = "Choose the item you wish to eat";
        let mut list = ItemListScreen::new(caption, true, false, eat_selected);
        list.setup(game.player, edible);
        ctx.open_sub_screen(Box::new(list));
    }

    fn render_map(&mut self, game: &GameWorld, display: &mut dyn Display) {
        let (width, height) = display.size();
        let (width, height) = (i32::from(width), i32::from(height).saturating_sub(1));
        if let Some(pos) = game.map.position_of(game.player) {
            self.focus = pos;
        }
        let level = game.map.level();
        let left = viewport_origin(self.focus.x, width, level.width());
        let top = viewport_origin(self.focus.y, height, level.height());
        let z = self.focus.z;

        for y in 0..height {
            for x in 0..width {
                let pos = Position::new(left + x, top + y, z);
                let glyph = match game.map.items_at(pos).last() {
                    Some(item) => item.glyph,
                    None => game.map.tile(pos).glyph(),
                };
                display.draw_glyph(x, y, glyph);
            }
        }

        let mut query = game.map.world.query::<(&Position, &Renderable)>();
        for (_, (pos, renderable)) in query.iter() {
            if pos.z == z {
                display.draw_glyph(pos.x - left, pos.y - top, renderable.glyph());
            }
        }
    }

    fn render_messages(&self, game: &GameWorld, display: &mut dyn Display) {
        if let Ok(recipient) = game.map.world.get::<&MessageRecipient>(game.player) {
            let hidden = recipient.messages.len().saturating_sub(MESSAGE_ROWS);
            for (row, message) in recipient.messages[hidden..].iter().enumerate() {
                display.draw_text(0, row as i32, &format!("%c{{white}}%b{{black}}{}", message));
            }
        }
    }

    fn render_status(&self, game: &GameWorld, display: &mut dyn Display) {
        let (_, height) = display.size();
        let being = game.map.being(game.player);
        let health = being.map_or(0, |b| b.health.max(0));
        let max_health = being.map_or(0, |b| b.max_health);
        let hunger = game
            .map
            .world
            .get::<&FoodConsumer>(game.player)
            .map(|f| f.hunger_state())
            .unwrap_or("");
        let status = format!(
            "%c{{white}}%b{{black}}HP: {}/{}  Depth: {}  {}",
            health,
            max_health,
            self.focus.z + 1,
            hunger
        );
        display.draw_text(0, i32::from(height) - 1, &status);
    }
}

impl Screen for PlayScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Play
    }

    fn enter(&mut self, ctx: &mut ScreenContext) -> GameResult<()> {
        let game = Self::build_world(ctx)?;
        self.focus = game.map.position_of(game.player).unwrap_or_default();
        info!(
            monsters = game.map.hostile_count(),
            depth = ctx.config.depth,
            "play_screen_enter"
        );
        ctx.game = Some(game);
        ctx.gate = TurnGate::new();
        self.ending = None;
        self.scheduler = TurnScheduler::new();
        self.scheduler.start(&mut ctx.gate);
        Ok(())
    }

    fn exit(&mut self, ctx: &mut ScreenContext) {
        ctx.game = None;
        info!("play_screen_exit");
    }

    fn render(&mut self, ctx: &ScreenContext, display: &mut dyn Display) {
        let Some(game) = ctx.game.as_ref() else {
            return;
        };
        self.render_map(game, display);
        self.render_messages(game, display);
        self.render_status(game, display);
        if let Some(ending) = self.ending {
            let (_, height) = display.size();
            display.draw_text(0, i32::from(height) / 2, ending.prompt());
        }
    }

    fn handle_input(&mut self, ctx: &mut ScreenContext, event: &InputEvent) {
        if let Some(ending) = self.ending {
            if event.is_key_down(KeyCode::Enter) {
                ctx.request_switch(ending.screen());
            }
            return;
        }

        let command = matches!(
            *event,
            InputEvent::KeyDown(
                KeyCode::Left
                    | KeyCode::Right
                    | KeyCode::Up
                    | KeyCode::Down
                    | KeyCode::Char('i' | 'd' | 'g' | 'e')
            ) | InputEvent::KeyPress('<' | '>')
        );
        if !command {
            return;
        }
        // 每条指令只显示它自己产生的消息
        if let Some(game) = ctx.game.as_mut() {
            game.map.clear_messages(game.player);
        }

        match *event {
            InputEvent::KeyDown(KeyCode::Left) => self.move_player(ctx, -1, 0, 0),
            InputEvent::KeyDown(KeyCode::Right) => self.move_player(ctx, 1, 0, 0),
            InputEvent::KeyDown(KeyCode::Up) => self.move_player(ctx, 0, -1, 0),
            InputEvent::KeyDown(KeyCode::Down) => self.move_player(ctx, 0, 1, 0),
            InputEvent::KeyDown(KeyCode::Char('i')) => self.show_inventory(ctx),
            InputEvent::KeyDown(KeyCode::Char('d')) => self.drop_item(ctx),
            InputEvent::KeyDown(KeyCode::Char('g')) => self.pick_up(ctx),
            InputEvent::KeyDown(KeyCode::Char('e')) => self.eat(ctx),
            InputEvent::KeyPress('>') => self.move_player(ctx, 0, 0, 1),
            InputEvent::KeyPress('<') => self.move_player(ctx, 0, 0, -1),
            _ => {}
        }
    }

    fn update(&mut self, ctx: &mut ScreenContext) {
        if self.ending.is_some() || ctx.gate.is_locked() {
            return;
        }
        let policy = ctx.config.retaliation;
        let Some(game) = ctx.game.as_mut() else {
            return;
        };
        self.scheduler
            .run(&mut game.map, &mut ctx.gate, policy, &mut ctx.rng);
        self.check_ending(ctx);
        ctx.request_refresh();
    }

    fn game_ended(&self) -> bool {
        self.ending.is_some()
    }
}

/// Top-left map coordinate of a viewport of `size` cells centred on `centre`.
fn viewport_origin(centre: i32, size: i32, extent: i32) -> i32 {
    if extent <= size {
        return 0;
    }
    (centre - size / 2).clamp(0, extent - size)
}

fn inventory_of(game: &GameWorld) -> Vec<Item> {
    game.map
        .world
        .get::<&InventoryHolder>(game.player)
        .map(|inv| inv.items.clone())
        .unwrap_or_default()
}

/// Take the selected inventory slots out, highest index first.
fn remove_from_inventory(game: &mut GameWorld, indices: &[usize]) -> Vec<Item> {
    let Ok(mut inventory) = game.map.world.get::<&mut InventoryHolder>(game.player) else {
        return Vec::new();
    };
    let mut removed = Vec::new();
    for &i in indices.iter().rev() {
        if i < inventory.items.len() {
            removed.push(inventory.items.remove(i));
        }
    }
    removed.reverse();
    removed
}

fn drop_selected(ctx: &mut ScreenContext, owner: hecs::Entity, selection: &Selection) -> bool {
    let Some(game) = ctx.game.as_mut() else {
        return false;
    };
    let Some(pos) = game.map.position_of(owner) else {
        return false;
    };
    let indices: Vec<usize> = selection.keys().copied().collect();
    let dropped = remove_from_inventory(game, &indices);
    for item in dropped {
        game.map.send_message(owner, format!("You drop {}.", item.describe()));
        game.map.add_item(pos, item);
    }
    true
}

fn pick_up_selected(ctx: &mut ScreenContext, owner: hecs::Entity, selection: &Selection) -> bool {
    let Some(game) = ctx.game.as_mut() else {
        return false;
    };
    let Some(pos) = game.map.position_of(owner) else {
        return false;
    };
    let indices: Vec<usize> = selection.keys().copied().collect();
    let taken = game.map.take_items(pos, &indices);

    let mut picked = 0;
    let mut left_behind = Vec::new();
    if let Ok(mut inventory) = game.map.world.get::<&mut InventoryHolder>(owner) {
        for item in taken {
            match inventory.add(item) {
                Ok(()) => picked += 1,
                Err(item) => left_behind.push(item),
            }
        }
    } else {
        left_behind = taken;
    }

    let full = !left_behind.is_empty();
    for item in left_behind {
        game.map.add_item(pos, item);
    }
    if picked > 0 {
        game.map.send_message(owner, format!("You pick up {} item(s).", picked));
    }
    if full {
        game.map.send_message(owner, "Your inventory is full! Not all items were picked up.");
    }
    picked > 0
}

fn eat_selected(ctx: &mut ScreenContext, owner: hecs::Entity, selection: &Selection) -> bool {
    let Some(game) = ctx.game.as_mut() else {
        return false;
    };
    let Some((&index, _)) = selection.iter().next() else {
        return false;
    };
    let Some(item) = remove_from_inventory(game, &[index]).pop() else {
        return false;
    };
    let food_value = item.food_value().unwrap_or(0) as i32;
    if let Ok(mut food) = game.map.world.get::<&mut FoodConsumer>(owner) {
        food.fullness = (food.fullness + food_value).min(food.max_fullness);
    }
    game.map.send_message(owner, format!("You eat {}.", item.describe()));
    true
}
