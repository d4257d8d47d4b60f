#![allow(dead_code)]

//! Builders for hand-made dungeons and sessions with a known layout.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use hecs::Entity;
use terminal_crawler::capability::CapabilityRegistry;
use terminal_crawler::config::GameConfig;
use terminal_crawler::dungeon::Level;
use terminal_crawler::ecs::{Map, Position};
use terminal_crawler::entity_factory::EntityFactory;
use terminal_crawler::error::GameResult;
use terminal_crawler::input::InputEvent;
use terminal_crawler::renderer::Display;
use terminal_crawler::screens::{GameWorld, Screen, ScreenContext, ScreenId};
use terminal_crawler::session::Session;
use terminal_crawler::template::TemplateRegistry;

/// Templates with round numbers, independent of the shipped data.
pub const TEST_TEMPLATES: &str = r#"{
    "player": {
        "name": "player", "character": "@", "foreground": "yellow",
        "max_hp": 40, "attack_value": 10,
        "max_fullness": 1000, "fullness": 500,
        "capabilities": ["player_actor", "attacker", "destructible", "inventory_holder",
                         "message_recipient", "food_consumer"]
    },
    "brute": {
        "name": "brute", "character": "K",
        "max_hp": 40, "attack_value": 10,
        "capabilities": ["task_actor", "attacker", "destructible"]
    },
    "bat": {
        "name": "bat", "character": "B",
        "max_hp": 5, "attack_value": 4,
        "capabilities": ["task_actor", "attacker", "destructible", "corpse_dropper"]
    },
    "newt": {
        "name": "newt", "character": ":",
        "max_hp": 3, "attack_value": 2,
        "capabilities": ["task_actor", "attacker", "destructible", "corpse_dropper"]
    },
    "ogre": {
        "name": "ogre", "character": "O",
        "max_hp": 100, "attack_value": 50, "sight_radius": 5, "tasks": ["hunt"],
        "capabilities": ["task_actor", "sight", "attacker", "destructible"]
    },
    "statue": {
        "name": "statue", "character": "&"
    },
    "totem": {
        "name": "totem", "character": "T", "max_hp": 5
    }
}"#;

pub fn factory() -> EntityFactory {
    factory_from(TemplateRegistry::from_json(TEST_TEMPLATES).unwrap())
}

/// A factory over `templates` with the built-in modules.
pub fn factory_from(templates: TemplateRegistry) -> EntityFactory {
    EntityFactory::new(Arc::new(templates), Arc::new(CapabilityRegistry::with_builtin()))
}

/// A one-row corridor, with a sealed cell at x = 6 for monsters that
/// should stay out of the way.
pub fn corridor() -> Map {
    Map::new(Level::from_layers(&[&[
        "########",
        "#....#.#",
        "########",
    ]]))
}

/// Player at (1, 1) plus the given monsters.
pub fn world_with(monsters: &[(&str, i32)]) -> GameWorld {
    let placed: Vec<(&str, Position)> = monsters
        .iter()
        .map(|(key, x)| (*key, Position::new(*x, 1, 0)))
        .collect();
    world_on(corridor(), Position::new(1, 1, 0), &placed)
}

/// `map` with the player at `start` and monsters at the given cells.
pub fn world_on(mut map: Map, start: Position, monsters: &[(&str, Position)]) -> GameWorld {
    let factory = factory();
    let player = factory.spawn(&mut map, "player", start).unwrap();
    for (key, pos) in monsters {
        factory.spawn(&mut map, key, *pos).unwrap();
    }
    GameWorld { map, player }
}

pub fn small_config() -> GameConfig {
    GameConfig {
        width: 12,
        height: 6,
        depth: 1,
        seed: Some(7),
        monsters_per_level: 1,
        ..GameConfig::default()
    }
}

/// A session on the play screen with `world` swapped in.
pub fn play_session(world: GameWorld) -> Session {
    let mut session = Session::new(small_config()).unwrap();
    session.switch_screen(ScreenId::Play).unwrap();
    session.context_mut().game = Some(world);
    session.take_refresh();
    session
}

pub fn press(session: &mut Session, event: InputEvent) {
    session.handle_input(&event).unwrap();
}

pub fn player_health(session: &Session) -> Option<i32> {
    let game = session.context().game.as_ref()?;
    game.map.being(game.player).map(|b| b.health)
}

pub type Journal = Rc<RefCell<Vec<String>>>;

/// Screen that writes its lifecycle calls to a shared journal.
#[derive(Debug)]
pub struct ProbeScreen {
    pub name: &'static str,
    pub id: ScreenId,
    pub journal: Journal,
}

impl ProbeScreen {
    pub fn boxed(name: &'static str, id: ScreenId, journal: &Journal) -> Box<dyn Screen> {
        Box::new(Self {
            name,
            id,
            journal: journal.clone(),
        })
    }
}

impl Screen for ProbeScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn enter(&mut self, _ctx: &mut ScreenContext) -> GameResult<()> {
        self.journal.borrow_mut().push(format!("enter {}", self.name));
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut ScreenContext) {
        self.journal.borrow_mut().push(format!("exit {}", self.name));
    }

    fn render(&mut self, _ctx: &ScreenContext, display: &mut dyn Display) {
        display.draw_text(0, 0, self.name);
    }

    fn handle_input(&mut self, _ctx: &mut ScreenContext, event: &InputEvent) {
        self.journal.borrow_mut().push(format!("{} got {:?}", self.name, event));
    }
}

pub fn owner() -> Entity {
    hecs::World::new().spawn((Position::default(),))
}
