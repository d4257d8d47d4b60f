//! Screen lifecycle and the context shared by every screen.
//!
//! A screen never switches screens itself. It files a request on the
//! [`ScreenContext`] and the session carries it out after the current
//! event, so `exit` and `enter` always run in the same order.

pub mod ending;
pub mod item_list;
pub mod play;
pub mod start;

use hecs::Entity;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::ecs::Map;
use crate::entity_factory::EntityFactory;
use crate::input::InputEvent;
use crate::renderer::Display;
use crate::turn_system::TurnGate;
use error::GameResult;

pub use ending::{LoseScreen, WinScreen};
pub use item_list::{ItemListScreen, Selection};
pub use play::{MESSAGE_ROWS, PlayScreen};
pub use start::StartScreen;

/// 屏幕标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Start,
    Play,
    Win,
    Lose,
    ItemList,
}

impl ScreenId {
    /// Win and lose end the game for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScreenId::Win | ScreenId::Lose)
    }
}

/// 基础屏幕特征
pub trait Screen: std::fmt::Debug {
    fn id(&self) -> ScreenId;

    /// Called once when the screen becomes active.
    fn enter(&mut self, ctx: &mut ScreenContext) -> GameResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once when the screen stops being active.
    fn exit(&mut self, ctx: &mut ScreenContext) {
        let _ = ctx;
    }

    fn render(&mut self, ctx: &ScreenContext, display: &mut dyn Display);

    /// Unknown events are ignored.
    fn handle_input(&mut self, ctx: &mut ScreenContext, event: &InputEvent);

    /// Advance anything that runs without input, e.g. the world scheduler.
    fn update(&mut self, ctx: &mut ScreenContext) {
        let _ = ctx;
    }

    /// Once true, input skips any sub-screen and goes to this screen.
    fn game_ended(&self) -> bool {
        false
    }
}

/// The live dungeon: the map and who the player is.
#[derive(Debug)]
pub struct GameWorld {
    pub map: Map,
    pub player: Entity,
}

#[derive(Debug)]
pub(crate) enum SubScreenRequest {
    Open(Box<dyn Screen>),
    Close,
}

/// 屏幕共享上下文
pub struct ScreenContext {
    pub config: GameConfig,
    pub factory: EntityFactory,
    pub gate: TurnGate,
    pub rng: StdRng,
    /// Set by the play screen while a game is running.
    pub game: Option<GameWorld>,
    refresh: bool,
    should_quit: bool,
    switch_request: Option<ScreenId>,
    sub_screen_request: Option<SubScreenRequest>,
}

impl std::fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ScreenContext {{ gate: {:?}, refresh: {}, switch_request: {:?} }}",
            self.gate, self.refresh, self.switch_request
        )
    }
}

impl ScreenContext {
    pub fn new(config: GameConfig, factory: EntityFactory) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            factory,
            gate: TurnGate::new(),
            rng,
            game: None,
            refresh: true,
            should_quit: false,
            switch_request: None,
            sub_screen_request: None,
        }
    }

    pub fn request_refresh(&mut self) {
        self.refresh = true;
    }

    /// Read and clear the refresh flag.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh)
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Ask the session to switch screens after the current event.
    pub fn request_switch(&mut self, id: ScreenId) {
        self.switch_request = Some(id);
    }

    pub(crate) fn take_switch_request(&mut self) -> Option<ScreenId> {
        self.switch_request.take()
    }

    /// Put a sub-screen over the active screen.
    pub fn open_sub_screen(&mut self, screen: Box<dyn Screen>) {
        self.sub_screen_request = Some(SubScreenRequest::Open(screen));
    }

    /// Remove the sub-screen, giving input back to the active screen.
    pub fn close_sub_screen(&mut self) {
        self.sub_screen_request = Some(SubScreenRequest::Close);
    }

    pub(crate) fn take_sub_screen_request(&mut self) -> Option<SubScreenRequest> {
        self.sub_screen_request.take()
    }
}

/// 根据标识构造屏幕
pub fn build_screen(id: ScreenId) -> Box<dyn Screen> {
    match id {
        ScreenId::Start => Box::new(StartScreen),
        ScreenId::Play => Box::new(PlayScreen::new()),
        ScreenId::Win => Box::new(WinScreen::new()),
        ScreenId::Lose => Box::new(LoseScreen),
        ScreenId::ItemList => Box::new(ItemListScreen::viewer("Items")),
    }
}
