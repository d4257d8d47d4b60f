use tracing::info;

use super::{Screen, ScreenContext, ScreenId};
use crate::input::{InputEvent, KeyCode};
use crate::renderer::Display;
use error::GameResult;

/// Title screen; Enter starts a game.
#[derive(Debug, Default)]
pub struct StartScreen;

impl Screen for StartScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Start
    }

    fn enter(&mut self, _ctx: &mut ScreenContext) -> GameResult<()> {
        info!("start_screen_enter");
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut ScreenContext) {
        info!("start_screen_exit");
    }

    fn render(&mut self, _ctx: &ScreenContext, display: &mut dyn Display) {
        display.draw_text(1, 1, "%c{yellow}Terminal Crawler");
        display.draw_text(1, 2, "Press [Enter] to start!");
    }

    fn handle_input(&mut self, ctx: &mut ScreenContext, event: &InputEvent) {
        if event.is_key_down(KeyCode::Enter) {
            ctx.request_switch(ScreenId::Play);
        }
    }
}
