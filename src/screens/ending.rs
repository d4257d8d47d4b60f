//! Final screens. Both ignore input; the gate is already cancelled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::{Screen, ScreenContext, ScreenId};
use crate::input::InputEvent;
use crate::renderer::Display;
use error::GameResult;

const BANNER_ROWS: i32 = 22;

#[derive(Debug)]
pub struct WinScreen {
    rng: StdRng,
}

impl WinScreen {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Default for WinScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for WinScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Win
    }

    fn enter(&mut self, ctx: &mut ScreenContext) -> GameResult<()> {
        self.rng = StdRng::from_rng(&mut ctx.rng);
        info!("win_screen_enter");
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut ScreenContext) {
        info!("win_screen_exit");
    }

    fn render(&mut self, _ctx: &ScreenContext, display: &mut dyn Display) {
        for row in 0..BANNER_ROWS {
            // 每行随机背景色
            let (r, g, b): (u8, u8, u8) = self.rng.random();
            display.draw_text(2, row + 1, &format!("%b{{rgb({},{},{})}}You win!", r, g, b));
        }
    }

    fn handle_input(&mut self, _ctx: &mut ScreenContext, _event: &InputEvent) {}
}

#[derive(Debug, Default)]
pub struct LoseScreen;

impl Screen for LoseScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Lose
    }

    fn enter(&mut self, _ctx: &mut ScreenContext) -> GameResult<()> {
        info!("lose_screen_enter");
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut ScreenContext) {
        info!("lose_screen_exit");
    }

    fn render(&mut self, _ctx: &ScreenContext, display: &mut dyn Display) {
        for row in 0..BANNER_ROWS {
            display.draw_text(2, row + 1, "%b{red}You lose! :(");
        }
    }

    fn handle_input(&mut self, _ctx: &mut ScreenContext, _event: &InputEvent) {}
}
