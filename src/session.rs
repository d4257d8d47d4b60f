//! Session: the active screen, an optional sub-screen and their context.
//!
//! Several sessions can live side by side; nothing here is global.

use std::sync::Arc;

use tracing::{debug, info};

use crate::capability::CapabilityRegistry;
use crate::config::GameConfig;
use crate::entity_factory::EntityFactory;
use crate::input::InputEvent;
use crate::renderer::Display;
use crate::screens::{Screen, ScreenContext, ScreenId, SubScreenRequest, build_screen};
use crate::template::TemplateRegistry;
use error::GameResult;

pub struct Session {
    screen: Option<Box<dyn Screen>>,
    sub_screen: Option<Box<dyn Screen>>,
    ctx: ScreenContext,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("screen", &self.screen_id())
            .field("sub_screen", &self.sub_screen.as_ref().map(|s| s.id()))
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl Session {
    /// Load templates, check the configured ones exist and show the start screen.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let templates = match &config.templates {
            Some(path) => TemplateRegistry::load(path)?,
            None => TemplateRegistry::builtin()?,
        };
        templates.get("player")?;
        for key in &config.monster_templates {
            templates.get(key)?;
        }
        let factory = EntityFactory::new(
            Arc::new(templates),
            Arc::new(CapabilityRegistry::with_builtin()),
        );

        let mut session = Self::with_context(ScreenContext::new(config, factory));
        session.switch_screen(ScreenId::Start)?;
        Ok(session)
    }

    /// A session with no active screen yet.
    pub fn with_context(ctx: ScreenContext) -> Self {
        Self {
            screen: None,
            sub_screen: None,
            ctx,
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ScreenContext {
        &mut self.ctx
    }

    pub fn screen_id(&self) -> Option<ScreenId> {
        self.screen.as_ref().map(|s| s.id())
    }

    pub fn has_sub_screen(&self) -> bool {
        self.sub_screen.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.ctx.should_quit()
    }

    pub fn switch_screen(&mut self, id: ScreenId) -> GameResult<()> {
        self.switch_to(build_screen(id))
    }

    /// Exit the sub-screen and the current screen, then enter `next`.
    /// Entering a terminal screen cancels the turn gate first.
    pub fn switch_to(&mut self, mut next: Box<dyn Screen>) -> GameResult<()> {
        if let Some(mut sub) = self.sub_screen.take() {
            sub.exit(&mut self.ctx);
        }
        if let Some(mut current) = self.screen.take() {
            current.exit(&mut self.ctx);
            debug!(screen = ?current.id(), "screen_exit");
        }
        if next.id().is_terminal() {
            self.ctx.gate.cancel();
        }
        next.enter(&mut self.ctx)?;
        info!(screen = ?next.id(), "screen_enter");
        self.screen = Some(next);
        self.ctx.request_refresh();
        Ok(())
    }

    /// Route one event to the sub-screen or the active screen, then let
    /// the world catch up.
    pub fn handle_input(&mut self, event: &InputEvent) -> GameResult<()> {
        let ended = self.screen.as_ref().is_some_and(|s| s.game_ended());
        match (&mut self.sub_screen, &mut self.screen) {
            (Some(sub), _) if !ended => sub.handle_input(&mut self.ctx, event),
            (_, Some(screen)) => screen.handle_input(&mut self.ctx, event),
            _ => {}
        }
        self.apply_requests()?;
        self.update()
    }

    /// Run whatever the active screen does between inputs.
    pub fn update(&mut self) -> GameResult<()> {
        if let Some(screen) = self.screen.as_mut() {
            screen.update(&mut self.ctx);
        }
        self.apply_requests()
    }

    pub fn render(&mut self, display: &mut dyn Display) {
        let ended = self.screen.as_ref().is_some_and(|s| s.game_ended());
        match (&mut self.sub_screen, &mut self.screen) {
            (Some(sub), _) if !ended => sub.render(&self.ctx, display),
            (_, Some(screen)) => screen.render(&self.ctx, display),
            _ => {}
        }
    }

    /// Whether a redraw was requested since the last call.
    pub fn take_refresh(&mut self) -> bool {
        self.ctx.take_refresh()
    }

    fn apply_requests(&mut self) -> GameResult<()> {
        if let Some(request) = self.ctx.take_sub_screen_request() {
            if let Some(mut old) = self.sub_screen.take() {
                old.exit(&mut self.ctx);
            }
            if let SubScreenRequest::Open(mut screen) = request {
                screen.enter(&mut self.ctx)?;
                self.sub_screen = Some(screen);
            }
            self.ctx.request_refresh();
        }
        if let Some(id) = self.ctx.take_switch_request() {
            self.switch_screen(id)?;
        }
        Ok(())
    }
}
