use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use scopeguard::defer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use terminal_crawler::config::GameConfig;
use terminal_crawler::error::handle_error;
use terminal_crawler::input;
use terminal_crawler::renderer::BufferDisplay;
use terminal_crawler::session::Session;

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => GameConfig::load(&path)
            .map_err(|e| anyhow!(handle_error(&e)))
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    init_tracing(&config.log_file)?;
    info!(seed = ?config.seed, depth = config.depth, "starting");

    let mut session = Session::new(config).map_err(|e| anyhow!(handle_error(&e)))?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
    defer! {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.clear()?;

    let result = run(&mut terminal, &mut session);
    match &result {
        Ok(()) => info!("exited"),
        Err(e) => error!(error = %e, "game_crashed"),
    }
    result
}

/// 主循环：有刷新请求时重绘，然后等待输入
fn run<B: Backend>(terminal: &mut Terminal<B>, session: &mut Session) -> Result<()> {
    loop {
        if session.take_refresh() {
            terminal.draw(|frame| {
                let mut display = BufferDisplay::new(frame.buffer_mut());
                session.render(&mut display);
            })?;
        }
        if session.should_quit() {
            return Ok(());
        }
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let event = event::read()?;
        if input::is_quit(&event) {
            return Ok(());
        }
        if let Event::Resize(..) = event {
            session.context_mut().request_refresh();
        }
        for input_event in input::translate_event(&event) {
            session.handle_input(&input_event)?;
        }
    }
}

/// The terminal belongs to the TUI, so logs go to a file.
fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
