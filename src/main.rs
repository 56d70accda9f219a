//! Terminal runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `blockfall::term`.
//! Set `BLOCKFALL_LOG_FILE` to capture diagnostics; stdout is the game screen.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use tracing::info;

use blockfall::app::{App, Flow, MonotonicClock};
use blockfall::config::Config;
use blockfall::logging;
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};

fn main() -> Result<()> {
    logging::init_from_env()?;
    let config = Config::load()?;
    info!(?config, "config loaded");

    let mut term = TerminalRenderer::new();
    term.enter()?;
    info!("terminal entered");

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let restored = term.exit();
    info!(ok = restored.is_ok(), "terminal restored");
    result.and(restored)
}

fn run(term: &mut TerminalRenderer, config: &Config) -> Result<()> {
    let mut app = App::new(config, MonotonicClock::new());
    app.set_key_release_events(term.reports_key_release());
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(u64::from(config.tick_ms));
    let mut last_tick = Instant::now();

    loop {
        if app.take_redraw() {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            app.render_into(&view, Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
        }

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("poll terminal events")? {
            let ev = event::read().context("read terminal event")?;
            if matches!(ev, Event::Resize(..)) {
                term.invalidate();
            }
            if app.handle_event(ev) == Flow::Quit {
                return Ok(());
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            app.tick();
        }
    }
}
