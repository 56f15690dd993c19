//! Terminal train matcher runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `term`.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event};

use train_matcher::app::App;
use train_matcher::config::GameConfig;
use train_matcher::input::{click_position, handle_key_event, should_quit};
use train_matcher::journal::DynJournal;
use train_matcher::term::{FrameBuffer, TerminalRenderer, Viewport};
use train_matcher::types::TICK_MS;

fn main() -> Result<()> {
    let config = GameConfig::from_env();
    let mut app = App::new(config, clock_seed());
    if let Some(journal) = DynJournal::from_env() {
        app = app.with_journal(journal);
    }

    let mut term = TerminalRenderer::new();
    term.enter(app.title())?;

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    app.flush_journal();
    result
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, app: &mut App) -> Result<()> {
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut viewport = Viewport::new(w, h);
    let mut fb = FrameBuffer::new(w, h);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        app.render_into(viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        app.handle_action(action);
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some((x, y)) = click_position(mouse) {
                        app.click(x, y, viewport);
                    }
                }
                Event::Resize(w, h) => {
                    viewport = Viewport::new(w, h);
                    term.invalidate();
                }
                _ => {}
            }
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            app.tick(elapsed.as_millis().min(250) as u32);
        }
    }
}
