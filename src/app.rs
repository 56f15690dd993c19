//! Terminal application state: one session plus everything the screen needs.
//!
//! [`App`] turns player actions into session calls, runs the frame timers,
//! forwards drained session events to the message feed and the journal, and
//! renders through [`GameView`]. It never touches the terminal itself, so the
//! whole control flow can be driven from tests.

use crate::config::GameConfig;
use crate::core::{MatchGameSession, SessionSnapshot};
use crate::journal::DynJournal;
use crate::term::{
    FrameBuffer, GameView, MessageFeed, SelectionBar, Theme, ViewContext, ViewWidgets, Viewport,
};
use crate::types::{
    Difficulty, LevelTransition, MatchOutcome, PlayerAction, SessionPhase, TrainColor,
};

/// Pause between matching the last train and loading the next level, so the
/// final departure is visible.
pub const DEPARTURE_DELAY_MS: u32 = 600;

/// Configuration and presentation settings shared by the frontend.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub config: GameConfig,
    pub theme: Theme,
}

impl GameContext {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            theme: Theme::default(),
        }
    }
}

pub struct App {
    ctx: GameContext,
    session: MatchGameSession,
    snap: SessionSnapshot,
    view: GameView,
    selection: SelectionBar,
    feed: MessageFeed,
    difficulty: Difficulty,
    /// Countdown to `advance_level` once the queue is exhausted.
    departure_ms: Option<u32>,
    journal: Option<DynJournal>,
}

impl App {
    pub fn new(config: GameConfig, seed: u32) -> Self {
        let session = MatchGameSession::new(config.session_config(seed));
        let view = GameView::new(config.window.title.clone());
        let snap = session.snapshot();
        Self {
            ctx: GameContext::new(config),
            session,
            snap,
            view,
            selection: SelectionBar::new(),
            feed: MessageFeed::new(),
            difficulty: Difficulty::default(),
            departure_ms: None,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: DynJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn title(&self) -> &str {
        self.view.title()
    }

    pub fn session(&self) -> &MatchGameSession {
        &self.session
    }

    pub fn theme(&self) -> &Theme {
        &self.ctx.theme
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn cursor(&self) -> usize {
        self.selection.cursor()
    }

    pub fn feed(&self) -> &MessageFeed {
        &self.feed
    }

    pub fn departure_pending(&self) -> bool {
        self.departure_ms.is_some()
    }

    pub fn handle_action(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::ToggleTheme => self.ctx.theme = self.ctx.theme.toggled(),
            PlayerAction::ToggleZen => self.session.set_zen_mode(!self.session.zen_mode()),
            PlayerAction::CycleDifficulty => {
                self.difficulty = self.difficulty.cycle();
                self.session.set_difficulty(self.difficulty);
            }
            PlayerAction::CycleMode => {
                let next = self.session.mode().next();
                self.session.set_mode(next);
                self.departure_ms = None;
                self.feed.clear();
            }
            PlayerAction::Restart => self.start(),
            PlayerAction::MoveLeft => self.selection.move_left(self.session.options().len()),
            PlayerAction::MoveRight => self.selection.move_right(self.session.options().len()),
            PlayerAction::Confirm => match self.session.phase() {
                SessionPhase::Menu | SessionPhase::GameOver => self.start(),
                SessionPhase::Playing => {
                    if let Some(color) = self.selection.selected(self.session.options()) {
                        self.try_match(color);
                    }
                }
            },
            PlayerAction::Pick(n) => {
                let len = self.session.options().len();
                if let Some(&color) = self.session.options().get(n as usize) {
                    self.selection.set_cursor(n as usize, len);
                    self.try_match(color);
                }
            }
        }
        self.dispatch_events();
    }

    /// Left click at terminal cell `(x, y)`.
    pub fn click(&mut self, x: u16, y: u16, viewport: Viewport) {
        match self.session.phase() {
            SessionPhase::Menu => self.handle_action(PlayerAction::Confirm),
            SessionPhase::GameOver => {}
            SessionPhase::Playing => {
                self.session.snapshot_into(&mut self.snap);
                let ctx = ViewContext {
                    snap: &self.snap,
                    theme: &self.ctx.theme,
                    palette: &self.ctx.config.palette,
                };
                if let Some(i) = self.view.option_at(&ctx, &self.selection, viewport, x, y) {
                    self.handle_action(PlayerAction::Pick(i as u8));
                }
            }
        }
    }

    /// Advance one frame.
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.session.update(elapsed_ms);
        crate::term::Widget::update(&mut self.feed, elapsed_ms);

        if let Some(remaining) = self.departure_ms {
            let remaining = remaining.saturating_sub(elapsed_ms);
            if remaining > 0 {
                self.departure_ms = Some(remaining);
            } else {
                self.departure_ms = None;
                self.depart();
            }
        }

        self.dispatch_events();
    }

    pub fn render_into(&mut self, viewport: Viewport, fb: &mut FrameBuffer) {
        self.session.snapshot_into(&mut self.snap);
        let ctx = ViewContext {
            snap: &self.snap,
            theme: &self.ctx.theme,
            palette: &self.ctx.config.palette,
        };
        let widgets = ViewWidgets {
            selection: &self.selection,
            feed: &self.feed,
        };
        self.view.render_into(&ctx, &widgets, viewport, fb);
    }

    pub fn flush_journal(&mut self) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.flush() {
                eprintln!("[Journal] {:#}", e);
            }
        }
    }

    fn start(&mut self) {
        self.session.reset_session();
        self.departure_ms = None;
        self.feed.clear();
        self.selection.clamp(self.session.options().len());
    }

    fn try_match(&mut self, color: TrainColor) {
        match self.session.attempt_match(color) {
            Ok(MatchOutcome::Correct) => {
                if self.session.queue_exhausted() {
                    self.departure_ms = Some(DEPARTURE_DELAY_MS);
                }
            }
            Ok(MatchOutcome::NoTrainsRemaining) => {
                self.feed
                    .push("No more trains to match!", self.ctx.theme.primary, 800);
            }
            Ok(MatchOutcome::Wrong) => {
                if self.session.zen_mode() {
                    self.feed
                        .push("Zen active - enjoy the ride!", self.ctx.theme.secondary, 600);
                }
            }
            Ok(MatchOutcome::WrongGameOver) => self.departure_ms = None,
            // Only reachable outside Playing, where selections are ignored.
            Err(_) => {}
        }
    }

    fn depart(&mut self) {
        match self.session.advance_level() {
            Ok(LevelTransition::Advanced { .. } | LevelTransition::StageCleared { .. }) => {
                self.selection.clamp(self.session.options().len());
            }
            Ok(LevelTransition::Victory) => {}
            // The run ended or was reset while the last train departed.
            Err(_) => {}
        }
    }

    fn dispatch_events(&mut self) {
        let episode = self.session.episode_id();
        for event in self.session.take_events() {
            self.feed.announce(&event, &self.ctx.theme);
            if let Some(journal) = self.journal.as_mut() {
                if let Err(e) = journal.record(episode, &event) {
                    self.journal = None;
                    let mut text = String::from("Journal disabled: ");
                    text.push_str(&e.to_string());
                    self.feed.push(&text, self.ctx.theme.error, 3000);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameMode;

    fn app() -> App {
        App::new(GameConfig::default(), 12345)
    }

    fn pick_target(app: &mut App) {
        let target = app.session().target().unwrap();
        let i = app
            .session()
            .options()
            .iter()
            .position(|c| *c == target)
            .unwrap();
        app.handle_action(PlayerAction::Pick(i as u8));
    }

    #[test]
    fn confirm_starts_from_menu() {
        let mut app = app();
        assert_eq!(app.session().phase(), SessionPhase::Menu);
        app.handle_action(PlayerAction::Confirm);
        assert_eq!(app.session().phase(), SessionPhase::Playing);
    }

    #[test]
    fn cursor_confirm_matches_selected_option() {
        let mut app = app();
        app.handle_action(PlayerAction::Confirm);
        let target = app.session().target().unwrap();
        let i = app
            .session()
            .options()
            .iter()
            .position(|c| *c == target)
            .unwrap();
        for _ in 0..i {
            app.handle_action(PlayerAction::MoveRight);
        }
        assert_eq!(app.cursor(), i);
        app.handle_action(PlayerAction::Confirm);
        assert_eq!(app.session().score(), 1);
        assert!(!app.feed().is_empty());
    }

    #[test]
    fn clearing_queue_advances_after_departure_delay() {
        let mut app = app();
        app.handle_action(PlayerAction::Confirm);
        while app.session().target().is_some() {
            pick_target(&mut app);
        }
        assert!(app.departure_pending());
        assert_eq!(app.session().level_index(), 0);

        app.tick(DEPARTURE_DELAY_MS - 1);
        assert_eq!(app.session().level_index(), 0);
        app.tick(1);
        assert!(!app.departure_pending());
        assert_eq!(app.session().level_index(), 1);
        assert!(app.cursor() < app.session().options().len());
    }

    #[test]
    fn difficulty_and_zen_toggles() {
        let mut app = app();
        app.handle_action(PlayerAction::Confirm);
        app.handle_action(PlayerAction::CycleDifficulty);
        assert_eq!(app.difficulty(), Difficulty::Relaxed);
        assert_eq!(app.session().max_mistakes(), Some(4));
        app.handle_action(PlayerAction::ToggleZen);
        assert_eq!(app.session().max_mistakes(), None);
    }

    #[test]
    fn cycle_mode_returns_to_menu() {
        let mut app = app();
        app.handle_action(PlayerAction::Confirm);
        app.handle_action(PlayerAction::CycleMode);
        assert_eq!(app.session().phase(), SessionPhase::Menu);
        assert_eq!(app.session().mode(), GameMode::Endless);
    }

    #[test]
    fn theme_toggle() {
        let mut app = app();
        let before = app.theme().kind;
        app.handle_action(PlayerAction::ToggleTheme);
        assert_ne!(app.theme().kind, before);
    }

    #[test]
    fn click_on_option_matches() {
        let mut app = app();
        let viewport = Viewport::new(120, 30);
        app.click(0, 0, viewport);
        assert_eq!(app.session().phase(), SessionPhase::Playing);

        let target = app.session().target().unwrap();
        let i = app
            .session()
            .options()
            .iter()
            .position(|c| *c == target)
            .unwrap();
        let layout = GameView::default().layout(viewport);
        let x = layout.selection.x + i as u16 * crate::term::widgets::OPTION_SLOT_W + 1;
        app.click(x, layout.selection.y, viewport);
        assert_eq!(app.session().score(), 1);
    }

    #[test]
    fn render_shows_menu_then_track() {
        let mut app = app();
        let mut fb = FrameBuffer::new(120, 30);
        app.render_into(Viewport::new(120, 30), &mut fb);
        assert!(fb.contains_text("Press Enter to start"));

        app.handle_action(PlayerAction::Confirm);
        app.render_into(Viewport::new(120, 30), &mut fb);
        assert!(fb.contains_text("SCORE"));
        assert!(fb.contains_text("Rookie Rails"));
    }
}
