//! Match session module - the rules of one playthrough
//!
//! [`MatchGameSession`] owns the track queue, the offered colors, the match
//! pointer, score, mistake budget, combo streak and level/stage progression.
//! It is a synchronous request/response API: the frontend calls
//! [`attempt_match`](MatchGameSession::attempt_match),
//! [`advance_level`](MatchGameSession::advance_level) and
//! [`update`](MatchGameSession::update), then reads a snapshot to draw.

use arrayvec::ArrayVec;

use crate::error::SessionError;
use crate::levels::{LevelCatalog, LevelRules, ModifierSet, RuleTuning};
use crate::modifiers::{ExpressChange, ModifierRuntime};
use crate::rng::SimpleRng;
use crate::rules;
use crate::snapshot::SessionSnapshot;
use crate::types::*;

/// One train waiting on the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackTrain {
    pub color: TrainColor,
    /// Set once the train has been matched and is departing.
    pub matched: bool,
}

impl TrackTrain {
    pub fn new(color: TrainColor) -> Self {
        Self {
            color,
            matched: false,
        }
    }
}

/// Best scores per mode. Never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScores {
    campaign: u32,
    endless: u32,
}

impl HighScores {
    pub fn get(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Campaign => self.campaign,
            GameMode::Endless => self.endless,
        }
    }

    /// Record `score`; returns `true` if it beat the previous best.
    pub fn record(&mut self, mode: GameMode, score: u32) -> bool {
        let slot = match mode {
            GameMode::Campaign => &mut self.campaign,
            GameMode::Endless => &mut self.endless,
        };
        if score > *slot {
            *slot = score;
            true
        } else {
            false
        }
    }
}

/// Things that happened during a call, for the presentation layer.
///
/// Drained with [`MatchGameSession::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    RunStarted {
        mode: GameMode,
        episode: u32,
    },
    Matched {
        color: TrainColor,
        score: u32,
        combo: u32,
    },
    Missed {
        expected: TrainColor,
        selected: TrainColor,
        mistakes: u32,
    },
    MistakeForgiven {
        mistakes: u32,
    },
    ComboStreak {
        combo: u32,
        super_combo: bool,
    },
    /// A level or endless stage began. `level` is 1-based.
    LevelStarted {
        level: u32,
    },
    ModifierUnlocked(ModifierKind),
    ExpressStarted,
    ExpressEnded,
    GameOver {
        reason: GameOverReason,
        score: u32,
        new_high_score: bool,
    },
    ZenChanged(bool),
    MistakeLimitChanged {
        max_mistakes: Option<u32>,
    },
}

impl SessionEvent {
    /// Stable snake_case name, used as the journal record kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::RunStarted { .. } => "run_started",
            SessionEvent::Matched { .. } => "matched",
            SessionEvent::Missed { .. } => "missed",
            SessionEvent::MistakeForgiven { .. } => "mistake_forgiven",
            SessionEvent::ComboStreak { .. } => "combo_streak",
            SessionEvent::LevelStarted { .. } => "level_started",
            SessionEvent::ModifierUnlocked(_) => "modifier_unlocked",
            SessionEvent::ExpressStarted => "express_started",
            SessionEvent::ExpressEnded => "express_ended",
            SessionEvent::GameOver { .. } => "game_over",
            SessionEvent::ZenChanged(_) => "zen_changed",
            SessionEvent::MistakeLimitChanged { .. } => "mistake_limit_changed",
        }
    }
}

/// Construction parameters for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub catalog: LevelCatalog,
    pub tuning: RuleTuning,
    pub seed: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            catalog: LevelCatalog::builtin(),
            tuning: RuleTuning::default(),
            seed: 1,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct MatchGameSession {
    catalog: LevelCatalog,
    tuning: RuleTuning,
    rng: SimpleRng,
    mode: GameMode,
    phase: SessionPhase,
    game_over_reason: Option<GameOverReason>,
    /// Monotonic run id (increments on every start/reset).
    episode_id: u32,
    level_index: usize,
    endless_stage: u32,
    rules: LevelRules,
    track: ArrayVec<TrackTrain, MAX_TRACK_TRAINS>,
    options: ArrayVec<TrainColor, PALETTE_SIZE>,
    current_index: usize,
    score: u32,
    mistakes: u32,
    combo: u32,
    correct_matches: u32,
    wrong_matches: u32,
    zen: bool,
    difficulty_delta: i32,
    high_scores: HighScores,
    modifiers: ModifierRuntime,
    level_intro_ms: u32,
    events: ArrayVec<SessionEvent, EVENT_CAPACITY>,
}

impl MatchGameSession {
    /// Create a session sitting in the menu.
    pub fn new(config: SessionConfig) -> Self {
        let mut rng = SimpleRng::new(config.seed);
        let rules = LevelRules::campaign(config.catalog.get_clamped(0));
        let modifiers = ModifierRuntime::new(&mut rng);

        let mut session = Self {
            catalog: config.catalog,
            tuning: config.tuning,
            rng,
            mode: GameMode::Campaign,
            phase: SessionPhase::Menu,
            game_over_reason: None,
            episode_id: 0,
            level_index: 0,
            endless_stage: 0,
            rules,
            track: ArrayVec::new(),
            options: ArrayVec::new(),
            current_index: 0,
            score: 0,
            mistakes: 0,
            combo: 0,
            correct_matches: 0,
            wrong_matches: 0,
            zen: false,
            difficulty_delta: 0,
            high_scores: HighScores::default(),
            modifiers,
            level_intro_ms: 0,
            events: ArrayVec::new(),
        };
        session.reset_run();
        session
    }

    /// Begin a new run in `mode` at level 0 / stage 0.
    pub fn start_session(&mut self, mode: GameMode) {
        self.mode = mode;
        self.reset_run();
        self.phase = SessionPhase::Playing;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.push_event(SessionEvent::RunStarted {
            mode,
            episode: self.episode_id,
        });
        self.push_event(SessionEvent::LevelStarted {
            level: self.level_number(),
        });
    }

    /// Discard the current run and start over in the same mode.
    pub fn reset_session(&mut self) {
        self.start_session(self.mode);
    }

    /// Abandon the current run and go back to the menu.
    pub fn return_to_menu(&mut self) {
        self.reset_run();
        self.phase = SessionPhase::Menu;
    }

    /// Switch mode. The current run is abandoned and the session returns to
    /// the menu; high scores are kept.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.return_to_menu();
    }

    /// Try to match `selected` against the head of the track queue.
    pub fn attempt_match(&mut self, selected: TrainColor) -> Result<MatchOutcome, SessionError> {
        self.ensure_playing("attempt a match")?;

        let Some(target) = self.track.get(self.current_index).map(|t| t.color) else {
            return Ok(MatchOutcome::NoTrainsRemaining);
        };

        if selected == target {
            self.on_correct_match();
            Ok(MatchOutcome::Correct)
        } else {
            Ok(self.on_wrong_match(target, selected))
        }
    }

    /// Move past a fully matched queue.
    pub fn advance_level(&mut self) -> Result<LevelTransition, SessionError> {
        self.ensure_playing("advance the level")?;
        if !self.queue_exhausted() {
            return Err(SessionError::QueueNotExhausted {
                remaining: self.remaining_trains(),
            });
        }

        let previous_modifiers = self.rules.modifiers.clone();
        let transition = match self.mode {
            GameMode::Campaign => {
                if self.level_index >= self.catalog.last_index() {
                    self.end_run(GameOverReason::Victory);
                    return Ok(LevelTransition::Victory);
                }
                self.level_index += 1;
                self.mistakes = 0;
                self.combo = 0;
                LevelTransition::Advanced {
                    level: self.level_index,
                }
            }
            GameMode::Endless => {
                self.endless_stage += 1;
                let previous_mistakes = self.mistakes;
                self.mistakes = self.mistakes.saturating_sub(1);
                self.combo = 0;
                self.level_index = (self.endless_stage as usize).min(self.catalog.last_index());
                if self.mistakes < previous_mistakes {
                    self.push_event(SessionEvent::MistakeForgiven {
                        mistakes: self.mistakes,
                    });
                }
                LevelTransition::StageCleared {
                    stage: self.endless_stage,
                }
            }
        };

        self.apply_level_rules();
        self.initialize_trains();

        self.push_event(SessionEvent::LevelStarted {
            level: self.level_number(),
        });
        let unlocked: ArrayVec<ModifierKind, 2> = self
            .rules
            .modifiers
            .added_since(&previous_modifiers)
            .collect();
        for kind in unlocked {
            self.push_event(SessionEvent::ModifierUnlocked(kind));
        }

        Ok(transition)
    }

    /// Advance frame timers by `elapsed_ms`. No-op outside `Playing`.
    pub fn update(&mut self, elapsed_ms: u32) {
        if self.phase != SessionPhase::Playing {
            return;
        }

        self.level_intro_ms = self.level_intro_ms.saturating_sub(elapsed_ms);

        match self
            .modifiers
            .tick(elapsed_ms, &self.rules.modifiers, &mut self.rng)
        {
            Some(ExpressChange::Started) => self.push_event(SessionEvent::ExpressStarted),
            Some(ExpressChange::Ended) => self.push_event(SessionEvent::ExpressEnded),
            None => {}
        }
    }

    /// Zen mode: the mistake budget becomes unbounded. Idempotent.
    pub fn set_zen_mode(&mut self, enabled: bool) {
        if self.zen == enabled {
            return;
        }
        self.zen = enabled;
        self.push_event(SessionEvent::ZenChanged(enabled));
        self.push_event(SessionEvent::MistakeLimitChanged {
            max_mistakes: self.max_mistakes(),
        });
    }

    /// Shift the mistake budget by `delta` relative to the level allowance.
    pub fn set_difficulty_modifier(&mut self, delta: i32) {
        if self.difficulty_delta == delta {
            return;
        }
        self.difficulty_delta = delta;
        self.push_event(SessionEvent::MistakeLimitChanged {
            max_mistakes: self.max_mistakes(),
        });
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.set_difficulty_modifier(difficulty.mistake_delta());
    }

    /// Take the events queued since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.events.drain(..)
    }

    /// Like [`drain_events`](Self::drain_events), but hands over the whole
    /// queue so the session can be borrowed again while iterating.
    pub fn take_events(&mut self) -> ArrayVec<SessionEvent, EVENT_CAPACITY> {
        std::mem::take(&mut self.events)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn endless_stage(&self) -> u32 {
        self.endless_stage
    }

    /// Human-facing level number (1-based).
    pub fn level_number(&self) -> u32 {
        match self.mode {
            GameMode::Campaign => self.level_index as u32 + 1,
            GameMode::Endless => self.endless_stage + 1,
        }
    }

    pub fn rules(&self) -> &LevelRules {
        &self.rules
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn tuning(&self) -> &RuleTuning {
        &self.tuning
    }

    pub fn track(&self) -> &[TrackTrain] {
        &self.track
    }

    pub fn options(&self) -> &[TrainColor] {
        &self.options
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Color the player must match next.
    pub fn target(&self) -> Option<TrainColor> {
        self.track.get(self.current_index).map(|t| t.color)
    }

    pub fn remaining_trains(&self) -> usize {
        self.track.len() - self.current_index
    }

    /// All trains matched; the caller must advance the level.
    pub fn queue_exhausted(&self) -> bool {
        self.current_index >= self.track.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// `None` when the budget is unbounded (zen mode).
    pub fn max_mistakes(&self) -> Option<u32> {
        rules::mistake_limit(self.rules.base_mistakes, self.difficulty_delta, self.zen)
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn combo_progress(&self) -> u32 {
        rules::combo_progress(self.combo, self.tuning.forgiveness_interval)
    }

    pub fn zen_mode(&self) -> bool {
        self.zen
    }

    pub fn difficulty_delta(&self) -> i32 {
        self.difficulty_delta
    }

    pub fn high_score(&self, mode: GameMode) -> u32 {
        self.high_scores.get(mode)
    }

    pub fn accuracy_percent(&self) -> f32 {
        rules::accuracy_percent(
            self.correct_matches,
            self.correct_matches + self.wrong_matches,
        )
    }

    pub fn active_modifiers(&self) -> &ModifierSet {
        &self.rules.modifiers
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.modifiers.speed_multiplier()
    }

    pub fn fog_phase(&self) -> f32 {
        self.modifiers.fog_phase()
    }

    pub fn level_intro_ms(&self) -> u32 {
        self.level_intro_ms
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.phase = self.phase;
        out.mode = self.mode;
        out.game_over_reason = self.game_over_reason;
        out.episode_id = self.episode_id;
        out.level = self.level_number();
        out.level_name.clear();
        for ch in self.rules.name.chars() {
            if out.level_name.try_push(ch).is_err() {
                break;
            }
        }
        out.track.clone_from(&self.track);
        out.options.clone_from(&self.options);
        out.current_index = self.current_index;
        out.score = self.score;
        out.high_score = self.high_scores.get(self.mode);
        out.mistakes = self.mistakes;
        out.max_mistakes = self.max_mistakes();
        out.combo = self.combo;
        out.combo_progress = self.combo_progress();
        out.forgiveness_interval = self.tuning.forgiveness_interval;
        out.accuracy = self.accuracy_percent();
        out.zen = self.zen;
        out.difficulty_delta = self.difficulty_delta;
        out.modifiers.clone_from(&self.rules.modifiers);
        out.fog_phase = self.modifiers.fog_phase();
        out.fog_offsets = *self.modifiers.fog_offsets();
        out.express_active = self.modifiers.express_active();
        out.speed_multiplier = self.modifiers.speed_multiplier();
        out.train_speed = self.rules.train_speed;
        out.spacing = self.rules.spacing;
        out.level_intro_ms = self.level_intro_ms;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn ensure_playing(&self, action: &'static str) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Playing {
            Ok(())
        } else {
            Err(SessionError::NotPlaying {
                action,
                phase: self.phase,
            })
        }
    }

    /// Zero the run state and load level 0 / stage 0. Phase is left to the caller.
    fn reset_run(&mut self) {
        self.game_over_reason = None;
        self.level_index = 0;
        self.endless_stage = 0;
        self.score = 0;
        self.mistakes = 0;
        self.combo = 0;
        self.correct_matches = 0;
        self.wrong_matches = 0;
        self.events.clear();
        self.apply_level_rules();
        self.initialize_trains();
    }

    fn apply_level_rules(&mut self) {
        self.rules = match self.mode {
            GameMode::Campaign => LevelRules::campaign(self.catalog.get_clamped(self.level_index)),
            GameMode::Endless => {
                LevelRules::endless(&self.catalog, self.endless_stage, &self.tuning.endless)
            }
        };
        self.modifiers.reset(&mut self.rng);
        self.level_intro_ms = LEVEL_INTRO_MS;
    }

    fn initialize_trains(&mut self) {
        self.track.clear();
        self.current_index = 0;
        let count = self.rules.max_trains.min(MAX_TRACK_TRAINS);
        for _ in 0..count {
            let Some(color) = self.rng.choose(&self.rules.available_colors) else {
                break;
            };
            self.track.push(TrackTrain::new(color));
        }
        self.options.clone_from(&self.rules.available_colors);
    }

    fn on_correct_match(&mut self) {
        if let Some(train) = self.track.get_mut(self.current_index) {
            train.matched = true;
        }
        let color = self.track[self.current_index].color;
        self.current_index += 1;
        self.score += rules::MATCH_POINTS;
        self.combo += 1;
        self.correct_matches += 1;

        self.push_event(SessionEvent::Matched {
            color,
            score: self.score,
            combo: self.combo,
        });
        if self.combo > 1 {
            self.push_event(SessionEvent::ComboStreak {
                combo: self.combo,
                super_combo: rules::is_super_combo(self.combo),
            });
        }

        if rules::forgives_mistake(self.combo, self.tuning.forgiveness_interval, self.mistakes) {
            self.mistakes -= 1;
            self.push_event(SessionEvent::MistakeForgiven {
                mistakes: self.mistakes,
            });
        }
    }

    fn on_wrong_match(&mut self, expected: TrainColor, selected: TrainColor) -> MatchOutcome {
        self.mistakes += 1;
        self.combo = 0;
        self.wrong_matches += 1;
        self.push_event(SessionEvent::Missed {
            expected,
            selected,
            mistakes: self.mistakes,
        });

        match self.max_mistakes() {
            Some(limit) if self.mistakes >= limit => {
                self.end_run(GameOverReason::MistakesExceeded);
                MatchOutcome::WrongGameOver
            }
            _ => MatchOutcome::Wrong,
        }
    }

    fn end_run(&mut self, reason: GameOverReason) {
        self.phase = SessionPhase::GameOver;
        self.game_over_reason = Some(reason);
        let new_high_score = self.high_scores.record(self.mode, self.score);
        self.push_event(SessionEvent::GameOver {
            reason,
            score: self.score,
            new_high_score,
        });
    }

    fn push_event(&mut self, event: SessionEvent) {
        // Oldest events are dropped if the frontend stops draining.
        if self.events.is_full() {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    #[cfg(test)]
    pub(crate) fn set_track_for_test(&mut self, colors: &[TrainColor]) {
        self.track.clear();
        for &c in colors {
            self.track.push(TrackTrain::new(c));
        }
        self.current_index = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_mistakes_for_test(&mut self, mistakes: u32) {
        self.mistakes = mistakes;
    }
}

impl Default for MatchGameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TrainColor::*;

    fn playing(mode: GameMode) -> MatchGameSession {
        let mut s = MatchGameSession::new(SessionConfig {
            seed: 12345,
            ..SessionConfig::default()
        });
        s.start_session(mode);
        s
    }

    fn clear_queue(s: &mut MatchGameSession) {
        while let Some(color) = s.target() {
            assert_eq!(s.attempt_match(color), Ok(MatchOutcome::Correct));
        }
    }

    fn wrong_color(s: &MatchGameSession) -> TrainColor {
        let target = s.target().unwrap();
        *TrainColor::ALL.iter().find(|c| **c != target).unwrap()
    }

    #[test]
    fn test_new_session_sits_in_menu() {
        let s = MatchGameSession::default();
        assert_eq!(s.phase(), SessionPhase::Menu);
        assert_eq!(s.episode_id(), 0);
        assert_eq!(s.score(), 0);
        assert!(!s.track().is_empty());
    }

    #[test]
    fn test_start_session_initializes_level_zero() {
        let s = playing(GameMode::Campaign);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.level_index(), 0);
        assert_eq!(s.track().len(), 8);
        assert_eq!(s.options(), &[Red, Blue, Green]);
        assert!(s.track().iter().all(|t| s.options().contains(&t.color)));
        assert!(s.track().iter().all(|t| !t.matched));
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.max_mistakes(), Some(3));
        assert_eq!(s.level_intro_ms(), LEVEL_INTRO_MS);
        assert_eq!(s.episode_id(), 1);
    }

    #[test]
    fn test_same_seed_same_queue() {
        let a = playing(GameMode::Campaign);
        let b = playing(GameMode::Campaign);
        assert_eq!(a.track(), b.track());
    }

    #[test]
    fn test_attempt_match_outside_playing_is_rejected() {
        let mut s = MatchGameSession::default();
        let err = s.attempt_match(Red).unwrap_err();
        assert_eq!(
            err,
            SessionError::NotPlaying {
                action: "attempt a match",
                phase: SessionPhase::Menu
            }
        );
        assert_eq!(s.mistakes(), 0);
    }

    #[test]
    fn test_scenario_a_mixed_matches() {
        let mut s = playing(GameMode::Campaign);
        s.set_track_for_test(&[Red, Blue, Red]);

        assert_eq!(s.attempt_match(Red), Ok(MatchOutcome::Correct));
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.score(), 1);

        assert_eq!(s.attempt_match(Green), Ok(MatchOutcome::Wrong));
        assert_eq!(s.mistakes(), 1);
        assert_eq!(s.combo(), 0);
        assert_eq!(s.current_index(), 1);

        assert_eq!(s.attempt_match(Blue), Ok(MatchOutcome::Correct));
        assert_eq!(s.current_index(), 2);
        assert_eq!(s.combo(), 1);

        assert_eq!(s.attempt_match(Red), Ok(MatchOutcome::Correct));
        assert_eq!(s.current_index(), 3);
        assert_eq!(s.score(), 3);
        assert_eq!(s.combo(), 2);
        assert!(s.queue_exhausted());
        assert!(s.track().iter().all(|t| t.matched));

        assert_eq!(s.attempt_match(Red), Ok(MatchOutcome::NoTrainsRemaining));
        assert_eq!(s.score(), 3);
    }

    #[test]
    fn test_scenario_b_single_mistake_budget() {
        let mut s = playing(GameMode::Campaign);
        s.set_difficulty_modifier(-2);
        assert_eq!(s.max_mistakes(), Some(1));

        let wrong = wrong_color(&s);
        assert_eq!(s.attempt_match(wrong), Ok(MatchOutcome::WrongGameOver));
        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert_eq!(s.game_over_reason(), Some(GameOverReason::MistakesExceeded));
        assert_eq!(s.high_score(GameMode::Campaign), 0);

        // Terminal until reset.
        assert!(s.attempt_match(Red).is_err());
        assert!(s.advance_level().is_err());
    }

    #[test]
    fn test_scenario_c_zen_never_ends() {
        let mut s = playing(GameMode::Campaign);
        s.set_zen_mode(true);
        assert_eq!(s.max_mistakes(), None);

        for _ in 0..10 {
            let wrong = wrong_color(&s);
            assert_eq!(s.attempt_match(wrong), Ok(MatchOutcome::Wrong));
        }
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.mistakes(), 10);
    }

    #[test]
    fn test_scenario_e_forgiveness_on_fourth_streak_match() {
        let mut s = playing(GameMode::Campaign);
        s.set_track_for_test(&[Red, Red, Red, Red, Red]);
        s.set_mistakes_for_test(2);

        for _ in 0..3 {
            s.attempt_match(Red).unwrap();
        }
        assert_eq!(s.mistakes(), 2);
        s.attempt_match(Red).unwrap();
        assert_eq!(s.combo(), 4);
        assert_eq!(s.mistakes(), 1);

        s.attempt_match(Red).unwrap();
        assert_eq!(s.mistakes(), 1);
    }

    #[test]
    fn test_wrong_match_restarts_forgiveness_cycle() {
        let mut s = playing(GameMode::Campaign);
        s.set_zen_mode(true);
        s.set_track_for_test(&[Red, Red, Red, Red, Red, Red]);

        s.attempt_match(Red).unwrap();
        s.attempt_match(Red).unwrap();
        s.attempt_match(Blue).unwrap();
        assert_eq!(s.mistakes(), 1);
        s.attempt_match(Red).unwrap();
        s.attempt_match(Red).unwrap();
        // Four correct overall but only two in the current streak.
        assert_eq!(s.mistakes(), 1);
        s.attempt_match(Red).unwrap();
        s.attempt_match(Red).unwrap();
        assert_eq!(s.combo(), 4);
        assert_eq!(s.mistakes(), 0);
    }

    #[test]
    fn test_advance_level_requires_exhausted_queue() {
        let mut s = playing(GameMode::Campaign);
        let remaining = s.remaining_trains();
        assert_eq!(
            s.advance_level(),
            Err(SessionError::QueueNotExhausted { remaining })
        );
        assert_eq!(s.level_index(), 0);
    }

    #[test]
    fn test_campaign_advance_resets_mistakes_and_combo() {
        let mut s = playing(GameMode::Campaign);
        s.set_mistakes_for_test(2);
        clear_queue(&mut s);
        assert_eq!(s.advance_level(), Ok(LevelTransition::Advanced { level: 1 }));
        assert_eq!(s.level_index(), 1);
        assert_eq!(s.mistakes(), 0);
        assert_eq!(s.combo(), 0);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.track().len(), 10);
        assert_eq!(s.options().len(), 4);
    }

    #[test]
    fn test_campaign_victory_after_last_level() {
        let mut s = playing(GameMode::Campaign);
        let levels = s.catalog().len();
        for _ in 0..levels - 1 {
            clear_queue(&mut s);
            assert!(matches!(s.advance_level(), Ok(LevelTransition::Advanced { .. })));
        }
        clear_queue(&mut s);
        let score = s.score();
        assert_eq!(s.advance_level(), Ok(LevelTransition::Victory));
        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert_eq!(s.game_over_reason(), Some(GameOverReason::Victory));
        assert_eq!(s.high_score(GameMode::Campaign), score);
        assert_eq!(s.high_score(GameMode::Endless), 0);
    }

    #[test]
    fn test_scenario_d_endless_stage_transition() {
        let mut s = playing(GameMode::Endless);
        clear_queue(&mut s);
        assert_eq!(s.advance_level(), Ok(LevelTransition::StageCleared { stage: 1 }));
        assert!(!s.active_modifiers().contains(ModifierKind::ExpressSignals));

        s.set_mistakes_for_test(2);
        clear_queue(&mut s);
        assert_eq!(s.advance_level(), Ok(LevelTransition::StageCleared { stage: 2 }));
        assert_eq!(s.mistakes(), 1);
        assert_eq!(s.endless_stage(), 2);
        assert!(s.active_modifiers().contains(ModifierKind::ExpressSignals));
    }

    #[test]
    fn test_endless_mistakes_floor_at_zero() {
        let mut s = playing(GameMode::Endless);
        clear_queue(&mut s);
        s.advance_level().unwrap();
        assert_eq!(s.mistakes(), 0);
    }

    #[test]
    fn test_difficulty_recomputed_on_level_change() {
        let mut s = playing(GameMode::Campaign);
        s.set_difficulty(Difficulty::Relaxed);
        assert_eq!(s.max_mistakes(), Some(4));
        clear_queue(&mut s);
        s.advance_level().unwrap();
        clear_queue(&mut s);
        s.advance_level().unwrap();
        // Level 3 allows 2 mistakes, relaxed adds one.
        assert_eq!(s.max_mistakes(), Some(3));
        s.set_difficulty(Difficulty::Expert);
        assert_eq!(s.max_mistakes(), Some(1));
    }

    #[test]
    fn test_zen_is_idempotent() {
        let mut s = playing(GameMode::Campaign);
        s.drain_events().for_each(drop);
        s.set_zen_mode(true);
        s.set_zen_mode(true);
        let events: Vec<_> = s.drain_events().collect();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, SessionEvent::ZenChanged(true)))
                .count(),
            1
        );
        s.set_zen_mode(false);
        assert_eq!(s.max_mistakes(), Some(3));
    }

    #[test]
    fn test_reset_keeps_high_score_and_mode() {
        let mut s = playing(GameMode::Endless);
        s.attempt_match(s.target().unwrap()).unwrap();
        s.set_zen_mode(false);
        s.set_difficulty_modifier(-5);
        let wrong = wrong_color(&s);
        assert_eq!(s.attempt_match(wrong), Ok(MatchOutcome::WrongGameOver));
        assert_eq!(s.high_score(GameMode::Endless), 1);

        s.reset_session();
        assert_eq!(s.mode(), GameMode::Endless);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(GameMode::Endless), 1);
        assert_eq!(s.episode_id(), 2);
    }

    #[test]
    fn test_high_score_survives_lower_run() {
        let mut s = playing(GameMode::Campaign);
        for _ in 0..3 {
            s.attempt_match(s.target().unwrap()).unwrap();
        }
        while s.phase() == SessionPhase::Playing {
            let wrong = wrong_color(&s);
            s.attempt_match(wrong).unwrap();
        }
        assert_eq!(s.high_score(GameMode::Campaign), 3);
        s.drain_events().for_each(drop);

        s.reset_session();
        while s.phase() == SessionPhase::Playing {
            let wrong = wrong_color(&s);
            s.attempt_match(wrong).unwrap();
        }
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(GameMode::Campaign), 3);
        let game_over = s
            .drain_events()
            .find(|e| matches!(e, SessionEvent::GameOver { .. }));
        assert_eq!(
            game_over,
            Some(SessionEvent::GameOver {
                reason: GameOverReason::MistakesExceeded,
                score: 0,
                new_high_score: false,
            })
        );
    }

    #[test]
    fn test_high_scores_record_keeps_best_per_mode() {
        let mut scores = HighScores::default();
        assert!(scores.record(GameMode::Campaign, 5));
        assert!(!scores.record(GameMode::Campaign, 2));
        assert!(!scores.record(GameMode::Campaign, 5));
        assert_eq!(scores.get(GameMode::Campaign), 5);
        assert_eq!(scores.get(GameMode::Endless), 0);
    }

    #[test]
    fn test_set_mode_returns_to_menu() {
        let mut s = playing(GameMode::Campaign);
        s.attempt_match(s.target().unwrap()).unwrap();
        s.set_mode(GameMode::Endless);
        assert_eq!(s.phase(), SessionPhase::Menu);
        assert_eq!(s.mode(), GameMode::Endless);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_update_only_while_playing() {
        let mut s = MatchGameSession::default();
        let before = s.level_intro_ms();
        s.update(1000);
        assert_eq!(s.level_intro_ms(), before);

        s.start_session(GameMode::Campaign);
        s.update(1000);
        assert_eq!(s.level_intro_ms(), LEVEL_INTRO_MS - 1000);
        s.update(5000);
        assert_eq!(s.level_intro_ms(), 0);
    }

    #[test]
    fn test_events_report_matches_and_streaks() {
        let mut s = playing(GameMode::Campaign);
        s.set_track_for_test(&[Red, Red]);
        s.drain_events().for_each(drop);

        s.attempt_match(Red).unwrap();
        s.attempt_match(Red).unwrap();
        let events: Vec<_> = s.drain_events().collect();
        assert_eq!(
            events,
            vec![
                SessionEvent::Matched {
                    color: Red,
                    score: 1,
                    combo: 1
                },
                SessionEvent::Matched {
                    color: Red,
                    score: 2,
                    combo: 2
                },
                SessionEvent::ComboStreak {
                    combo: 2,
                    super_combo: false
                },
            ]
        );
        assert_eq!(s.drain_events().count(), 0);
    }

    #[test]
    fn test_take_events_empties_queue() {
        let mut s = playing(GameMode::Campaign);
        let taken = s.take_events();
        assert!(matches!(taken.first(), Some(SessionEvent::RunStarted { episode: 1, .. })));
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn test_event_queue_drops_oldest_when_full() {
        let mut s = playing(GameMode::Campaign);
        s.set_zen_mode(true);
        for _ in 0..(EVENT_CAPACITY * 2) {
            let wrong = wrong_color(&s);
            s.attempt_match(wrong).unwrap();
        }
        let events: Vec<_> = s.drain_events().collect();
        assert_eq!(events.len(), EVENT_CAPACITY);
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Missed { mistakes, .. }) if *mistakes == (EVENT_CAPACITY * 2) as u32
        ));
    }

    #[test]
    fn test_accuracy_tracks_attempts() {
        let mut s = playing(GameMode::Campaign);
        s.set_zen_mode(true);
        s.attempt_match(s.target().unwrap()).unwrap();
        let wrong = wrong_color(&s);
        s.attempt_match(wrong).unwrap();
        assert_eq!(s.accuracy_percent(), 50.0);
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut s = playing(GameMode::Campaign);
        s.attempt_match(s.target().unwrap()).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.phase, SessionPhase::Playing);
        assert_eq!(snap.score, 1);
        assert_eq!(snap.current_index, 1);
        assert_eq!(snap.track.as_slice(), s.track());
        assert_eq!(snap.options.as_slice(), s.options());
        assert_eq!(snap.level, 1);
        assert_eq!(snap.level_name.as_str(), "Rookie Rails");
        assert_eq!(snap.max_mistakes, Some(3));
        assert_eq!(snap.combo_progress, 1);
    }
}
