//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (session logic, terminal rendering, event journal).
//!
//! # Palette
//!
//! Trains come in seven fixed colors. Each level offers a subset of them:
//!
//! | Color | Label |
//! |-------|-------|
//! | Red | R |
//! | Blue | B |
//! | Green | G |
//! | Yellow | Y |
//! | Purple | P |
//! | Orange | O |
//! | Cyan | C |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `LEVEL_INTRO_MS` | 2500 | Level banner duration |
//! | `EXPRESS_ACTIVE_MS` | 3000 | Length of an express-signal burst |
//! | `EXPRESS_FIRST_COOLDOWN_MS` | 7000..=11000 | Wait before the first burst of a level |
//! | `EXPRESS_COOLDOWN_MS` | 9000..=13000 | Wait between later bursts |
//!
//! # Examples
//!
//! ```
//! use train_matcher_types::{GameMode, TrainColor, PALETTE_SIZE};
//!
//! // Parse from string (case-insensitive)
//! let color = TrainColor::from_str("purple").unwrap();
//! assert_eq!(color, TrainColor::Purple);
//! assert_eq!(color.label(), 'P');
//!
//! // Modes cycle
//! assert_eq!(GameMode::Campaign.next(), GameMode::Endless);
//!
//! assert_eq!(PALETTE_SIZE, 7);
//! ```

use std::fmt;

/// Number of distinct train colors.
pub const PALETTE_SIZE: usize = 7;

/// Hard upper bound on trains queued on the track in one level.
pub const MAX_TRACK_TRAINS: usize = 20;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Consecutive correct matches needed to forgive one mistake.
pub const FORGIVENESS_INTERVAL: u32 = 4;

/// Combo length at which streak messages become "super".
pub const COMBO_SUPER_THRESHOLD: u32 = 5;

/// Level banner duration after every level start.
pub const LEVEL_INTRO_MS: u32 = 2500;

/// Duration of one express-signal speed burst.
pub const EXPRESS_ACTIVE_MS: u32 = 3000;

/// Idle window before the first express burst of a level (inclusive bounds).
pub const EXPRESS_FIRST_COOLDOWN_MS: (u32, u32) = (7000, 11000);

/// Idle window between later express bursts (inclusive bounds).
pub const EXPRESS_COOLDOWN_MS: (u32, u32) = (9000, 13000);

/// Target speed multiplier while an express burst is active.
pub const EXPRESS_SPEED_MULTIPLIER: f32 = 1.45;

/// Rate (per second) at which the speed multiplier eases toward its target.
pub const SPEED_EASE_PER_SEC: f32 = 1.2;

/// Fog phase advance in radians per second.
pub const FOG_PHASE_RATE: f32 = 0.25;

/// Number of fog lumps drifting over the track.
pub const FOG_LUMPS: usize = 6;

/// Capacity of the per-frame session event queue.
pub const EVENT_CAPACITY: usize = 16;

/// Train colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrainColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Cyan,
}

impl TrainColor {
    /// Every color, in palette order.
    pub const ALL: [TrainColor; PALETTE_SIZE] = [
        TrainColor::Red,
        TrainColor::Blue,
        TrainColor::Green,
        TrainColor::Yellow,
        TrainColor::Purple,
        TrainColor::Orange,
        TrainColor::Cyan,
    ];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use train_matcher_types::TrainColor;
    ///
    /// assert_eq!(TrainColor::from_str("Red"), Some(TrainColor::Red));
    /// assert_eq!(TrainColor::from_str("CYAN"), Some(TrainColor::Cyan));
    /// assert_eq!(TrainColor::from_str("magenta"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(TrainColor::Red),
            "blue" => Some(TrainColor::Blue),
            "green" => Some(TrainColor::Green),
            "yellow" => Some(TrainColor::Yellow),
            "purple" => Some(TrainColor::Purple),
            "orange" => Some(TrainColor::Orange),
            "cyan" => Some(TrainColor::Cyan),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainColor::Red => "red",
            TrainColor::Blue => "blue",
            TrainColor::Green => "green",
            TrainColor::Yellow => "yellow",
            TrainColor::Purple => "purple",
            TrainColor::Orange => "orange",
            TrainColor::Cyan => "cyan",
        }
    }

    /// Single-letter label drawn on train bodies.
    pub fn label(&self) -> char {
        match self {
            TrainColor::Red => 'R',
            TrainColor::Blue => 'B',
            TrainColor::Green => 'G',
            TrainColor::Yellow => 'Y',
            TrainColor::Purple => 'P',
            TrainColor::Orange => 'O',
            TrainColor::Cyan => 'C',
        }
    }
}

impl fmt::Display for TrainColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level modifiers
///
/// Modifiers only change pacing and presentation. The session tracks which
/// are active and exposes derived values (speed multiplier, fog phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    /// Drifting fog over the track.
    DenseFog,
    /// Periodic bursts of higher train speed.
    ExpressSignals,
}

impl ModifierKind {
    /// Parse modifier from its snake_case name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dense_fog" => Some(ModifierKind::DenseFog),
            "express_signals" => Some(ModifierKind::ExpressSignals),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModifierKind::DenseFog => "dense_fog",
            ModifierKind::ExpressSignals => "express_signals",
        }
    }

    /// Human readable name for banners.
    pub fn title(&self) -> &'static str {
        match self {
            ModifierKind::DenseFog => "Dense Fog",
            ModifierKind::ExpressSignals => "Express Signals",
        }
    }
}

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// Fixed sequence of levels ending in victory.
    #[default]
    Campaign,
    /// Unbounded stages with scaling difficulty.
    Endless,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Campaign => "campaign",
            GameMode::Endless => "endless",
        }
    }

    /// The other mode.
    pub fn next(&self) -> Self {
        match self {
            GameMode::Campaign => GameMode::Endless,
            GameMode::Endless => GameMode::Campaign,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifecycle phase
///
/// `Menu -> Playing -> GameOver`, and `GameOver -> Playing` via reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Menu,
    Playing,
    GameOver,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Menu => "menu",
            SessionPhase::Playing => "playing",
            SessionPhase::GameOver => "game_over",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// The mistake budget ran out.
    MistakesExceeded,
    /// The last campaign level was cleared.
    Victory,
}

impl GameOverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverReason::MistakesExceeded => "mistakes_exceeded",
            GameOverReason::Victory => "victory",
        }
    }
}

/// Difficulty presets
///
/// Each preset shifts the level's base mistake allowance by a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Standard,
    Relaxed,
    Expert,
}

impl Difficulty {
    /// Offset applied to the level's base mistake allowance.
    ///
    /// ```
    /// use train_matcher_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::Standard.mistake_delta(), 0);
    /// assert_eq!(Difficulty::Relaxed.mistake_delta(), 1);
    /// assert_eq!(Difficulty::Expert.mistake_delta(), -1);
    /// ```
    pub fn mistake_delta(&self) -> i32 {
        match self {
            Difficulty::Standard => 0,
            Difficulty::Relaxed => 1,
            Difficulty::Expert => -1,
        }
    }

    /// Standard -> Relaxed -> Expert -> Standard
    pub fn cycle(&self) -> Self {
        match self {
            Difficulty::Standard => Difficulty::Relaxed,
            Difficulty::Relaxed => Difficulty::Expert,
            Difficulty::Expert => Difficulty::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Standard => "standard",
            Difficulty::Relaxed => "relaxed",
            Difficulty::Expert => "expert",
        }
    }
}

/// Result of one match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Selected color matched the head of the queue.
    Correct,
    /// Wrong color; the run continues.
    Wrong,
    /// Wrong color and the mistake budget is spent.
    WrongGameOver,
    /// Input arrived after the queue was already cleared. Callers ignore it.
    NoTrainsRemaining,
}

/// Result of advancing past a cleared queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTransition {
    /// Campaign moved on to `level` (0-based).
    Advanced { level: usize },
    /// Endless moved on to `stage`.
    StageCleared { stage: u32 },
    /// Last campaign level cleared; the run is over.
    Victory,
}

/// Player intents produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Move the selection cursor one option left (wraps)
    MoveLeft,
    /// Move the selection cursor one option right (wraps)
    MoveRight,
    /// Start from the menu, or match the selected option
    Confirm,
    /// Match option `n` (0-based) directly
    Pick(u8),
    /// Discard the run and start over in the same mode
    Restart,
    /// Switch between campaign and endless (returns to menu)
    CycleMode,
    /// Toggle zen mode
    ToggleZen,
    /// Cycle difficulty preset
    CycleDifficulty,
    /// Toggle light/dark theme
    ToggleTheme,
}
