//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the match rules, level progression and session state.
//! It has **zero dependencies** on UI, terminals, files or clocks, making it:
//!
//! - **Deterministic**: Same seed produces the same train queues
//! - **Testable**: Every rule is reachable from plain function calls
//! - **Portable**: Any frontend can drive it (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`levels`]: Campaign level catalog, endless stage scaling, active rules
//! - [`modifiers`]: Dense fog phase and express-signal speed bursts
//! - [`rng`]: Seeded LCG used for queue colors and modifier timers
//! - [`rules`]: Scoring, forgiveness, combo and mistake-budget arithmetic
//! - [`session`]: [`MatchGameSession`], the state machine a frontend drives
//! - [`snapshot`]: Read-only per-frame copy of session state
//!
//! # Game Rules
//!
//! - A queue of colored trains waits on the track; the player picks the
//!   color of the train at the head of the queue.
//! - A correct pick scores one point and extends the combo streak.
//! - Every fourth consecutive correct pick forgives one mistake.
//! - A wrong pick costs a mistake and breaks the streak. Running out of
//!   mistakes ends the run, unless zen mode is on.
//! - Once the queue is empty the frontend calls
//!   [`advance_level`](MatchGameSession::advance_level). Campaign runs end
//!   in victory after the last level; endless runs scale forever.
//!
//! # Example
//!
//! ```
//! use train_matcher_core::{MatchGameSession, SessionConfig};
//! use train_matcher_types::{GameMode, MatchOutcome, SessionPhase};
//!
//! let mut session = MatchGameSession::new(SessionConfig::default());
//! session.start_session(GameMode::Campaign);
//!
//! let target = session.target().unwrap();
//! assert_eq!(session.attempt_match(target), Ok(MatchOutcome::Correct));
//! assert_eq!(session.score(), 1);
//! assert_eq!(session.phase(), SessionPhase::Playing);
//! ```
//!
//! # Timing
//!
//! The session is event-driven; only modifier effects and the level intro
//! banner depend on time. Call [`MatchGameSession::update`] every frame with
//! the elapsed milliseconds (16ms at 60 FPS).

pub mod error;
pub mod levels;
pub mod modifiers;
pub mod rng;
pub mod rules;
pub mod session;
pub mod snapshot;

pub use train_matcher_types as types;

// Re-export commonly used types for convenience
pub use error::SessionError;
pub use levels::{
    EndlessScaling, LevelCatalog, LevelDefinition, LevelRules, ModifierSet, RuleTuning,
};
pub use modifiers::{ExpressChange, ModifierRuntime};
pub use rng::SimpleRng;
pub use session::{HighScores, MatchGameSession, SessionConfig, SessionEvent, TrackTrain};
pub use snapshot::SessionSnapshot;
