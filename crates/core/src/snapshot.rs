use arrayvec::{ArrayString, ArrayVec};

use crate::levels::ModifierSet;
use crate::session::TrackTrain;
use crate::types::{
    GameMode, GameOverReason, SessionPhase, TrainColor, FOG_LUMPS, MAX_TRACK_TRAINS, PALETTE_SIZE,
};

/// Longest level name kept in a snapshot; longer names are truncated.
pub const LEVEL_NAME_CAPACITY: usize = 32;

/// Read-only copy of everything a frontend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub mode: GameMode,
    pub game_over_reason: Option<GameOverReason>,
    pub episode_id: u32,
    /// 1-based level (campaign) or stage (endless) number.
    pub level: u32,
    pub level_name: ArrayString<LEVEL_NAME_CAPACITY>,
    pub track: ArrayVec<TrackTrain, MAX_TRACK_TRAINS>,
    pub options: ArrayVec<TrainColor, PALETTE_SIZE>,
    pub current_index: usize,
    pub score: u32,
    pub high_score: u32,
    pub mistakes: u32,
    pub max_mistakes: Option<u32>,
    pub combo: u32,
    pub combo_progress: u32,
    pub forgiveness_interval: u32,
    pub accuracy: f32,
    pub zen: bool,
    pub difficulty_delta: i32,
    pub modifiers: ModifierSet,
    pub fog_phase: f32,
    pub fog_offsets: [f32; FOG_LUMPS],
    pub express_active: bool,
    pub speed_multiplier: f32,
    pub train_speed: f32,
    pub spacing: u32,
    pub level_intro_ms: u32,
}

impl SessionSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Color at the head of the queue.
    pub fn target(&self) -> Option<TrainColor> {
        self.track.get(self.current_index).map(|t| t.color)
    }

    pub fn playable(&self) -> bool {
        self.phase == SessionPhase::Playing && self.target().is_some()
    }

    pub fn queue_exhausted(&self) -> bool {
        self.current_index >= self.track.len()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Menu,
            mode: GameMode::Campaign,
            game_over_reason: None,
            episode_id: 0,
            level: 0,
            level_name: ArrayString::new(),
            track: ArrayVec::new(),
            options: ArrayVec::new(),
            current_index: 0,
            score: 0,
            high_score: 0,
            mistakes: 0,
            max_mistakes: None,
            combo: 0,
            combo_progress: 0,
            forgiveness_interval: 0,
            accuracy: 0.0,
            zen: false,
            difficulty_delta: 0,
            modifiers: ModifierSet::new(),
            fog_phase: 0.0,
            fog_offsets: [0.0; FOG_LUMPS],
            express_active: false,
            speed_multiplier: 1.0,
            train_speed: 0.0,
            spacing: 0,
            level_intro_ms: 0,
        }
    }
}
