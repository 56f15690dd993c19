//! Level catalog and per-level rules
//!
//! A [`LevelCatalog`] is the ordered, read-only list of campaign levels. The
//! session never plays a [`LevelDefinition`] directly; it derives the active
//! [`LevelRules`] from it. Campaign rules are a straight copy, endless rules
//! blend a base level with stage-scaled pacing and stage-gated modifiers.

use arrayvec::ArrayVec;

use crate::types::{ModifierKind, TrainColor, MAX_TRACK_TRAINS, PALETTE_SIZE};

/// Ordered set of active modifiers.
///
/// Insertion is idempotent; iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierSet {
    kinds: ArrayVec<ModifierKind, 2>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `kind` if absent. Returns `true` when it was newly added.
    pub fn insert(&mut self, kind: ModifierKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.kinds.push(kind);
        true
    }

    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ModifierKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Modifiers present in `self` but not in `before`.
    pub fn added_since<'a>(
        &'a self,
        before: &'a ModifierSet,
    ) -> impl Iterator<Item = ModifierKind> + 'a {
        self.iter().filter(move |k| !before.contains(*k))
    }
}

impl FromIterator<ModifierKind> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = ModifierKind>>(iter: I) -> Self {
        let mut set = ModifierSet::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Static configuration of one campaign level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDefinition {
    pub name: String,
    pub available_colors: ArrayVec<TrainColor, PALETTE_SIZE>,
    pub train_speed: f32,
    pub max_trains: usize,
    pub spacing: u32,
    pub mistakes_allowed: u32,
    pub modifiers: ModifierSet,
}

impl LevelDefinition {
    /// Build a definition; duplicate colors are dropped.
    pub fn new(
        name: impl Into<String>,
        colors: &[TrainColor],
        train_speed: f32,
        max_trains: usize,
        spacing: u32,
        mistakes_allowed: u32,
        modifiers: &[ModifierKind],
    ) -> Self {
        let mut available_colors = ArrayVec::new();
        for &c in colors {
            if !available_colors.contains(&c) {
                available_colors.push(c);
            }
        }
        Self {
            name: name.into(),
            available_colors,
            train_speed,
            max_trains,
            spacing,
            mistakes_allowed,
            modifiers: modifiers.iter().copied().collect(),
        }
    }

    /// Whether the session can play this level as-is.
    pub fn is_playable(&self) -> bool {
        !self.available_colors.is_empty()
            && (1..=MAX_TRACK_TRAINS).contains(&self.max_trains)
            && self.mistakes_allowed >= 1
            && self.train_speed.is_finite()
            && self.train_speed > 0.0
            && self.spacing > 0
    }
}

/// Ordered, non-empty list of playable levels.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    /// Returns `None` if `levels` is empty or contains an unplayable level.
    pub fn new(levels: Vec<LevelDefinition>) -> Option<Self> {
        if levels.is_empty() || !levels.iter().all(LevelDefinition::is_playable) {
            return None;
        }
        Some(Self { levels })
    }

    /// The six stock levels, Rookie Rails through Mirage Metro.
    pub fn builtin() -> Self {
        use ModifierKind::*;
        use TrainColor::*;

        let all = TrainColor::ALL;
        Self {
            levels: vec![
                LevelDefinition::new("Rookie Rails", &[Red, Blue, Green], 5.0, 8, 90, 3, &[]),
                LevelDefinition::new(
                    "Sunset Shuffle",
                    &[Red, Blue, Green, Yellow],
                    6.0,
                    10,
                    85,
                    3,
                    &[],
                ),
                LevelDefinition::new(
                    "Twilight Tracks",
                    &[Red, Blue, Green, Yellow, Purple],
                    7.0,
                    12,
                    80,
                    2,
                    &[ExpressSignals],
                ),
                LevelDefinition::new("Aurora Express", &all, 8.0, 14, 75, 2, &[ExpressSignals]),
                LevelDefinition::new("Blizzard Belt", &all, 8.5, 15, 72, 2, &[DenseFog]),
                LevelDefinition::new(
                    "Mirage Metro",
                    &all,
                    9.0,
                    16,
                    68,
                    1,
                    &[ExpressSignals, DenseFog],
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.levels.len() - 1
    }

    /// Level `index`, clamped to the last level.
    pub fn get_clamped(&self, index: usize) -> &LevelDefinition {
        &self.levels[index.min(self.last_index())]
    }

    pub fn get(&self, index: usize) -> Option<&LevelDefinition> {
        self.levels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDefinition> {
        self.levels.iter()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// How endless stages scale away from their base level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndlessScaling {
    /// Extra train speed per stage.
    pub speed_step: f32,
    /// Cap on the accumulated speed bonus.
    pub speed_bonus_cap: f32,
    /// Stages per additional queued train.
    pub stages_per_extra_train: u32,
    /// Upper bound on queued trains.
    pub max_trains_cap: usize,
    /// Spacing lost per stage.
    pub spacing_step: u32,
    /// Spacing never shrinks below this.
    pub spacing_floor: u32,
    /// Stages per point of mistake allowance lost.
    pub stages_per_penalty: u32,
    /// First stage with express signals forced on.
    pub express_unlock_stage: u32,
    /// First stage with dense fog forced on.
    pub fog_unlock_stage: u32,
}

impl Default for EndlessScaling {
    fn default() -> Self {
        Self {
            speed_step: 0.35,
            speed_bonus_cap: 3.5,
            stages_per_extra_train: 2,
            max_trains_cap: 18,
            spacing_step: 2,
            spacing_floor: 55,
            stages_per_penalty: 3,
            express_unlock_stage: 2,
            fog_unlock_stage: 4,
        }
    }
}

/// Tunable rule constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleTuning {
    /// Consecutive correct matches per forgiven mistake.
    pub forgiveness_interval: u32,
    pub endless: EndlessScaling,
}

impl Default for RuleTuning {
    fn default() -> Self {
        Self {
            forgiveness_interval: crate::types::FORGIVENESS_INTERVAL,
            endless: EndlessScaling::default(),
        }
    }
}

/// Rules in force for the level currently being played.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRules {
    pub name: String,
    pub available_colors: ArrayVec<TrainColor, PALETTE_SIZE>,
    pub train_speed: f32,
    pub max_trains: usize,
    pub spacing: u32,
    /// Mistake allowance before the difficulty offset.
    pub base_mistakes: u32,
    pub modifiers: ModifierSet,
}

impl LevelRules {
    pub fn campaign(def: &LevelDefinition) -> Self {
        Self {
            name: def.name.clone(),
            available_colors: def.available_colors.clone(),
            train_speed: def.train_speed,
            max_trains: def.max_trains.min(MAX_TRACK_TRAINS),
            spacing: def.spacing,
            base_mistakes: def.mistakes_allowed.max(1),
            modifiers: def.modifiers.clone(),
        }
    }

    /// Rules for endless `stage` (0-based).
    pub fn endless(catalog: &LevelCatalog, stage: u32, scaling: &EndlessScaling) -> Self {
        let base = catalog.get_clamped(stage as usize);

        let speed_bonus = (stage as f32 * scaling.speed_step).min(scaling.speed_bonus_cap);
        let extra_trains = match scaling.stages_per_extra_train {
            0 => 0,
            n => (stage / n) as usize,
        };
        let max_trains = (base.max_trains + extra_trains)
            .min(scaling.max_trains_cap)
            .min(MAX_TRACK_TRAINS);
        let spacing = base
            .spacing
            .saturating_sub(stage.saturating_mul(scaling.spacing_step))
            .max(scaling.spacing_floor);
        let penalty = match scaling.stages_per_penalty {
            0 => 0,
            n => stage / n,
        };
        let base_mistakes = base.mistakes_allowed.saturating_sub(penalty).max(1);

        let mut modifiers = base.modifiers.clone();
        if stage >= scaling.express_unlock_stage {
            modifiers.insert(ModifierKind::ExpressSignals);
        }
        if stage >= scaling.fog_unlock_stage {
            modifiers.insert(ModifierKind::DenseFog);
        }

        Self {
            name: format!("Endless Stage {}", stage + 1),
            available_colors: base.available_colors.clone(),
            train_speed: base.train_speed + speed_bonus,
            max_trains,
            spacing,
            base_mistakes,
            modifiers,
        }
    }
}
