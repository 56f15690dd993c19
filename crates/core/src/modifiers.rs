//! Modifier runtime - time-driven side effects of level modifiers
//!
//! The session owns one [`ModifierRuntime`] and advances it once per frame.
//! It never draws anything: dense fog only accumulates a phase angle, and
//! express signals only produce a speed multiplier for the renderer.

use std::f32::consts::TAU;

use crate::levels::ModifierSet;
use crate::rng::SimpleRng;
use crate::types::{
    ModifierKind, EXPRESS_ACTIVE_MS, EXPRESS_COOLDOWN_MS, EXPRESS_FIRST_COOLDOWN_MS,
    EXPRESS_SPEED_MULTIPLIER, FOG_LUMPS, FOG_PHASE_RATE, SPEED_EASE_PER_SEC,
};

/// Express-signal state change produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressChange {
    Started,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierRuntime {
    fog_phase: f32,
    fog_offsets: [f32; FOG_LUMPS],
    express_active: bool,
    /// Idle time accumulated toward `express_cooldown_ms`.
    express_idle_ms: u32,
    express_cooldown_ms: u32,
    /// Time spent in the current burst.
    express_elapsed_ms: u32,
    speed_multiplier: f32,
}

impl ModifierRuntime {
    pub fn new(rng: &mut SimpleRng) -> Self {
        let mut rt = Self {
            fog_phase: 0.0,
            fog_offsets: [0.0; FOG_LUMPS],
            express_active: false,
            express_idle_ms: 0,
            express_cooldown_ms: EXPRESS_FIRST_COOLDOWN_MS.0,
            express_elapsed_ms: 0,
            speed_multiplier: 1.0,
        };
        rt.reset(rng);
        rt
    }

    /// Restart all timers for a freshly applied level.
    pub fn reset(&mut self, rng: &mut SimpleRng) {
        self.fog_phase = 0.0;
        for offset in self.fog_offsets.iter_mut() {
            *offset = rng.next_unit() * TAU;
        }
        self.express_active = false;
        self.express_idle_ms = 0;
        self.express_elapsed_ms = 0;
        self.express_cooldown_ms =
            rng.range_inclusive(EXPRESS_FIRST_COOLDOWN_MS.0, EXPRESS_FIRST_COOLDOWN_MS.1);
        self.speed_multiplier = 1.0;
    }

    pub fn fog_phase(&self) -> f32 {
        self.fog_phase
    }

    pub fn fog_offsets(&self) -> &[f32; FOG_LUMPS] {
        &self.fog_offsets
    }

    pub fn express_active(&self) -> bool {
        self.express_active
    }

    pub fn express_cooldown_ms(&self) -> u32 {
        self.express_cooldown_ms
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Advance timers by `elapsed_ms` under the `active` modifiers.
    pub fn tick(
        &mut self,
        elapsed_ms: u32,
        active: &ModifierSet,
        rng: &mut SimpleRng,
    ) -> Option<ExpressChange> {
        let dt = elapsed_ms as f32 / 1000.0;

        if active.contains(ModifierKind::DenseFog) {
            self.fog_phase = (self.fog_phase + dt * FOG_PHASE_RATE) % TAU;
        }

        if !active.contains(ModifierKind::ExpressSignals) {
            self.speed_multiplier = (self.speed_multiplier - dt * SPEED_EASE_PER_SEC).max(1.0);
            return None;
        }

        let mut change = None;
        if self.express_active {
            self.express_elapsed_ms = self.express_elapsed_ms.saturating_add(elapsed_ms);
            if self.express_elapsed_ms >= EXPRESS_ACTIVE_MS {
                self.express_active = false;
                self.express_elapsed_ms = 0;
                change = Some(ExpressChange::Ended);
            }
        } else {
            self.express_idle_ms = self.express_idle_ms.saturating_add(elapsed_ms);
            if self.express_idle_ms >= self.express_cooldown_ms {
                self.express_active = true;
                self.express_idle_ms = 0;
                self.express_elapsed_ms = 0;
                self.express_cooldown_ms =
                    rng.range_inclusive(EXPRESS_COOLDOWN_MS.0, EXPRESS_COOLDOWN_MS.1);
                change = Some(ExpressChange::Started);
            }
        }

        let target = if self.express_active {
            EXPRESS_SPEED_MULTIPLIER
        } else {
            1.0
        };
        let step = dt * SPEED_EASE_PER_SEC;
        self.speed_multiplier = if self.speed_multiplier < target {
            (self.speed_multiplier + step).min(target)
        } else {
            (self.speed_multiplier - step).max(target)
        };

        change
    }
}
