//! Rules module - scoring, combo and mistake-budget arithmetic
//!
//! These are the small pure functions the session is built from:
//! - Every correct match scores exactly one point.
//! - A streak of `interval` consecutive correct matches forgives one mistake.
//! - The mistake budget is the level allowance shifted by the difficulty
//!   offset, never below one, and unbounded in zen mode.

use crate::types::COMBO_SUPER_THRESHOLD;

/// Points awarded for one correct match.
pub const MATCH_POINTS: u32 = 1;

/// Whether the forgiveness rule fires right after a correct match.
///
/// `combo` is the streak length *including* the match that just happened.
/// A zero interval disables forgiveness.
pub fn forgives_mistake(combo: u32, interval: u32, mistakes: u32) -> bool {
    interval > 0 && combo > 0 && combo % interval == 0 && mistakes > 0
}

/// Position of `combo` inside the current forgiveness cycle.
///
/// Returns `interval` (a full meter) when the streak sits exactly on a
/// multiple of the interval, and 0 when there is no streak.
pub fn combo_progress(combo: u32, interval: u32) -> u32 {
    if combo == 0 || interval == 0 {
        return 0;
    }
    match combo % interval {
        0 => interval,
        n => n,
    }
}

/// Whether a streak deserves the "super" banner.
pub fn is_super_combo(combo: u32) -> bool {
    combo >= COMBO_SUPER_THRESHOLD
}

/// Effective mistake budget.
///
/// `None` means unbounded (zen mode).
pub fn mistake_limit(base_allowance: u32, delta: i32, zen: bool) -> Option<u32> {
    if zen {
        return None;
    }
    let base = base_allowance.max(1) as i64;
    Some((base + delta as i64).max(1) as u32)
}

/// Hit accuracy as a percentage in `[0, 100]`.
///
/// Returns 0 when nothing has been attempted yet.
pub fn accuracy_percent(correct: u32, attempts: u32) -> f32 {
    if attempts == 0 {
        return 0.0;
    }
    let correct = correct.min(attempts);
    correct as f32 / attempts as f32 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forgiveness_every_fourth() {
        assert!(!forgives_mistake(1, 4, 2));
        assert!(!forgives_mistake(3, 4, 2));
        assert!(forgives_mistake(4, 4, 2));
        assert!(!forgives_mistake(5, 4, 2));
        assert!(forgives_mistake(8, 4, 1));
    }

    #[test]
    fn test_forgiveness_needs_a_mistake() {
        assert!(!forgives_mistake(4, 4, 0));
    }

    #[test]
    fn test_forgiveness_disabled_by_zero_interval() {
        assert!(!forgives_mistake(4, 0, 3));
        assert!(!forgives_mistake(0, 4, 3));
    }

    #[test]
    fn test_combo_progress_cycle() {
        assert_eq!(combo_progress(0, 4), 0);
        assert_eq!(combo_progress(1, 4), 1);
        assert_eq!(combo_progress(3, 4), 3);
        assert_eq!(combo_progress(4, 4), 4);
        assert_eq!(combo_progress(5, 4), 1);
        assert_eq!(combo_progress(8, 4), 4);
        assert_eq!(combo_progress(8, 0), 0);
    }

    #[test]
    fn test_super_combo_threshold() {
        assert!(!is_super_combo(4));
        assert!(is_super_combo(5));
        assert!(is_super_combo(12));
    }

    #[test]
    fn test_mistake_limit_presets() {
        assert_eq!(mistake_limit(3, 0, false), Some(3));
        assert_eq!(mistake_limit(3, 1, false), Some(4));
        assert_eq!(mistake_limit(3, -1, false), Some(2));
    }

    #[test]
    fn test_mistake_limit_floor() {
        assert_eq!(mistake_limit(1, -1, false), Some(1));
        assert_eq!(mistake_limit(0, 0, false), Some(1));
        assert_eq!(mistake_limit(2, -10, false), Some(1));
    }

    #[test]
    fn test_mistake_limit_zen() {
        assert_eq!(mistake_limit(3, 0, true), None);
        assert_eq!(mistake_limit(1, -1, true), None);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy_percent(0, 0), 0.0);
        assert_eq!(accuracy_percent(3, 4), 75.0);
        assert_eq!(accuracy_percent(5, 5), 100.0);
        // Inconsistent counters are clamped rather than exceeding 100%.
        assert_eq!(accuracy_percent(9, 4), 100.0);
    }
}
