//! Difficulty curve and run scoring
//!
//! Both are pure accumulations over survival time so tests can pin exact
//! step boundaries.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Speed for a given survival time: a step function, not continuous.
///
/// Onboarding (first-ever run) multiplies the base down and suppresses the
/// steps entirely.
pub fn speed_at(survival_time: f32, onboarding: bool) -> f32 {
    if onboarding {
        return BASE_SPEED * ONBOARDING_SPEED_MULT;
    }
    let steps = (survival_time / SPEED_STEP_INTERVAL).floor();
    (BASE_SPEED + steps * SPEED_INCREMENT).min(MAX_SPEED)
}

/// Time-based score, bonuses, and the combo multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreManager {
    time_survived: f32,
    bonuses: u64,
    combo: u32,
    multiplier: u32,
    shifts: u32,
    perfect_shifts: u32,
}

impl ScoreManager {
    pub fn new() -> Self {
        Self {
            time_survived: 0.0,
            bonuses: 0,
            combo: 0,
            multiplier: 1,
            shifts: 0,
            perfect_shifts: 0,
        }
    }

    /// Advance survival time. Only called while actively playing, so the
    /// clock is monotonic and pausable.
    pub fn update(&mut self, dt: f32) {
        self.time_survived += dt;
    }

    pub fn time_survived(&self) -> f32 {
        self.time_survived
    }

    /// Running score: time component plus accumulated bonuses.
    pub fn score(&self) -> u64 {
        (self.time_survived * SCORE_PER_SECOND).floor() as u64 + self.bonuses
    }

    /// Score with the combo multiplier applied.
    pub fn final_score(&self) -> u64 {
        self.score() * self.multiplier as u64
    }

    pub fn add_bonus(&mut self, amount: u64) {
        self.bonuses += amount;
    }

    /// A successful (non-clamped) lane switch.
    pub fn record_shift(&mut self) {
        self.shifts += 1;
    }

    /// A lane switch inside the perfect window: bonus plus one combo step.
    /// Returns the multiplier now in effect.
    pub fn perfect_shift(&mut self) -> u32 {
        self.bonuses += PERFECT_SHIFT_BONUS;
        self.combo += 1;
        self.perfect_shifts += 1;
        self.update_multiplier();
        self.multiplier
    }

    fn update_multiplier(&mut self) {
        self.multiplier = if self.combo >= COMBO_LEVEL2 {
            3
        } else if self.combo >= COMBO_LEVEL1 {
            2
        } else {
            1
        };
    }

    /// Any miss (taking a hit) resets the combo chain.
    pub fn reset_combo(&mut self) {
        self.combo = 0;
        self.multiplier = 1;
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn shifts(&self) -> u32 {
        self.shifts
    }

    pub fn perfect_shifts(&self) -> u32 {
        self.perfect_shifts
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_speed_step_boundaries() {
        assert_eq!(speed_at(0.0, false), 2.5);
        assert_eq!(speed_at(4.99, false), 2.5);
        assert_eq!(speed_at(5.0, false), 2.75);
        assert_eq!(speed_at(10.0, false), 3.0);
        // Cap: 2.5 + 22 * 0.25 = 8.0 at t = 110
        assert_eq!(speed_at(110.0, false), 8.0);
        assert_eq!(speed_at(1000.0, false), 8.0);
    }

    #[test]
    fn test_onboarding_speed_is_flat() {
        assert_eq!(speed_at(0.0, true), 1.25);
        assert_eq!(speed_at(60.0, true), 1.25);
    }

    proptest! {
        #[test]
        fn prop_speed_non_decreasing_and_bounded(t in 0.0f32..10_000.0, dt in 0.0f32..100.0) {
            let a = speed_at(t, false);
            let b = speed_at(t + dt, false);
            prop_assert!(b >= a);
            prop_assert!(b <= MAX_SPEED);
        }
    }

    #[test]
    fn test_score_accumulation() {
        let mut score = ScoreManager::new();
        score.update(3.0);
        assert_eq!(score.score(), 300);
        score.add_bonus(25);
        assert_eq!(score.score(), 325);
        assert_eq!(score.final_score(), 325);
    }

    #[test]
    fn test_combo_multiplier_thresholds() {
        let mut score = ScoreManager::new();
        for _ in 0..2 {
            score.perfect_shift();
        }
        assert_eq!(score.multiplier(), 1);
        score.perfect_shift();
        assert_eq!(score.multiplier(), 2);
        for _ in 0..3 {
            score.perfect_shift();
        }
        assert_eq!(score.combo(), 6);
        assert_eq!(score.multiplier(), 3);

        // Multiplier applies to the whole running score
        score.update(1.0);
        assert_eq!(score.final_score(), score.score() * 3);

        score.reset_combo();
        assert_eq!(score.multiplier(), 1);
        assert_eq!(score.combo(), 0);
    }

    #[test]
    fn test_perfect_shift_bonus_amount() {
        let mut score = ScoreManager::new();
        let mult = score.perfect_shift();
        assert_eq!(mult, 1);
        assert_eq!(score.score(), PERFECT_SHIFT_BONUS);
        assert_eq!(score.combo(), 1);
    }
}
