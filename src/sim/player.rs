//! Player movement, health, and status effects
//!
//! The player occupies exactly one lane; horizontal motion is a short
//! ease-out tween between lane offsets, vertical motion a sine jump arc.
//! Status effects (invulnerable, ghost, shield, slow) are independent
//! timer-driven flags; all handles live in one registry owned here so
//! `reset`/`revive` can cancel everything a stale run may have started.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::timer::{Ease, TimerKey, Timers, Tween};
use super::track::PowerUpKind;
use crate::consts::*;
use crate::lane_offset;

/// Lane switch direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

/// What `take_damage` did. Death is never triggered from here; a `Fatal`
/// outcome is handed to the game's single death entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, ghost, or already dying: expected no-op
    Ignored,
    /// Shield consumed the hit; health unchanged
    Absorbed,
    /// Health reduced, still alive
    Damaged { remaining: u8 },
    /// Health reached zero
    Fatal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Current lane index (committed immediately on switch; motion lags)
    pub lane: usize,
    /// World-space X, tweened toward the lane offset
    pub x: f32,
    /// Vertical jump offset above the track
    pub vertical: f32,
    /// Cosmetic lean while switching lanes
    pub tilt: f32,
    pub health: u8,
    pub max_health: u8,
    pub jumping: bool,
    pub shield: bool,
    pub dying: bool,
    shift_tween: Option<Tween>,
    tilt_tween: Option<Tween>,
    jump_tween: Option<Tween>,
    timers: Timers,
}

impl Player {
    pub fn new(max_health: u8) -> Self {
        Self {
            lane: MIDDLE_LANE,
            x: lane_offset(MIDDLE_LANE),
            vertical: 0.0,
            tilt: 0.0,
            health: max_health,
            max_health,
            jumping: false,
            shield: false,
            dying: false,
            shift_tween: None,
            tilt_tween: None,
            jump_tween: None,
            timers: Timers::new(),
        }
    }

    /// Advance tweens and status timers by one tick.
    pub fn update(&mut self, dt: f32) {
        if let Some(tween) = &mut self.shift_tween {
            self.x = tween.tick(dt);
            if tween.finished() {
                self.shift_tween = None;
            }
        }
        if let Some(tween) = &mut self.tilt_tween {
            self.tilt = tween.tick(dt);
            if tween.finished() {
                self.tilt_tween = None;
                self.tilt = 0.0;
            }
        }
        if let Some(tween) = &mut self.jump_tween {
            self.vertical = tween.tick(dt);
            if tween.finished() {
                self.jump_tween = None;
                self.vertical = 0.0;
                self.jumping = false;
            }
        }

        let shield = &mut self.shield;
        self.timers.tick(dt, |key| {
            if key == TimerKey::Shield {
                *shield = false;
            }
        });
    }

    /// Switch one lane over, clamped at the edges. Returns `false` for the
    /// clamped no-op so callers can skip cost (sound, perfect-shift check).
    pub fn switch_lane(&mut self, direction: Direction) -> bool {
        if self.dying {
            return false;
        }
        let new_lane = match direction {
            Direction::Left => self.lane.saturating_sub(1),
            Direction::Right => (self.lane + 1).min(LANE_COUNT - 1),
        };
        if new_lane == self.lane {
            return false;
        }

        self.lane = new_lane;
        self.shift_tween = Some(Tween::new(
            self.x,
            lane_offset(new_lane),
            SWITCH_DURATION,
            Ease::OutCubic,
        ));
        let tilt_peak = match direction {
            Direction::Left => TILT_ANGLE,
            Direction::Right => -TILT_ANGLE,
        };
        self.tilt_tween = Some(Tween::new(0.0, tilt_peak, TILT_DURATION, Ease::Arc));
        true
    }

    /// Start a jump. No double-jump: gated on the jump flag.
    pub fn jump(&mut self) -> bool {
        if self.jumping || self.dying {
            return false;
        }
        self.jumping = true;
        self.jump_tween = Some(Tween::new(0.0, JUMP_HEIGHT, JUMP_DURATION, Ease::Arc));
        true
    }

    /// Forward speed multiplier. Derived from the jump flag rather than
    /// stored, so interruption (death, reset) can never leave it stuck.
    pub fn speed_multiplier(&self) -> f32 {
        if self.jumping { JUMP_DASH_MULT } else { 1.0 }
    }

    /// World time scale from the slow effect.
    pub fn time_scale(&self) -> f32 {
        if self.timers.is_active(TimerKey::Slow) {
            SLOW_FACTOR
        } else {
            1.0
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.timers.is_active(TimerKey::Invulnerable)
    }

    pub fn is_ghost(&self) -> bool {
        self.timers.is_active(TimerKey::Ghost)
    }

    pub fn at_full_health(&self) -> bool {
        self.health >= self.max_health
    }

    pub fn can_shoot(&self) -> bool {
        !self.dying && !self.timers.is_active(TimerKey::ShootCooldown)
    }

    /// Arm the shot cooldown after firing.
    pub fn begin_shot_cooldown(&mut self) {
        self.timers.set(TimerKey::ShootCooldown, SHOT_COOLDOWN);
    }

    pub fn is_shooting(&self) -> bool {
        self.timers.is_active(TimerKey::ShootCooldown)
    }

    /// Grant an invulnerability window (revive, external respawn).
    pub fn set_invulnerable(&mut self, duration: f32) {
        self.timers.set(TimerKey::Invulnerable, duration);
    }

    /// Apply damage, honoring the status-effect ladder.
    pub fn take_damage(&mut self, amount: u8) -> DamageOutcome {
        if self.dying || self.is_invulnerable() || self.is_ghost() {
            return DamageOutcome::Ignored;
        }

        if self.shield {
            // Shield absorbs exactly one hit, whatever its size
            self.shield = false;
            self.timers.cancel(TimerKey::Shield);
            self.timers.set(TimerKey::Invulnerable, HIT_GRACE_DURATION);
            return DamageOutcome::Absorbed;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            return DamageOutcome::Fatal;
        }
        // Grace window against frame-perfect double hits
        self.timers.set(TimerKey::Invulnerable, HIT_GRACE_DURATION);
        DamageOutcome::Damaged {
            remaining: self.health,
        }
    }

    /// Apply a collected power-up effect.
    pub fn apply_powerup(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Heal => {
                self.health = (self.health + 1).min(self.max_health);
            }
            PowerUpKind::Shield => {
                self.shield = true;
                self.timers.set(TimerKey::Shield, SHIELD_DURATION);
            }
            PowerUpKind::Ghost => {
                self.timers.set(TimerKey::Ghost, GHOST_DURATION);
            }
            PowerUpKind::TimeSlow => {
                self.timers.set(TimerKey::Slow, SLOW_DURATION);
            }
        }
    }

    /// Enter the terminal dying sub-state. All further actions and damage
    /// are rejected until a reset or revive.
    pub fn begin_dying(&mut self) {
        self.dying = true;
        self.shift_tween = None;
        self.tilt_tween = None;
        self.jump_tween = None;
        self.jumping = false;
        self.timers.clear();
    }

    /// Player hitbox: fixed size, centered mid-body, raised by the jump.
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center_size(
            Vec3::new(self.x, HITBOX_CENTER_Y + self.vertical, 0.0),
            Vec3::from_array(HITBOX_SIZE),
        )
    }

    /// Fresh-run state. Cancels every outstanding timer and tween so no
    /// stale callback can touch the new run.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_health);
    }

    /// Revive after a continue: full health, brief invulnerability,
    /// everything else cleared.
    pub fn revive(&mut self) {
        self.reset();
        self.set_invulnerable(INVULNERABLE_DURATION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lane_clamp_left() {
        let mut player = Player::new(MAX_HEALTH);
        assert!(player.switch_lane(Direction::Left));
        assert_eq!(player.lane, 0);
        // Clamped no-op is signaled distinctly
        assert!(!player.switch_lane(Direction::Left));
        assert_eq!(player.lane, 0);
    }

    proptest! {
        #[test]
        fn prop_lane_always_in_range(moves in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut player = Player::new(MAX_HEALTH);
            for go_right in moves {
                let dir = if go_right { Direction::Right } else { Direction::Left };
                player.switch_lane(dir);
                prop_assert!(player.lane < LANE_COUNT);
            }
        }
    }

    #[test]
    fn test_switch_tweens_toward_lane_offset() {
        let mut player = Player::new(MAX_HEALTH);
        player.switch_lane(Direction::Right);
        assert_eq!(player.lane, MIDDLE_LANE + 1);
        // Lane commits immediately, position lags behind
        assert_eq!(player.x, lane_offset(MIDDLE_LANE));
        player.update(SWITCH_DURATION);
        assert!((player.x - lane_offset(MIDDLE_LANE + 1)).abs() < 1e-4);
    }

    #[test]
    fn test_no_double_jump() {
        let mut player = Player::new(MAX_HEALTH);
        assert!(player.jump());
        assert!(!player.jump());
    }

    #[test]
    fn test_jump_multiplier_restored_on_completion() {
        let mut player = Player::new(MAX_HEALTH);
        player.jump();
        assert_eq!(player.speed_multiplier(), JUMP_DASH_MULT);

        let mut elapsed = 0.0;
        while elapsed < JUMP_DURATION + 0.1 {
            player.update(SIM_DT);
            elapsed += SIM_DT;
        }
        assert!(!player.jumping);
        assert_eq!(player.speed_multiplier(), 1.0);
        assert_eq!(player.vertical, 0.0);
    }

    #[test]
    fn test_jump_multiplier_restored_on_reset_mid_jump() {
        let mut player = Player::new(MAX_HEALTH);
        player.jump();
        player.update(JUMP_DURATION / 2.0);
        assert!(player.vertical > 0.0);

        player.reset();
        assert_eq!(player.speed_multiplier(), 1.0);
        assert_eq!(player.vertical, 0.0);
    }

    #[test]
    fn test_damage_reduces_health_and_grants_grace() {
        let mut player = Player::new(3);
        let outcome = player.take_damage(1);
        assert_eq!(outcome, DamageOutcome::Damaged { remaining: 2 });
        assert!(player.is_invulnerable());

        // Frame-perfect second hit is swallowed by the grace window
        assert_eq!(player.take_damage(1), DamageOutcome::Ignored);
        assert_eq!(player.health, 2);
    }

    #[test]
    fn test_shield_absorbs_one_hit() {
        let mut player = Player::new(3);
        player.apply_powerup(PowerUpKind::Shield);
        assert!(player.shield);

        let outcome = player.take_damage(2);
        assert_eq!(outcome, DamageOutcome::Absorbed);
        assert_eq!(player.health, 3);
        assert!(!player.shield);
        assert!(player.is_invulnerable());
    }

    #[test]
    fn test_ghost_ignores_damage_until_expiry() {
        let mut player = Player::new(3);
        player.apply_powerup(PowerUpKind::Ghost);
        assert_eq!(player.take_damage(1), DamageOutcome::Ignored);

        player.update(GHOST_DURATION + 0.01);
        assert!(!player.is_ghost());
        assert!(matches!(
            player.take_damage(1),
            DamageOutcome::Damaged { .. }
        ));
    }

    #[test]
    fn test_fatal_at_zero_health() {
        let mut player = Player::new(1);
        assert_eq!(player.take_damage(1), DamageOutcome::Fatal);
        // take_damage never flips the dying flag itself
        assert!(!player.dying);
    }

    #[test]
    fn test_dying_rejects_everything() {
        let mut player = Player::new(3);
        player.begin_dying();
        assert!(!player.switch_lane(Direction::Left));
        assert!(!player.jump());
        assert!(!player.can_shoot());
        assert_eq!(player.take_damage(1), DamageOutcome::Ignored);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let mut player = Player::new(3);
        player.take_damage(1);
        player.apply_powerup(PowerUpKind::Heal);
        assert_eq!(player.health, 3);
        player.apply_powerup(PowerUpKind::Heal);
        assert_eq!(player.health, 3);
    }

    #[test]
    fn test_overlapping_status_timers_stay_independent() {
        let mut player = Player::new(3);
        player.apply_powerup(PowerUpKind::Ghost);
        player.update(GHOST_DURATION - 1.0);
        player.apply_powerup(PowerUpKind::TimeSlow);

        // Ghost expires on its own clock; slow keeps running
        player.update(1.01);
        assert!(!player.is_ghost());
        assert_eq!(player.time_scale(), SLOW_FACTOR);
    }

    #[test]
    fn test_revive_clears_status_and_grants_invulnerability() {
        let mut player = Player::new(3);
        player.apply_powerup(PowerUpKind::Shield);
        player.take_damage(1);
        player.begin_dying();

        player.revive();
        assert!(!player.dying);
        assert_eq!(player.health, 3);
        assert!(!player.shield);
        assert!(player.is_invulnerable());
        assert!((player.timers.remaining(TimerKey::Invulnerable).unwrap()
            - INVULNERABLE_DURATION)
            .abs()
            < 1e-6);
    }
}
