//! Collision primitives and the resolution policy
//!
//! Geometry is plain axis-aligned boxes and a vertical cylinder over
//! numeric bounds; nothing here knows about meshes. Resolution is gated by
//! the caller on the active-play state; lane identity must match exactly
//! before any box test runs, so cross-lane overlap can never collide.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::player::{DamageOutcome, Player};
use super::score::ScoreManager;
use super::state::GameEvent;
use super::track::{Projectile, ProjectileOwner, Slot, SlotKind};
use crate::consts::*;
use crate::lane_offset;

/// Axis-aligned box over plain numeric bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Shrink every face inward by a scalar (hitbox forgiveness tuning)
    pub fn shrink(self, amount: f32) -> Self {
        Self {
            min: self.min + Vec3::splat(amount),
            max: self.max - Vec3::splat(amount),
        }
    }

    /// Shrink only the horizontal faces, leaving the top/bottom exact
    pub fn shrink_horizontal(self, amount: f32) -> Self {
        Self {
            min: self.min + Vec3::new(amount, 0.0, amount),
            max: self.max - Vec3::new(amount, 0.0, amount),
        }
    }

    /// Expand every face outward by a scalar
    pub fn expand(self, amount: f32) -> Self {
        self.shrink(-amount)
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn overlap_x(&self, other: &Aabb) -> f32 {
        (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0)
    }

    pub fn overlap_z(&self, other: &Aabb) -> f32 {
        (self.max.z.min(other.max.z) - self.min.z.max(other.min.z)).max(0.0)
    }
}

/// Vertical-cylinder hit test: horizontal radius plus a vertical band.
/// Used for projectile-vs-player, where a box would feel unfair at the
/// capsule's rounded edges.
pub fn cylinder_hit(point: Vec3, center: Vec3, radius: f32, half_height: f32) -> bool {
    let dx = point.x - center.x;
    let dz = point.z - center.z;
    dx * dx + dz * dz <= radius * radius && (point.y - center.y).abs() <= half_height
}

/// One hazard cube's box: stack position `j`, cube `k` up from the track.
fn hazard_cube(slot: &Slot, j: usize, k: u8) -> Aabb {
    let center = Vec3::new(
        lane_offset(slot.lane),
        CUBE_SIZE / 2.0 + k as f32 * CUBE_SIZE,
        slot.stack_position_z(j),
    );
    Aabb::from_center_size(center, Vec3::splat(CUBE_SIZE))
}

fn enemy_body(slot: &Slot) -> Aabb {
    let size = Vec3::from_array(ENEMY_BODY_SIZE);
    let center = Vec3::new(lane_offset(slot.lane), size.y / 2.0, slot.z);
    Aabb::from_center_size(center, size)
}

/// What one resolution pass did, for run bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionReport {
    /// A qualifying hit initiated death; caller owns the (idempotent)
    /// death trigger
    pub fatal: bool,
    pub enemies_defeated: u32,
    pub coins: u32,
}

/// Resolve all collisions for one tick.
///
/// Caller gates on the Playing phase. Projectile-vs-enemy always runs;
/// every test against the player's hitbox is additionally skipped while
/// the player is invulnerable or dying.
pub fn resolve(
    player: &mut Player,
    slots: &mut [Slot],
    projectiles: &mut Vec<Projectile>,
    score: &mut ScoreManager,
    events: &mut Vec<GameEvent>,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    // Projectiles: player shots chip enemies, enemy shots test the player
    let mut i = 0;
    while i < projectiles.len() {
        let shot = projectiles[i];
        let mut consumed = false;

        match shot.owner {
            ProjectileOwner::Player => {
                for slot in slots.iter_mut() {
                    if !slot.is_enemy_alive() {
                        continue;
                    }
                    if enemy_body(slot).expand(PROJECTILE_HIT_RADIUS).contains(shot.pos) {
                        slot.enemy_hp = slot.enemy_hp.saturating_sub(shot.damage);
                        consumed = true;
                        if slot.enemy_hp == 0 {
                            report.enemies_defeated += 1;
                            report.coins += 1;
                            score.add_bonus(ENEMY_DEFEAT_BONUS);
                            events.push(GameEvent::EnemyDefeated {
                                bonus: ENEMY_DEFEAT_BONUS,
                            });
                        }
                        break;
                    }
                }
            }
            ProjectileOwner::Enemy => {
                if !player.is_invulnerable() && !player.dying {
                    let center = Vec3::new(player.x, HITBOX_CENTER_Y + player.vertical, 0.0);
                    if cylinder_hit(
                        shot.pos,
                        center,
                        PROJECTILE_HIT_RADIUS,
                        PROJECTILE_HIT_HALF_HEIGHT,
                    ) {
                        consumed = true;
                        apply_damage(player, shot.damage, score, events, &mut report);
                    }
                }
            }
        }

        if consumed || shot.spent() {
            projectiles.swap_remove(i);
        } else {
            i += 1;
        }
    }

    if player.is_invulnerable() || player.dying {
        return report;
    }

    let hitbox = player.hitbox();
    for slot in slots.iter_mut() {
        // Lane gate first: cross-lane overlap never collides
        if slot.lane != player.lane {
            continue;
        }
        // Broad phase: cheap travel-axis reject (player sits at z = 0)
        if slot.z.abs() > NEAR_WINDOW {
            continue;
        }

        match slot.kind {
            SlotKind::Empty => {}

            SlotKind::HazardStack => {
                if player.is_ghost() {
                    continue;
                }
                // Only currently-visible cubes kill; a gap in a hazardous
                // lane is safe to stand in
                'stacks: for j in 0..STACK_POSITIONS {
                    for k in 0..slot.stacks[j] {
                        let cube = hazard_cube(slot, j, k).shrink(HAZARD_SHRINK);
                        if hitbox.intersects(&cube) {
                            score.reset_combo();
                            report.fatal = true;
                            break 'stacks;
                        }
                    }
                }
            }

            SlotKind::Crate => {
                if player.is_ghost() {
                    continue;
                }
                let crate_box = Aabb::from_center_size(
                    Vec3::new(lane_offset(slot.lane), CUBE_SIZE / 2.0, slot.z),
                    Vec3::splat(CUBE_SIZE),
                );
                let shrunk = crate_box.shrink_horizontal(HAZARD_SHRINK);
                if hitbox.intersects(&shrunk)
                    && hitbox.overlap_x(&shrunk) > MIN_OVERLAP_DEPTH
                    && hitbox.overlap_z(&shrunk) > MIN_OVERLAP_DEPTH
                {
                    let player_bottom = hitbox.min.y;
                    let crate_top = crate_box.max.y;
                    if player_bottom >= crate_top - LANDING_TOLERANCE {
                        // Landed on top: safe
                    } else if player.vertical > JUMP_CLEAR_HEIGHT {
                        // Cleared mid-jump: safe
                    } else {
                        apply_damage(player, 1, score, events, &mut report);
                    }
                }
            }

            SlotKind::Enemy => {
                if player.is_ghost() || !slot.enemy_body_live {
                    continue;
                }
                let body = enemy_body(slot).shrink(ENEMY_SHRINK);
                if hitbox.intersects(&body) {
                    // Body contact is instant-kill-equivalent; arm-off so
                    // the corpse cannot multi-hit
                    slot.enemy_body_live = false;
                    let full = player.max_health;
                    apply_damage(player, full, score, events, &mut report);
                }
            }

            SlotKind::PowerUp(kind) => {
                if slot.taken {
                    continue;
                }
                let pickup = Aabb::from_center_size(
                    Vec3::new(lane_offset(slot.lane), POWERUP_HEIGHT, slot.z),
                    Vec3::splat(POWERUP_SIZE),
                );
                if hitbox.intersects(&pickup) {
                    slot.taken = true;
                    player.apply_powerup(kind);
                    events.push(GameEvent::Pickup(kind));
                }
            }
        }
    }

    report
}

/// Route a damage outcome into score/events/report. Death is only
/// *requested* here; the game's guarded trigger makes it idempotent.
fn apply_damage(
    player: &mut Player,
    amount: u8,
    score: &mut ScoreManager,
    events: &mut Vec<GameEvent>,
    report: &mut ResolutionReport,
) {
    match player.take_damage(amount) {
        DamageOutcome::Ignored => {}
        DamageOutcome::Absorbed => {
            score.reset_combo();
            events.push(GameEvent::ShieldAbsorbed);
        }
        DamageOutcome::Damaged { remaining } => {
            score.reset_combo();
            events.push(GameEvent::Damage { remaining });
        }
        DamageOutcome::Fatal => {
            score.reset_combo();
            report.fatal = true;
        }
    }
}
