//! Obstacle track: slot pool, row spawning, and the travel-axis mover
//!
//! Slots are allocated once at startup and shuttle between a LIFO pool and
//! the active list; steady-state play never allocates. A row is one slot
//! per lane spawned at the same travel-axis position on a fixed cadence.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rules::{LaneStatus, RuleManager};
use crate::consts::*;
use crate::lane_offset;

/// Power-up subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Heal,
    Shield,
    Ghost,
    TimeSlow,
}

/// What occupies a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotKind {
    #[default]
    Empty,
    /// Stacked cubes in a hazard lane; gaps between stacks are survivable
    HazardStack,
    /// Single crate that can be jumped or landed on
    Crate,
    /// Ranged enemy with a body hitbox and a fire cooldown
    Enemy,
    PowerUp(PowerUpKind),
}

/// One pooled obstacle-row slot. Plain data, fixed size, no heap fields:
/// recycling a slot is a memcpy, never an allocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Slot {
    pub lane: usize,
    /// Travel-axis position; decreases toward the player at world speed
    pub z: f32,
    pub kind: SlotKind,
    /// Lane was flagged hazardous when this row spawned
    pub hazard: bool,
    /// Visible cube count per stack position; 0 is a gap
    pub stacks: [u8; STACK_POSITIONS],
    pub enemy_hp: u8,
    /// Body collision armed (cleared on body hit, distinct from defeat)
    pub enemy_body_live: bool,
    pub fire_cooldown: f32,
    /// Power-up already collected (hidden until the row recycles)
    pub taken: bool,
}

impl Slot {
    fn blank() -> Self {
        Self {
            lane: 0,
            z: 0.0,
            kind: SlotKind::Empty,
            hazard: false,
            stacks: [0; STACK_POSITIONS],
            enemy_hp: 0,
            enemy_body_live: false,
            fire_cooldown: 0.0,
            taken: false,
        }
    }

    fn reset(&mut self, lane: usize, z: f32) {
        *self = Self::blank();
        self.lane = lane;
        self.z = z;
    }

    /// Travel-axis position of stack slot `j` within this row
    pub fn stack_position_z(&self, j: usize) -> f32 {
        let spacing = ROW_LENGTH / (STACK_POSITIONS as f32 + 1.0);
        self.z - ROW_LENGTH / 2.0 + spacing * (j as f32 + 1.0)
    }

    pub fn is_enemy_alive(&self) -> bool {
        self.kind == SlotKind::Enemy && self.enemy_hp > 0
    }
}

/// Who fired a projectile (attribution for scoring only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

/// Ephemeral shot: lives until it hits or exhausts its distance budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec3,
    pub dir: Vec3,
    pub speed: f32,
    pub damage: u8,
    pub traveled: f32,
    pub max_range: f32,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn advance(&mut self, dt: f32) {
        let step = self.speed * dt;
        self.pos += self.dir * step;
        self.traveled += step;
    }

    pub fn spent(&self) -> bool {
        self.traveled >= self.max_range
    }
}

/// Pool, spawn scheduler, and mover for obstacle rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackManager {
    pool: Vec<Slot>,
    active: Vec<Slot>,
    spawn_accum: f32,
    /// Rows spawned in each lane since its last obstacle placement
    rows_since_obstacle: [u32; LANE_COUNT],
}

impl TrackManager {
    pub fn new() -> Self {
        let mut pool = Vec::with_capacity(POOL_SIZE);
        for _ in 0..POOL_SIZE {
            pool.push(Slot::blank());
        }
        Self {
            pool,
            active: Vec::with_capacity(POOL_SIZE),
            spawn_accum: 0.0,
            rows_since_obstacle: [0; LANE_COUNT],
        }
    }

    pub fn active(&self) -> &[Slot] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [Slot] {
        &mut self.active
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Advance all active rows toward the player, recycle rows past the
    /// despawn threshold, and run the spawn cadence. The accumulator keeps
    /// its remainder across fires so cadence never drifts with framerate.
    pub fn update(
        &mut self,
        dt: f32,
        speed: f32,
        rules: &RuleManager,
        at_full_health: bool,
        rng: &mut Pcg32,
    ) {
        for i in (0..self.active.len()).rev() {
            self.active[i].z -= speed * dt;
            if self.active[i].z < DESPAWN_Z {
                let slot = self.active.swap_remove(i);
                self.pool.push(slot);
            }
        }

        self.spawn_accum += dt;
        while self.spawn_accum >= SPAWN_INTERVAL {
            self.spawn_accum -= SPAWN_INTERVAL;
            self.spawn_row(rules, at_full_health, rng);
        }
    }

    /// Spawn one row at the spawn line.
    pub fn spawn_row(&mut self, rules: &RuleManager, at_full_health: bool, rng: &mut Pcg32) {
        self.spawn_row_at(SPAWN_Z, rules, at_full_health, rng);
    }

    fn spawn_row_at(
        &mut self,
        z: f32,
        rules: &RuleManager,
        at_full_health: bool,
        rng: &mut Pcg32,
    ) {
        for lane in 0..LANE_COUNT {
            self.rows_since_obstacle[lane] += 1;

            let Some(mut slot) = self.pool.pop() else {
                // Pool exhausted: degrade to an emptier track, never fail
                log::debug!("Slot pool exhausted, skipping spawn in lane {lane}");
                continue;
            };
            slot.reset(lane, z);

            match rules.lane_status(lane) {
                LaneStatus::Hazard => {
                    slot.hazard = true;
                    // Minimum gap plus density throttle keeps the hazard
                    // lane traversable in bursts, never a solid wall
                    if self.rows_since_obstacle[lane] >= MIN_OBSTACLE_GAP
                        && rng.random_bool(HAZARD_DENSITY)
                    {
                        slot.kind = SlotKind::HazardStack;
                        Self::fill_stacks(&mut slot, rng);
                        self.rows_since_obstacle[lane] = 0;
                    }
                }
                LaneStatus::Safe => {
                    let roll: f32 = rng.random();
                    if roll < POWERUP_CHANCE {
                        slot.kind = SlotKind::PowerUp(Self::roll_powerup(rng, at_full_health));
                    } else if roll < POWERUP_CHANCE + OBSTACLE_CHANCE {
                        if rng.random_bool(0.5) {
                            slot.kind = SlotKind::Crate;
                        } else {
                            slot.kind = SlotKind::Enemy;
                            slot.enemy_hp = ENEMY_HP;
                            slot.enemy_body_live = true;
                            slot.fire_cooldown = ENEMY_FIRE_COOLDOWN;
                        }
                    }
                }
            }

            self.active.push(slot);
        }
    }

    /// Populate stack positions with 1..=3 cubes each, leaving gaps.
    /// At least one stack is always visible.
    fn fill_stacks(slot: &mut Slot, rng: &mut Pcg32) {
        let mut any_visible = false;
        for cell in slot.stacks.iter_mut() {
            if rng.random_bool(0.7) {
                *cell = rng.random_range(1..=MAX_STACK_HEIGHT);
                any_visible = true;
            }
        }
        if !any_visible {
            let j = rng.random_range(0..STACK_POSITIONS);
            slot.stacks[j] = rng.random_range(1..=MAX_STACK_HEIGHT);
        }
    }

    /// Power-up subtype roll. Heal is excluded at full health so the
    /// pickup is never wasted.
    fn roll_powerup(rng: &mut Pcg32, at_full_health: bool) -> PowerUpKind {
        let choices: &[PowerUpKind] = if at_full_health {
            &[PowerUpKind::Shield, PowerUpKind::Ghost, PowerUpKind::TimeSlow]
        } else {
            &[
                PowerUpKind::Heal,
                PowerUpKind::Shield,
                PowerUpKind::Ghost,
                PowerUpKind::TimeSlow,
            ]
        };
        choices[rng.random_range(0..choices.len())]
    }

    /// Tick engaged enemies' fire cooldowns and emit shots at the player.
    pub fn tick_enemy_fire(&mut self, dt: f32, player_x: f32, projectiles: &mut Vec<Projectile>) {
        for slot in &mut self.active {
            if !slot.is_enemy_alive() {
                continue;
            }
            // Player sits at z = 0
            if !(ENEMY_ENGAGE_MIN..=ENEMY_ENGAGE_MAX).contains(&slot.z) {
                continue;
            }
            slot.fire_cooldown -= dt;
            if slot.fire_cooldown <= 0.0 {
                slot.fire_cooldown += ENEMY_FIRE_COOLDOWN;
                let origin = Vec3::new(lane_offset(slot.lane), SHOT_SPAWN_HEIGHT, slot.z);
                let target = Vec3::new(player_x, SHOT_SPAWN_HEIGHT, 0.0);
                projectiles.push(Projectile {
                    pos: origin,
                    dir: (target - origin).normalize_or_zero(),
                    speed: ENEMY_SHOT_SPEED,
                    damage: ENEMY_SHOT_DAMAGE,
                    traveled: 0.0,
                    max_range: SHOT_RANGE,
                    owner: ProjectileOwner::Enemy,
                });
            }
        }
    }

    /// Return defeated enemies' slots to the pool (explicit consumption;
    /// collected power-ups just stay hidden until their row recycles).
    pub fn sweep_defeated(&mut self) {
        for i in (0..self.active.len()).rev() {
            let slot = &self.active[i];
            if slot.kind == SlotKind::Enemy && slot.enemy_hp == 0 {
                let slot = self.active.swap_remove(i);
                self.pool.push(slot);
            }
        }
    }

    /// Back-fill the corridor at the given speed's natural row spacing so
    /// the track is not visibly empty right after a reset, then seed the
    /// spawn accumulator with the fractional remainder so the next runtime
    /// spawn lands on cadence.
    pub fn prefill(
        &mut self,
        speed: f32,
        rules: &RuleManager,
        at_full_health: bool,
        rng: &mut Pcg32,
    ) {
        let speed = speed.max(0.001);
        let spacing = speed * SPAWN_INTERVAL;
        let mut z = PREFILL_MARGIN;
        while z < SPAWN_Z {
            self.spawn_row_at(z, rules, at_full_health, rng);
            z += spacing;
        }
        // Distance from the newest row up to the spawn line, as time
        let gap = SPAWN_Z - (z - spacing);
        self.spawn_accum = gap / speed;
    }

    /// Test scaffolding: activate a hand-built slot, drawing from the pool
    /// so the cardinality invariant stays intact.
    #[cfg(test)]
    pub(crate) fn inject_slot(&mut self, slot: Slot) {
        self.pool.pop().expect("slot pool empty");
        self.active.push(slot);
    }

    /// Recycle everything and restart the cadence.
    pub fn reset(&mut self) {
        while let Some(slot) = self.active.pop() {
            self.pool.push(slot);
        }
        self.spawn_accum = 0.0;
        self.rows_since_obstacle = [0; LANE_COUNT];
    }
}

impl Default for TrackManager {
    fn default() -> Self {
        Self::new()
    }
}
