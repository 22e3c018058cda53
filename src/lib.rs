//! Shift Runner - a lane-based endless runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track, collisions, rules, game state)
//! - `storage`: Key-value persistence seam (injected, never global)
//! - `progression`: Coins, daily tasks, first-run flag
//! - `market`: Selected/unlocked skins and weapons
//! - `loadout`: Static weapon and skin tables
//! - `highscores`: Local top-10 leaderboard

pub mod highscores;
pub mod loadout;
pub mod market;
pub mod progression;
pub mod sim;
pub mod storage;

pub use highscores::HighScores;
pub use storage::{KeyValueStore, MemoryStore};

/// Game configuration constants
///
/// Collision and timing thresholds below were tuned by play, not derived.
/// Treat them as tunables; gameplay feel depends on the exact values.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest delta a single tick will accept
    pub const MAX_TICK_DT: f32 = 0.1;

    /// Number of parallel lanes (odd, so a middle lane exists)
    pub const LANE_COUNT: usize = 3;
    /// World-space X offset of each lane
    pub const LANE_OFFSETS: [f32; LANE_COUNT] = [-2.0, 0.0, 2.0];
    /// Index of the middle lane
    pub const MIDDLE_LANE: usize = LANE_COUNT / 2;
    /// Lane width
    pub const LANE_WIDTH: f32 = 1.8;

    /// Lane switch tween duration (seconds)
    pub const SWITCH_DURATION: f32 = 0.12;
    /// Cosmetic tilt tween duration and peak angle (radians)
    pub const TILT_DURATION: f32 = 0.2;
    pub const TILT_ANGLE: f32 = 0.25;
    /// Default maximum health (skins may override)
    pub const MAX_HEALTH: u8 = 3;
    /// Invulnerability window after revive/respawn (seconds)
    pub const INVULNERABLE_DURATION: f32 = 2.0;
    /// Brief invulnerability after a survivable hit (seconds)
    pub const HIT_GRACE_DURATION: f32 = 1.0;
    /// Player hitbox: width, height, depth. Upright capsule approximation.
    pub const HITBOX_SIZE: [f32; 3] = [0.3, 2.0, 0.3];
    /// Hitbox center sits this far above the feet
    pub const HITBOX_CENTER_Y: f32 = 1.0;

    /// Jump arc duration (seconds) and peak height
    pub const JUMP_DURATION: f32 = 0.55;
    pub const JUMP_HEIGHT: f32 = 1.5;
    /// Forward speed multiplier while airborne (the "jump dash")
    pub const JUMP_DASH_MULT: f32 = 1.35;
    /// Vertical offset above which an overlapping crate counts as cleared
    pub const JUMP_CLEAR_HEIGHT: f32 = 0.9;
    /// Tolerance when landing on top of a crate
    pub const LANDING_TOLERANCE: f32 = 0.2;

    /// Row length along the travel axis
    pub const ROW_LENGTH: f32 = 4.0;
    /// Seconds between row spawns
    pub const SPAWN_INTERVAL: f32 = 1.5;
    /// Travel-axis position where rows appear / are recycled
    pub const SPAWN_Z: f32 = 30.0;
    pub const DESPAWN_Z: f32 = -10.0;
    /// Closest a prefilled row may sit to the player
    pub const PREFILL_MARGIN: f32 = 6.0;
    /// Slots allocated at startup; never grown afterwards
    pub const POOL_SIZE: usize = 50;
    /// Obstacle cube edge length
    pub const CUBE_SIZE: f32 = 0.8;
    /// Stack positions along a hazard row, max cubes per stack
    pub const STACK_POSITIONS: usize = 4;
    pub const MAX_STACK_HEIGHT: u8 = 3;
    /// Minimum rows between obstacle placements in the same lane
    pub const MIN_OBSTACLE_GAP: u32 = 3;
    /// Fraction of eligible hazard rows that actually get obstacles
    pub const HAZARD_DENSITY: f64 = 0.6;
    /// Safe-lane roll: power-up / obstacle / nothing
    pub const POWERUP_CHANCE: f32 = 0.15;
    pub const OBSTACLE_CHANCE: f32 = 0.25;

    /// Difficulty speed curve: BASE + floor(t / INTERVAL) * INCREMENT, capped
    pub const BASE_SPEED: f32 = 2.5;
    pub const SPEED_INCREMENT: f32 = 0.25;
    pub const SPEED_STEP_INTERVAL: f32 = 5.0;
    pub const MAX_SPEED: f32 = 8.0;
    /// First-ever run: halved base speed, no stepping
    pub const ONBOARDING_SPEED_MULT: f32 = 0.5;

    /// Rule rotation intervals: (survival-time threshold, interval), ascending
    pub const RULE_INTERVALS: [(f32, f32); 4] =
        [(0.0, 5.0), (10.0, 4.0), (20.0, 3.0), (30.0, 2.5)];
    /// First-ever run keeps the opening rule longer
    pub const ONBOARDING_FIRST_RULE_INTERVAL: f32 = 8.0;

    /// Scoring
    pub const SCORE_PER_SECOND: f32 = 100.0;
    pub const PERFECT_SHIFT_BONUS: u64 = 50;
    /// A shift is "perfect" while a row is within this distance ahead
    pub const PERFECT_SHIFT_WINDOW: f32 = 2.0;
    /// Combo thresholds: x2 multiplier, then x3 (max)
    pub const COMBO_LEVEL1: u32 = 3;
    pub const COMBO_LEVEL2: u32 = 6;
    pub const ENEMY_DEFEAT_BONUS: u64 = 25;

    /// Broad-phase window along the travel axis
    pub const NEAR_WINDOW: f32 = 3.0;
    /// Hazard cubes shrink by this much for forgiving gameplay
    pub const HAZARD_SHRINK: f32 = 0.1;
    /// Enemy bodies shrink more
    pub const ENEMY_SHRINK: f32 = 0.2;
    /// Minimum horizontal overlap before a crate hit counts
    pub const MIN_OVERLAP_DEPTH: f32 = 0.1;
    /// Projectile-vs-player cylinder test
    pub const PROJECTILE_HIT_RADIUS: f32 = 0.4;
    pub const PROJECTILE_HIT_HALF_HEIGHT: f32 = 1.0;

    /// Ranged enemy
    pub const ENEMY_HP: u8 = 2;
    pub const ENEMY_FIRE_COOLDOWN: f32 = 1.5;
    /// Enemies only fire within this travel-axis distance band
    pub const ENEMY_ENGAGE_MIN: f32 = 5.0;
    pub const ENEMY_ENGAGE_MAX: f32 = 25.0;
    pub const ENEMY_SHOT_SPEED: f32 = 10.0;
    pub const ENEMY_SHOT_DAMAGE: u8 = 1;
    pub const ENEMY_BODY_SIZE: [f32; 3] = [0.6, 1.8, 0.6];

    /// Player shooting
    pub const SHOT_COOLDOWN: f32 = 0.3;
    pub const SHOT_RANGE: f32 = 40.0;
    pub const SHOT_SPAWN_HEIGHT: f32 = 1.2;

    /// Power-up effect durations
    pub const SHIELD_DURATION: f32 = 10.0;
    pub const GHOST_DURATION: f32 = 5.0;
    pub const SLOW_DURATION: f32 = 3.0;
    pub const SLOW_FACTOR: f32 = 0.5;
    /// Power-up pickup box edge length
    pub const POWERUP_SIZE: f32 = 0.5;
    pub const POWERUP_HEIGHT: f32 = 1.0;

    /// World freeze before the dying state resolves to game over
    pub const DEATH_SEQUENCE_DURATION: f32 = 0.5;
}

/// World-space X offset for a lane index
#[inline]
pub fn lane_offset(lane: usize) -> f32 {
    consts::LANE_OFFSETS[lane]
}
