//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, storage, or platform dependencies
//! - Single-threaded; timers and tweens resolve cooperatively from the tick

pub mod collision;
pub mod player;
pub mod rules;
pub mod score;
pub mod state;
pub mod tick;
pub mod timer;
pub mod track;

pub use collision::{Aabb, ResolutionReport, cylinder_hit, resolve};
pub use player::{DamageOutcome, Direction, Player};
pub use rules::{HazardRule, LaneStatus, RuleManager};
pub use score::{ScoreManager, speed_at};
pub use state::{GameEvent, GamePhase, StateMachine};
pub use tick::{Game, RunConfig, RunSummary, TickInput};
pub use timer::{Ease, TimerKey, Timers, Tween};
pub use track::{
    PowerUpKind, Projectile, ProjectileOwner, Slot, SlotKind, TrackManager,
};
