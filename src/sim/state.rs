//! Game phases, the validated state machine, and observable events

use serde::{Deserialize, Serialize};

use super::rules::HazardRule;
use super::track::PowerUpKind;

/// Top-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Assets/config still loading
    Loading,
    /// Main menu, no run active
    Menu,
    /// Active gameplay
    Playing,
    /// Run suspended, world frozen
    Paused,
    /// Death sequence playing out, world frozen
    Dying,
    /// Run ended
    GameOver,
    /// Waiting on the continue boundary (gameplay suspended)
    RewardedAd,
}

/// Finite-state controller gating which systems tick.
///
/// A requested transition not in the table is rejected and logged; the
/// current phase is left unchanged. Rejection is the expected answer for
/// stale requests (e.g. a second death trigger), not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMachine {
    current: GamePhase,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: GamePhase::Loading,
        }
    }

    pub fn current(&self) -> GamePhase {
        self.current
    }

    /// Whether the table permits `from -> to`.
    pub fn allowed(from: GamePhase, to: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (from, to),
            (Loading, Menu)
                | (Menu, Playing)
                | (Playing, Paused)
                | (Playing, Dying)
                | (Paused, Playing)
                | (Paused, Menu)
                | (Dying, GameOver)
                | (GameOver, Playing)
                | (GameOver, Menu)
                | (GameOver, RewardedAd)
                | (RewardedAd, Playing)
                | (RewardedAd, GameOver)
                | (RewardedAd, Menu)
        )
    }

    /// Attempt a transition. Returns whether it was applied.
    pub fn transition(&mut self, to: GamePhase) -> bool {
        if !Self::allowed(self.current, to) {
            log::warn!("Invalid state transition: {:?} -> {:?}", self.current, to);
            return false;
        }
        log::info!("State transition: {:?} -> {:?}", self.current, to);
        self.current = to;
        true
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Discrete simulation events, queued per tick for HUD/VFX/audio consumers.
/// The core never calls into presentation; it only records what happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    RuleChanged(HazardRule),
    /// A lane switch landed inside the perfect window
    PerfectShift { bonus: u64, multiplier: u32 },
    Pickup(PowerUpKind),
    /// Shield absorbed a hit; health unchanged
    ShieldAbsorbed,
    Damage { remaining: u8 },
    EnemyDefeated { bonus: u64 },
    Death,
    GameOver,
    Revived,
}
