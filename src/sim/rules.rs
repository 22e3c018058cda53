//! Lane-hazard rule rotation
//!
//! One rule is active at a time; each maps lane index to safe/hazard.
//! Rotation accelerates with survival time, independent of obstacle
//! density, and never repeats the same rule back to back.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Per-lane danger status under the active rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneStatus {
    Safe,
    Hazard,
}

/// Identifier selecting a pure lane predicate.
///
/// Every rule marks at least one lane safe and at least one hazardous for
/// any odd lane count; a rule that marked all lanes identically would make
/// the game unwinnable or trivial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardRule {
    /// Leftmost lane is hazardous
    LeftHazard,
    /// Rightmost lane is hazardous
    RightHazard,
    /// Only the middle lane is safe
    MiddleOnly,
    /// Only the middle lane is hazardous
    SidesOnly,
}

impl HazardRule {
    pub const ALL: [HazardRule; 4] = [
        HazardRule::LeftHazard,
        HazardRule::RightHazard,
        HazardRule::MiddleOnly,
        HazardRule::SidesOnly,
    ];

    /// Lane predicate, parameterized on lane count for testability.
    pub fn lane_status_in(self, lane: usize, lane_count: usize) -> LaneStatus {
        let middle = lane_count / 2;
        let hazardous = match self {
            HazardRule::LeftHazard => lane == 0,
            HazardRule::RightHazard => lane == lane_count - 1,
            HazardRule::MiddleOnly => lane != middle,
            HazardRule::SidesOnly => lane == middle,
        };
        if hazardous { LaneStatus::Hazard } else { LaneStatus::Safe }
    }

    /// HUD label
    pub fn label(self) -> &'static str {
        match self {
            HazardRule::LeftHazard => "Left Kills",
            HazardRule::RightHazard => "Right Kills",
            HazardRule::MiddleOnly => "Middle Only",
            HazardRule::SidesOnly => "Sides Only",
        }
    }
}

/// Owns the active rule and its rotation timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleManager {
    current: HazardRule,
    last_change: f32,
    next_interval: f32,
}

impl RuleManager {
    pub fn new() -> Self {
        Self {
            current: HazardRule::MiddleOnly,
            last_change: 0.0,
            next_interval: RULE_INTERVALS[0].1,
        }
    }

    pub fn current(&self) -> HazardRule {
        self.current
    }

    pub fn lane_status(&self, lane: usize) -> LaneStatus {
        self.current.lane_status_in(lane, LANE_COUNT)
    }

    /// Interval for the next rotation: largest configured threshold at or
    /// below the survival time; first entry when below all thresholds.
    pub fn interval_for(survival_time: f32) -> f32 {
        RULE_INTERVALS
            .iter()
            .rev()
            .find(|(threshold, _)| survival_time >= *threshold)
            .map(|(_, interval)| *interval)
            .unwrap_or(RULE_INTERVALS[0].1)
    }

    /// Advance the rotation clock. Returns the new rule when a change
    /// fires. The clock runs on survival time, so pausing cannot skip a
    /// rotation.
    pub fn update(&mut self, survival_time: f32, rng: &mut Pcg32) -> Option<HazardRule> {
        if survival_time - self.last_change < self.next_interval {
            return None;
        }

        // Uniform pick among the rules that are not current
        let others: Vec<HazardRule> = HazardRule::ALL
            .iter()
            .copied()
            .filter(|r| *r != self.current)
            .collect();
        self.current = others[rng.random_range(0..others.len())];

        self.next_interval = Self::interval_for(survival_time);
        self.last_change = survival_time;
        log::info!("Rule changed to: {}", self.current.label());
        Some(self.current)
    }

    /// Back to the opening rule. The first rotation of a first-ever run is
    /// held longer to give the player time to read the track.
    pub fn reset(&mut self, onboarding: bool) {
        self.current = HazardRule::MiddleOnly;
        self.last_change = 0.0;
        self.next_interval = if onboarding {
            ONBOARDING_FIRST_RULE_INTERVAL
        } else {
            RULE_INTERVALS[0].1
        };
    }
}

impl Default for RuleManager {
    fn default() -> Self {
        Self::new()
    }
}
