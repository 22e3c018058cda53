//! Top-level game: state machine gating, per-tick update ordering, and the
//! continue boundary
//!
//! Tick order while playing: survival clock -> derived speed -> rule
//! rotation -> input intents -> track mover/spawner -> projectiles ->
//! collision resolution -> player tweens and timers. Dying freezes the
//! world and only runs the death timer; every other phase is inert.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision;
use super::player::{Direction, Player};
use super::rules::RuleManager;
use super::score::{ScoreManager, speed_at};
use super::state::{GameEvent, GamePhase, StateMachine};
use super::track::{Projectile, ProjectileOwner, TrackManager};
use crate::consts::*;
use crate::loadout::WeaponSpec;

/// Read-only run parameters, assembled by the host from the persistence
/// collaborators before the run starts. The core never touches storage.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub max_health: u8,
    pub weapon: WeaponSpec,
    /// First-ever run: slower, flatter, forgiving rule rotation
    pub onboarding: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            weapon: crate::loadout::default_weapon(),
            onboarding: false,
        }
    }
}

/// Write-only results of a finished run, for the host to feed into
/// progression, high scores, and task tracking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_score: u64,
    pub time_survived: f32,
    pub coins_earned: u32,
    pub shifts: u32,
    pub perfect_shifts: u32,
    pub enemies_defeated: u32,
}

/// Discrete input intents for a single tick. Gesture decoding is the input
/// collaborator's job; the core only sees the resulting intents and
/// ignores them outside active play.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub switch_lane: Option<Direction>,
    pub jump: bool,
    /// Aim in the horizontal plane: x lateral, y forward. Backward aims
    /// are discarded.
    pub shoot: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
}

/// The simulation core: owns every system and drives them in fixed order.
#[derive(Debug)]
pub struct Game {
    pub machine: StateMachine,
    pub rules: RuleManager,
    pub track: TrackManager,
    pub player: Player,
    pub score: ScoreManager,
    pub projectiles: Vec<Projectile>,
    /// Difficulty-curve speed (before jump dash / time slow)
    pub speed: f32,
    config: RunConfig,
    seed: u64,
    rng: Pcg32,
    death_triggered: bool,
    death_timer: f32,
    continue_used: bool,
    coins_earned: u32,
    enemies_defeated: u32,
    events: Vec<GameEvent>,
    last_summary: Option<RunSummary>,
}

impl Game {
    pub fn new(seed: u64, config: RunConfig) -> Self {
        let mut machine = StateMachine::new();
        // The core has nothing async to load; land in the menu immediately
        machine.transition(GamePhase::Menu);

        Self {
            machine,
            rules: RuleManager::new(),
            track: TrackManager::new(),
            player: Player::new(config.max_health),
            score: ScoreManager::new(),
            projectiles: Vec::new(),
            speed: BASE_SPEED,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            death_triggered: false,
            death_timer: 0.0,
            continue_used: false,
            coins_earned: 0,
            enemies_defeated: 0,
            events: Vec::new(),
            last_summary: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.machine.current()
    }

    /// HUD label for the active rule
    pub fn rule_label(&self) -> &'static str {
        self.rules.current().label()
    }

    /// World speed after the jump dash and time-slow modifiers
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.player.speed_multiplier() * self.player.time_scale()
    }

    /// Events recorded since the last drain, for HUD/VFX/audio.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Summary of the last finished run (set on entering game over).
    pub fn summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Begin a run from the menu or a finished game. Returns `false` if
    /// the current phase does not permit starting.
    pub fn start_run(&mut self) -> bool {
        if !self.machine.transition(GamePhase::Playing) {
            return false;
        }
        self.reset_run();
        true
    }

    fn reset_run(&mut self) {
        self.player = Player::new(self.config.max_health);
        self.score.reset();
        self.rules.reset(self.config.onboarding);
        self.track.reset();
        self.projectiles.clear();
        self.death_triggered = false;
        self.death_timer = 0.0;
        self.continue_used = false;
        self.coins_earned = 0;
        self.enemies_defeated = 0;
        self.events.clear();
        self.last_summary = None;

        self.speed = speed_at(0.0, self.config.onboarding);
        let at_full = self.player.at_full_health();
        self.track
            .prefill(self.speed, &self.rules, at_full, &mut self.rng);
        self.events.push(GameEvent::RunStarted);
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = dt.min(MAX_TICK_DT);

        if input.pause {
            match self.machine.current() {
                GamePhase::Playing => {
                    self.machine.transition(GamePhase::Paused);
                    return;
                }
                GamePhase::Paused => {
                    self.machine.transition(GamePhase::Playing);
                }
                _ => {}
            }
        }

        match self.machine.current() {
            GamePhase::Playing => self.tick_playing(input, dt),
            GamePhase::Dying => self.tick_dying(dt),
            _ => {}
        }
    }

    fn tick_playing(&mut self, input: &TickInput, dt: f32) {
        // Survival clock, then everything derived from it
        self.score.update(dt);
        let survival = self.score.time_survived();
        self.speed = speed_at(survival, self.config.onboarding);
        if let Some(rule) = self.rules.update(survival, &mut self.rng) {
            self.events.push(GameEvent::RuleChanged(rule));
        }

        self.handle_intents(input);

        // World advance: rows, enemy fire, projectiles
        let effective = self.effective_speed();
        let at_full = self.player.at_full_health();
        self.track
            .update(dt, effective, &self.rules, at_full, &mut self.rng);
        self.track
            .tick_enemy_fire(dt, self.player.x, &mut self.projectiles);
        for shot in &mut self.projectiles {
            shot.advance(dt);
        }
        self.projectiles
            .retain(|s| !s.spent() && s.pos.z > DESPAWN_Z && s.pos.z < SPAWN_Z + ROW_LENGTH);

        // Resolve against the player and sweep defeated enemies
        let report = collision::resolve(
            &mut self.player,
            self.track.active_mut(),
            &mut self.projectiles,
            &mut self.score,
            &mut self.events,
        );
        self.coins_earned += report.coins;
        self.enemies_defeated += report.enemies_defeated;
        self.track.sweep_defeated();

        if report.fatal {
            self.trigger_death();
            return;
        }

        // Player applies its own effects last
        self.player.update(dt);
    }

    fn tick_dying(&mut self, dt: f32) {
        self.death_timer -= dt;
        if self.death_timer <= 0.0 && self.machine.transition(GamePhase::GameOver) {
            self.finalize_run();
        }
    }

    fn handle_intents(&mut self, input: &TickInput) {
        if let Some(direction) = input.switch_lane {
            if self.player.switch_lane(direction) {
                self.score.record_shift();
                // Perfect shift: the switch landed while a row sits just
                // ahead of the player
                let row_ahead = self
                    .track
                    .active()
                    .iter()
                    .any(|slot| slot.z > 0.0 && slot.z < PERFECT_SHIFT_WINDOW);
                if row_ahead {
                    let multiplier = self.score.perfect_shift();
                    self.events.push(GameEvent::PerfectShift {
                        bonus: PERFECT_SHIFT_BONUS,
                        multiplier,
                    });
                }
            }
        }

        if input.jump {
            self.player.jump();
        }

        if let Some(aim) = input.shoot {
            self.try_shoot(aim);
        }
    }

    fn try_shoot(&mut self, aim: Vec2) {
        if !self.player.can_shoot() {
            return;
        }
        // Never fire backwards toward the camera
        if aim.y <= 0.0 {
            return;
        }
        let dir = Vec3::new(aim.x, 0.0, aim.y).normalize_or_zero();
        if dir.length_squared() < 0.5 {
            return;
        }

        self.projectiles.push(Projectile {
            pos: Vec3::new(
                self.player.x,
                SHOT_SPAWN_HEIGHT + self.player.vertical,
                0.0,
            ),
            dir,
            speed: self.config.weapon.shot_speed,
            damage: self.config.weapon.damage,
            traveled: 0.0,
            max_range: SHOT_RANGE,
            owner: ProjectileOwner::Player,
        });
        self.player.begin_shot_cooldown();
    }

    /// The single death entry point. Guarded: only the first qualifying
    /// hit starts the sequence, and only from active play. Game over is
    /// reached exclusively through the dying phase.
    pub fn trigger_death(&mut self) {
        if self.death_triggered {
            return;
        }
        if !self.machine.transition(GamePhase::Dying) {
            return;
        }
        self.death_triggered = true;
        self.death_timer = DEATH_SEQUENCE_DURATION;
        self.player.begin_dying();
        self.score.reset_combo();
        self.events.push(GameEvent::Death);
    }

    fn finalize_run(&mut self) {
        let summary = RunSummary {
            final_score: self.score.final_score(),
            time_survived: self.score.time_survived(),
            coins_earned: self.coins_earned,
            shifts: self.score.shifts(),
            perfect_shifts: self.score.perfect_shifts(),
            enemies_defeated: self.enemies_defeated,
        };
        log::info!(
            "Game over: score {} after {:.1}s",
            summary.final_score,
            summary.time_survived
        );
        self.last_summary = Some(summary);
        self.events.push(GameEvent::GameOver);
    }

    /// Ask for a continue. Valid once per run, only from game over.
    /// The host resolves the outcome with [`Game::resolve_continue`];
    /// gameplay stays suspended in the ad phase until then.
    pub fn request_continue(&mut self) -> bool {
        if self.continue_used {
            return false;
        }
        self.machine.transition(GamePhase::RewardedAd)
    }

    /// Two-outcome continue boundary: success revives, failure finalizes.
    pub fn resolve_continue(&mut self, success: bool) {
        if self.machine.current() != GamePhase::RewardedAd {
            log::warn!("Continue resolved outside the ad phase, ignoring");
            return;
        }
        if success {
            self.continue_used = true;
            self.death_triggered = false;
            self.death_timer = 0.0;
            self.player.revive();
            self.machine.transition(GamePhase::Playing);
            self.events.push(GameEvent::Revived);
        } else {
            self.machine.transition(GamePhase::GameOver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::track::{Slot, SlotKind};

    fn playing_game() -> Game {
        let mut game = Game::new(12345, RunConfig::default());
        assert!(game.start_run());
        game
    }

    fn empty_slot(lane: usize, z: f32, kind: SlotKind) -> Slot {
        let mut slot = Slot {
            lane,
            z,
            kind,
            hazard: false,
            stacks: [0; STACK_POSITIONS],
            enemy_hp: 0,
            enemy_body_live: false,
            fire_cooldown: 0.0,
            taken: false,
        };
        if kind == SlotKind::HazardStack {
            slot.hazard = true;
            slot.stacks = [MAX_STACK_HEIGHT; STACK_POSITIONS];
        }
        slot
    }

    #[test]
    fn test_new_game_sits_in_menu() {
        let game = Game::new(1, RunConfig::default());
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(game.summary().is_none());
    }

    #[test]
    fn test_start_run_prefills_track() {
        let game = playing_game();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.track.active_len() > 0);
    }

    #[test]
    fn test_tick_outside_playing_is_inert() {
        let mut game = Game::new(1, RunConfig::default());
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.score.time_survived(), 0.0);
    }

    #[test]
    fn test_pause_toggle() {
        let mut game = playing_game();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        game.tick(&pause, SIM_DT);
        assert_eq!(game.phase(), GamePhase::Paused);
        // Paused: survival clock frozen
        let t = game.score.time_survived();
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.score.time_survived(), t);

        game.tick(&pause, SIM_DT);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_speed_follows_difficulty_curve() {
        let mut game = playing_game();
        for _ in 0..((6.0 / SIM_DT) as usize) {
            game.tick(&TickInput::default(), SIM_DT);
            if game.phase() != GamePhase::Playing {
                // A spawned hazard got the player; irrelevant here
                return;
            }
        }
        assert_eq!(
            game.speed,
            speed_at(game.score.time_survived(), false)
        );
        assert!(game.speed > BASE_SPEED);
    }

    #[test]
    fn test_onboarding_speed_flat() {
        let config = RunConfig {
            onboarding: true,
            ..Default::default()
        };
        let mut game = Game::new(3, config);
        game.start_run();
        for _ in 0..200 {
            game.tick(&TickInput::default(), SIM_DT);
            if game.phase() != GamePhase::Playing {
                return;
            }
            assert_eq!(game.speed, BASE_SPEED * ONBOARDING_SPEED_MULT);
        }
    }

    #[test]
    fn test_death_sequence_orders_active_dying_gameover() {
        let mut game = playing_game();
        game.track.reset();
        game.track
            .inject_slot(empty_slot(MIDDLE_LANE, 0.0, SlotKind::HazardStack));

        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase(), GamePhase::Dying);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::Death));
        assert!(game.summary().is_none());

        // World motion is frozen while dying
        let z_before: Vec<f32> = game.track.active().iter().map(|s| s.z).collect();
        game.tick(&TickInput::default(), SIM_DT);
        let z_after: Vec<f32> = game.track.active().iter().map(|s| s.z).collect();
        assert_eq!(z_before, z_after);

        let mut elapsed = SIM_DT;
        while elapsed < DEATH_SEQUENCE_DURATION + SIM_DT {
            game.tick(&TickInput::default(), SIM_DT);
            elapsed += SIM_DT;
        }
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.summary().is_some());
        assert!(game.drain_events().contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_death_trigger_idempotent() {
        let mut game = playing_game();
        game.trigger_death();
        game.trigger_death();
        assert_eq!(game.phase(), GamePhase::Dying);
        let deaths = game
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::Death)
            .count();
        assert_eq!(deaths, 1);

        // Across ticks, before game over completes
        game.trigger_death();
        assert!(!game.drain_events().contains(&GameEvent::Death));
    }

    #[test]
    fn test_fatal_hit_at_one_health_dies_exactly_once() {
        let config = RunConfig {
            max_health: 1,
            ..Default::default()
        };
        let mut game = Game::new(99, config);
        game.start_run();
        game.track.reset();
        game.track
            .inject_slot(empty_slot(MIDDLE_LANE, 0.0, SlotKind::Crate));

        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase(), GamePhase::Dying);
        assert_eq!(game.player.health, 0);

        let mut elapsed = 0.0;
        while elapsed <= DEATH_SEQUENCE_DURATION + SIM_DT {
            game.tick(&TickInput::default(), SIM_DT);
            elapsed += SIM_DT;
        }
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_perfect_shift_window() {
        let mut game = playing_game();
        game.track.reset();
        // Row 1.5 units ahead: inside the 2.0 perfect window
        game.track
            .inject_slot(empty_slot(MIDDLE_LANE, 1.5, SlotKind::Empty));

        let input = TickInput {
            switch_lane: Some(Direction::Right),
            ..Default::default()
        };
        game.tick(&input, SIM_DT);

        assert_eq!(game.score.combo(), 1);
        assert_eq!(game.score.perfect_shifts(), 1);
        let events = game.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PerfectShift { bonus, .. } if *bonus == PERFECT_SHIFT_BONUS
        )));
    }

    #[test]
    fn test_shift_outside_window_is_not_perfect() {
        let mut game = playing_game();
        game.track.reset();
        game.track
            .inject_slot(empty_slot(MIDDLE_LANE, 5.0, SlotKind::Empty));

        let input = TickInput {
            switch_lane: Some(Direction::Right),
            ..Default::default()
        };
        game.tick(&input, SIM_DT);
        assert_eq!(game.score.combo(), 0);
        assert_eq!(game.score.shifts(), 1);
    }

    #[test]
    fn test_clamped_shift_earns_nothing() {
        let mut game = playing_game();
        game.track.reset();
        game.track
            .inject_slot(empty_slot(MIDDLE_LANE, 1.5, SlotKind::Empty));

        // Walk to the edge, then push past it
        let right = TickInput {
            switch_lane: Some(Direction::Right),
            ..Default::default()
        };
        game.tick(&right, SIM_DT);
        let shifts = game.score.shifts();
        game.tick(&right, SIM_DT);
        // Second press clamped: no shift recorded
        assert_eq!(game.score.shifts(), shifts);
    }

    #[test]
    fn test_shoot_spawns_weapon_projectile_and_cooldown_gates() {
        let mut game = playing_game();
        game.track.reset();

        let fire = TickInput {
            shoot: Some(Vec2::new(0.0, 1.0)),
            ..Default::default()
        };
        game.tick(&fire, SIM_DT);
        assert_eq!(game.projectiles.len(), 1);
        assert_eq!(game.projectiles[0].owner, ProjectileOwner::Player);
        assert_eq!(game.projectiles[0].damage, game.config().weapon.damage);

        // Cooldown still running: second intent discarded
        game.tick(&fire, SIM_DT);
        assert_eq!(game.projectiles.len(), 1);
    }

    #[test]
    fn test_backward_aim_discarded() {
        let mut game = playing_game();
        game.track.reset();
        let fire = TickInput {
            shoot: Some(Vec2::new(0.0, -1.0)),
            ..Default::default()
        };
        game.tick(&fire, SIM_DT);
        assert!(game.projectiles.is_empty());
    }

    #[test]
    fn test_continue_flow_revives_once() {
        let mut game = playing_game();
        game.trigger_death();
        for _ in 0..60 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert_eq!(game.phase(), GamePhase::GameOver);

        assert!(game.request_continue());
        assert_eq!(game.phase(), GamePhase::RewardedAd);
        // Suspended, not ticking
        let t = game.score.time_survived();
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.score.time_survived(), t);

        game.resolve_continue(true);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(!game.player.dying);
        assert!(game.player.is_invulnerable());
        assert!(game.drain_events().contains(&GameEvent::Revived));

        // One continue per run
        game.trigger_death();
        for _ in 0..60 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert!(!game.request_continue());
    }

    #[test]
    fn test_continue_failure_finalizes() {
        let mut game = playing_game();
        game.trigger_death();
        for _ in 0..60 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert!(game.request_continue());
        game.resolve_continue(false);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.summary().is_some());
    }

    #[test]
    fn test_restart_after_game_over_resets_state() {
        let mut game = playing_game();
        for _ in 0..30 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        game.trigger_death();
        for _ in 0..60 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert_eq!(game.phase(), GamePhase::GameOver);

        assert!(game.start_run());
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.score.time_survived(), 0.0);
        assert_eq!(game.player.health, game.config().max_health);
        assert!(game.projectiles.is_empty());
        assert!(game.drain_events().contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = Game::new(777, RunConfig::default());
        let mut b = Game::new(777, RunConfig::default());
        a.start_run();
        b.start_run();

        let input = TickInput::default();
        for _ in 0..600 {
            a.tick(&input, SIM_DT);
            b.tick(&input, SIM_DT);
        }
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.track.active_len(), b.track.active_len());
        assert_eq!(a.rules.current(), b.rules.current());
        assert_eq!(a.score.score(), b.score.score());
    }
}
