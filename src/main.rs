//! Headless demo runner
//!
//! Drives the simulation with a fixed-timestep accumulator and a small
//! auto-player, the way a real frontend would: build the run config from
//! the persistence collaborators, feed intents in, drain events out, and
//! write the summary back at the end. Panics are caught at the frame
//! boundary; the frame is dropped and the game pauses instead of
//! corrupting mid-tick state.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;
use shift_runner::consts::*;
use shift_runner::market::MarketManager;
use shift_runner::progression::ProgressionManager;
use shift_runner::sim::{
    Direction, Game, GamePhase, LaneStatus, RunConfig, SlotKind, TickInput,
};
use shift_runner::{HighScores, MemoryStore};

/// Pick intents the way a cautious player would: dodge hazard lanes, jump
/// crates, shoot enemies.
fn auto_player(game: &Game) -> TickInput {
    let mut input = TickInput::default();
    if game.phase() != GamePhase::Playing {
        return input;
    }

    let lane = game.player.lane;

    // Leave a hazardous lane for the nearest safe one
    if game.rules.lane_status(lane) == LaneStatus::Hazard {
        let left_safe = lane > 0 && game.rules.lane_status(lane - 1) == LaneStatus::Safe;
        input.switch_lane = Some(if left_safe {
            Direction::Left
        } else {
            Direction::Right
        });
        return input;
    }

    // React to whatever sits closest ahead in our lane
    let mut nearest: Option<(f32, SlotKind)> = None;
    for slot in game.track.active() {
        if slot.lane != lane || slot.z <= 0.0 {
            continue;
        }
        if nearest.is_none_or(|(z, _)| slot.z < z) {
            nearest = Some((slot.z, slot.kind));
        }
    }
    match nearest {
        Some((z, SlotKind::Crate)) if z < 3.0 => input.jump = true,
        Some((z, SlotKind::Enemy)) if z < ENEMY_ENGAGE_MAX => {
            input.shoot = Some(Vec2::new(0.0, 1.0));
        }
        Some((z, SlotKind::HazardStack)) if z < 4.0 => {
            // A stack snuck into our lane before the rule flipped
            input.switch_lane = Some(if lane == 0 {
                Direction::Right
            } else {
                Direction::Left
            });
        }
        _ => {}
    }
    input
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });

    // Persistence collaborators feed the run config in...
    let mut store = MemoryStore::new();
    let mut progression = ProgressionManager::load(&store);
    let market = MarketManager::load(&store);
    progression.roll_tasks("demo-day", &mut store);

    let config = RunConfig {
        max_health: market.selected_skin().max_health,
        weapon: market.selected_weapon(),
        onboarding: !progression.has_played(),
    };
    progression.mark_played(&mut store);
    progression.reset_run();

    let mut game = Game::new(seed, config);
    log::info!("Shift Runner demo, seed {seed}");
    game.start_run();

    // Fixed-timestep accumulator over simulated 60 fps frames
    let frame_dt = 1.0 / 60.0;
    let mut accumulator = 0.0f32;
    let mut continued = false;

    'frames: for _ in 0..(180.0 / frame_dt) as u32 {
        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = auto_player(&game);
            let result = catch_unwind(AssertUnwindSafe(|| game.tick(&input, SIM_DT)));
            if result.is_err() {
                log::error!("Tick panicked; dropping frame and pausing");
                game.tick(
                    &TickInput {
                        pause: true,
                        ..Default::default()
                    },
                    SIM_DT,
                );
                accumulator = 0.0;
                break;
            }
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in game.drain_events() {
            log::debug!("{event:?}");
        }

        if game.phase() == GamePhase::GameOver {
            if !continued && game.request_continue() {
                // Mock ad boundary: always succeeds in the demo
                continued = true;
                game.resolve_continue(true);
                log::info!("Continue granted, back to the track");
            } else {
                break 'frames;
            }
        }
    }

    // ...and take the summary back out at the end
    if let Some(summary) = game.summary().copied() {
        progression.apply_run_summary(&summary, &mut store);

        let mut highscores = HighScores::load(&store);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        let rank = highscores.add_score(summary.final_score, summary.time_survived, timestamp);
        highscores.save(&mut store);

        println!(
            "Run over: score {} ({}x), survived {:.1}s, {} coins, {} perfect shifts{}",
            summary.final_score,
            game.score.multiplier(),
            summary.time_survived,
            summary.coins_earned,
            summary.perfect_shifts,
            rank.map(|r| format!(", high score rank #{r}"))
                .unwrap_or_default()
        );
    } else {
        println!(
            "Survived the whole demo: score {} at {:.1}s",
            game.score.final_score(),
            game.score.time_survived()
        );
    }
}
