//! Per-frame simulation step
//!
//! Advances one frame in the observed order: physics, floor check,
//! generator, movement/cleanup, obstacle collision and scoring, item
//! pickup. Side effects leave through the event buffer; the session
//! controller turns them into feedback and currency.

use rand::Rng;

use crate::consts::*;

use super::collision;
use super::physics;
use super::spawn;
use super::state::{difficulty_for, DeathCause, GameEvent, SimState, Viewport};

/// Normalized input for a single frame: the hold signal and the host
/// timestamp in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub holding: bool,
    pub now_ms: f64,
}

/// Advance the simulation by one frame.
///
/// Returns `false` when the run ended this frame (a `Died` event is in
/// the buffer); the state must not be ticked again until the session
/// controller resumes or restarts it.
pub fn tick<R: Rng>(
    state: &mut SimState,
    input: &FrameInput,
    view: Viewport,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) -> bool {
    let multiplier = physics::frame_multiplier(state.last_frame_time, input.now_ms);
    state.last_frame_time = input.now_ms;
    state.holding = input.holding;

    // --- Physics ---
    if !physics::integrate(state, view, multiplier) {
        events.push(GameEvent::Died {
            cause: DeathCause::Floor,
        });
        return false;
    }

    // --- Generator ---
    spawn::maybe_spawn(state, view, input.now_ms, rng);

    // --- Movement & cleanup ---
    spawn::advance_entities(state, multiplier);

    // --- Collision & scoring ---
    let player = collision::player_rect(state.y);
    if state
        .obstacles
        .iter()
        .any(|o| collision::hits_obstacle(&player, o))
    {
        events.push(GameEvent::Died {
            cause: DeathCause::Obstacle,
        });
        return false;
    }

    let mut newly_passed = 0u32;
    for obstacle in &mut state.obstacles {
        if collision::clears_obstacle(&player, obstacle) {
            obstacle.passed = true;
            newly_passed += 1;
        }
    }
    for _ in 0..newly_passed {
        state.obstacles_passed += 1;
        state.score += POINTS_PER_PASS;

        let level = difficulty_for(state.obstacles_passed);
        if level != state.difficulty {
            state.difficulty = level;
            events.push(GameEvent::DifficultyChanged { level });
            log::debug!("difficulty up: level {level}");
        }

        events.push(GameEvent::ObstaclePassed {
            total: state.obstacles_passed,
            milestone: state.obstacles_passed % OBSTACLES_PER_LEVEL == 0,
        });
    }

    // --- Items ---
    for item in &mut state.items {
        if !item.collected && collision::touches_item(&player, item) {
            item.collected = true;
            events.push(GameEvent::ItemCollected { value: item.value });
        }
    }

    true
}
