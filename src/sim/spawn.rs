//! Procedural obstacle and bonus generation
//!
//! Time-gated: a top/bottom pair spawns whenever the difficulty-scaled
//! interval has elapsed, with the anchor reset to the firing time (never
//! accumulated - accumulation is how infinite-spawn bugs happen).
//! Bonus items ride the same trigger, gated by the daily earning cap and
//! a bad-luck-protection counter.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

use super::state::{
    gap_size, spawn_interval_ms, Item, ItemKind, Obstacle, SimState, Trend, Viewport,
};

/// Whether a bonus item accompanies the pair being spawned.
///
/// Mutually exclusive with a plain pair: luck (roll < 0.30) or the
/// guarantee counter fires, but only while below the daily cap. The cap
/// here is a spawn gate on the mirrored counter; the accrual clamp is
/// enforced centrally by the session controller, so an item spawned right
/// at the boundary may still award zero.
pub fn bonus_due(daily_earnings: u32, obstacles_since_last_coin: u32, luck_roll: f32) -> bool {
    daily_earnings < DAILY_EARN_CAP
        && (luck_roll < BONUS_LUCK || obstacles_since_last_coin >= BONUS_GUARANTEE_AFTER)
}

/// Bonus value drawn from the difficulty tier's range.
pub fn bonus_value<R: Rng>(difficulty: u8, rng: &mut R) -> u32 {
    match difficulty {
        1 => rng.random_range(5..=10),
        2 => rng.random_range(11..=20),
        3 => rng.random_range(21..=30),
        4 => rng.random_range(31..=40),
        _ => rng.random_range(41..=50),
    }
}

/// Trend tag for a new pair: compare against the previous pair's top
/// height with a 5 px dead zone; flat inherits, first pair is neutral.
pub fn trend_for(obstacles: &[Obstacle], top_height: f32) -> Trend {
    if obstacles.len() < 2 {
        return Trend::Neutral;
    }
    let last_top = &obstacles[obstacles.len() - 2];
    if top_height < last_top.height - 5.0 {
        Trend::Bull
    } else if top_height > last_top.height + 5.0 {
        Trend::Bear
    } else {
        last_top.trend
    }
}

/// Spawn an obstacle pair (and maybe a bonus item) if the interval has
/// elapsed. Returns `true` when a pair was appended.
pub fn maybe_spawn<R: Rng>(
    state: &mut SimState,
    view: Viewport,
    now_ms: f64,
    rng: &mut R,
) -> bool {
    if now_ms - state.last_obstacle_time <= spawn_interval_ms(state.difficulty) {
        return false;
    }
    state.last_obstacle_time = now_ms;

    let gap = gap_size(state.difficulty);
    let max_top = view.height - gap - MIN_OBSTACLE_HEIGHT;
    let top_height = if max_top > MIN_OBSTACLE_HEIGHT {
        rng.random_range(MIN_OBSTACLE_HEIGHT..max_top)
    } else {
        // Degenerate viewport; the parameter floors make this unreachable
        // on any real screen.
        MIN_OBSTACLE_HEIGHT
    };
    let bottom_y = top_height + gap;
    let trend = trend_for(&state.obstacles, top_height);

    state.obstacles.push(Obstacle {
        x: view.width,
        y: 0.0,
        width: OBSTACLE_WIDTH,
        height: top_height,
        passed: false,
        trend,
    });
    state.obstacles.push(Obstacle {
        x: view.width,
        y: bottom_y,
        width: OBSTACLE_WIDTH,
        height: view.height - bottom_y,
        passed: false,
        trend,
    });

    let roll: f32 = rng.random();
    if bonus_due(state.daily_earnings, state.obstacles_since_last_coin, roll) {
        state.obstacles_since_last_coin = 0;
        let value = bonus_value(state.difficulty, rng);
        state.items.push(Item {
            // Centered in the gap, halfway across the obstacle.
            pos: Vec2::new(view.width + OBSTACLE_WIDTH / 2.0, top_height + gap / 2.0),
            size: ITEM_SIZE,
            collected: false,
            kind: ItemKind::BigBonus,
            value,
        });
        log::debug!("bonus spawned: {} (tier {})", value, state.difficulty);
    } else {
        state.obstacles_since_last_coin += 1;
    }

    true
}

/// Advance every active entity by the scroll speed and prune what has
/// left the screen. Insertion order is preserved.
pub fn advance_entities(state: &mut SimState, multiplier: f32) {
    let dx = super::state::scroll_speed(state.difficulty) * multiplier;
    for obstacle in &mut state.obstacles {
        obstacle.x -= dx;
    }
    for item in &mut state.items {
        item.pos.x -= dx;
    }
    state.obstacles.retain(|o| o.x + o.width > OFFSCREEN_X);
    state.items.retain(|i| i.pos.x > OFFSCREEN_X && !i.collected);
}
