//! Vertical physics integration
//!
//! Gravity/lift forces scaled by a frame-time multiplier, clamped to
//! terminal velocity. The ceiling is a soft bounce-stop; the floor ends
//! the run.

use crate::consts::*;

use super::state::{SimState, Viewport};

/// Elapsed-time multiplier relative to an ideal 60 Hz frame.
///
/// A stalled frame would otherwise teleport the player, so multipliers
/// above 3x are treated as a single ideal frame. The first frame of a run
/// (`last_ms == 0`) is also treated as 1x.
pub fn frame_multiplier(last_ms: f64, now_ms: f64) -> f32 {
    if last_ms == 0.0 {
        return 1.0;
    }
    let multiplier = ((now_ms - last_ms) / FRAME_MS) as f32;
    if multiplier > MAX_FRAME_MULTIPLIER {
        1.0
    } else {
        multiplier
    }
}

/// Advance one frame of vertical motion.
///
/// Returns `false` when the candle has fallen past the floor, which is a
/// terminal outcome for the run.
pub fn integrate(state: &mut SimState, view: Viewport, multiplier: f32) -> bool {
    let accel = if state.holding { LIFT } else { GRAVITY };
    state.velocity =
        (state.velocity + accel * multiplier).clamp(-TERMINAL_VELOCITY, TERMINAL_VELOCITY);
    state.y += state.velocity * multiplier;

    // Soft ceiling: stop dead instead of bouncing.
    if state.y < 0.0 {
        state.y = 0.0;
        state.velocity = 0.0;
    }

    state.y <= view.floor_y()
}
