//! Frame-driven simulation core
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Advances only through `tick` with host-supplied timestamps
//! - Randomness injected through `rand::Rng` (fixed seeds in tests)
//! - Side effects leave as `GameEvent`s, never as direct collaborator calls
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{player_rect, Rect};
pub use state::{
    difficulty_for, gap_size, scroll_speed, spawn_interval_ms, DeathCause, GameEvent, Item,
    ItemKind, Obstacle, SimState, Trend, Viewport,
};
pub use tick::{tick, FrameInput};
