//! Candle Wick - a candlestick-dodging arcade mini-game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (physics, procedural generation, collisions)
//! - `session`: Lifecycle state machine wiring the sim to its collaborators
//! - `render`: Pure render pass over an abstract drawing surface
//! - `player`: Persisted player record with daily/weekly period rollover
//! - `persistence`: Player-record store port and implementations
//! - `feedback` / `reward`: Haptic and reward-gate collaborator ports

pub mod feedback;
pub mod persistence;
pub mod player;
pub mod render;
pub mod reward;
pub mod session;
pub mod sim;

pub use player::{Period, PlayerRecord};
pub use session::{Session, SessionPhase};

/// Game tuning constants
pub mod consts {
    /// One ideal frame at 60 Hz, in milliseconds.
    pub const FRAME_MS: f64 = 16.666;
    /// Frame multipliers above this are collapsed to 1x (lag protection,
    /// prevents teleporting after a scheduler stall).
    pub const MAX_FRAME_MULTIPLIER: f32 = 3.0;

    /// Downward acceleration per ideal frame.
    pub const GRAVITY: f32 = 0.5;
    /// Upward acceleration per ideal frame while the hold input is active.
    pub const LIFT: f32 = -0.8;
    /// Velocity clamp, both directions.
    pub const TERMINAL_VELOCITY: f32 = 8.0;

    /// Horizontal center of the player column.
    pub const PLAYER_X: f32 = 100.0;
    pub const CANDLE_WIDTH: f32 = 20.0;
    pub const CANDLE_HEIGHT: f32 = 40.0;

    pub const OBSTACLE_WIDTH: f32 = 50.0;
    /// Minimum height of either member of an obstacle pair.
    pub const MIN_OBSTACLE_HEIGHT: f32 = 50.0;

    /// Difficulty scaling anchors. Speed rises, spawn interval and gap
    /// shrink (floored), one level per ten obstacles passed.
    pub const BASE_SCROLL_SPEED: f32 = 3.0;
    pub const SPEED_STEP: f32 = 0.5;
    pub const BASE_SPAWN_INTERVAL_MS: f64 = 2000.0;
    pub const SPAWN_INTERVAL_STEP_MS: f64 = 120.0;
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 900.0;
    pub const BASE_GAP: f32 = 250.0;
    pub const GAP_STEP: f32 = 10.0;
    pub const MIN_GAP: f32 = 130.0;
    pub const MAX_DIFFICULTY: u8 = 15;
    pub const OBSTACLES_PER_LEVEL: u32 = 10;

    /// Points per obstacle pair cleared.
    pub const POINTS_PER_PASS: u32 = 10;

    /// Bonus item tuning
    pub const ITEM_SIZE: f32 = 30.0;
    /// Forgiveness margin added to the item radius for pickup.
    pub const ITEM_PICKUP_MARGIN: f32 = 20.0;
    /// Per-pair chance of a bonus spawn while below the daily cap.
    pub const BONUS_LUCK: f32 = 0.30;
    /// Bad-luck protection: a bonus is guaranteed after this many
    /// spawn-less pairs.
    pub const BONUS_GUARANTEE_AFTER: u32 = 3;

    /// Maximum currency a player may earn per day.
    pub const DAILY_EARN_CAP: u32 = 1000;

    /// Entities are pruned once this far past the left edge.
    pub const OFFSCREEN_X: f32 = -100.0;

    /// Obstacles at or left of this are removed on resume so a continued
    /// run never starts inside a wall.
    pub const RESUME_CLEAR_X: f32 = 300.0;

    /// Reward-gated continues available per session.
    pub const MAX_CONTINUES: u8 = 3;
}
