//! Simulation state and core entity types
//!
//! A single mutable record owned by the frame loop. Nothing here touches
//! I/O; the session controller consumes the per-frame event stream.

use glam::Vec2;

use crate::consts::*;

/// Simulation canvas size, in virtual pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Highest y the candle may occupy before the run ends.
    pub fn floor_y(&self) -> f32 {
        self.height - CANDLE_HEIGHT
    }
}

/// Cosmetic market-trend tag on an obstacle pair, derived from the height
/// delta against the previous pair. Drives coloring only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bull,
    Bear,
    Neutral,
}

/// One member of an obstacle pair (top or bottom of a gap).
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Set exactly once when the pair is scored (top member only).
    pub passed: bool,
    pub trend: Trend,
}

impl Obstacle {
    pub fn right_edge(&self) -> f32 {
        self.x + self.width
    }

    /// The top member of a pair sits flush with the ceiling and acts as
    /// the pair discriminator for scoring.
    pub fn is_top(&self) -> bool {
        self.y == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Coin,
    BigBonus,
}

/// A collectible bonus entity, positioned by its center.
#[derive(Debug, Clone)]
pub struct Item {
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
    pub kind: ItemKind,
    pub value: u32,
}

impl Item {
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Floor,
    Obstacle,
}

/// Per-frame outputs of the simulation core. The session controller maps
/// these onto feedback signals and currency accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ObstaclePassed { total: u32, milestone: bool },
    DifficultyChanged { level: u8 },
    ItemCollected { value: u32 },
    Died { cause: DeathCause },
}

/// Complete simulation state for one run.
#[derive(Debug, Clone)]
pub struct SimState {
    /// Player vertical position (top of the candle body).
    pub y: f32,
    pub velocity: f32,
    /// Current hold input, written by the input adapter each frame.
    pub holding: bool,
    /// Obstacles in insertion order, always appended in top/bottom pairs.
    pub obstacles: Vec<Obstacle>,
    pub items: Vec<Item>,
    pub score: u32,
    pub obstacles_passed: u32,
    /// Difficulty tier in [1, 15], derived from `obstacles_passed`.
    pub difficulty: u8,
    /// Mirror of the persisted daily counter; gates bonus spawns only.
    /// The authoritative cap clamp lives in the session controller.
    pub daily_earnings: u32,
    /// Bad-luck-protection counter, reset whenever a bonus spawns.
    pub obstacles_since_last_coin: u32,
    /// Timestamp of the last obstacle-pair spawn, host milliseconds.
    pub last_obstacle_time: f64,
    /// Timestamp of the previous frame; 0 means "no previous frame".
    pub last_frame_time: f64,
}

impl SimState {
    /// Fresh run state, player centered vertically.
    pub fn new(view: Viewport) -> Self {
        Self {
            y: view.height / 2.0,
            velocity: 0.0,
            holding: false,
            obstacles: Vec::new(),
            items: Vec::new(),
            score: 0,
            obstacles_passed: 0,
            difficulty: 1,
            daily_earnings: 0,
            obstacles_since_last_coin: 0,
            last_obstacle_time: 0.0,
            last_frame_time: 0.0,
        }
    }
}

/// Scroll speed for a difficulty tier, pixels per ideal frame.
pub fn scroll_speed(difficulty: u8) -> f32 {
    BASE_SCROLL_SPEED + (difficulty - 1) as f32 * SPEED_STEP
}

/// Obstacle spawn interval for a difficulty tier, floored at 900 ms.
pub fn spawn_interval_ms(difficulty: u8) -> f64 {
    (BASE_SPAWN_INTERVAL_MS - (difficulty - 1) as f64 * SPAWN_INTERVAL_STEP_MS)
        .max(MIN_SPAWN_INTERVAL_MS)
}

/// Gap clearance for a difficulty tier, floored at 130 px.
pub fn gap_size(difficulty: u8) -> f32 {
    (BASE_GAP - (difficulty - 1) as f32 * GAP_STEP).max(MIN_GAP)
}

/// Difficulty tier for a cumulative pass count: one level per ten
/// obstacles, capped at 15.
pub fn difficulty_for(obstacles_passed: u32) -> u8 {
    ((obstacles_passed / OBSTACLES_PER_LEVEL) + 1).min(MAX_DIFFICULTY as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_formulas_exact() {
        for d in 1..=15u8 {
            let step = (d - 1) as f64;
            assert_eq!(spawn_interval_ms(d), (2000.0 - step * 120.0).max(900.0));
            assert_eq!(gap_size(d), (250.0 - step as f32 * 10.0).max(130.0));
            assert_eq!(scroll_speed(d), 3.0 + step as f32 * 0.5);
        }
        // Floors engage at the high tiers.
        assert_eq!(spawn_interval_ms(15), 900.0);
        assert_eq!(gap_size(13), 130.0);
        assert_eq!(gap_size(15), 130.0);
    }

    #[test]
    fn difficulty_tier_boundaries() {
        assert_eq!(difficulty_for(0), 1);
        assert_eq!(difficulty_for(9), 1);
        assert_eq!(difficulty_for(10), 2);
        assert_eq!(difficulty_for(149), 15);
        assert_eq!(difficulty_for(1000), 15);
    }

    #[test]
    fn level_two_parameters() {
        // Passing the tenth obstacle moves to tier 2: speed 3.5,
        // interval 1880 ms, gap 240 px.
        let d = difficulty_for(10);
        assert_eq!(d, 2);
        assert_eq!(scroll_speed(d), 3.5);
        assert_eq!(spawn_interval_ms(d), 1880.0);
        assert_eq!(gap_size(d), 240.0);
    }
}
