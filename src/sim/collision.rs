//! Collision detection and pass scoring
//!
//! Axis-aligned rectangle overlap for obstacles (any touch is death),
//! a forgiving circular test for item pickup, and the exactly-once pass
//! check that drives scoring.

use glam::Vec2;

use crate::consts::*;

use super::state::{Item, Obstacle};

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// The candle's bounding box for a given vertical position.
pub fn player_rect(y: f32) -> Rect {
    Rect {
        x: PLAYER_X - CANDLE_WIDTH / 2.0,
        y,
        w: CANDLE_WIDTH,
        h: CANDLE_HEIGHT,
    }
}

fn obstacle_rect(obstacle: &Obstacle) -> Rect {
    Rect {
        x: obstacle.x,
        y: obstacle.y,
        w: obstacle.width,
        h: obstacle.height,
    }
}

/// Any overlap with an obstacle ends the run.
pub fn hits_obstacle(player: &Rect, obstacle: &Obstacle) -> bool {
    player.overlaps(&obstacle_rect(obstacle))
}

/// A pair scores exactly once: when the player's leading edge has fully
/// passed the obstacle's trailing edge, and only for the top member (the
/// pair discriminator - counting both members would double-score).
pub fn clears_obstacle(player: &Rect, obstacle: &Obstacle) -> bool {
    !obstacle.passed && player.x > obstacle.right_edge() && obstacle.is_top()
}

/// Circular pickup test with a 20 px forgiveness margin around the item.
pub fn touches_item(player: &Rect, item: &Item) -> bool {
    let reach = item.radius() + ITEM_PICKUP_MARGIN;
    player.center().distance_squared(item.pos) < reach * reach
}
