//! Render pass
//!
//! A deterministic function of simulation state over an abstract drawing
//! surface. No gameplay logic lives here; the front-end owns the real
//! backing surface and may skip a frame entirely when it is not ready.

use crate::consts::*;
use crate::sim::{ItemKind, SimState, Trend, Viewport};

/// 8-bit RGBA color. Alpha is straight (not premultiplied); surfaces
/// blend over what is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Palette (the original mini-app's slate/green/red scheme).
pub mod colors {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(0x0f, 0x17, 0x2a);
    pub const GRID: Rgba = Rgba::rgba(255, 255, 255, 13);

    pub const NEUTRAL_EDGE: Rgba = Rgba::rgb(0x64, 0x74, 0x8b);
    pub const NEUTRAL_FILL: Rgba = Rgba::rgba(0x94, 0xa3, 0xb8, 26);
    pub const BULL_EDGE: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
    pub const BULL_FILL: Rgba = Rgba::rgba(0x22, 0xc5, 0x5e, 51);
    pub const BEAR_EDGE: Rgba = Rgba::rgb(0xef, 0x44, 0x44);
    pub const BEAR_FILL: Rgba = Rgba::rgba(0xef, 0x44, 0x44, 51);

    pub const ITEM: Rgba = Rgba::rgb(0xf5, 0x9e, 0x0b);
    pub const LABEL: Rgba = Rgba::rgb(255, 255, 255);

    pub const CANDLE_UP: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
    pub const CANDLE_DOWN: Rgba = Rgba::rgb(0xef, 0x44, 0x44);
}

/// Minimal 2D drawing port. Coordinates are virtual pixels in the sim's
/// viewport space; the surface owns any scaling to its real resolution.
pub trait Surface {
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: Rgba);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Rgba);
    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba);
    /// Horizontally centered label at (x, y). Surfaces with no text
    /// capability may approximate or drop it.
    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba);
}

fn trend_colors(trend: Trend) -> (Rgba, Rgba) {
    match trend {
        Trend::Bull => (colors::BULL_EDGE, colors::BULL_FILL),
        Trend::Bear => (colors::BEAR_EDGE, colors::BEAR_FILL),
        Trend::Neutral => (colors::NEUTRAL_EDGE, colors::NEUTRAL_FILL),
    }
}

/// Draw one frame of simulation state.
pub fn draw_frame(state: &SimState, view: Viewport, surface: &mut impl Surface) {
    surface.clear(colors::BACKGROUND);

    // --- Background grid ---
    let grid = 50.0;
    let mut gy = 0.0;
    while gy < view.height {
        surface.line(0.0, gy, view.width, gy, 1.0, colors::GRID);
        gy += grid;
    }
    let mut gx = 0.0;
    while gx < view.width {
        surface.line(gx, 0.0, gx, view.height, 1.0, colors::GRID);
        gx += grid;
    }

    // --- Obstacles ---
    for obstacle in &state.obstacles {
        let (edge, fill) = trend_colors(obstacle.trend);
        surface.fill_rect(
            obstacle.x,
            obstacle.y,
            obstacle.width,
            obstacle.height,
            colors::BACKGROUND,
        );
        surface.fill_rect(obstacle.x, obstacle.y, obstacle.width, obstacle.height, fill);
        surface.stroke_rect(
            obstacle.x,
            obstacle.y,
            obstacle.width,
            obstacle.height,
            2.0,
            edge,
        );
    }

    // --- Items ---
    for item in &state.items {
        if item.collected {
            continue;
        }
        surface.fill_circle(item.pos.x, item.pos.y, item.radius(), colors::ITEM);
        if item.kind == ItemKind::BigBonus {
            surface.text(
                item.pos.x,
                item.pos.y - 25.0,
                &format!("+{}", item.value),
                colors::LABEL,
            );
        }
    }

    // --- Player candle ---
    let x = PLAYER_X - CANDLE_WIDTH / 2.0;
    let y = state.y;
    let color = if state.holding {
        colors::CANDLE_UP
    } else {
        colors::CANDLE_DOWN
    };

    // Wick stretch: the wick trailing the motion elongates with speed.
    let base_wick = 10.0;
    let stretch = state.velocity.abs() * 4.0;
    let (top_wick, bottom_wick) = if state.velocity < 0.0 {
        (base_wick, base_wick + stretch)
    } else if state.velocity > 0.0 {
        (base_wick + stretch, base_wick)
    } else {
        (base_wick, base_wick)
    };

    surface.line(PLAYER_X, y, PLAYER_X, y - top_wick, 1.0, color);
    surface.line(
        PLAYER_X,
        y + CANDLE_HEIGHT,
        PLAYER_X,
        y + CANDLE_HEIGHT + bottom_wick,
        1.0,
        color,
    );
    surface.fill_rect(x, y, CANDLE_WIDTH, CANDLE_HEIGHT, color);
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::sim::{Item, Obstacle};

    use super::*;

    /// Records draw calls instead of rasterizing.
    #[derive(Default)]
    struct Recording {
        clears: u32,
        rects: Vec<Rgba>,
        circles: u32,
        labels: Vec<String>,
    }

    impl Surface for Recording {
        fn clear(&mut self, _color: Rgba) {
            self.clears += 1;
        }
        fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, color: Rgba) {
            self.rects.push(color);
        }
        fn stroke_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _lw: f32, color: Rgba) {
            self.rects.push(color);
        }
        fn line(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _w: f32, _color: Rgba) {}
        fn fill_circle(&mut self, _cx: f32, _cy: f32, _r: f32, _color: Rgba) {
            self.circles += 1;
        }
        fn text(&mut self, _x: f32, _y: f32, text: &str, _color: Rgba) {
            self.labels.push(text.to_string());
        }
    }

    const VIEW: Viewport = Viewport {
        width: 420.0,
        height: 780.0,
    };

    #[test]
    fn trend_drives_obstacle_color() {
        let mut state = SimState::new(VIEW);
        state.obstacles.push(Obstacle {
            x: 200.0,
            y: 0.0,
            width: OBSTACLE_WIDTH,
            height: 100.0,
            passed: false,
            trend: Trend::Bull,
        });

        let mut surface = Recording::default();
        draw_frame(&state, VIEW, &mut surface);
        assert_eq!(surface.clears, 1);
        // The fills are unique to obstacles; edge colors are shared with
        // the candle body.
        assert!(surface.rects.contains(&colors::BULL_FILL));
        assert!(!surface.rects.contains(&colors::BEAR_FILL));
        assert!(!surface.rects.contains(&colors::NEUTRAL_FILL));
    }

    #[test]
    fn collected_items_are_not_drawn() {
        let mut state = SimState::new(VIEW);
        state.items.push(Item {
            pos: Vec2::new(200.0, 300.0),
            size: ITEM_SIZE,
            collected: true,
            kind: ItemKind::BigBonus,
            value: 25,
        });
        state.items.push(Item {
            pos: Vec2::new(250.0, 300.0),
            size: ITEM_SIZE,
            collected: false,
            kind: ItemKind::BigBonus,
            value: 42,
        });

        let mut surface = Recording::default();
        draw_frame(&state, VIEW, &mut surface);
        assert_eq!(surface.circles, 1);
        assert_eq!(surface.labels, vec!["+42".to_string()]);
    }

    #[test]
    fn hold_state_picks_candle_color() {
        let mut state = SimState::new(VIEW);
        state.holding = true;
        let mut surface = Recording::default();
        draw_frame(&state, VIEW, &mut surface);
        assert!(surface.rects.contains(&colors::CANDLE_UP));

        state.holding = false;
        let mut surface = Recording::default();
        draw_frame(&state, VIEW, &mut surface);
        assert!(surface.rects.contains(&colors::CANDLE_DOWN));
    }
}
