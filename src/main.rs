//! Candle Wick entry point
//!
//! Terminal front-end: a raw-mode event loop, a half-block pixel
//! rasterizer implementing the render surface, and the hold-input
//! adapter. The simulation runs on a fixed virtual viewport and is
//! scaled to whatever the terminal offers.

use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{self, Color as TermColor},
    terminal,
};

use candle_wick::feedback::LogFeedback;
use candle_wick::persistence::JsonFileStore;
use candle_wick::render::{colors, draw_frame, Rgba, Surface};
use candle_wick::reward::AlwaysGrant;
use candle_wick::sim::Viewport;
use candle_wick::{Session, SessionPhase};

/// Virtual simulation canvas, phone-shaped like the original mini-app.
const VIEW: Viewport = Viewport {
    width: 420.0,
    height: 780.0,
};

/// Countdown before a continued run goes live.
const RESUME_COUNTDOWN_MS: f64 = 3000.0;

/// Without key-release reporting, a hold is sustained by key repeats;
/// this grace bridges the initial repeat delay.
const HOLD_GRACE_MS: f64 = 600.0;

// ── Pixel surface with half-block rendering ────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
struct Rgb(u8, u8, u8);

const CLEAR: Rgb = Rgb(5, 8, 16);

/// Terminal-backed pixel buffer: one cell is two vertically stacked
/// pixels (the ▀ trick). Implements the render surface by scaling the
/// sim's virtual viewport into the buffer, letterboxed and centered.
struct PixelSurface {
    pw: usize,
    ph: usize,
    px: Vec<Rgb>,
    scale: f32,
    off_x: f32,
    off_y: f32,
}

impl PixelSurface {
    fn new(cols: u16, rows: u16) -> Self {
        let mut surface = Self {
            pw: 0,
            ph: 0,
            px: Vec::new(),
            scale: 1.0,
            off_x: 0.0,
            off_y: 0.0,
        };
        surface.resize(cols, rows);
        surface
    }

    /// Pixel area is every terminal row but the last (reserved for the
    /// status line), two pixels tall each.
    fn resize(&mut self, cols: u16, rows: u16) {
        self.pw = cols as usize;
        self.ph = (rows.saturating_sub(1) as usize) * 2;
        self.px = vec![CLEAR; self.pw * self.ph];
        self.scale = (self.pw as f32 / VIEW.width).min(self.ph as f32 / VIEW.height);
        self.off_x = (self.pw as f32 - VIEW.width * self.scale) / 2.0;
        self.off_y = (self.ph as f32 - VIEW.height * self.scale) / 2.0;
    }

    /// Too small to draw anything meaningful; skip the frame.
    fn ready(&self) -> bool {
        self.pw >= 20 && self.ph >= 20
    }

    fn tx(&self, x: f32) -> i32 {
        (x * self.scale + self.off_x) as i32
    }

    fn ty(&self, y: f32) -> i32 {
        (y * self.scale + self.off_y) as i32
    }

    fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.pw || y as usize >= self.ph {
            return;
        }
        let dst = &mut self.px[y as usize * self.pw + x as usize];
        if color.a == 255 {
            *dst = Rgb(color.r, color.g, color.b);
        } else {
            let a = color.a as i32;
            let blend = |d: u8, s: u8| (d as i32 + (s as i32 - d as i32) * a / 255) as u8;
            *dst = Rgb(
                blend(dst.0, color.r),
                blend(dst.1, color.g),
                blend(dst.2, color.b),
            );
        }
    }

    fn fill_px(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, color);
            }
        }
    }

    /// Flush the buffer to the terminal as half-block cells.
    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.ph / 2;
        for row in 0..rows {
            for col in 0..self.pw {
                let top = self.px[row * 2 * self.pw + col];
                let bot = self.px[(row * 2 + 1) * self.pw + col];
                queue!(
                    out,
                    style::SetForegroundColor(TermColor::Rgb {
                        r: top.0,
                        g: top.1,
                        b: top.2
                    }),
                    style::SetBackgroundColor(TermColor::Rgb {
                        r: bot.0,
                        g: bot.1,
                        b: bot.2
                    }),
                    style::Print('\u{2580}')
                )?;
            }
            queue!(out, style::ResetColor, style::Print("\r\n"))?;
        }
        Ok(())
    }
}

impl Surface for PixelSurface {
    fn clear(&mut self, color: Rgba) {
        let c = Rgb(color.r, color.g, color.b);
        self.px.fill(c);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let x0 = self.tx(x);
        let y0 = self.ty(y);
        let x1 = self.tx(x + w).max(x0 + 1);
        let y1 = self.ty(y + h).max(y0 + 1);
        self.fill_px(x0, y0, x1, y1, color);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: Rgba) {
        let lw = ((line_width * self.scale) as i32).max(1);
        let x0 = self.tx(x);
        let y0 = self.ty(y);
        let x1 = self.tx(x + w).max(x0 + 1);
        let y1 = self.ty(y + h).max(y0 + 1);
        self.fill_px(x0, y0, x1, (y0 + lw).min(y1), color);
        self.fill_px(x0, (y1 - lw).max(y0), x1, y1, color);
        self.fill_px(x0, y0, (x0 + lw).min(x1), y1, color);
        self.fill_px((x1 - lw).max(x0), y0, x1, y1, color);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Rgba) {
        let w = ((width * self.scale) as i32).max(1);
        let (px1, py1) = (self.tx(x1), self.ty(y1));
        let (px2, py2) = (self.tx(x2), self.ty(y2));
        let dx = px2 - px1;
        let dy = py2 - py1;
        let steps = dx.abs().max(dy.abs()).max(1);
        for i in 0..=steps {
            let x = px1 + dx * i / steps;
            let y = py1 + dy * i / steps;
            self.fill_px(x, y, x + w, y + w, color);
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba) {
        let pcx = self.tx(cx);
        let pcy = self.ty(cy);
        let pr = ((r * self.scale) as i32).max(1);
        for dy in -pr..=pr {
            let half = ((pr * pr - dy * dy) as f32).sqrt() as i32;
            for dx in -half..=half {
                self.set(pcx + dx, pcy + dy, color);
            }
        }
    }

    /// Bitmap digits plus '+'; anything else is dropped (the terminal's
    /// real text lives on the status line).
    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        let glyphs: Vec<&[u8; 15]> = text.chars().filter_map(glyph_for).collect();
        if glyphs.is_empty() {
            return;
        }
        let total_w = glyphs.len() as i32 * 4 - 1;
        let mut gx = self.tx(x) - total_w / 2;
        let gy = self.ty(y) - 2;
        for glyph in glyphs {
            for row in 0..5 {
                for col in 0..3 {
                    if glyph[row * 3 + col] == 1 {
                        self.set(gx + col as i32, gy + row as i32, color);
                    }
                }
            }
            gx += 4;
        }
    }
}

// ── 3x5 bitmap glyphs ──────────────────────────────────────────────────────

#[rustfmt::skip]
static DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
static PLUS: [u8; 15] = [0,0,0, 0,1,0, 1,1,1, 0,1,0, 0,0,0];

fn glyph_for(c: char) -> Option<&'static [u8; 15]> {
    match c {
        '0'..='9' => Some(&DIGITS[c as usize - '0' as usize]),
        '+' => Some(&PLUS),
        _ => None,
    }
}

// ── Hold-input adapter ─────────────────────────────────────────────────────

/// Normalizes key events into the boolean hold signal the sim consumes.
/// With key-release reporting the signal is exact; without it, repeats
/// keep re-arming a grace window.
struct HoldInput {
    down: bool,
    deadline: f64,
    release_supported: bool,
}

impl HoldInput {
    fn new(release_supported: bool) -> Self {
        Self {
            down: false,
            deadline: 0.0,
            release_supported,
        }
    }

    fn press(&mut self, now_ms: f64) {
        self.down = true;
        self.deadline = now_ms + HOLD_GRACE_MS;
    }

    fn release(&mut self) {
        self.down = false;
    }

    fn clear(&mut self) {
        self.down = false;
        self.deadline = 0.0;
    }

    fn is_holding(&self, now_ms: f64) -> bool {
        if self.release_supported {
            self.down
        } else {
            self.down && now_ms < self.deadline
        }
    }
}

// ── Overlays ───────────────────────────────────────────────────────────────

const OVERLAY_DIM: Rgba = Rgba::rgba(0, 0, 0, 150);
const PANEL_FILL: Rgba = Rgba::rgba(30, 41, 59, 235);

fn draw_hud(surface: &mut PixelSurface, score: u32, currency: u64, level: u8) {
    surface.text(VIEW.width / 2.0, 50.0, &score.to_string(), colors::LABEL);
    surface.text(60.0, 50.0, &currency.to_string(), colors::ITEM);
    surface.text(VIEW.width - 60.0, 50.0, &level.to_string(), colors::NEUTRAL_EDGE);
}

fn draw_title(surface: &mut PixelSurface) {
    // A big idle candle in place of a wordmark.
    let cx = VIEW.width / 2.0;
    let cy = VIEW.height / 2.0 - 60.0;
    surface.line(cx, cy - 50.0, cx, cy, 3.0, colors::CANDLE_UP);
    surface.fill_rect(cx - 30.0, cy, 60.0, 120.0, colors::CANDLE_UP);
    surface.line(cx, cy + 120.0, cx, cy + 170.0, 3.0, colors::CANDLE_UP);
}

fn draw_game_over(surface: &mut PixelSurface, score: u32, best: u32) {
    surface.fill_rect(0.0, 0.0, VIEW.width, VIEW.height, OVERLAY_DIM);
    let (w, h) = (260.0, 160.0);
    let (x, y) = ((VIEW.width - w) / 2.0, (VIEW.height - h) / 2.0);
    surface.fill_rect(x, y, w, h, PANEL_FILL);
    surface.stroke_rect(x, y, w, h, 3.0, colors::BEAR_EDGE);
    surface.text(VIEW.width / 2.0, y + 50.0, &score.to_string(), colors::LABEL);
    surface.text(VIEW.width / 2.0, y + 110.0, &best.to_string(), colors::ITEM);
}

fn draw_countdown(surface: &mut PixelSurface, remaining_ms: f64) {
    surface.fill_rect(0.0, 0.0, VIEW.width, VIEW.height, OVERLAY_DIM);
    let secs = (remaining_ms / 1000.0).ceil().max(1.0) as u32;
    surface.text(VIEW.width / 2.0, VIEW.height / 2.0, &secs.to_string(), colors::CANDLE_UP);
}

fn status_line(out: &mut impl Write, row: u16, text: &str) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, row),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::SetForegroundColor(TermColor::Rgb {
            r: 148,
            g: 163,
            b: 184
        }),
        style::Print(text),
        style::ResetColor
    )?;
    out.flush()
}

// ── Main ───────────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    env_logger::init();
    log::info!("Candle Wick (terminal) starting...");

    let store = JsonFileStore::in_data_dir().unwrap_or_else(|e| {
        log::warn!("no data directory ({e}), player record goes to temp");
        JsonFileStore::new(std::env::temp_dir().join("candle-wick"))
    });
    let user_id = std::env::var("USER").unwrap_or_else(|_| "local".into());
    let mut session = Session::new(user_id, VIEW, store, LogFeedback, AlwaysGrant);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;
    let release_supported = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if release_supported {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let cleanup = |out: &mut io::Stdout, release_supported: bool| -> io::Result<()> {
        if release_supported {
            execute!(out, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut surface = PixelSurface::new(cols, rows);
    let mut term_rows = rows;
    let mut hold = HoldInput::new(release_supported);
    let mut resume_at: Option<f64> = None;

    let epoch = Instant::now();
    let frame_dur = Duration::from_millis(16);

    loop {
        let frame_start = Instant::now();
        let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;

        // --- Input ---
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        if matches!(key.code, KeyCode::Char(' ') | KeyCode::Up) {
                            hold.release();
                        }
                        continue;
                    }
                    match (key.code, session.phase()) {
                        (KeyCode::Char('q') | KeyCode::Esc, _) => {
                            cleanup(&mut out, release_supported)?;
                            return Ok(());
                        }
                        (KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter, SessionPhase::Idle) => {
                            hold.clear();
                            session.start();
                        }
                        (KeyCode::Char(' ') | KeyCode::Up, SessionPhase::Playing) => {
                            hold.press(now_ms);
                        }
                        // Deliberate keys only: a space still held from the
                        // death frame must not instantly restart.
                        (KeyCode::Char('r') | KeyCode::Enter, SessionPhase::GameOver) => {
                            hold.clear();
                            session.restart();
                        }
                        (KeyCode::Char('c'), SessionPhase::GameOver) => {
                            if session.continue_via_reward() {
                                resume_at = Some(now_ms + RESUME_COUNTDOWN_MS);
                            }
                        }
                        (KeyCode::Char('b'), SessionPhase::GameOver) => {
                            session.claim_double();
                        }
                        _ => {}
                    }
                }
                Event::Resize(c, r) => {
                    surface.resize(c, r);
                    term_rows = r;
                }
                _ => {}
            }
        }

        // --- Update ---
        if session.phase() == SessionPhase::Resuming {
            if let Some(at) = resume_at {
                if now_ms >= at {
                    resume_at = None;
                    hold.clear();
                    session.resume();
                }
            }
        }
        session.frame(now_ms, hold.is_holding(now_ms));

        // --- Render ---
        if surface.ready() {
            draw_frame(session.sim(), VIEW, &mut surface);
            draw_hud(
                &mut surface,
                session.sim().score,
                session.record().total_currency,
                session.sim().difficulty,
            );
            let status = match session.phase() {
                SessionPhase::Idle => {
                    "CANDLE WICK  ·  space: start  ·  q: quit".to_string()
                }
                SessionPhase::Playing => {
                    "hold space to rise  ·  q: quit".to_string()
                }
                SessionPhase::GameOver => {
                    draw_game_over(
                        &mut surface,
                        session.sim().score,
                        session.record().best_score,
                    );
                    format!(
                        "game over  ·  r: restart  ·  c: continue ({} left)  ·  b: double & exit  ·  q: quit",
                        session.continues_left()
                    )
                }
                SessionPhase::Resuming => {
                    if let Some(at) = resume_at {
                        draw_countdown(&mut surface, at - now_ms);
                    }
                    "get ready...".to_string()
                }
            };
            if session.phase() == SessionPhase::Idle {
                draw_title(&mut surface);
            }
            surface.render(&mut out)?;
            status_line(&mut out, term_rows.saturating_sub(1), &status)?;
        }

        // --- Frame pacing ---
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
