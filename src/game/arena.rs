//! Static arena geometry

use serde::Serialize;

/// Player hitbox width
pub const PLAYER_WIDTH: f32 = 28.0;
/// Player hitbox height
pub const PLAYER_HEIGHT: f32 = 40.0;

/// Simulation bounds, constant for the lifetime of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
        }
    }
}

/// Static axis-aligned platform rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Platform {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap with a box at (x, y) of the given size
    pub fn overlaps(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        x + w > self.x && x < self.x + self.w && y + h > self.y && y < self.y + self.h
    }
}

const DEFAULT_PLATFORMS: [Platform; 10] = [
    Platform::new(0.0, 500.0, 960.0, 40.0),
    Platform::new(60.0, 420.0, 200.0, 20.0),
    Platform::new(320.0, 360.0, 160.0, 20.0),
    Platform::new(600.0, 400.0, 200.0, 20.0),
    Platform::new(760.0, 320.0, 180.0, 20.0),
    Platform::new(200.0, 280.0, 160.0, 20.0),
    Platform::new(440.0, 230.0, 120.0, 20.0),
    Platform::new(650.0, 260.0, 160.0, 20.0),
    Platform::new(300.0, 160.0, 180.0, 20.0),
    Platform::new(520.0, 120.0, 160.0, 20.0),
];

/// Arena geometry: canvas bounds plus an immutable platform list.
///
/// Platform order matters: collision resolution walks the list front to back.
#[derive(Debug, Clone, Serialize)]
pub struct Arena {
    pub canvas: Canvas,
    platforms: Vec<Platform>,
}

impl Arena {
    pub fn new(canvas: Canvas, platforms: Vec<Platform>) -> Self {
        Self { canvas, platforms }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Largest x a hitbox can occupy
    pub fn max_x(&self) -> f32 {
        (self.canvas.width - PLAYER_WIDTH).max(0.0)
    }

    /// Players below this line have fallen off-stage
    pub fn kill_line(&self) -> f32 {
        self.canvas.height + 100.0
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(Canvas::default(), DEFAULT_PLATFORMS.to_vec())
    }
}
