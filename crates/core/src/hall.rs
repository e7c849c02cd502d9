//! Hall geometry and the logical coordinate transform
//!
//! The hall is a fixed 900x700 virtual canvas. Every component in the
//! workspace assumes this exact coordinate frame: the layout generator
//! places stalls in it, the controller clamps drags against it, and
//! persisted stall positions are expressed in it. Treat the constants
//! below as a contract, not tunables.

use serde::{Deserialize, Serialize};

/// Hall canvas width in pixels
pub const HALL_WIDTH: i32 = 900;

/// Hall canvas height in pixels
pub const HALL_HEIGHT: i32 = 700;

/// Top of the stall placement area (the strip above holds the entrance)
pub const SECTION_TOP: i32 = 50;

/// Horizontal margin on each side of the placement area
pub const MARGIN_X: i32 = 40;

/// Width available to stall rows (margins plus the side corridor removed)
pub const USABLE_WIDTH: i32 = HALL_WIDTH - MARGIN_X * 2 - 40;

/// Drag snapping grid, in hall pixels
pub const GRID_SIZE: i32 = 10;

/// Total weighted capacity of the hall (see [`crate::capacity`])
pub const HALL_CAPACITY: u32 = 1080;

/// Operator-facing coordinate: x in [-20, 20], y in [0, 15]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

/// Convert a hall pixel position into the normalized logical space.
///
/// Pure and total: any finite pixel pair maps to a finite logical pair.
/// Values are rounded to two decimals, matching what operators see.
pub fn to_logical(x: i32, y: i32) -> LogicalPoint {
    let half_w = HALL_WIDTH as f64 / 2.0;
    let lx = ((x as f64 - half_w) / half_w) * 20.0;
    let ly = ((y - SECTION_TOP) as f64 / (HALL_HEIGHT - SECTION_TOP) as f64) * 15.0;
    LogicalPoint {
        x: round2(lx),
        y: round2(ly),
    }
}

/// Algebraic inverse of [`to_logical`], rounded to whole pixels.
pub fn from_logical(point: &LogicalPoint) -> (i32, i32) {
    let half_w = HALL_WIDTH as f64 / 2.0;
    let x = (point.x / 20.0) * half_w + half_w;
    let y = (point.y / 15.0) * (HALL_HEIGHT - SECTION_TOP) as f64 + SECTION_TOP as f64;
    (x.round() as i32, y.round() as i32)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Axis-aligned bounding box in hall pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the two boxes overlap with positive area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// True when the box lies entirely inside the hall canvas
    pub fn within_hall(&self) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x + self.width <= HALL_WIDTH
            && self.y + self.height <= HALL_HEIGHT
    }
}
