//! Drag state machine and position arithmetic
//!
//! The drag lifecycle is an explicit two-state machine: `PointerDown`
//! moves Idle -> Dragging, every `PointerMove` recomputes the candidate
//! position from scratch, `PointerUp` returns to Idle. The arithmetic
//! lives in [`next_position`], a pure function that needs no UI to test.

use crate::hall::{GRID_SIZE, HALL_HEIGHT, HALL_WIDTH};
use crate::models::{Stall, StallSize};

/// Pointer position in container-relative screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    pub x: f64,
    pub y: f64,
}

/// Offset between the pointer and the dragged stall's scaled corner,
/// captured once at pointer-down and held for the whole drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub dx: f64,
    pub dy: f64,
}

/// Drag lifecycle state
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { stall_code: String, grab: Grab },
}

impl DragState {
    /// Enter the dragging state, capturing the grab offset
    pub fn begin(stall: &Stall, pointer: PointerPoint, scale: f64) -> Self {
        DragState::Dragging {
            stall_code: stall.stall_code.clone(),
            grab: Grab {
                dx: pointer.x - stall.position_x as f64 * scale,
                dy: pointer.y - stall.position_y as f64 * scale,
            },
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }
}

/// Candidate position for the dragged stall.
///
/// Screen delta divided by the render scale, snapped to the grid on both
/// axes, then clamped so the footprint stays inside the hall. The clamp
/// runs after the snap, so a boundary position wins even when the boundary
/// itself is not a grid multiple.
pub fn next_position(grab: &Grab, pointer: PointerPoint, scale: f64, size: StallSize) -> (i32, i32) {
    let (width, height) = size.footprint();
    let x = ((pointer.x - grab.dx) / scale).round() as i32;
    let y = ((pointer.y - grab.dy) / scale).round() as i32;
    (
        snap(x).clamp(0, HALL_WIDTH - width),
        snap(y).clamp(0, HALL_HEIGHT - height),
    )
}

fn snap(v: i32) -> i32 {
    ((v as f64 / GRID_SIZE as f64).round() as i32) * GRID_SIZE
}
