//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible layouts during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::hall::{HALL_HEIGHT, HALL_WIDTH};
use crate::models::{Stall, StallSize};

/// Validate that a generated layout is internally consistent
pub fn assert_layout_invariants(stalls: &[Stall]) {
    // Codes must be unique within a layout
    let mut codes = HashSet::new();
    for stall in stalls {
        debug_assert!(
            codes.insert(stall.stall_code.as_str()),
            "Duplicate stall code {}",
            stall.stall_code
        );
    }

    // Every footprint must lie inside the hall
    for stall in stalls {
        debug_assert!(
            stall.rect().within_hall(),
            "Stall {} at ({}, {}) escapes the hall",
            stall.stall_code,
            stall.position_x,
            stall.position_y
        );
    }

    // Footprints must not overlap at generation time
    for (i, a) in stalls.iter().enumerate() {
        for b in &stalls[i + 1..] {
            debug_assert!(
                !a.rect().intersects(&b.rect()),
                "Stalls {} and {} overlap",
                a.stall_code,
                b.stall_code
            );
        }
    }
}

/// Validate that a drag-produced position respects the clamp bounds
pub fn assert_drag_invariants(x: i32, y: i32, size: StallSize) {
    let (width, height) = size.footprint();
    debug_assert!(
        (0..=HALL_WIDTH - width).contains(&x),
        "Dragged x {} escapes [0, {}]",
        x,
        HALL_WIDTH - width
    );
    debug_assert!(
        (0..=HALL_HEIGHT - height).contains(&y),
        "Dragged y {} escapes [0, {}]",
        y,
        HALL_HEIGHT - height
    );
}
