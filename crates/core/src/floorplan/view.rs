//! Pure render projection
//!
//! Projects `{stalls, mode, selection, booked}` into a flat render
//! description. Any UI layer (or a headless test) recomputes this after
//! each accepted event instead of holding its own derived state.

use std::collections::HashSet;

use serde::Serialize;

use crate::floorplan::Mode;
use crate::hall::LogicalPoint;
use crate::models::{Stall, StallSize};

/// Visual state of one stall, in resolution precedence order.
///
/// A blocked stall is never shown as bookable regardless of other flags,
/// and in create mode booked status is irrelevant since no bookings exist
/// yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StallStatus {
    /// Organizer-held, excluded from booking
    Blocked,
    /// Already booked while the viewer is trying to book
    Disabled,
    /// In the viewer's selection set
    Selected,
    /// Taken by another vendor
    Booked,
    /// Free, rendered in its size's default style
    Open,
}

/// One stall ready to draw
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StallView {
    pub stall_code: String,
    pub size: StallSize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub price: f64,
    pub status: StallStatus,
    /// Operator-facing coordinate, shown while dragging or selected
    pub logical: LogicalPoint,
    /// Whether a click would be accepted in the current mode
    pub interactive: bool,
}

/// Project the caller's data sets into a render description.
pub fn project(
    stalls: &[Stall],
    mode: Mode,
    selection: &HashSet<String>,
    booked: &HashSet<String>,
) -> Vec<StallView> {
    stalls
        .iter()
        .map(|stall| {
            let (width, height) = stall.size.footprint();
            StallView {
                stall_code: stall.stall_code.clone(),
                size: stall.size,
                x: stall.position_x,
                y: stall.position_y,
                width,
                height,
                price: stall.price,
                status: status_for(stall, mode, selection, booked),
                logical: stall.logical(),
                interactive: mode.permits_click(stall, booked),
            }
        })
        .collect()
}

fn status_for(
    stall: &Stall,
    mode: Mode,
    selection: &HashSet<String>,
    booked: &HashSet<String>,
) -> StallStatus {
    let is_booked = booked.contains(&stall.stall_code);
    if stall.blocked {
        StallStatus::Blocked
    } else if mode == Mode::Book && is_booked {
        StallStatus::Disabled
    } else if selection.contains(&stall.stall_code) {
        StallStatus::Selected
    } else if (stall.booked_by.is_some() || is_booked) && mode != Mode::Create {
        StallStatus::Booked
    } else {
        StallStatus::Open
    }
}
