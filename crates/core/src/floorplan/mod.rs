//! Interactive floor-plan controller
//!
//! Holds the transient interaction state (mode, drag machine, render scale)
//! and turns pointer input into explicit requests back to the caller. The
//! caller owns the canonical stall list, the selection set, and the
//! booked-id set; nothing here mutates them. Rendering is a pure projection
//! in [`view`], callable from any UI layer or a headless test harness.

mod drag;
mod view;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::hall::HALL_WIDTH;
use crate::models::Stall;

pub use drag::{next_position, DragState, Grab, PointerPoint};
pub use view::{project, StallStatus, StallView};

/// Interaction policy for the floor-plan view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Read-only, public event pages
    View,
    /// Vendor selecting stalls to reserve
    Book,
    /// Organizer marking held stalls while designing a new event
    Create,
    /// Organizer toggling block state on an existing event
    Admin,
}

impl Mode {
    /// Whether a click on this stall is accepted in this mode.
    ///
    /// `Book` filters blocked and already-booked targets; `Create` and
    /// `Admin` accept clicks on blocked stalls too, since that is how the
    /// organizer releases a hold.
    pub fn permits_click(self, stall: &Stall, booked: &HashSet<String>) -> bool {
        match self {
            Mode::View => false,
            Mode::Book => !stall.blocked && !booked.contains(&stall.stall_code),
            Mode::Create | Mode::Admin => true,
        }
    }
}

/// Accepted click, reported to the caller for it to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Toggle this stall code in the caller-owned selection set
    Toggle(String),
}

/// Requested position mutation, reported after each drag step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionChange {
    pub stall_code: String,
    pub x: i32,
    pub y: i32,
}

/// Floor-plan interaction controller
#[derive(Debug, Clone)]
pub struct FloorPlan {
    mode: Mode,
    draggable: bool,
    container_width: f64,
    drag: DragState,
}

impl FloorPlan {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            draggable: false,
            container_width: HALL_WIDTH as f64,
            drag: DragState::Idle,
        }
    }

    /// Enable drag-to-reposition. Dragging and click-to-select are mutually
    /// exclusive in one session.
    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Observe the rendering container's width; all pointer conversions
    /// divide by the resulting scale so layouts stay correct under resize.
    pub fn set_container_width(&mut self, width: f64) {
        if width > 0.0 {
            self.container_width = width;
        }
    }

    pub fn scale(&self) -> f64 {
        self.container_width / HALL_WIDTH as f64
    }

    /// Stall code currently being dragged, if any
    pub fn dragging(&self) -> Option<&str> {
        match &self.drag {
            DragState::Dragging { stall_code, .. } => Some(stall_code),
            DragState::Idle => None,
        }
    }

    /// Handle a click on a stall.
    ///
    /// Returns the action the caller should apply, or `None` when the click
    /// is ignored (view mode, drag sessions, blocked/booked targets in book
    /// mode). Ignored clicks are routine interaction, not errors.
    pub fn click(&self, stall: &Stall, booked: &HashSet<String>) -> Option<ClickAction> {
        if self.draggable || !self.mode.permits_click(stall, booked) {
            return None;
        }
        Some(ClickAction::Toggle(stall.stall_code.clone()))
    }

    /// Begin a drag: capture the offset between the pointer and the stall's
    /// scaled top-left corner. No-op unless dragging is enabled.
    pub fn pointer_down(&mut self, stall: &Stall, pointer: PointerPoint) {
        if !self.draggable {
            return;
        }
        self.drag = DragState::begin(stall, pointer, self.scale());
    }

    /// Recompute the dragged stall's position from the current pointer.
    ///
    /// Returns the snapped, clamped position for the caller to apply to its
    /// stall list. Only the dragged stall moves; no collision detection is
    /// performed against other stalls.
    pub fn pointer_move(&mut self, stalls: &[Stall], pointer: PointerPoint) -> Option<PositionChange> {
        let (stall_code, grab) = match &self.drag {
            DragState::Dragging { stall_code, grab } => (stall_code.clone(), *grab),
            DragState::Idle => return None,
        };
        let stall = stalls.iter().find(|s| s.stall_code == stall_code)?;
        let (x, y) = next_position(&grab, pointer, self.scale(), stall.size);
        crate::invariants::assert_drag_invariants(x, y, stall.size);
        Some(PositionChange { stall_code, x, y })
    }

    /// End the drag, returning to idle
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Project the current data sets into a render description.
    pub fn project(
        &self,
        stalls: &[Stall],
        selection: &HashSet<String>,
        booked: &HashSet<String>,
    ) -> Vec<StallView> {
        view::project(stalls, self.mode, selection, booked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StallSize;

    fn stall(code: &str) -> Stall {
        Stall::new(code.to_string(), StallSize::Small, 100, 100)
    }

    fn set(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_view_mode_never_accepts_clicks() {
        let plan = FloorPlan::new(Mode::View);
        assert!(plan.click(&stall("S-01"), &HashSet::new()).is_none());
    }

    #[test]
    fn test_book_mode_rejects_booked_and_blocked() {
        let plan = FloorPlan::new(Mode::Book);
        let booked = set(&["S-02"]);

        assert!(plan.click(&stall("S-02"), &booked).is_none());

        let mut held = stall("S-03");
        held.blocked = true;
        assert!(plan.click(&held, &booked).is_none());

        assert_eq!(
            plan.click(&stall("S-01"), &booked),
            Some(ClickAction::Toggle("S-01".to_string()))
        );
    }

    #[test]
    fn test_admin_mode_accepts_blocked_stalls() {
        // Releasing a hold requires clicking the blocked stall.
        let plan = FloorPlan::new(Mode::Admin);
        let mut held = stall("S-01");
        held.blocked = true;
        assert!(plan.click(&held, &HashSet::new()).is_some());
    }

    #[test]
    fn test_drag_sessions_do_not_click_select() {
        let plan = FloorPlan::new(Mode::Create).draggable(true);
        assert!(plan.click(&stall("S-01"), &HashSet::new()).is_none());
    }

    #[test]
    fn test_drag_lifecycle() {
        let stalls = vec![stall("S-01")];
        let mut plan = FloorPlan::new(Mode::Admin).draggable(true);

        assert!(plan.dragging().is_none());
        plan.pointer_down(&stalls[0], PointerPoint { x: 105.0, y: 107.0 });
        assert_eq!(plan.dragging(), Some("S-01"));

        let change = plan
            .pointer_move(&stalls, PointerPoint { x: 205.0, y: 157.0 })
            .unwrap();
        assert_eq!(change.stall_code, "S-01");
        assert_eq!((change.x, change.y), (200, 150));

        plan.pointer_up();
        assert!(plan.dragging().is_none());
        assert!(plan
            .pointer_move(&stalls, PointerPoint { x: 300.0, y: 300.0 })
            .is_none());
    }

    #[test]
    fn test_pointer_down_ignored_without_draggable() {
        let stalls = vec![stall("S-01")];
        let mut plan = FloorPlan::new(Mode::Admin);
        plan.pointer_down(&stalls[0], PointerPoint { x: 100.0, y: 100.0 });
        assert!(plan.dragging().is_none());
    }

    #[test]
    fn test_scale_follows_container_width() {
        let mut plan = FloorPlan::new(Mode::Admin);
        assert_eq!(plan.scale(), 1.0);
        plan.set_container_width(450.0);
        assert_eq!(plan.scale(), 0.5);
        // Nonsense widths are ignored rather than breaking conversion
        plan.set_container_width(0.0);
        assert_eq!(plan.scale(), 0.5);
    }

    #[test]
    fn test_scaled_drag_divides_pointer_space() {
        let stalls = vec![stall("S-01")];
        let mut plan = FloorPlan::new(Mode::Admin).draggable(true);
        plan.set_container_width(450.0); // scale 0.5

        // Stall at (100, 100) renders at (50, 50); grab its corner exactly.
        plan.pointer_down(&stalls[0], PointerPoint { x: 50.0, y: 50.0 });
        let change = plan
            .pointer_move(&stalls, PointerPoint { x: 100.0, y: 75.0 })
            .unwrap();
        assert_eq!((change.x, change.y), (200, 150));
    }
}
