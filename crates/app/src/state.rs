//! Session state management
//!
//! The session owns the canonical stall list plus the two independent sets
//! the controller merges at render time: the vendor's selection and the
//! externally sourced booked-id set. The controller never mutates any of
//! these; it reports requested changes and the session applies them here.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use fairfloor_core::{ClickAction, PositionChange, Stall};

/// Booking policy: at most this many stalls per reservation. This is the
/// caller's rule, not the floor plan's - the controller accepts the click
/// and the session refuses it here with no mutation.
pub const MAX_STALLS_PER_BOOKING: usize = 3;

/// Outcome of applying an accepted click to the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Stall was added to the selection
    Added,
    /// Stall was removed from the selection
    Removed,
    /// Selection already at the per-booking limit; nothing changed
    LimitReached,
}

/// Main session state
pub struct AppState {
    stalls: Arc<Mutex<Vec<Stall>>>,
    selection: Arc<Mutex<HashSet<String>>>,
    booked: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            stalls: Arc::new(Mutex::new(Vec::new())),
            selection: Arc::new(Mutex::new(HashSet::new())),
            booked: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn set_stalls(&self, stalls: Vec<Stall>) {
        *self.stalls.lock().unwrap() = stalls;
    }

    pub fn stalls(&self) -> Vec<Stall> {
        self.stalls.lock().unwrap().clone()
    }

    pub fn selection(&self) -> HashSet<String> {
        self.selection.lock().unwrap().clone()
    }

    pub fn booked(&self) -> HashSet<String> {
        self.booked.lock().unwrap().clone()
    }

    /// Replace the booked set wholesale with a pushed snapshot.
    ///
    /// Last write wins and replays are idempotent. A stall the vendor has
    /// already selected is deliberately *not* evicted from the selection
    /// when it turns up booked - the server arbitrates at submission time.
    pub fn replace_booked(&self, booked_stall_ids: Vec<String>) {
        *self.booked.lock().unwrap() = booked_stall_ids.into_iter().collect();
    }

    /// Apply an accepted click, honoring the per-booking limit.
    pub fn apply_click(&self, action: &ClickAction) -> SelectionOutcome {
        let ClickAction::Toggle(stall_code) = action;
        let mut selection = self.selection.lock().unwrap();
        if selection.remove(stall_code) {
            SelectionOutcome::Removed
        } else if selection.len() >= MAX_STALLS_PER_BOOKING {
            SelectionOutcome::LimitReached
        } else {
            selection.insert(stall_code.clone());
            SelectionOutcome::Added
        }
    }

    pub fn clear_selection(&self) {
        self.selection.lock().unwrap().clear();
    }

    /// Apply a controller-reported drag result to the owned stall list.
    /// Returns false when the stall code is unknown.
    #[allow(dead_code)]
    pub fn move_stall(&self, change: &PositionChange) -> bool {
        let mut stalls = self.stalls.lock().unwrap();
        match stalls.iter_mut().find(|s| s.stall_code == change.stall_code) {
            Some(stall) => {
                stall.position_x = change.x;
                stall.position_y = change.y;
                true
            }
            None => false,
        }
    }

    /// Toggle an organizer hold on a stall (create/admin modes)
    #[allow(dead_code)]
    pub fn toggle_block(&self, stall_code: &str) -> bool {
        let mut stalls = self.stalls.lock().unwrap();
        match stalls.iter_mut().find(|s| s.stall_code == stall_code) {
            Some(stall) => {
                stall.blocked = !stall.blocked;
                true
            }
            None => false,
        }
    }

    /// Combined price of the current selection
    pub fn selection_total(&self) -> f64 {
        let selection = self.selection.lock().unwrap();
        self.stalls
            .lock()
            .unwrap()
            .iter()
            .filter(|s| selection.contains(&s.stall_code))
            .map(|s| s.price)
            .sum()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
