//! Fairfloor Core Library
//!
//! Floor-plan spatial model and interaction engine for exhibition-hall
//! stall booking: hall geometry, weighted capacity checks, deterministic
//! layout generation, and the interactive floor-plan controller.
//!
//! Everything here is synchronous and UI-agnostic. The caller owns the
//! stall list, the selection set, and the booked-id set; the controller
//! only reads them and reports requested mutations back.

pub mod capacity;
pub mod error;
pub mod floorplan;
pub mod hall;
pub mod invariants;
pub mod layout;
pub mod models;

pub use capacity::{check_capacity, max_stalls, CapacityCheck, StallCounts};
pub use error::{Error, Result};
pub use floorplan::{
    next_position, project, ClickAction, DragState, FloorPlan, Mode, PointerPoint, PositionChange,
    StallStatus, StallView,
};
pub use hall::{
    from_logical, to_logical, LogicalPoint, Rect, GRID_SIZE, HALL_CAPACITY, HALL_HEIGHT,
    HALL_WIDTH, MARGIN_X, SECTION_TOP, USABLE_WIDTH,
};
pub use layout::{apply_group_prices, generate_default_positions, GroupPrices};
pub use models::{Stall, StallSize};
