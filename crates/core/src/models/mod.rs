//! Domain models

mod size;
mod stall;

pub use size::StallSize;
pub use stall::Stall;
