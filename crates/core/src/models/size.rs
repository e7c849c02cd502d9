//! Stall size classes
//!
//! Footprints and capacity weights are a process-wide constant table; the
//! generator, the capacity model, and persisted positions all assume them.

use serde::{Deserialize, Serialize};

/// Stall size class with a fixed footprint and capacity weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StallSize {
    Small,
    Medium,
    Large,
}

impl StallSize {
    /// Generation order: groups stack top to bottom in this order
    pub const ALL: [StallSize; 3] = [StallSize::Small, StallSize::Medium, StallSize::Large];

    /// Footprint as (width, height) in hall pixels
    pub fn footprint(self) -> (i32, i32) {
        match self {
            StallSize::Small => (56, 44),
            StallSize::Medium => (84, 52),
            StallSize::Large => (120, 64),
        }
    }

    /// Abstract load this size contributes toward [`crate::hall::HALL_CAPACITY`]
    pub fn weight(self) -> u32 {
        match self {
            StallSize::Small => 10,
            StallSize::Medium => 15,
            StallSize::Large => 36,
        }
    }

    /// Stall code prefix ("S-01", "M-01", ...)
    pub fn prefix(self) -> char {
        match self {
            StallSize::Small => 'S',
            StallSize::Medium => 'M',
            StallSize::Large => 'L',
        }
    }

    /// Legend label shown next to the floor plan
    pub fn label(self) -> &'static str {
        match self {
            StallSize::Small => "Small Booths",
            StallSize::Medium => "Medium Booths",
            StallSize::Large => "Large Booths",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&StallSize::Small).unwrap(), "\"SMALL\"");
        let back: StallSize = serde_json::from_str("\"LARGE\"").unwrap();
        assert_eq!(back, StallSize::Large);
    }

    #[test]
    fn test_weight_table() {
        assert_eq!(StallSize::Small.weight(), 10);
        assert_eq!(StallSize::Medium.weight(), 15);
        assert_eq!(StallSize::Large.weight(), 36);
    }
}
