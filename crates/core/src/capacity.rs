//! Weighted capacity model
//!
//! Hall admission is bounded by weighted units, not raw stall counts: each
//! size class contributes its weight per stall, and the sum must stay within
//! [`HALL_CAPACITY`]. The per-size maxima are an input-bounding hint only -
//! mixed counts can each sit under their own maximum and still overflow the
//! hall, so [`check_capacity`] stays the authoritative gate.

use serde::{Deserialize, Serialize};

use crate::hall::HALL_CAPACITY;
use crate::models::StallSize;

/// Requested stall counts per size class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct StallCounts {
    #[serde(default)]
    pub small: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub large: u32,
}

impl StallCounts {
    pub fn new(small: u32, medium: u32, large: u32) -> Self {
        Self {
            small,
            medium,
            large,
        }
    }

    pub fn count(&self, size: StallSize) -> u32 {
        match size {
            StallSize::Small => self.small,
            StallSize::Medium => self.medium,
            StallSize::Large => self.large,
        }
    }

    /// Combined weighted load of all requested stalls
    pub fn total_weight(&self) -> u32 {
        StallSize::ALL
            .iter()
            .map(|&size| self.count(size) * size.weight())
            .sum()
    }
}

/// Outcome of a capacity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityCheck {
    pub valid: bool,
    pub total: u32,
    /// Remaining headroom; negative when the request overflows the hall
    pub remaining: i64,
}

/// Evaluate the combined counts against the hall capacity.
pub fn check_capacity(counts: &StallCounts) -> CapacityCheck {
    let total = counts.total_weight();
    CapacityCheck {
        valid: total <= HALL_CAPACITY,
        total,
        remaining: HALL_CAPACITY as i64 - total as i64,
    }
}

/// Theoretical maximum count for one size class on its own.
pub fn max_stalls(size: StallSize) -> u32 {
    HALL_CAPACITY / size.weight()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_boundary_is_valid() {
        let check = check_capacity(&StallCounts::new(108, 0, 0));
        assert!(check.valid);
        assert_eq!(check.total, 1080);
        assert_eq!(check.remaining, 0);
    }

    #[test]
    fn test_one_over_boundary_is_invalid() {
        let check = check_capacity(&StallCounts::new(109, 0, 0));
        assert!(!check.valid);
        assert_eq!(check.total, 1090);
        assert_eq!(check.remaining, -10);
    }

    #[test]
    fn test_per_size_maxima() {
        assert_eq!(max_stalls(StallSize::Small), 108);
        assert_eq!(max_stalls(StallSize::Medium), 72);
        assert_eq!(max_stalls(StallSize::Large), 30);
    }

    #[test]
    fn test_maxima_are_not_sufficient_combined() {
        // Each size under its own maximum, combined load still overflows.
        let counts = StallCounts::new(60, 30, 10);
        assert!(counts.small < max_stalls(StallSize::Small));
        assert!(counts.medium < max_stalls(StallSize::Medium));
        assert!(counts.large < max_stalls(StallSize::Large));
        let check = check_capacity(&counts);
        assert!(!check.valid);
        assert_eq!(check.total, 60 * 10 + 30 * 15 + 10 * 36);
    }

    #[test]
    fn test_counts_parse_uppercase_keys() {
        let counts: StallCounts = serde_json::from_str(r#"{"SMALL": 4, "LARGE": 2}"#).unwrap();
        assert_eq!(counts, StallCounts::new(4, 0, 2));
    }
}
