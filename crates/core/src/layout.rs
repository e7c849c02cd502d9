//! Deterministic default layout generation
//!
//! Places each size group into centered rows inside its own vertical band,
//! Small above Medium above Large. Identical counts always produce identical
//! codes and positions; there is no randomness anywhere.

use tracing::debug;

use crate::capacity::{check_capacity, StallCounts};
use crate::error::{Error, Result};
use crate::hall::{MARGIN_X, SECTION_TOP, USABLE_WIDTH};
use crate::models::{Stall, StallSize};
use serde::{Deserialize, Serialize};

/// Horizontal gap between stalls in a row
const STALL_GAP: i32 = 10;

/// Vertical gap between rows inside one size group
const ROW_GAP: i32 = 16;

/// Vertical gap between size groups
const GROUP_GAP: i32 = 20;

/// Price per size group, set once at creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct GroupPrices {
    #[serde(default)]
    pub small: f64,
    #[serde(default)]
    pub medium: f64,
    #[serde(default)]
    pub large: f64,
}

impl GroupPrices {
    pub fn price(&self, size: StallSize) -> f64 {
        match size {
            StallSize::Small => self.small,
            StallSize::Medium => self.medium,
            StallSize::Large => self.large,
        }
    }
}

/// Generate the default non-overlapping layout for the requested counts.
///
/// Refuses to run when the counts overflow the hall capacity; the error
/// carries the computed total and deficit for display. All-zero counts
/// produce an empty layout.
pub fn generate_default_positions(counts: &StallCounts) -> Result<Vec<Stall>> {
    let check = check_capacity(counts);
    if !check.valid {
        return Err(Error::CapacityExceeded {
            total: check.total,
            remaining: check.remaining,
        });
    }

    let mut stalls = Vec::with_capacity(counts.total_weight() as usize / 10);
    let mut current_y = SECTION_TOP + 20;

    for size in StallSize::ALL {
        let count = counts.count(size) as i32;
        if count <= 0 {
            continue;
        }

        let (width, height) = size.footprint();
        let row_height = height + ROW_GAP;
        let per_row = (USABLE_WIDTH + STALL_GAP) / (width + STALL_GAP);
        let rows = (count + per_row - 1) / per_row;

        let mut idx = 0;
        for row in 0..rows {
            let row_count = per_row.min(count - idx);
            let row_width = row_count * width + (row_count - 1) * STALL_GAP;
            let start_x = MARGIN_X + (USABLE_WIDTH - row_width) / 2;

            for col in 0..row_count {
                idx += 1;
                stalls.push(Stall::new(
                    format!("{}-{:02}", size.prefix(), idx),
                    size,
                    start_x + col * (width + STALL_GAP),
                    current_y + row * row_height,
                ));
            }
        }

        debug!(size = ?size, count = count, rows = rows, "Placed size group");
        current_y += rows * row_height + GROUP_GAP;
    }

    crate::invariants::assert_layout_invariants(&stalls);

    Ok(stalls)
}

/// Assign the per-group prices onto a generated layout.
pub fn apply_group_prices(stalls: &mut [Stall], prices: &GroupPrices) {
    for stall in stalls {
        stall.price = prices.price(stall.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_small_stalls() {
        let stalls = generate_default_positions(&StallCounts::new(4, 0, 0)).unwrap();
        let codes: Vec<&str> = stalls.iter().map(|s| s.stall_code.as_str()).collect();
        assert_eq!(codes, ["S-01", "S-02", "S-03", "S-04"]);
        for stall in &stalls {
            assert!(stall.rect().within_hall());
        }
        for (i, a) in stalls.iter().enumerate() {
            for b in &stalls[i + 1..] {
                assert!(
                    !a.rect().intersects(&b.rect()),
                    "{} overlaps {}",
                    a.stall_code,
                    b.stall_code
                );
            }
        }
    }

    #[test]
    fn test_generation_is_idempotent() {
        let counts = StallCounts::new(12, 7, 3);
        let first = generate_default_positions(&counts).unwrap();
        let second = generate_default_positions(&counts).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.stall_code, b.stall_code);
            assert_eq!((a.position_x, a.position_y), (b.position_x, b.position_y));
        }
    }

    #[test]
    fn test_groups_stack_vertically() {
        let stalls = generate_default_positions(&StallCounts::new(2, 2, 2)).unwrap();
        let max_small_bottom = stalls
            .iter()
            .filter(|s| s.size == StallSize::Small)
            .map(|s| s.position_y + s.size.footprint().1)
            .max()
            .unwrap();
        let min_medium_top = stalls
            .iter()
            .filter(|s| s.size == StallSize::Medium)
            .map(|s| s.position_y)
            .min()
            .unwrap();
        assert!(min_medium_top >= max_small_bottom);
    }

    #[test]
    fn test_full_rows_wrap() {
        // 11 small stalls fit one row; the twelfth starts a second row.
        let stalls = generate_default_positions(&StallCounts::new(12, 0, 0)).unwrap();
        let first_y = stalls[0].position_y;
        assert!(stalls[..11].iter().all(|s| s.position_y == first_y));
        assert!(stalls[11].position_y > first_y);
    }

    #[test]
    fn test_zero_counts_yield_empty_layout() {
        let stalls = generate_default_positions(&StallCounts::default()).unwrap();
        assert!(stalls.is_empty());
    }

    #[test]
    fn test_over_capacity_refused_with_deficit() {
        let err = generate_default_positions(&StallCounts::new(109, 0, 0)).unwrap_err();
        match err {
            Error::CapacityExceeded { total, remaining } => {
                assert_eq!(total, 1090);
                assert_eq!(remaining, -10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prices_applied_per_group() {
        let mut stalls = generate_default_positions(&StallCounts::new(1, 1, 1)).unwrap();
        apply_group_prices(
            &mut stalls,
            &GroupPrices {
                small: 500.0,
                medium: 900.0,
                large: 2000.0,
            },
        );
        assert_eq!(stalls[0].price, 500.0);
        assert_eq!(stalls[2].price, 2000.0);
    }

    #[test]
    fn test_boundary_count_generates() {
        // 108 small stalls is the exact capacity boundary and must succeed.
        let stalls = generate_default_positions(&StallCounts::new(108, 0, 0)).unwrap();
        assert_eq!(stalls.len(), 108);
        assert!(stalls.iter().all(|s| s.rect().within_hall()));
    }
}
