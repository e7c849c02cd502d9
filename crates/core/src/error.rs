//! Error types for Fairfloor Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Requested stall counts exceed the hall's weighted capacity.
    /// Carries the computed total and the (negative) remaining headroom so
    /// callers can surface the deficit instead of a generic failure.
    #[error("Capacity exceeded: total weight {total}, remaining {remaining}")]
    CapacityExceeded { total: u32, remaining: i64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
