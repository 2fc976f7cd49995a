//! Error types for protocol primitives

use thiserror::Error;

/// Primitive result type
pub type Result<T> = std::result::Result<T, Error>;

/// Primitive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Accumulator is at maximum capacity (2^depth - 1 leaves)
    #[error("Merkle accumulator full: capacity {capacity} reached")]
    TreeFull {
        /// Maximum leaf count
        capacity: u64,
    },

    /// Leaf index outside the accumulated range
    #[error("Leaf index {index} out of bounds ({count} leaves)")]
    IndexOutOfBounds {
        /// Requested leaf index
        index: u64,
        /// Current leaf count
        count: u64,
    },
}
