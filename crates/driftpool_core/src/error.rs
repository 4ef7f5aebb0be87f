//! # Pool Error Types
//!
//! Misuse of the pool API. Exhaustion and redundant releases are not errors.

use thiserror::Error;

/// Errors that can occur when talking to an entity pool.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The handle points outside the pool's backing array.
    #[error("invalid handle: slot {slot} is outside pool of capacity {capacity}")]
    InvalidHandle {
        /// The offending slot index.
        slot: usize,
        /// Capacity of the pool at the time of the call.
        capacity: usize,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
