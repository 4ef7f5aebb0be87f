//! # Memory Management
//!
//! Pre-allocated entity storage for transient simulated objects.
//!
//! ## Design Philosophy
//!
//! All slots are allocated once when the pool is created. During a tick:
//! - No heap allocations
//! - No per-entity destruction, only an active flag and a returned index
//! - Deterministic slot order under saturation

mod pool;

pub use pool::{EntityPool, ExhaustionPolicy};
