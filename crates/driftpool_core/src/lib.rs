//! # DRIFTPOOL Core
//!
//! Fixed-capacity storage for transient 2D entities (bullets, obstacles,
//! particles) designed for:
//! - Hard capacity bounds with clean exhaustion
//! - O(1) slot reuse through a free list
//! - Zero allocations while a simulation runs
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in the tick path** - All slots are pre-allocated
//! 2. **Stable slots** - A record never moves to a different index
//! 3. **Generation-checked handles** - Stale handles never alias new entities
//!
//! ## Example
//!
//! ```rust,ignore
//! use driftpool_core::{EntityPool, SpawnState, Vec2};
//!
//! let mut pool = EntityPool::new(50);
//! let bullet = pool.acquire_with(&SpawnState::new(Vec2::new(400.0, 500.0), Vec2::new(0.0, -400.0)));
//! pool.integrate(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod component;
pub mod entity;
pub mod error;
pub mod memory;

pub use component::Vec2;
pub use entity::{EntityRecord, Handle, SpawnState};
pub use error::{PoolError, PoolResult};
pub use memory::{EntityPool, ExhaustionPolicy};
