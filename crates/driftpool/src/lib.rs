//! # DRIFTPOOL
//!
//! Pooled simulation of homogeneous transient entities for 2D games.
//!
//! ## Design Principles
//!
//! 1. **Fixed memory** - The pool is sized once; spawns past capacity are dropped
//! 2. **Deterministic** - Same seed, same deltas, same entity stream
//! 3. **Recycle at the edge** - Entities leaving the playfield free their slot
//! 4. **External configuration** - Scene tuning lives in TOML files
//!
//! ## Tick Order
//!
//! Clock, integrate, spawn, recycle, stats. See [`Simulation::tick`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use driftpool::{SimulationConfig, SpawnState, Vec2};
//!
//! let mut sim = SimulationConfig::from_file("data/falling_obstacles.toml")?.build()?;
//! sim.try_spawn(SpawnState::new(Vec2::new(400.0, -20.0), Vec2::new(0.0, 200.0)));
//!
//! loop {
//!     let report = sim.tick(frame_delta);
//!     for entity in sim.iterate_active() {
//!         draw(entity.position, entity.rotation);
//!     }
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod recycler;
pub mod simulation;
pub mod spawn;
pub mod stats;

pub use clock::SimulationClock;
pub use config::{
    BoundaryConfig, ClockConfig, ConfigError, ConfigResult, PoolConfig, SimulationConfig,
    SpawnConfig, TimerConfig,
};
pub use recycler::{
    BoundaryRecycler, Bounds, EdgePolicy, Edges, ExitPredicate, ExitRule, RecycleOutcome,
};
pub use simulation::{ActiveEntity, Simulation, TickReport};
pub use spawn::{Cooldown, SpawnController, SpawnOutcome, SpawnPattern, SpawnTimer, TimerId};
pub use stats::{StatsCollector, StatsSnapshot};

pub use driftpool_core::{
    EntityPool, EntityRecord, ExhaustionPolicy, Handle, PoolError, PoolResult, SpawnState, Vec2,
};
