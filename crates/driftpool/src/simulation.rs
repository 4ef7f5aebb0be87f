//! # Simulation
//!
//! Owns the pool and drives it once per rendered frame:
//! ```text
//! tick(delta):
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. INTEGRATE   position += velocity * delta (active only)    │
//! │ 2. SPAWN       queued requests, then timers that fell due    │
//! │ 3. RECYCLE     release / wrap on post-move positions         │
//! │ 4. STATS       fold the tick report into the counters        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Spawning before recycling means a newborn entity is only reclaimed in its
//! first tick if it was born outside the playfield.

use driftpool_core::{EntityPool, Handle, SpawnState, Vec2};
use serde::Serialize;

use crate::clock::SimulationClock;
use crate::recycler::BoundaryRecycler;
use crate::spawn::{SpawnController, SpawnTimer, TimerId};
use crate::stats::{StatsCollector, StatsSnapshot};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Delta actually applied, in seconds.
    pub delta: f64,
    /// Spawns that got a slot.
    pub spawned: usize,
    /// Spawns dropped on exhaustion or queue overflow.
    pub dropped: usize,
    /// Entities released for leaving the playfield.
    pub recycled: usize,
    /// Entities released for outliving their lifespan.
    pub expired: usize,
    /// Entities wrapped to the opposite edge.
    pub wrapped: usize,
    /// Active entities after the tick.
    pub active: usize,
}

/// Read-only view of one active entity, handed to render and collision code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveEntity {
    /// Handle of the entity.
    pub handle: Handle,
    /// Current position.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Angular velocity in radians per second.
    pub angular_velocity: f64,
    /// Accumulated rotation in radians.
    pub rotation: f64,
    /// Seconds since spawn.
    pub age: f64,
}

/// One pooled simulation of homogeneous transient entities.
#[derive(Clone, Debug)]
pub struct Simulation {
    pool: EntityPool,
    spawner: SpawnController,
    recycler: BoundaryRecycler,
    clock: SimulationClock,
    stats: StatsCollector,
}

impl Simulation {
    /// Creates a simulation around a pool and a recycler.
    ///
    /// The spawn queue holds up to one pool's worth of requests.
    #[must_use]
    pub fn new(pool: EntityPool, recycler: BoundaryRecycler) -> Self {
        let spawner = SpawnController::new(pool.capacity(), 0);
        let stats = StatsCollector::new(&pool);
        Self {
            pool,
            spawner,
            recycler,
            clock: SimulationClock::new(),
            stats,
        }
    }

    /// Replaces the spawn controller.
    #[must_use]
    pub fn with_spawner(mut self, spawner: SpawnController) -> Self {
        self.spawner = spawner;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: SimulationClock) -> Self {
        self.clock = clock;
        self
    }

    /// Advances the simulation by one frame.
    pub fn tick(&mut self, delta: f64) -> TickReport {
        let delta = self.clock.advance(delta);

        self.pool.integrate(delta);
        let spawn = self.spawner.run(&mut self.pool, delta);
        let recycle = self.recycler.sweep(&mut self.pool);

        let report = TickReport {
            tick: self.clock.tick(),
            delta,
            spawned: spawn.spawned,
            dropped: spawn.dropped,
            recycled: recycle.recycled,
            expired: recycle.expired,
            wrapped: recycle.wrapped,
            active: self.pool.active_count(),
        };
        self.stats.observe(&report, &self.pool);
        report
    }

    /// Queues a spawn for the next tick.
    ///
    /// # Returns
    ///
    /// `false` if the request queue is full or `state` is not finite. The
    /// rejection is counted as dropped on the next tick.
    pub fn request_spawn(&mut self, state: SpawnState) -> bool {
        self.spawner.request_spawn(state)
    }

    /// Event-driven spawn, gated by the spawner's cooldown.
    ///
    /// # Returns
    ///
    /// `false` if the cooldown has not elapsed or the queue is full.
    pub fn trigger(&mut self, state: SpawnState) -> bool {
        let now = self.clock.elapsed();
        self.spawner.trigger(now, state)
    }

    /// Spawns immediately, outside the tick.
    ///
    /// # Returns
    ///
    /// `false` if the pool is exhausted or `state` is not finite; the spawn
    /// is dropped.
    pub fn try_spawn(&mut self, state: SpawnState) -> bool {
        let spawned = SpawnController::try_spawn(&mut self.pool, &state);
        self.stats.record_spawn(spawned, &self.pool);
        spawned
    }

    /// Releases an entity on behalf of the host (a bullet hit something).
    ///
    /// Releasing an already released entity is a no-op.
    pub fn despawn(&mut self, handle: Handle) -> bool {
        let released = self.pool.release(handle);
        if released {
            self.stats.record_despawn(&self.pool);
        }
        released
    }

    /// Registers a repeating spawn timer.
    pub fn add_timer(&mut self, timer: SpawnTimer) -> TimerId {
        self.spawner.add_timer(timer)
    }

    /// Stops a spawn timer.
    pub fn stop_timer(&mut self, id: TimerId) -> bool {
        self.spawner.stop_timer(id)
    }

    /// Iterates active entities in slot order.
    pub fn iterate_active(&self) -> impl Iterator<Item = ActiveEntity> + '_ {
        self.pool
            .iter_active_records()
            .map(|(handle, record)| ActiveEntity {
                handle,
                position: record.position,
                velocity: record.velocity,
                angular_velocity: record.angular_velocity,
                rotation: record.rotation,
                age: record.age,
            })
    }

    /// Returns the counters as of the last change.
    #[must_use]
    pub const fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the pool (read-only).
    #[must_use]
    pub const fn pool(&self) -> &EntityPool {
        &self.pool
    }

    /// Returns the clock.
    #[must_use]
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Returns the spawn controller.
    #[must_use]
    pub const fn spawner(&self) -> &SpawnController {
        &self.spawner
    }

    /// Returns the recycler.
    #[must_use]
    pub const fn recycler(&self) -> &BoundaryRecycler {
        &self.recycler
    }

    /// Releases every entity and drops queued requests.
    ///
    /// Timers, the clock and the counters keep running.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.spawner.clear_pending();
        self.stats.sample(&self.pool);
    }
}
