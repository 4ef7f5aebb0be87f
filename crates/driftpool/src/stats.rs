//! # Statistics
//!
//! Read-only counters fed by tick outcomes. The collector never touches the
//! pool; it only samples counts from it.

use driftpool_core::EntityPool;
use serde::Serialize;

use crate::simulation::TickReport;

/// Immutable view of the counters at the end of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// Slots in the pool.
    pub capacity: usize,
    /// Entities currently active.
    pub active_count: usize,
    /// Highest active count seen.
    pub peak_active: usize,
    /// Spawns that got a slot.
    pub total_spawned: u64,
    /// Entities released for leaving the playfield.
    pub total_recycled: u64,
    /// Entities released for outliving their lifespan.
    pub total_expired: u64,
    /// Entities released by the host (collisions, pickups).
    pub total_despawned: u64,
    /// Edge wraps performed.
    pub total_wrapped: u64,
    /// Spawns dropped on exhaustion or queue overflow.
    pub total_dropped: u64,
}

/// Accumulates counters owned by one simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatsCollector {
    current: StatsSnapshot,
}

impl StatsCollector {
    /// Creates a collector with every counter at zero.
    #[must_use]
    pub fn new(pool: &EntityPool) -> Self {
        let mut collector = Self::default();
        collector.sample(pool);
        collector
    }

    /// Folds one tick's report into the totals and re-samples the pool.
    pub fn observe(&mut self, report: &TickReport, pool: &EntityPool) {
        let c = &mut self.current;
        c.tick = report.tick;
        c.total_spawned += report.spawned as u64;
        c.total_dropped += report.dropped as u64;
        c.total_recycled += report.recycled as u64;
        c.total_expired += report.expired as u64;
        c.total_wrapped += report.wrapped as u64;
        self.sample(pool);
    }

    /// Records a spawn attempt made outside the tick.
    pub fn record_spawn(&mut self, spawned: bool, pool: &EntityPool) {
        if spawned {
            self.current.total_spawned += 1;
        } else {
            self.current.total_dropped += 1;
        }
        self.sample(pool);
    }

    /// Records a release made by the host.
    pub fn record_despawn(&mut self, pool: &EntityPool) {
        self.current.total_despawned += 1;
        self.sample(pool);
    }

    /// Re-reads capacity and active count from the pool.
    pub fn sample(&mut self, pool: &EntityPool) {
        let c = &mut self.current;
        c.capacity = pool.capacity();
        c.active_count = pool.active_count();
        c.peak_active = c.peak_active.max(c.active_count);
    }

    /// Returns the current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> StatsSnapshot {
        self.current
    }
}
