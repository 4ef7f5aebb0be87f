//! # Entity Pool
//!
//! Fixed-capacity arena of entity records with an index free list.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::component::Vec2;
use crate::entity::{EntityRecord, Handle, SpawnState};
use crate::error::{PoolError, PoolResult};

/// What `acquire` does once every slot is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Strict bound: `acquire` returns `None` and the spawn is dropped.
    #[default]
    Drop,
    /// Opt-in fallback: append fresh slots until `max_capacity` is reached.
    ///
    /// Existing slot ids never move; new slots are added at the end.
    Grow {
        /// Hard ceiling on the number of slots.
        max_capacity: usize,
    },
}

/// A pool of homogeneous transient entities.
///
/// All storage is allocated once. During the simulation:
/// - `acquire` pops the lowest free slot index
/// - `release` resets the record and pushes the index back
/// - iteration walks the backing array and skips inactive slots
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by exactly one simulation.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = EntityPool::new(20);
///
/// let handle = pool.acquire()?;
/// pool.init(handle, &SpawnState::new(Vec2::new(400.0, 500.0), Vec2::new(0.0, -400.0)));
///
/// pool.release(handle);
/// ```
#[derive(Debug, Clone)]
pub struct EntityPool {
    /// Backing storage, one record per slot.
    records: Vec<EntityRecord>,
    /// Inactive slot indices, lowest first.
    free_list: BinaryHeap<Reverse<u32>>,
    /// Number of active slots.
    active_count: usize,
    /// Behavior when the free list is empty.
    policy: ExhaustionPolicy,
    /// Number of integration steps taken so far.
    epoch: u64,
}

impl EntityPool {
    /// Creates a strictly bounded pool with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, ExhaustionPolicy::Drop)
    }

    /// Creates a pool with an explicit exhaustion policy.
    ///
    /// With [`ExhaustionPolicy::Grow`] memory for `max_capacity` slots is
    /// reserved upfront so growth never reallocates.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero, exceeds `u32::MAX`, or is larger than a
    /// `Grow` policy's `max_capacity`.
    #[must_use]
    pub fn with_policy(capacity: usize, policy: ExhaustionPolicy) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        let reserve = match policy {
            ExhaustionPolicy::Drop => capacity,
            ExhaustionPolicy::Grow { max_capacity } => {
                assert!(
                    max_capacity >= capacity,
                    "max_capacity must be at least the initial capacity"
                );
                max_capacity
            }
        };
        assert!(
            u32::try_from(reserve).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        let mut records = Vec::with_capacity(reserve);
        let mut free_list = BinaryHeap::with_capacity(reserve);
        for slot in 0..capacity as u32 {
            records.push(EntityRecord::vacant(slot));
            free_list.push(Reverse(slot));
        }

        Self {
            records,
            free_list,
            active_count: 0,
            policy,
            epoch: 0,
        }
    }

    /// Returns the current number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Returns the number of active entities.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count
    }

    /// Returns the exhaustion policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    /// Returns the number of integration steps taken so far.
    #[inline]
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Moves the lowest free slot to active and returns its handle.
    ///
    /// The slot's motion state is at its neutral default; the caller
    /// initializes it through [`EntityPool::init`] or [`EntityPool::get_mut`].
    ///
    /// # Returns
    ///
    /// `None` if the pool is exhausted. Nothing changes in that case.
    pub fn acquire(&mut self) -> Option<Handle> {
        let slot = match self.free_list.pop() {
            Some(Reverse(slot)) => slot as usize,
            None => self.grow_one()?,
        };

        let handle = self.records[slot].activate(self.epoch);
        self.active_count += 1;
        Some(handle)
    }

    /// Acquires a slot and writes `state` into it.
    pub fn acquire_with(&mut self, state: &SpawnState) -> Option<Handle> {
        let handle = self.acquire()?;
        self.records[handle.slot()].apply(state);
        Some(handle)
    }

    fn grow_one(&mut self) -> Option<usize> {
        let ExhaustionPolicy::Grow { max_capacity } = self.policy else {
            return None;
        };
        let slot = self.records.len();
        if slot >= max_capacity {
            return None;
        }

        let slot_id = u32::try_from(slot).ok()?;
        self.records.push(EntityRecord::vacant(slot_id));
        tracing::debug!(capacity = slot + 1, max_capacity, "entity pool grew");
        Some(slot)
    }

    /// Releases the entity behind `handle`, returning its slot to the free list.
    ///
    /// Releasing an inactive or stale handle is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if a slot was actually released.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the handle points outside the pool.
    /// Release builds log the misuse and ignore the call.
    pub fn release(&mut self, handle: Handle) -> bool {
        match self.try_release(handle) {
            Ok(released) => released,
            Err(err) => {
                if cfg!(debug_assertions) {
                    panic!("{err}");
                }
                tracing::error!(%err, "rejected release");
                false
            }
        }
    }

    /// Releases the entity behind `handle`, reporting out-of-range handles.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] if the slot index is not inside
    /// this pool.
    pub fn try_release(&mut self, handle: Handle) -> PoolResult<bool> {
        let capacity = self.capacity();
        let record = self
            .records
            .get_mut(handle.slot())
            .ok_or(PoolError::InvalidHandle {
                slot: handle.slot(),
                capacity,
            })?;

        if !record.matches(handle) {
            return Ok(false);
        }

        record.deactivate();
        self.free_list.push(Reverse(handle.raw_slot()));
        self.active_count -= 1;
        Ok(true)
    }

    /// Gets the record behind a live handle.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&EntityRecord> {
        self.records
            .get(handle.slot())
            .filter(|record| record.matches(handle))
    }

    /// Gets the record behind a live handle mutably.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut EntityRecord> {
        self.records
            .get_mut(handle.slot())
            .filter(|record| record.matches(handle))
    }

    /// Writes a spawn state into a live slot.
    ///
    /// # Returns
    ///
    /// `false` if the handle is stale.
    pub fn init(&mut self, handle: Handle, state: &SpawnState) -> bool {
        match self.get_mut(handle) {
            Some(record) => {
                record.apply(state);
                true
            }
            None => false,
        }
    }

    /// Returns the handle of the entity occupying `slot`, if it is active.
    #[inline]
    #[must_use]
    pub fn handle_at(&self, slot: usize) -> Option<Handle> {
        self.records
            .get(slot)
            .filter(|record| record.is_active())
            .map(EntityRecord::handle)
    }

    /// Iterates handles of active slots in index order.
    ///
    /// The walk allocates nothing and can be restarted at any time.
    pub fn iterate_active(&self) -> impl Iterator<Item = Handle> + '_ {
        self.iter_active_records().map(|(handle, _)| handle)
    }

    /// Iterates active records together with their handles, in index order.
    pub fn iter_active_records(&self) -> impl Iterator<Item = (Handle, &EntityRecord)> {
        self.records
            .iter()
            .filter(|record| record.is_active())
            .map(|record| (record.handle(), record))
    }

    /// Advances every active entity by `delta` seconds.
    ///
    /// `position += velocity * delta`, `rotation += angular_velocity * delta`,
    /// and each entity's age grows by `delta`. Bumps the pool epoch.
    pub fn integrate(&mut self, delta: f64) {
        self.epoch += 1;
        for record in self.records.iter_mut().filter(|r| r.is_active()) {
            record.integrate(delta);
        }
    }

    /// Releases every entity, keeping generations so old handles stay stale.
    pub fn clear(&mut self) {
        for record in &mut self.records {
            record.deactivate();
        }
        self.free_list.clear();
        self.free_list
            .extend((0..self.records.len() as u32).map(Reverse));
        self.active_count = 0;
    }

    /// Copies active positions into `buf` and returns them as raw bytes.
    ///
    /// Intended for GPU upload; `buf` is reused between frames so steady-state
    /// calls do not allocate.
    pub fn pack_active_positions<'b>(&self, buf: &'b mut Vec<Vec2>) -> &'b [u8] {
        buf.clear();
        buf.extend(
            self.records
                .iter()
                .filter(|record| record.is_active())
                .map(|record| record.position),
        );
        bytemuck::cast_slice(buf.as_slice())
    }
}
