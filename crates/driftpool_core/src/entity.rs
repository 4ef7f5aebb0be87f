//! # Entity Records
//!
//! An entity is one fixed slot in the pool's backing array. It is never
//! allocated or freed on its own; it only toggles between active and inactive.
//!
//! Handles consist of:
//! - A slot index into the backing array
//! - A generation counter for detecting stale references

use crate::component::Vec2;

/// Opaque reference to a pool slot.
///
/// A handle is valid only while its slot stays active. Once the slot is
/// released (and possibly re-acquired) the generation no longer matches and
/// every lookup through the old handle yields nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Index into the backing array.
    slot: u32,
    /// Generation of the slot at acquire time.
    generation: u32,
}

impl Handle {
    #[inline]
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    #[inline]
    pub(crate) const fn raw_slot(self) -> u32 {
        self.slot
    }

    /// Returns the stable slot id this handle points at.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }

    /// Returns the generation this handle was issued with.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Initial state written into a freshly acquired slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnState {
    /// Starting position.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Angular velocity in radians per second.
    pub angular_velocity: f64,
    /// Seconds the entity may live before it is reclaimed. `None` = unlimited.
    pub lifespan: Option<f64>,
}

impl SpawnState {
    /// Creates a spawn state with the given position and velocity.
    #[inline]
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            angular_velocity: 0.0,
            lifespan: None,
        }
    }

    /// Sets the angular velocity.
    #[inline]
    #[must_use]
    pub const fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Sets the lifespan in seconds.
    #[inline]
    #[must_use]
    pub const fn with_lifespan(mut self, seconds: f64) -> Self {
        self.lifespan = Some(seconds);
        self
    }

    /// Returns `true` if every motion value is finite and the lifespan is
    /// not NaN.
    ///
    /// A non-finite position never satisfies a region exit test, so such an
    /// entity would hold its slot forever.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.angular_velocity.is_finite()
            && !self.lifespan.is_some_and(f64::is_nan)
    }
}

/// One slot of pool storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityRecord {
    /// Stable index into backing storage.
    slot_id: u32,
    /// Bumped every time the slot is acquired.
    generation: u32,
    /// Whether the slot currently holds a live entity.
    active: bool,
    /// Current position.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Angular velocity in radians per second.
    pub angular_velocity: f64,
    /// Accumulated rotation in radians.
    pub rotation: f64,
    /// Seconds since the slot was acquired.
    pub age: f64,
    /// Seconds the entity may live. `None` = unlimited.
    pub lifespan: Option<f64>,
    /// Pool epoch at acquire time (diagnostics only).
    spawn_tick: u64,
}

impl EntityRecord {
    /// Creates an inactive record for the given slot.
    #[inline]
    #[must_use]
    pub(crate) const fn vacant(slot_id: u32) -> Self {
        Self {
            slot_id,
            generation: 0,
            active: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            rotation: 0.0,
            age: 0.0,
            lifespan: None,
            spawn_tick: 0,
        }
    }

    /// Returns the stable slot id.
    #[inline]
    #[must_use]
    pub const fn slot_id(&self) -> usize {
        self.slot_id as usize
    }

    /// Returns the current generation.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns whether the slot is active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the pool epoch at which the entity was spawned.
    #[inline]
    #[must_use]
    pub const fn spawn_tick(&self) -> u64 {
        self.spawn_tick
    }

    /// Returns the handle for the current occupant.
    #[inline]
    #[must_use]
    pub(crate) const fn handle(&self) -> Handle {
        Handle::new(self.slot_id, self.generation)
    }

    /// Returns `true` once the entity has outlived its lifespan.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.lifespan.is_some_and(|limit| self.age >= limit)
    }

    /// Writes a spawn state into the record.
    #[inline]
    pub fn apply(&mut self, state: &SpawnState) {
        self.position = state.position;
        self.velocity = state.velocity;
        self.angular_velocity = state.angular_velocity;
        self.lifespan = state.lifespan;
    }

    /// Advances position, rotation and age by `delta` seconds.
    #[inline]
    pub(crate) fn integrate(&mut self, delta: f64) {
        self.position += self.velocity * delta;
        self.rotation += self.angular_velocity * delta;
        self.age += delta;
    }

    /// Marks the slot active under a new generation and returns its handle.
    #[inline]
    pub(crate) fn activate(&mut self, spawn_tick: u64) -> Handle {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        self.spawn_tick = spawn_tick;
        self.handle()
    }

    /// Clears motion state and marks the slot inactive.
    ///
    /// The generation is kept so outstanding handles stay stale.
    #[inline]
    pub(crate) fn deactivate(&mut self) {
        let generation = self.generation;
        *self = Self::vacant(self.slot_id);
        self.generation = generation;
    }

    /// Returns `true` if `handle` refers to this record's current occupant.
    #[inline]
    #[must_use]
    pub(crate) const fn matches(&self, handle: Handle) -> bool {
        self.active && self.generation == handle.generation
    }
}
