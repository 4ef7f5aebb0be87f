//! # Spawn Controller
//!
//! Decides *when* a spawn is attempted and *what* state it starts with.
//!
//! Two triggering modes:
//! - **Timer-driven**: a [`SpawnTimer`] fires at its own cadence, independent
//!   of the frame rate, and requests a batch per firing
//! - **Event-driven**: a discrete input requests one spawn, gated by a
//!   [`Cooldown`] so a held key does not spawn every frame
//!
//! Requests from producers are queued and consumed on the next tick.
//! A spawn that finds the pool exhausted is dropped, never retried.

use std::collections::VecDeque;

use driftpool_core::{EntityPool, SpawnState, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// COOLDOWN
// ============================================================================

/// Minimum-elapsed-time gate for event-driven spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cooldown {
    /// Seconds required between two accepted events.
    min_interval: f64,
    /// Clock time of the last accepted event.
    last_fired: Option<f64>,
}

impl Cooldown {
    /// Creates a cooldown that has never fired.
    #[must_use]
    pub const fn new(min_interval: f64) -> Self {
        Self {
            min_interval,
            last_fired: None,
        }
    }

    /// Returns the minimum interval in seconds.
    #[must_use]
    pub const fn min_interval(&self) -> f64 {
        self.min_interval
    }

    /// Returns `true` if an event at `now` would pass the gate.
    #[must_use]
    pub fn is_ready(&self, now: f64) -> bool {
        match self.last_fired {
            Some(last) => now - last >= self.min_interval,
            None => true,
        }
    }

    /// Passes the gate if ready, recording `now` as the last firing.
    pub fn try_fire(&mut self, now: f64) -> bool {
        if !self.is_ready(now) {
            return false;
        }
        self.last_fired = Some(now);
        true
    }

    /// Forgets the last firing.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

// ============================================================================
// SPAWN PATTERN
// ============================================================================

/// How a timer derives the initial state of each spawn.
///
/// Jitter values are half-widths of a uniform range around the base value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnPattern {
    /// State every spawn starts from.
    pub base: SpawnState,
    /// Half-width of the uniform position offset per axis.
    pub position_jitter: Vec2,
    /// Half-width of the uniform velocity offset per axis.
    pub velocity_jitter: Vec2,
}

impl SpawnPattern {
    /// A pattern that always yields `base`.
    #[must_use]
    pub const fn fixed(base: SpawnState) -> Self {
        Self {
            base,
            position_jitter: Vec2::ZERO,
            velocity_jitter: Vec2::ZERO,
        }
    }

    /// Adds uniform position jitter.
    #[must_use]
    pub const fn with_position_jitter(mut self, x: f64, y: f64) -> Self {
        self.position_jitter = Vec2::new(x, y);
        self
    }

    /// Adds uniform velocity jitter.
    #[must_use]
    pub const fn with_velocity_jitter(mut self, x: f64, y: f64) -> Self {
        self.velocity_jitter = Vec2::new(x, y);
        self
    }

    /// Draws one initial state.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> SpawnState {
        let mut state = self.base;
        state.position.x += jitter(rng, self.position_jitter.x);
        state.position.y += jitter(rng, self.position_jitter.y);
        state.velocity.x += jitter(rng, self.velocity_jitter.x);
        state.velocity.y += jitter(rng, self.velocity_jitter.y);
        state
    }
}

fn jitter<R: Rng>(rng: &mut R, half_width: f64) -> f64 {
    let half_width = half_width.abs();
    if half_width == 0.0 || !half_width.is_finite() {
        return 0.0;
    }
    rng.gen_range(-half_width..=half_width)
}

// ============================================================================
// SPAWN TIMER
// ============================================================================

/// Identifier of a timer registered with a [`SpawnController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(usize);

/// Repeating spawn timer with its own cadence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnTimer {
    /// Seconds between firings.
    interval: f64,
    /// Spawns requested per firing.
    batch: u32,
    /// Maximum number of firings. `None` = forever.
    repeat: Option<u32>,
    /// Initial state generator.
    pattern: SpawnPattern,
    /// Time carried over toward the next firing.
    accumulator: f64,
    /// Firings so far.
    fired: u32,
    /// Whether the timer is still counting.
    running: bool,
}

impl SpawnTimer {
    /// Creates a timer firing one spawn every `interval` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is not a positive finite number.
    #[must_use]
    pub fn new(interval: f64, pattern: SpawnPattern) -> Self {
        assert!(
            interval.is_finite() && interval > 0.0,
            "Timer interval must be positive"
        );
        Self {
            interval,
            batch: 1,
            repeat: None,
            pattern,
            accumulator: 0.0,
            fired: 0,
            running: true,
        }
    }

    /// Spawns `batch` entities per firing.
    #[must_use]
    pub const fn with_batch(mut self, batch: u32) -> Self {
        self.batch = batch;
        self
    }

    /// Stops after `limit` firings.
    #[must_use]
    pub const fn with_repeat(mut self, limit: u32) -> Self {
        self.repeat = Some(limit);
        self
    }

    /// Returns the interval in seconds.
    #[must_use]
    pub const fn interval(&self) -> f64 {
        self.interval
    }

    /// Returns the batch size.
    #[must_use]
    pub const fn batch(&self) -> u32 {
        self.batch
    }

    /// Returns the spawn pattern.
    #[must_use]
    pub const fn pattern(&self) -> &SpawnPattern {
        &self.pattern
    }

    /// Returns how many times the timer has fired.
    #[must_use]
    pub const fn fired(&self) -> u32 {
        self.fired
    }

    /// Returns `true` while the timer is counting.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the timer. A stopped timer never fires again.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Accumulates `delta` seconds and returns how many firings fell due.
    pub fn advance(&mut self, delta: f64) -> u32 {
        if !self.running {
            return 0;
        }

        self.accumulator += delta;
        let mut elapsed = (self.accumulator / self.interval).floor();
        if let Some(limit) = self.repeat {
            elapsed = elapsed.min(f64::from(limit.saturating_sub(self.fired)));
        }
        // Float-to-int `as` saturates, so a huge backlog clamps to u32::MAX
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let due = elapsed as u32;

        self.accumulator = (self.accumulator - f64::from(due) * self.interval).max(0.0);
        self.fired = self.fired.saturating_add(due);

        if self.repeat.is_some_and(|limit| self.fired >= limit) {
            self.running = false;
        }
        due
    }
}

// ============================================================================
// SPAWN CONTROLLER
// ============================================================================

/// Counts from one spawn phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Spawns that got a slot.
    pub spawned: usize,
    /// Spawns dropped on exhaustion or queue overflow.
    pub dropped: usize,
}

impl SpawnOutcome {
    fn record(&mut self, spawned: bool) {
        if spawned {
            self.spawned += 1;
        } else {
            self.dropped += 1;
        }
    }
}

/// Owns spawn requests, timers and the event cooldown.
#[derive(Clone, Debug)]
pub struct SpawnController {
    /// Requests waiting for the next tick.
    pending: VecDeque<SpawnState>,
    /// Queue bound.
    max_pending: usize,
    /// Requests rejected at the queue, not yet reported.
    rejected: usize,
    /// Registered timers.
    timers: Vec<SpawnTimer>,
    /// Gate for event-driven spawns.
    cooldown: Option<Cooldown>,
    /// Source of spawn jitter.
    rng: ChaCha8Rng,
}

impl SpawnController {
    /// Creates a controller with a bounded request queue and RNG seed.
    #[must_use]
    pub fn new(max_pending: usize, seed: u64) -> Self {
        Self {
            pending: VecDeque::with_capacity(max_pending),
            max_pending,
            rejected: 0,
            timers: Vec::new(),
            cooldown: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Gates event-driven spawns behind a minimum interval.
    #[must_use]
    pub fn with_cooldown(mut self, min_interval: f64) -> Self {
        self.cooldown = Some(Cooldown::new(min_interval));
        self
    }

    /// Returns the cooldown gate, if any.
    #[must_use]
    pub const fn cooldown(&self) -> Option<&Cooldown> {
        self.cooldown.as_ref()
    }

    /// Returns the number of queued requests.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Acquires a slot and writes `state` into it.
    ///
    /// # Returns
    ///
    /// `false` if the pool is exhausted or `state` is not finite; the spawn
    /// is dropped.
    pub fn try_spawn(pool: &mut EntityPool, state: &SpawnState) -> bool {
        if !state.is_finite() {
            tracing::warn!(?state, "non-finite spawn state, spawn dropped");
            return false;
        }
        if pool.acquire_with(state).is_some() {
            return true;
        }
        tracing::debug!(
            capacity = pool.capacity(),
            "pool exhausted, spawn dropped"
        );
        false
    }

    /// Queues a spawn for the next tick.
    ///
    /// # Returns
    ///
    /// `false` if the queue is full or `state` is not finite; the request is
    /// dropped.
    pub fn request_spawn(&mut self, state: SpawnState) -> bool {
        if !state.is_finite() {
            self.rejected += 1;
            tracing::warn!(?state, "non-finite spawn state, request dropped");
            return false;
        }
        if self.pending.len() >= self.max_pending {
            self.rejected += 1;
            tracing::warn!(max_pending = self.max_pending, "spawn queue full, request dropped");
            return false;
        }
        self.pending.push_back(state);
        true
    }

    /// Event-driven spawn: passes the cooldown gate at `now`, then queues.
    ///
    /// # Returns
    ///
    /// `false` if the gate is closed or the queue is full.
    pub fn trigger(&mut self, now: f64, state: SpawnState) -> bool {
        if let Some(cooldown) = &self.cooldown {
            if !cooldown.is_ready(now) {
                return false;
            }
        }
        if !self.request_spawn(state) {
            return false;
        }
        if let Some(cooldown) = &mut self.cooldown {
            cooldown.try_fire(now);
        }
        true
    }

    /// Registers a timer.
    pub fn add_timer(&mut self, timer: SpawnTimer) -> TimerId {
        self.timers.push(timer);
        TimerId(self.timers.len() - 1)
    }

    /// Returns a registered timer.
    #[must_use]
    pub fn timer(&self, id: TimerId) -> Option<&SpawnTimer> {
        self.timers.get(id.0)
    }

    /// Stops a registered timer.
    ///
    /// # Returns
    ///
    /// `false` if the id is unknown.
    pub fn stop_timer(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(id.0) {
            Some(timer) => {
                timer.stop();
                true
            }
            None => false,
        }
    }

    /// Runs the spawn phase of a tick: queued requests first, then timers.
    pub fn run(&mut self, pool: &mut EntityPool, delta: f64) -> SpawnOutcome {
        let mut outcome = SpawnOutcome {
            dropped: std::mem::take(&mut self.rejected),
            ..SpawnOutcome::default()
        };

        while let Some(state) = self.pending.pop_front() {
            outcome.record(Self::try_spawn(pool, &state));
        }

        for timer in &mut self.timers {
            let requested = timer.advance(delta).saturating_mul(timer.batch);
            for issued in 0..requested {
                let state = timer.pattern.sample(&mut self.rng);
                if !Self::try_spawn(pool, &state) {
                    // Nothing else will fit this tick
                    outcome.dropped += (requested - issued) as usize;
                    break;
                }
                outcome.spawned += 1;
            }
        }

        outcome
    }

    /// Drops all queued requests and resets the cooldown.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
        self.rejected = 0;
        if let Some(cooldown) = &mut self.cooldown {
            cooldown.reset();
        }
    }
}
