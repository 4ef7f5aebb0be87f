//! # Simulation Clock
//!
//! Tick counter and elapsed time. Frame deltas are sanitized here before
//! anything integrates with them.

/// Timekeeping for one simulation instance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationClock {
    /// Ticks taken so far.
    tick: u64,
    /// Seconds simulated so far.
    elapsed: f64,
    /// Upper bound applied to each delta.
    max_delta: Option<f64>,
}

impl SimulationClock {
    /// Creates a clock at tick zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            max_delta: None,
        }
    }

    /// Clamps every delta to `max_delta` seconds.
    ///
    /// Useful to stop a long frame hitch from teleporting entities.
    #[must_use]
    pub const fn with_max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = Some(max_delta);
        self
    }

    /// Returns the number of ticks taken.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the simulated time in seconds.
    #[inline]
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Returns the delta clamp, if any.
    #[inline]
    #[must_use]
    pub const fn max_delta(&self) -> Option<f64> {
        self.max_delta
    }

    /// Advances one tick and returns the delta actually applied.
    ///
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, delta: f64) -> f64 {
        let mut delta = if delta.is_finite() && delta >= 0.0 {
            delta
        } else {
            tracing::warn!(delta, tick = self.tick, "invalid frame delta, using zero");
            0.0
        };
        if let Some(max) = self.max_delta {
            delta = delta.min(max);
        }

        self.tick += 1;
        self.elapsed += delta;
        delta
    }
}
