//! # Simulation Configuration
//!
//! Scene tuning lives in TOML and is loaded once at startup:
//!
//! ```toml
//! [pool]
//! capacity = 30
//!
//! [boundary]
//! policy = "recycle"
//! margin = 20.0
//! edges = { bottom = true }
//! bounds = { min_x = 0.0, min_y = 0.0, max_x = 800.0, max_y = 600.0 }
//!
//! [spawn]
//! seed = 12345
//! cooldown = 0.2
//!
//! [[spawn.timers]]
//! interval = 1.5
//! batch = 3
//! y = -20.0
//! vy = 200.0
//! jitter_x = 380.0
//! ```
//!
//! Every value is validated before a [`Simulation`] is built, so building
//! never panics on a validated config.

use std::path::{Path, PathBuf};

use driftpool_core::{EntityPool, ExhaustionPolicy, SpawnState, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::SimulationClock;
use crate::recycler::{BoundaryRecycler, Bounds, EdgePolicy, Edges, ExitRule};
use crate::simulation::Simulation;
use crate::spawn::{SpawnController, SpawnPattern, SpawnTimer};

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML was malformed or had the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A pool must hold at least one entity.
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,

    /// The growth ceiling is below the initial capacity.
    #[error("max_capacity {max_capacity} is below capacity {capacity}")]
    MaxCapacityBelowCapacity {
        /// Initial capacity.
        capacity: usize,
        /// Configured ceiling.
        max_capacity: usize,
    },

    /// The playfield rectangle is empty, inverted or not finite.
    #[error("invalid bounds: min ({min_x}, {min_y}) must be below max ({max_x}, {max_y})")]
    InvalidBounds {
        /// Left edge.
        min_x: f64,
        /// Top edge.
        min_y: f64,
        /// Right edge.
        max_x: f64,
        /// Bottom edge.
        max_y: f64,
    },

    /// A numeric field is out of range.
    #[error("invalid {field}: {value}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A timer would fire without spawning anything.
    #[error("timer {index}: batch must be at least 1")]
    ZeroBatch {
        /// Position of the timer in the list.
        index: usize,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Pool sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Slots allocated upfront.
    pub capacity: usize,
    /// Opt-in growth ceiling. Absent = strict drop on exhaustion.
    pub max_capacity: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            max_capacity: None,
        }
    }
}

impl PoolConfig {
    /// Returns the exhaustion policy this config selects.
    #[must_use]
    pub fn policy(&self) -> ExhaustionPolicy {
        match self.max_capacity {
            Some(max_capacity) => ExhaustionPolicy::Grow { max_capacity },
            None => ExhaustionPolicy::Drop,
        }
    }
}

fn default_screen() -> Bounds {
    Bounds::from_size(800.0, 600.0)
}

fn default_edges() -> Edges {
    Edges::ALL
}

/// Edge handling, tagged by `policy`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BoundaryConfig {
    /// Release entities that leave through one of `edges`.
    Recycle {
        /// The playfield.
        #[serde(default = "default_screen")]
        bounds: Bounds,
        /// Distance past an edge before an entity counts as gone.
        #[serde(default)]
        margin: f64,
        /// Edges that count as exits.
        #[serde(default = "default_edges")]
        edges: Edges,
    },
    /// Toroidal wrap around the padded playfield.
    Wrap {
        /// The playfield.
        #[serde(default = "default_screen")]
        bounds: Bounds,
        /// Padding before wrapping kicks in.
        #[serde(default)]
        margin: f64,
    },
    /// No edge handling.
    Unbounded,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self::Recycle {
            bounds: default_screen(),
            margin: 0.0,
            edges: Edges::ALL,
        }
    }
}

impl BoundaryConfig {
    /// Builds the recycler this config describes.
    #[must_use]
    pub fn recycler(&self) -> BoundaryRecycler {
        match *self {
            Self::Recycle {
                bounds,
                margin,
                edges,
            } => BoundaryRecycler::recycle(ExitRule::region(bounds, margin, edges)),
            Self::Wrap { bounds, margin } => BoundaryRecycler::wrap(bounds, margin),
            Self::Unbounded => BoundaryRecycler::new(EdgePolicy::Unbounded),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        let (bounds, margin) = match *self {
            Self::Recycle { bounds, margin, .. } | Self::Wrap { bounds, margin } => (bounds, margin),
            Self::Unbounded => return Ok(()),
        };
        if !bounds.is_valid() {
            return Err(ConfigError::InvalidBounds {
                min_x: bounds.min_x,
                min_y: bounds.min_y,
                max_x: bounds.max_x,
                max_y: bounds.max_y,
            });
        }
        non_negative("boundary.margin", margin)
    }
}

const fn default_batch() -> u32 {
    1
}

/// One repeating spawn timer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds between firings.
    pub interval: f64,
    /// Spawns per firing.
    #[serde(default = "default_batch")]
    pub batch: u32,
    /// Maximum firings. Absent = forever.
    #[serde(default)]
    pub repeat: Option<u32>,
    /// Spawn x.
    #[serde(default)]
    pub x: f64,
    /// Spawn y.
    #[serde(default)]
    pub y: f64,
    /// Horizontal velocity.
    #[serde(default)]
    pub vx: f64,
    /// Vertical velocity.
    #[serde(default)]
    pub vy: f64,
    /// Angular velocity in radians per second.
    #[serde(default)]
    pub angular_velocity: f64,
    /// Lifespan in seconds. Absent = unlimited.
    #[serde(default)]
    pub lifespan: Option<f64>,
    /// Half-width of x jitter.
    #[serde(default)]
    pub jitter_x: f64,
    /// Half-width of y jitter.
    #[serde(default)]
    pub jitter_y: f64,
    /// Half-width of horizontal velocity jitter.
    #[serde(default)]
    pub jitter_vx: f64,
    /// Half-width of vertical velocity jitter.
    #[serde(default)]
    pub jitter_vy: f64,
}

impl TimerConfig {
    /// Builds the timer this config describes.
    ///
    /// # Panics
    ///
    /// Panics on a non-positive interval; call [`SimulationConfig::validate`]
    /// first.
    #[must_use]
    pub fn timer(&self) -> SpawnTimer {
        let mut base = SpawnState::new(Vec2::new(self.x, self.y), Vec2::new(self.vx, self.vy))
            .with_angular_velocity(self.angular_velocity);
        base.lifespan = self.lifespan;

        let pattern = SpawnPattern::fixed(base)
            .with_position_jitter(self.jitter_x, self.jitter_y)
            .with_velocity_jitter(self.jitter_vx, self.jitter_vy);

        let timer = SpawnTimer::new(self.interval, pattern).with_batch(self.batch);
        match self.repeat {
            Some(limit) => timer.with_repeat(limit),
            None => timer,
        }
    }

    fn validate(&self, index: usize) -> ConfigResult<()> {
        positive("spawn.timers.interval", self.interval)?;
        if self.batch == 0 {
            return Err(ConfigError::ZeroBatch { index });
        }
        for (field, value) in [
            ("spawn.timers.x", self.x),
            ("spawn.timers.y", self.y),
            ("spawn.timers.vx", self.vx),
            ("spawn.timers.vy", self.vy),
            ("spawn.timers.angular_velocity", self.angular_velocity),
        ] {
            finite(field, value)?;
        }
        for (field, value) in [
            ("spawn.timers.jitter_x", self.jitter_x),
            ("spawn.timers.jitter_y", self.jitter_y),
            ("spawn.timers.jitter_vx", self.jitter_vx),
            ("spawn.timers.jitter_vy", self.jitter_vy),
        ] {
            non_negative(field, value)?;
        }
        if let Some(lifespan) = self.lifespan {
            positive("spawn.timers.lifespan", lifespan)?;
        }
        Ok(())
    }
}

/// Spawn controller settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seed for spawn jitter.
    pub seed: u64,
    /// Request queue bound. Absent = pool capacity.
    pub max_pending: Option<usize>,
    /// Minimum seconds between event-driven spawns.
    pub cooldown: Option<f64>,
    /// Repeating timers.
    pub timers: Vec<TimerConfig>,
}

/// Clock settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Upper bound on a single tick's delta, in seconds.
    pub max_delta: Option<f64>,
}

/// Complete scene configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Pool sizing.
    pub pool: PoolConfig,
    /// Edge handling.
    pub boundary: BoundaryConfig,
    /// Spawning.
    pub spawn: SpawnConfig,
    /// Timekeeping.
    pub clock: ClockConfig,
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML, or a validation
    /// error for out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SimulationConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every value that would otherwise panic or misbehave.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pool.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if let Some(max_capacity) = self.pool.max_capacity {
            if max_capacity < self.pool.capacity {
                return Err(ConfigError::MaxCapacityBelowCapacity {
                    capacity: self.pool.capacity,
                    max_capacity,
                });
            }
        }
        self.boundary.validate()?;
        if let Some(cooldown) = self.spawn.cooldown {
            non_negative("spawn.cooldown", cooldown)?;
        }
        for (index, timer) in self.spawn.timers.iter().enumerate() {
            timer.validate(index)?;
        }
        if let Some(max_delta) = self.clock.max_delta {
            positive("clock.max_delta", max_delta)?;
        }
        Ok(())
    }

    /// Validates the config and builds a ready-to-tick simulation.
    ///
    /// # Errors
    ///
    /// Returns a validation error; nothing is built in that case.
    pub fn build(&self) -> ConfigResult<Simulation> {
        self.validate()?;

        let pool = EntityPool::with_policy(self.pool.capacity, self.pool.policy());
        let max_pending = self.spawn.max_pending.unwrap_or(self.pool.capacity);
        let mut spawner = SpawnController::new(max_pending, self.spawn.seed);
        if let Some(cooldown) = self.spawn.cooldown {
            spawner = spawner.with_cooldown(cooldown);
        }
        for timer in &self.spawn.timers {
            spawner.add_timer(timer.timer());
        }

        let mut clock = SimulationClock::new();
        if let Some(max_delta) = self.clock.max_delta {
            clock = clock.with_max_delta(max_delta);
        }

        tracing::debug!(
            capacity = self.pool.capacity,
            timers = self.spawn.timers.len(),
            "simulation built from config"
        );

        Ok(Simulation::new(pool, self.boundary.recycler())
            .with_spawner(spawner)
            .with_clock(clock))
    }
}

fn finite(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLING_OBSTACLES: &str = r#"
        [pool]
        capacity = 30

        [boundary]
        policy = "recycle"
        margin = 20.0
        edges = { bottom = true }
        bounds = { min_x = 0.0, min_y = 0.0, max_x = 800.0, max_y = 600.0 }

        [spawn]
        seed = 12345
        cooldown = 0.2

        [[spawn.timers]]
        interval = 1.5
        batch = 3
        y = -20.0
        x = 400.0
        vy = 200.0
        jitter_x = 380.0
    "#;

    #[test]
    fn test_parse_full_document() {
        let config = SimulationConfig::from_toml_str(FALLING_OBSTACLES).unwrap();

        assert_eq!(config.pool.capacity, 30);
        assert_eq!(config.pool.policy(), ExhaustionPolicy::Drop);
        assert_eq!(config.spawn.seed, 12345);
        assert_eq!(config.spawn.cooldown, Some(0.2));
        assert_eq!(config.spawn.timers.len(), 1);
        assert_eq!(config.spawn.timers[0].batch, 3);
        assert_eq!(config.spawn.timers[0].repeat, None);
        match config.boundary {
            BoundaryConfig::Recycle { margin, edges, .. } => {
                assert_eq!(margin, 20.0);
                assert_eq!(edges, Edges::BOTTOM);
            }
            other => panic!("unexpected boundary {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.pool.capacity, 32);
    }

    #[test]
    fn test_wrap_and_growth() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [pool]
            capacity = 8
            max_capacity = 16

            [boundary]
            policy = "wrap"
            margin = 16.0
            "#,
        )
        .unwrap();

        assert_eq!(config.pool.policy(), ExhaustionPolicy::Grow { max_capacity: 16 });
        assert_eq!(
            config.boundary,
            BoundaryConfig::Wrap {
                bounds: Bounds::from_size(800.0, 600.0),
                margin: 16.0,
            }
        );
    }

    #[test]
    fn test_build_wires_timers() {
        let mut sim = SimulationConfig::from_toml_str(FALLING_OBSTACLES)
            .unwrap()
            .build()
            .unwrap();

        let report = sim.tick(1.5);
        assert_eq!(report.spawned, 3);
        assert_eq!(sim.pool().capacity(), 30);
        for entity in sim.iterate_active() {
            assert!((20.0..=780.0).contains(&entity.position.x));
            assert_eq!(entity.velocity, Vec2::new(0.0, 200.0));
        }
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = SimulationConfig::from_toml_str("[pool]\ncapacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_rejects_max_below_capacity() {
        let err = SimulationConfig::from_toml_str("[pool]\ncapacity = 10\nmax_capacity = 5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MaxCapacityBelowCapacity { capacity: 10, max_capacity: 5 }
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = SimulationConfig::from_toml_str(
            r#"
            [boundary]
            policy = "wrap"
            bounds = { min_x = 100.0, min_y = 0.0, max_x = 0.0, max_y = 600.0 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));
    }

    #[test]
    fn test_rejects_bad_timer() {
        let err = SimulationConfig::from_toml_str("[[spawn.timers]]\ninterval = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "spawn.timers.interval", .. }));

        let err = SimulationConfig::from_toml_str("[[spawn.timers]]\ninterval = 1.0\nbatch = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroBatch { index: 0 }));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SimulationConfig::from_toml_str("[pool\ncapacity = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let err = SimulationConfig::from_toml_str("[boundary]\npolicy = \"bounce\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::from_file("/nonexistent/driftpool.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
