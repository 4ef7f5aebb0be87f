//! # Boundary Recycler
//!
//! Once per tick, after integration, every active entity is checked against
//! the edge policy:
//! - **Recycle**: entities that left the region go back to the pool
//! - **Wrap**: entities that left the region re-enter on the opposite side
//! - **Unbounded**: edges are ignored
//!
//! Independently of the edge policy, entities past their lifespan expire.

use driftpool_core::{EntityPool, EntityRecord, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in scene units.
///
/// `min_y` is the top edge, `max_y` the bottom edge (screen space).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds from explicit edges.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates bounds spanning `[0, width] x [0, height]`.
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns `true` if both spans are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y
    }

    /// Returns `true` if `p` lies inside the bounds grown by `margin`.
    #[must_use]
    pub fn contains(&self, p: Vec2, margin: f64) -> bool {
        p.x >= self.min_x - margin
            && p.x <= self.max_x + margin
            && p.y >= self.min_y - margin
            && p.y <= self.max_y + margin
    }

    /// Wraps `p` toroidally into the bounds grown by `margin`.
    ///
    /// # Returns
    ///
    /// `true` if the position was moved.
    pub fn wrap(&self, p: &mut Vec2, margin: f64) -> bool {
        if self.contains(*p, margin) {
            return false;
        }
        let moved_x = wrap_axis(&mut p.x, self.min_x - margin, self.max_x + margin);
        let moved_y = wrap_axis(&mut p.y, self.min_y - margin, self.max_y + margin);
        moved_x || moved_y
    }
}

fn wrap_axis(value: &mut f64, lo: f64, hi: f64) -> bool {
    let span = hi - lo;
    if span <= 0.0 || (*value >= lo && *value <= hi) {
        return false;
    }
    *value = lo + (*value - lo).rem_euclid(span);
    true
}

/// Which edges of a region count as exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    /// Leaving above `min_y`.
    pub top: bool,
    /// Leaving below `max_y`.
    pub bottom: bool,
    /// Leaving left of `min_x`.
    pub left: bool,
    /// Leaving right of `max_x`.
    pub right: bool,
}

impl Edges {
    /// All four edges.
    pub const ALL: Self = Self {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };
    /// Top and bottom.
    pub const VERTICAL: Self = Self {
        top: true,
        bottom: true,
        left: false,
        right: false,
    };
    /// Left and right.
    pub const HORIZONTAL: Self = Self {
        top: false,
        bottom: false,
        left: true,
        right: true,
    };
    /// Top only (player bullets flying up).
    pub const TOP: Self = Self {
        top: true,
        bottom: false,
        left: false,
        right: false,
    };
    /// Bottom only (falling obstacles).
    pub const BOTTOM: Self = Self {
        top: false,
        bottom: true,
        left: false,
        right: false,
    };
}

/// Caller-supplied exit test.
pub type ExitPredicate = fn(Vec2) -> bool;

/// Decides whether a position has left the playfield.
#[derive(Clone, Copy, Debug)]
pub enum ExitRule {
    /// Axis-aligned: outside `[min - margin, max + margin]` on a selected edge.
    Region {
        /// The playfield.
        bounds: Bounds,
        /// Distance past an edge before an entity counts as gone.
        margin: f64,
        /// Edges that count as exits.
        edges: Edges,
    },
    /// Arbitrary predicate.
    Custom(ExitPredicate),
}

impl ExitRule {
    /// Region rule over the given edges.
    #[must_use]
    pub const fn region(bounds: Bounds, margin: f64, edges: Edges) -> Self {
        Self::Region {
            bounds,
            margin,
            edges,
        }
    }

    /// Returns `true` if `p` has left the region.
    #[must_use]
    pub fn leaves_bounds(&self, p: Vec2) -> bool {
        match *self {
            Self::Region {
                bounds,
                margin,
                edges,
            } => {
                (edges.left && p.x < bounds.min_x - margin)
                    || (edges.right && p.x > bounds.max_x + margin)
                    || (edges.top && p.y < bounds.min_y - margin)
                    || (edges.bottom && p.y > bounds.max_y + margin)
            }
            Self::Custom(predicate) => predicate(p),
        }
    }
}

/// What happens to an entity that crosses the playfield edge.
#[derive(Clone, Copy, Debug)]
pub enum EdgePolicy {
    /// Release it back to the pool.
    Recycle(ExitRule),
    /// Move it to the opposite side of the padded region.
    Wrap {
        /// The playfield.
        bounds: Bounds,
        /// Padding around the playfield before wrapping kicks in.
        margin: f64,
    },
    /// Leave it alone; only lifespan expiry applies.
    Unbounded,
}

/// Counts from one recycler sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecycleOutcome {
    /// Entities released for leaving the region.
    pub recycled: usize,
    /// Entities released for outliving their lifespan.
    pub expired: usize,
    /// Entities whose position was wrapped.
    pub wrapped: usize,
}

impl RecycleOutcome {
    /// Total slots returned to the pool.
    #[inline]
    #[must_use]
    pub const fn released(&self) -> usize {
        self.recycled + self.expired
    }
}

enum Verdict {
    Keep,
    Wrapped,
    Recycle,
    Expire,
}

/// Per-tick pass that reclaims or wraps entities at the playfield edge.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryRecycler {
    policy: EdgePolicy,
}

impl BoundaryRecycler {
    /// Creates a recycler with the given edge policy.
    #[must_use]
    pub const fn new(policy: EdgePolicy) -> Self {
        Self { policy }
    }

    /// Recycles on any region exit.
    #[must_use]
    pub const fn recycle(rule: ExitRule) -> Self {
        Self::new(EdgePolicy::Recycle(rule))
    }

    /// Wraps toroidally around `bounds`.
    #[must_use]
    pub const fn wrap(bounds: Bounds, margin: f64) -> Self {
        Self::new(EdgePolicy::Wrap { bounds, margin })
    }

    /// Returns the edge policy.
    #[must_use]
    pub const fn policy(&self) -> &EdgePolicy {
        &self.policy
    }

    /// Checks every active entity once.
    ///
    /// Runs after integration, so decisions use post-move positions.
    pub fn sweep(&self, pool: &mut EntityPool) -> RecycleOutcome {
        let mut outcome = RecycleOutcome::default();

        for slot in 0..pool.capacity() {
            let Some(handle) = pool.handle_at(slot) else {
                continue;
            };
            let verdict = match pool.get_mut(handle) {
                Some(record) => self.judge(record),
                None => continue,
            };

            match verdict {
                Verdict::Keep => {}
                Verdict::Wrapped => outcome.wrapped += 1,
                Verdict::Recycle => {
                    if pool.release(handle) {
                        outcome.recycled += 1;
                    }
                }
                Verdict::Expire => {
                    if pool.release(handle) {
                        outcome.expired += 1;
                    }
                }
            }
        }

        if outcome.released() > 0 {
            tracing::trace!(
                recycled = outcome.recycled,
                expired = outcome.expired,
                "recycler released entities"
            );
        }
        outcome
    }

    fn judge(&self, record: &mut EntityRecord) -> Verdict {
        if record.is_expired() {
            return Verdict::Expire;
        }
        match &self.policy {
            EdgePolicy::Recycle(rule) if rule.leaves_bounds(record.position) => Verdict::Recycle,
            EdgePolicy::Wrap { bounds, margin } if bounds.wrap(&mut record.position, *margin) => {
                Verdict::Wrapped
            }
            _ => Verdict::Keep,
        }
    }
}
