//! Tunable constants of the hit tests.

use crate::Fp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerances and limits shared by every hit test of a [`CollisionManager`](crate::CollisionManager).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CollisionConfig {
    /// Circles whose center distance is within this of the radii sum are touching: a hit with a zero push-out.
    pub tangent_epsilon: Fp,
    /// Box-box axis overlaps below this are treated as precision noise.
    pub sat_epsilon: Fp,
    /// Upper bound on the length of a box-box push-out.
    pub max_penetration: Fp,
}

impl CollisionConfig {
    pub const DEFAULT_TANGENT_EPSILON: Fp = 0.01;
    pub const DEFAULT_SAT_EPSILON: Fp = 0.001;
    pub const DEFAULT_MAX_PENETRATION: Fp = 1.0;

    #[inline]
    pub fn with_tangent_epsilon(mut self, epsilon: Fp) -> Self {
        self.tangent_epsilon = epsilon.abs();
        self
    }
    #[inline]
    pub fn with_sat_epsilon(mut self, epsilon: Fp) -> Self {
        self.sat_epsilon = epsilon.abs();
        self
    }
    #[inline]
    pub fn with_max_penetration(mut self, max: Fp) -> Self {
        self.max_penetration = max.abs();
        self
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        CollisionConfig {
            tangent_epsilon: CollisionConfig::DEFAULT_TANGENT_EPSILON,
            sat_epsilon: CollisionConfig::DEFAULT_SAT_EPSILON,
            max_penetration: CollisionConfig::DEFAULT_MAX_PENETRATION,
        }
    }
}
