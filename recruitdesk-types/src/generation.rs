//! Write generation counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic counter bumped by the permission store on every flag, override
/// or tab write. Sessions remember the generation they resolved against and
/// re-resolve when the store reports a newer one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the following generation.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// True if `self` was produced before `other`.
    pub fn is_older_than(&self, other: Generation) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}
