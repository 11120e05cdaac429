//! Shared value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation tag of a player or recorder handle.
///
/// Every handle the controller creates gets the next value, so a completion
/// or event carrying an older tag refers to a handle that has already been
/// destroyed and replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Tag following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position within an audio source, expressed as a fraction of its duration
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Fraction(f64);

impl Fraction {
    pub const ZERO: Fraction = Fraction(0.0);

    /// Clamp any value into `[0, 1]`; NaN becomes zero
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Progress of `current` seconds through `duration` seconds.
    ///
    /// Negative positions count as zero and a duration that is not strictly
    /// positive (unknown, still preparing) yields zero.
    pub fn of(current: f64, duration: f64) -> Self {
        if !(duration > 0.0) || !duration.is_finite() {
            return Self::ZERO;
        }
        Self::clamped(current.max(0.0) / duration)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
