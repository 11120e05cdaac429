//! Time source port
//!
//! Everything that compares instants (seek debounce, simulated playback
//! position) reads time through this trait so tests can drive it.

use tokio::time::Instant;

pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}
