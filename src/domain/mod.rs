//! Domain layer - Handle capabilities and derived presentation state
//!
//! This layer contains:
//! - Ports for the external media engine (player, recorder, factory)
//! - Handle lifecycle state machines
//! - UI gate derivation and the seek debounce window
//! - Domain events recorded on every controller transition

pub mod media;
pub mod playback;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};
