//! Infrastructure layer - Adapters for the domain ports
//!
//! - Clocks backing the seek debounce
//! - An in-memory media engine standing in for the native toolkit

pub mod clock;
pub mod engine;

pub use clock::{ManualClock, TokioClock};
pub use engine::{EngineCall, EngineJournal, SimulatedEngine, SimulationSettings};
