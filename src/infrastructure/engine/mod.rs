//! Media engine adapters

pub mod simulated;

pub use simulated::{
    EngineCall, EngineJournal, SimulatedEngine, SimulatedPlayer, SimulatedRecorder,
    SimulationSettings,
};
