//! Application layer - Use cases driving the media handles
//!
//! This layer orchestrates the domain ports to fulfil UI commands:
//! - The playback/recording controller and its command set
//! - The progress poller
//! - The single-task service exposing both to a presentation binding

pub mod controller;
pub mod poller;
pub mod service;

pub use controller::{
    ControlCommand, ControllerSettings, PlaybackRecordingController, EVENT_HISTORY_LIMIT,
};
pub use poller::{PollerState, ProgressPoller};
pub use service::{ControllerHandle, ControllerService, StoppedService};
