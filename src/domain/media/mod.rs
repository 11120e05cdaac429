//! Media engine ports
//!
//! The native audio engine (decoding, encoding, device I/O) lives outside this
//! crate. These traits are the fixed capability surface the controller talks
//! to; adapters live in the infrastructure layer.

pub mod engine;
pub mod player;
pub mod recorder;
pub mod state;

pub use engine::{
    event_channel, EventReceiver, EventSender, HandleEvent, MediaEngine, PlayerEventKind,
};
pub use player::{Player, PlayerOptions, PlayerSnapshot};
pub use recorder::{RecordToggle, Recorder, RecorderOptions, RecorderSnapshot, RecordingQuality};
pub use state::{PlayerState, RecorderState};
