//! Playback context - derived UI state and transition history

pub mod debounce;
pub mod event;
pub mod ui_state;

pub use debounce::SeekDebounce;
pub use event::{PlaybackEvent, PlaybackEventKind};
pub use ui_state::{Gates, PlayLabel, RecordLabel, UiState};
