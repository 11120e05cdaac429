//! Media engine facade

use super::player::{Player, PlayerOptions};
use super::recorder::{Recorder, RecorderOptions};
use crate::domain::shared::value_objects::HandleId;
use tokio::sync::mpsc;

/// Asynchronous notification raised by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEventKind {
    /// Playback reached the end of the source
    Ended,
    /// Playback was paused
    Paused,
}

/// Notification tagged with the handle that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleEvent {
    pub handle: HandleId,
    pub kind: PlayerEventKind,
}

impl HandleEvent {
    pub fn new(handle: HandleId, kind: PlayerEventKind) -> Self {
        Self { handle, kind }
    }
}

pub type EventSender = mpsc::UnboundedSender<HandleEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<HandleEvent>;

/// Create the channel handle notifications travel on
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Factory for native handles
#[cfg_attr(test, mockall::automock)]
pub trait MediaEngine: Send + Sync {
    /// Construct an unprepared player for `source`
    fn create_player(
        &self,
        id: HandleId,
        source: &str,
        options: &PlayerOptions,
    ) -> Box<dyn Player>;

    /// Construct an idle recorder writing to `target`
    fn create_recorder(
        &self,
        id: HandleId,
        target: &str,
        options: &RecorderOptions,
    ) -> Box<dyn Recorder>;
}
