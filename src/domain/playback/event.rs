//! Playback domain events

use crate::domain::media::PlayerEventKind;
use crate::domain::shared::events::{DomainEvent, EventMetadata};
use crate::domain::shared::value_objects::HandleId;
use chrono::{DateTime, Utc};

/// What happened during a controller transition
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEventKind {
    PlayerCreated { handle: HandleId },
    PlayerDestroyed { handle: HandleId },
    RecorderCreated { handle: HandleId },
    RecorderDestroyed { handle: HandleId },
    PlayerPrepared { handle: HandleId },
    PlayToggled { playing: bool },
    Stopped,
    Seeked { position_secs: f64 },
    RecordingStarted,
    RecordingStopped,
    LoopingChanged { enabled: bool },
    /// A notification from the current player was applied
    HandleNotified { handle: HandleId, kind: PlayerEventKind },
    /// A notification from an already replaced player was dropped
    StaleEventDiscarded { handle: HandleId },
    ErrorRaised { message: String },
}

/// Recorded controller transition
#[derive(Debug, Clone)]
pub struct PlaybackEvent {
    pub metadata: EventMetadata,
    pub kind: PlaybackEventKind,
}

impl PlaybackEvent {
    pub fn new(kind: PlaybackEventKind) -> Self {
        Self {
            metadata: EventMetadata::new(event_type_of(&kind)),
            kind,
        }
    }
}

fn event_type_of(kind: &PlaybackEventKind) -> &'static str {
    match kind {
        PlaybackEventKind::PlayerCreated { .. } => "player.created",
        PlaybackEventKind::PlayerDestroyed { .. } => "player.destroyed",
        PlaybackEventKind::RecorderCreated { .. } => "recorder.created",
        PlaybackEventKind::RecorderDestroyed { .. } => "recorder.destroyed",
        PlaybackEventKind::PlayerPrepared { .. } => "player.prepared",
        PlaybackEventKind::PlayToggled { .. } => "playback.toggled",
        PlaybackEventKind::Stopped => "playback.stopped",
        PlaybackEventKind::Seeked { .. } => "playback.seeked",
        PlaybackEventKind::RecordingStarted => "recording.started",
        PlaybackEventKind::RecordingStopped => "recording.stopped",
        PlaybackEventKind::LoopingChanged { .. } => "playback.looping_changed",
        PlaybackEventKind::HandleNotified { .. } => "player.notified",
        PlaybackEventKind::StaleEventDiscarded { .. } => "player.stale_event",
        PlaybackEventKind::ErrorRaised { .. } => "controller.error",
    }
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        event_type_of(&self.kind)
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_matches_kind() {
        let event = PlaybackEvent::new(PlaybackEventKind::Seeked { position_secs: 4.5 });
        assert_eq!(event.event_type(), "playback.seeked");
        assert_eq!(event.metadata.event_type, "playback.seeked");
    }
}
