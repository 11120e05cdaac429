//! Derived presentation state
//!
//! Nothing in here is a source of truth. Gates are recomputed from handle
//! snapshots after every transition; the remaining fields carry the loop
//! preference, the last published progress and the last error message.

use crate::domain::media::{PlayerSnapshot, RecorderSnapshot};
use crate::domain::shared::value_objects::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caption of the play/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayLabel {
    #[serde(rename = "Preparing...")]
    Preparing,
    Play,
    Pause,
}

impl fmt::Display for PlayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayLabel::Preparing => write!(f, "Preparing..."),
            PlayLabel::Play => write!(f, "Play"),
            PlayLabel::Pause => write!(f, "Pause"),
        }
    }
}

/// Caption of the record button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordLabel {
    #[serde(rename = "Preparing...")]
    Preparing,
    Record,
    Stop,
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordLabel::Preparing => write!(f, "Preparing..."),
            RecordLabel::Record => write!(f, "Record"),
            RecordLabel::Stop => write!(f, "Stop"),
        }
    }
}

/// Labels and enablement flags derived from handle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gates {
    pub play_label: PlayLabel,
    pub record_label: RecordLabel,
    pub stop_disabled: bool,
    pub play_disabled: bool,
    pub record_disabled: bool,
}

impl Gates {
    /// Compute gates from whichever handles currently exist.
    ///
    /// An absent recorder disables play the same way an active recording does.
    pub fn derive(player: Option<PlayerSnapshot>, recorder: Option<RecorderSnapshot>) -> Self {
        let is_playing = player.map_or(false, |p| p.is_playing);
        let is_recording = recorder.map_or(false, |r| r.is_recording);

        let play_disabled = match player {
            None => true,
            Some(p) => !p.can_play || recorder.map_or(true, |r| r.is_recording),
        };

        Self {
            play_label: if is_playing { PlayLabel::Pause } else { PlayLabel::Play },
            record_label: if is_recording { RecordLabel::Stop } else { RecordLabel::Record },
            stop_disabled: player.map_or(true, |p| !p.can_stop),
            play_disabled,
            record_disabled: recorder.is_none() || player.map_or(false, |p| !p.is_stopped),
        }
    }
}

/// Snapshot exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub play_pause_button: PlayLabel,
    pub record_button: RecordLabel,
    pub stop_button_disabled: bool,
    pub play_button_disabled: bool,
    pub record_button_disabled: bool,
    pub loop_button_status: bool,
    pub progress: Fraction,
    pub error: Option<String>,
}

impl UiState {
    /// Overwrite labels and gates, leaving the other fields alone
    pub fn apply(&mut self, gates: Gates) {
        self.play_pause_button = gates.play_label;
        self.record_button = gates.record_label;
        self.stop_button_disabled = gates.stop_disabled;
        self.play_button_disabled = gates.play_disabled;
        self.record_button_disabled = gates.record_disabled;
    }

    pub fn gates(&self) -> Gates {
        Gates {
            play_label: self.play_pause_button,
            record_label: self.record_button,
            stop_disabled: self.stop_button_disabled,
            play_disabled: self.play_button_disabled,
            record_disabled: self.record_button_disabled,
        }
    }

    /// The seek slider shares the play gate
    pub fn seek_disabled(&self) -> bool {
        self.play_button_disabled
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            play_pause_button: PlayLabel::Preparing,
            record_button: RecordLabel::Preparing,
            stop_button_disabled: true,
            play_button_disabled: true,
            record_button_disabled: true,
            loop_button_status: false,
            progress: Fraction::ZERO,
            error: None,
        }
    }
}
