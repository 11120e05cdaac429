//! Handle lifecycle state machines

use serde::{Deserialize, Serialize};

/// Lifecycle of a player handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// Created, prepare not yet requested
    Unprepared,
    /// Source is being loaded
    Preparing,
    /// Prepared and stopped at the start (or after stop/ended)
    Ready,
    /// Preparation failed
    Failed,
    /// Audio is playing
    Playing,
    /// Playback paused mid-stream
    Paused,
    /// Destroyed; every resource has been released
    Terminal,
}

impl PlayerState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: &PlayerState) -> bool {
        use PlayerState::*;

        match (self, new_state) {
            (Terminal, _) => false,
            (_, Terminal) => true,

            (Unprepared, Preparing) => true,
            (Preparing, Ready) => true,
            (Preparing, Failed) => true,

            (Ready, Playing) => true,
            (Playing, Paused) => true,
            (Paused, Playing) => true,

            // stop or natural completion
            (Playing, Ready) => true,
            (Paused, Ready) => true,

            _ => false,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    /// True while the player is not holding a playback position
    pub fn is_stopped(&self) -> bool {
        !matches!(self, PlayerState::Playing | PlayerState::Paused)
    }

    pub fn can_play(&self) -> bool {
        matches!(self, PlayerState::Ready | PlayerState::Playing | PlayerState::Paused)
    }

    pub fn can_stop(&self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::Unprepared
    }
}

/// Lifecycle of a recorder handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Recording,
    Terminal,
}

impl RecorderState {
    pub fn can_transition_to(&self, new_state: &RecorderState) -> bool {
        use RecorderState::*;

        matches!(
            (self, new_state),
            (Idle, Recording) | (Recording, Idle) | (Idle, Terminal) | (Recording, Terminal)
        )
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording)
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_player_transitions() {
        use PlayerState::*;

        assert!(Unprepared.can_transition_to(&Preparing));
        assert!(Preparing.can_transition_to(&Ready));
        assert!(Preparing.can_transition_to(&Failed));
        assert!(Ready.can_transition_to(&Playing));
        assert!(Playing.can_transition_to(&Paused));
        assert!(Paused.can_transition_to(&Playing));
        assert!(Playing.can_transition_to(&Ready));
        assert!(Paused.can_transition_to(&Ready));
        assert!(Failed.can_transition_to(&Terminal));
        assert!(Playing.can_transition_to(&Terminal));
    }

    #[test]
    fn test_invalid_player_transitions() {
        use PlayerState::*;

        assert!(!Unprepared.can_transition_to(&Playing));
        assert!(!Failed.can_transition_to(&Playing));
        assert!(!Ready.can_transition_to(&Paused));
        assert!(!Terminal.can_transition_to(&Ready));
        assert!(!Terminal.can_transition_to(&Terminal));
    }

    #[test]
    fn test_player_flags() {
        use PlayerState::*;

        assert!(Ready.can_play() && !Ready.can_stop() && Ready.is_stopped());
        assert!(Playing.is_playing() && Playing.can_stop() && !Playing.is_stopped());
        assert!(Paused.can_play() && Paused.can_stop() && !Paused.is_playing());
        assert!(!Failed.can_play() && Failed.is_stopped());
        assert!(!Preparing.can_play() && !Preparing.can_stop());
        assert!(!Terminal.can_play() && Terminal.is_stopped());
    }

    #[test]
    fn test_recorder_transitions() {
        use RecorderState::*;

        assert!(Idle.can_transition_to(&Recording));
        assert!(Recording.can_transition_to(&Idle));
        assert!(Recording.can_transition_to(&Terminal));
        assert!(!Terminal.can_transition_to(&Idle));
        assert!(Recording.is_recording());
        assert!(!Idle.is_recording());
    }
}
