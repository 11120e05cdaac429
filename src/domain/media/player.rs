//! Player capability

use super::engine::EventSender;
use super::state::PlayerState;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::HandleId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Options passed when a player is constructed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerOptions {
    /// Release native resources automatically once playback ends
    pub auto_destroy: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            auto_destroy: false,
        }
    }
}

/// Readiness flags of a player at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub is_playing: bool,
    pub is_stopped: bool,
    pub can_play: bool,
    pub can_stop: bool,
}

impl PlayerSnapshot {
    pub fn from_state(state: PlayerState) -> Self {
        Self {
            is_playing: state.is_playing(),
            is_stopped: state.is_stopped(),
            can_play: state.can_play(),
            can_stop: state.can_stop(),
        }
    }
}

/// One prepared audio source.
///
/// Completions are modelled as futures; the `ended`/`pause` notifications are
/// pushed into the sender given to [`Player::subscribe`], tagged with
/// [`Player::id`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Player: Send + Sync {
    /// Generation tag assigned at construction
    fn id(&self) -> HandleId;

    /// Route `ended`/`pause` notifications to `events`
    fn subscribe(&mut self, events: EventSender);

    /// Load the source
    async fn prepare(&mut self) -> Result<()>;

    /// Toggle between playing and paused, returning whether audio now plays
    async fn play_pause(&mut self) -> Result<bool>;

    async fn stop(&mut self);

    /// Move to an absolute position in seconds
    async fn seek(&mut self, position_secs: f64);

    /// Release native resources synchronously
    fn destroy(&mut self);

    /// Playback position in seconds
    fn current_time(&self) -> f64;

    /// Source duration in seconds; not positive while unknown
    fn duration(&self) -> f64;

    fn snapshot(&self) -> PlayerSnapshot;

    fn set_looping(&mut self, looping: bool);
}
