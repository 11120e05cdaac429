//! Domain errors

use super::value_objects::HandleId;
use thiserror::Error;

/// Domain result type
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The audio source failed to load or prepare
    #[error("Preparation failed: {0}")]
    Preparation(String),

    /// A play/pause toggle was rejected by the engine
    #[error("Playback failed: {0}")]
    Playback(String),

    /// A record toggle was rejected by the engine
    #[error("Recording failed: {0}")]
    Recording(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// An operation needed a handle that is not currently owned
    #[error("No {0} handle available")]
    NoHandle(&'static str),

    #[error("Handle {0} has been released")]
    HandleReleased(HandleId),

    #[error("Controller service is not running")]
    ServiceStopped,

    #[error("Controller task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
