//! Shared kernel - Common types used by the media and playback contexts

pub mod clock;
pub mod error;
pub mod events;
pub mod result;
pub mod value_objects;

pub use clock::Clock;
pub use error::DomainError;
pub use result::Result;
pub use value_objects::*;
