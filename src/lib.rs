//! Playdeck - Playback and recording controller for an audio toolkit
//!
//! The native engine does the actual decoding, encoding and device I/O. This
//! crate keeps one player and one recorder handle in sync with the controls a
//! UI shows: which buttons are enabled, what they say, and how far playback
//! has progressed.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
