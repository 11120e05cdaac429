//! Recorder capability

use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::HandleId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Encoder quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingQuality {
    Min,
    Low,
    Medium,
    High,
    Max,
}

impl Default for RecordingQuality {
    fn default() -> Self {
        RecordingQuality::Max
    }
}

/// Encoder configuration for a recorder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecorderOptions {
    /// Bits per second
    pub bitrate: u32,
    pub channels: u16,
    /// Samples per second
    pub sample_rate: u32,
    pub quality: RecordingQuality,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            bitrate: 256_000,
            channels: 2,
            sample_rate: 44_100,
            quality: RecordingQuality::Max,
        }
    }
}

/// Outcome of a record toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordToggle {
    /// Recording has just begun
    Started,
    /// Recording went from active to idle; the output is finalized
    Stopped,
}

/// Recorder flags at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecorderSnapshot {
    pub is_recording: bool,
}

/// One recording session target
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recorder: Send + Sync {
    fn id(&self) -> HandleId;

    /// Start recording when idle, stop when recording
    async fn toggle_record(&mut self) -> Result<RecordToggle>;

    /// Release native resources synchronously
    fn destroy(&mut self);

    fn is_recording(&self) -> bool;
}
