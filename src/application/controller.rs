//! Playback/recording controller
//!
//! Owns the live player and recorder handles, forwards UI commands to them and
//! republishes the derived [`UiState`] after every transition.

use crate::config::Config;
use crate::domain::media::{
    EventSender, HandleEvent, MediaEngine, Player, PlayerOptions, RecordToggle, Recorder,
    RecorderOptions, RecorderSnapshot,
};
use crate::domain::playback::{Gates, PlaybackEvent, PlaybackEventKind, SeekDebounce, UiState};
use crate::domain::shared::clock::Clock;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{Fraction, HandleId};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Most recent transitions kept for [`PlaybackRecordingController::take_events`]
pub const EVENT_HISTORY_LIMIT: usize = 256;

/// UI command forwarded to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    PlayPause,
    Stop,
    /// Fractional position in `[0, 1]`
    Seek(f64),
    ToggleRecording,
    SetLooping(bool),
}

/// Static inputs for handle construction
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub source_uri: String,
    pub recording_target: String,
    pub player_options: PlayerOptions,
    pub recorder_options: RecorderOptions,
    pub seek_debounce: Duration,
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            source_uri: config.media.source_uri.clone(),
            recording_target: config.media.recording_target.clone(),
            player_options: config.media.player_options(),
            recorder_options: config.recorder.clone(),
            seek_debounce: config.progress.seek_debounce(),
        }
    }
}

pub struct PlaybackRecordingController {
    engine: Arc<dyn MediaEngine>,
    clock: Arc<dyn Clock>,
    settings: ControllerSettings,
    player: Option<Box<dyn Player>>,
    recorder: Option<Box<dyn Recorder>>,
    /// Last generation tag handed out
    last_handle: HandleId,
    loop_preference: bool,
    debounce: SeekDebounce,
    ui: watch::Sender<UiState>,
    handle_events: EventSender,
    /// Oldest entries are dropped once the limit is reached
    history: VecDeque<PlaybackEvent>,
    initialized: bool,
    torn_down: bool,
}

impl PlaybackRecordingController {
    /// Create a controller; handles are only built by [`initialize`](Self::initialize).
    ///
    /// Player notifications are routed into `handle_events`.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        clock: Arc<dyn Clock>,
        settings: ControllerSettings,
        handle_events: EventSender,
    ) -> Self {
        let (ui, _) = watch::channel(UiState::default());
        let debounce = SeekDebounce::new(settings.seek_debounce);

        Self {
            engine,
            clock,
            settings,
            player: None,
            recorder: None,
            last_handle: HandleId::new(0),
            loop_preference: false,
            debounce,
            ui,
            handle_events,
            history: VecDeque::with_capacity(EVENT_HISTORY_LIMIT),
            initialized: false,
            torn_down: false,
        }
    }

    /// Build both handles and prepare the player
    pub async fn initialize(&mut self) -> Result<()> {
        self.ensure_active()?;
        if self.initialized {
            return Err(DomainError::InvalidStateTransition(
                "controller is already initialized".to_string(),
            ));
        }

        info!("Initializing controller for {}", self.settings.source_uri);
        self.reload_handles().await;
        self.initialized = true;
        Ok(())
    }

    /// Toggle between playing and paused
    pub async fn play_pause(&mut self) -> Result<()> {
        self.ensure_active()?;
        let player = self.player.as_mut().ok_or(DomainError::NoHandle("player"))?;

        let outcome = player.play_pause().await;
        match outcome {
            Ok(playing) => {
                info!("Playback {}", if playing { "started" } else { "paused" });
                self.record(PlaybackEventKind::PlayToggled { playing });
            }
            Err(e) => self.raise_error(e),
        }

        self.recompute();
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.ensure_active()?;
        let player = self.player.as_mut().ok_or(DomainError::NoHandle("player"))?;

        player.stop().await;
        info!("Playback stopped");
        self.record(PlaybackEventKind::Stopped);

        self.recompute();
        Ok(())
    }

    /// Seek to `fraction` of the source duration.
    ///
    /// Without a player this does nothing at all, the debounce timestamp
    /// included.
    pub async fn seek(&mut self, fraction: f64) -> Result<()> {
        self.ensure_active()?;
        let Some(player) = self.player.as_mut() else {
            debug!("Seek ignored, no player");
            return Ok(());
        };

        self.debounce.record(self.clock.now());

        let position_secs = Fraction::clamped(fraction).value() * player.duration();
        player.seek(position_secs).await;
        debug!("Seeked to {:.3}s", position_secs);
        self.record(PlaybackEventKind::Seeked { position_secs });

        self.recompute();
        Ok(())
    }

    /// Start or stop recording.
    ///
    /// Any live player is destroyed before the recorder is touched. When the
    /// toggle reports that recording stopped, both handles are rebuilt.
    pub async fn toggle_recording(&mut self) -> Result<()> {
        self.ensure_active()?;
        if self.recorder.is_none() {
            return Err(DomainError::NoHandle("recorder"));
        }

        self.destroy_player();

        let outcome = match self.recorder.as_mut() {
            Some(recorder) => recorder.toggle_record().await,
            None => return Err(DomainError::NoHandle("recorder")),
        };

        match outcome {
            Ok(RecordToggle::Started) => {
                info!("Recording started to {}", self.settings.recording_target);
                self.record(PlaybackEventKind::RecordingStarted);
            }
            Ok(RecordToggle::Stopped) => {
                info!("Recording stopped, reloading handles");
                self.record(PlaybackEventKind::RecordingStopped);
                self.reload_handles().await;
            }
            Err(e) => self.raise_error(e),
        }

        self.recompute();
        Ok(())
    }

    /// Store the loop preference and apply it to the live player
    pub fn set_looping(&mut self, enabled: bool) {
        self.loop_preference = enabled;
        self.ui.send_modify(|state| state.loop_button_status = enabled);

        if let Some(player) = self.player.as_mut() {
            player.set_looping(enabled);
        }
        debug!("Looping {}", if enabled { "enabled" } else { "disabled" });
        self.record(PlaybackEventKind::LoopingChanged { enabled });
    }

    pub async fn execute(&mut self, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::PlayPause => self.play_pause().await,
            ControlCommand::Stop => self.stop().await,
            ControlCommand::Seek(fraction) => self.seek(fraction).await,
            ControlCommand::ToggleRecording => self.toggle_recording().await,
            ControlCommand::SetLooping(enabled) => {
                self.set_looping(enabled);
                Ok(())
            }
        }
    }

    /// Apply an `ended`/`pause` notification if it came from the live player
    pub fn handle_event(&mut self, event: HandleEvent) {
        if self.torn_down {
            return;
        }

        let current = self.player.as_ref().map(|p| p.id());
        if current != Some(event.handle) {
            debug!("Discarding {:?} from stale player {}", event.kind, event.handle);
            self.record(PlaybackEventKind::StaleEventDiscarded {
                handle: event.handle,
            });
            return;
        }

        debug!("Player {} notified {:?}", event.handle, event.kind);
        self.record(PlaybackEventKind::HandleNotified {
            handle: event.handle,
            kind: event.kind,
        });
        self.recompute();
    }

    /// Publish the playback position unless a seek happened recently.
    ///
    /// Returns whether a value was published.
    pub fn refresh_progress(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(player) = self.player.as_ref() else {
            return false;
        };
        if self.debounce.is_suppressed(self.clock.now()) {
            return false;
        }

        let progress = Fraction::of(player.current_time(), player.duration());
        self.ui.send_if_modified(|state| {
            if state.progress == progress {
                false
            } else {
                state.progress = progress;
                true
            }
        });
        true
    }

    /// Release both handles. Nothing is published afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        info!("Tearing down controller");
        self.torn_down = true;
        self.destroy_player();
        if let Some(mut recorder) = self.recorder.take() {
            let handle = recorder.id();
            recorder.destroy();
            self.record(PlaybackEventKind::RecorderDestroyed { handle });
        }
    }

    pub fn state(&self) -> UiState {
        self.ui.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.ui.subscribe()
    }

    /// Drain recorded transitions, oldest first
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        self.history.drain(..).collect()
    }

    pub fn player_id(&self) -> Option<HandleId> {
        self.player.as_ref().map(|p| p.id())
    }

    pub fn recorder_id(&self) -> Option<HandleId> {
        self.recorder.as_ref().map(|r| r.id())
    }

    pub fn loop_preference(&self) -> bool {
        self.loop_preference
    }

    pub fn last_seek(&self) -> Option<Instant> {
        self.debounce.last_seek()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn ensure_active(&self) -> Result<()> {
        if self.torn_down {
            Err(DomainError::ServiceStopped)
        } else {
            Ok(())
        }
    }

    fn next_handle(&mut self) -> HandleId {
        self.last_handle = self.last_handle.next();
        self.last_handle
    }

    /// Replace both handles, then prepare the new player
    async fn reload_handles(&mut self) {
        self.reload_player();
        self.reload_recorder();
        self.prepare_player().await;
    }

    fn reload_player(&mut self) {
        self.destroy_player();

        let id = self.next_handle();
        let mut player = self.engine.create_player(
            id,
            &self.settings.source_uri,
            &self.settings.player_options,
        );
        player.subscribe(self.handle_events.clone());
        self.player = Some(player);
        self.record(PlaybackEventKind::PlayerCreated { handle: id });

        self.recompute();
    }

    fn reload_recorder(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            let handle = recorder.id();
            recorder.destroy();
            self.record(PlaybackEventKind::RecorderDestroyed { handle });
        }

        let id = self.next_handle();
        let recorder = self.engine.create_recorder(
            id,
            &self.settings.recording_target,
            &self.settings.recorder_options,
        );
        self.recorder = Some(recorder);
        self.record(PlaybackEventKind::RecorderCreated { handle: id });

        self.recompute();
    }

    async fn prepare_player(&mut self) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let handle = player.id();

        let outcome = player.prepare().await;
        match outcome {
            Ok(()) => {
                player.set_looping(self.loop_preference);
                info!("Player {} prepared", handle);
                self.record(PlaybackEventKind::PlayerPrepared { handle });
            }
            Err(e) => {
                error!("Error preparing player {}: {}", handle, e);
                self.raise_error(e);
            }
        }

        self.recompute();
    }

    fn destroy_player(&mut self) {
        if let Some(mut player) = self.player.take() {
            let handle = player.id();
            player.destroy();
            debug!("Player {} destroyed", handle);
            self.record(PlaybackEventKind::PlayerDestroyed { handle });
        }
    }

    /// Re-derive labels and gates from the live handles
    fn recompute(&mut self) {
        let player = self.player.as_ref().map(|p| p.snapshot());
        let recorder = self.recorder.as_ref().map(|r| RecorderSnapshot {
            is_recording: r.is_recording(),
        });
        let gates = Gates::derive(player, recorder);
        self.ui.send_modify(|state| state.apply(gates));
    }

    fn raise_error(&mut self, error: DomainError) {
        let message = error.to_string();
        warn!("{}", message);
        let published = message.clone();
        self.ui.send_modify(|state| state.error = Some(published));
        self.record(PlaybackEventKind::ErrorRaised { message });
    }

    fn record(&mut self, kind: PlaybackEventKind) {
        if self.history.len() == EVENT_HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(PlaybackEvent::new(kind));
    }
}
