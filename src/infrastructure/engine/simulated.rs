//! In-memory media engine
//!
//! Stands in for the native toolkit: players keep a virtual playhead driven by
//! the injected clock, raise `ended` when the source runs out (unless looping)
//! and `pause` when paused; recorders flip between idle and recording. Every
//! call is appended to a shared journal so callers can check ordering.

use crate::domain::media::{
    EventSender, HandleEvent, MediaEngine, Player, PlayerEventKind, PlayerOptions, PlayerSnapshot,
    PlayerState, RecordToggle, Recorder, RecorderOptions, RecorderState,
};
use crate::domain::shared::clock::Clock;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::HandleId;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One call received by the engine or one of its handles
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    CreatePlayer(HandleId),
    Prepare(HandleId),
    PlayPause(HandleId),
    Stop(HandleId),
    Seek(HandleId, f64),
    SetLooping(HandleId, bool),
    DestroyPlayer(HandleId),
    CreateRecorder(HandleId),
    ToggleRecord(HandleId),
    DestroyRecorder(HandleId),
}

/// Ordered log of engine calls, shared by the engine and its handles
#[derive(Debug, Clone, Default)]
pub struct EngineJournal {
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl EngineJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: EngineCall) {
        debug!("engine call: {:?}", call);
        lock(&self.calls).push(call);
    }

    /// Index of the first entry equal to `call`
    pub fn position(&self, call: &EngineCall) -> Option<usize> {
        lock(&self.calls).iter().position(|c| c == call)
    }

    pub fn count(&self, predicate: impl Fn(&EngineCall) -> bool) -> usize {
        lock(&self.calls).iter().filter(|c| predicate(c)).count()
    }
}

/// Knobs applied to handles created after they are set
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Length of every source in seconds
    pub duration_secs: f64,
    pub fail_prepare: bool,
    pub fail_play: bool,
    pub fail_record: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            fail_prepare: false,
            fail_play: false,
            fail_record: false,
        }
    }
}

/// Engine producing [`SimulatedPlayer`] and [`SimulatedRecorder`] handles
pub struct SimulatedEngine {
    settings: Mutex<SimulationSettings>,
    journal: EngineJournal,
    clock: Arc<dyn Clock>,
}

impl SimulatedEngine {
    pub fn new(settings: SimulationSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: Mutex::new(settings),
            journal: EngineJournal::new(),
            clock,
        }
    }

    pub fn journal(&self) -> EngineJournal {
        self.journal.clone()
    }

    pub fn settings(&self) -> SimulationSettings {
        lock(&self.settings).clone()
    }

    /// Change the settings used for handles created from now on
    pub fn update_settings(&self, update: impl FnOnce(&mut SimulationSettings)) {
        update(&mut lock(&self.settings));
    }
}

impl MediaEngine for SimulatedEngine {
    fn create_player(
        &self,
        id: HandleId,
        source: &str,
        options: &PlayerOptions,
    ) -> Box<dyn Player> {
        self.journal.record(EngineCall::CreatePlayer(id));
        info!("Creating player {} for {}", id, source);
        Box::new(SimulatedPlayer::new(
            id,
            source.to_string(),
            options.clone(),
            self.settings(),
            self.journal.clone(),
            self.clock.clone(),
        ))
    }

    fn create_recorder(
        &self,
        id: HandleId,
        target: &str,
        options: &RecorderOptions,
    ) -> Box<dyn Recorder> {
        self.journal.record(EngineCall::CreateRecorder(id));
        info!(
            "Creating recorder {} for {} ({} bps, {} ch, {} Hz, {:?})",
            id, target, options.bitrate, options.channels, options.sample_rate, options.quality
        );
        Box::new(SimulatedRecorder::new(
            id,
            target.to_string(),
            self.settings().fail_record,
            self.journal.clone(),
        ))
    }
}

/// Virtual playhead shared with the end-of-source timer
#[derive(Debug)]
struct Playhead {
    state: PlayerState,
    /// Position accumulated up to `resumed_at`
    offset_secs: f64,
    resumed_at: Option<Instant>,
    looping: bool,
    duration_secs: f64,
}

impl Playhead {
    fn position(&self, now: Instant) -> f64 {
        let running = self
            .resumed_at
            .map(|at| now.saturating_duration_since(at).as_secs_f64())
            .unwrap_or(0.0);
        let raw = self.offset_secs + running;

        if self.duration_secs <= 0.0 {
            0.0
        } else if self.looping {
            raw.rem_euclid(self.duration_secs)
        } else {
            raw.min(self.duration_secs)
        }
    }

    /// Fold elapsed playing time into the offset
    fn rebase(&mut self, now: Instant) {
        self.offset_secs = self.position(now);
        self.resumed_at = self.resumed_at.map(|_| now);
    }

    fn transition_to(&mut self, new_state: PlayerState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot transition player from {:?} to {:?}",
                self.state, new_state
            )));
        }
        self.state = new_state;
        Ok(())
    }
}

pub struct SimulatedPlayer {
    id: HandleId,
    source: String,
    options: PlayerOptions,
    settings: SimulationSettings,
    journal: EngineJournal,
    clock: Arc<dyn Clock>,
    playhead: Arc<Mutex<Playhead>>,
    events: Option<EventSender>,
    end_timer: Option<JoinHandle<()>>,
}

impl SimulatedPlayer {
    fn new(
        id: HandleId,
        source: String,
        options: PlayerOptions,
        settings: SimulationSettings,
        journal: EngineJournal,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let playhead = Playhead {
            state: PlayerState::Unprepared,
            offset_secs: 0.0,
            resumed_at: None,
            looping: false,
            duration_secs: settings.duration_secs,
        };

        Self {
            id,
            source,
            options,
            settings,
            journal,
            clock,
            playhead: Arc::new(Mutex::new(playhead)),
            events: None,
            end_timer: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        lock(&self.playhead).state
    }

    fn notify(&self, kind: PlayerEventKind) {
        if let Some(events) = &self.events {
            // receiver gone means the controller shut down
            let _ = events.send(HandleEvent::new(self.id, kind));
        }
    }

    fn cancel_end_timer(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }

    /// Schedule the natural end of playback from the current position
    fn arm_end_timer(&mut self) {
        self.cancel_end_timer();

        let remaining = {
            let playhead = lock(&self.playhead);
            if playhead.state != PlayerState::Playing || playhead.looping {
                return;
            }
            (playhead.duration_secs - playhead.position(self.clock.now())).max(0.0)
        };
        let remaining = match Duration::try_from_secs_f64(remaining) {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!("Player {} will not raise ended: {}", self.id, e);
                return;
            }
        };

        let id = self.id;
        let playhead = self.playhead.clone();
        let events = self.events.clone();
        let clock = self.clock.clone();
        let auto_destroy = self.options.auto_destroy;

        self.end_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;

            {
                let mut playhead = lock(&playhead);
                if playhead.state != PlayerState::Playing || playhead.looping {
                    return;
                }
                let now = clock.now();
                if playhead.position(now) < playhead.duration_secs {
                    return;
                }
                playhead.state = if auto_destroy {
                    PlayerState::Terminal
                } else {
                    PlayerState::Ready
                };
                playhead.offset_secs = 0.0;
                playhead.resumed_at = None;
            }

            debug!("Player {} reached the end of its source", id);
            if let Some(events) = events {
                let _ = events.send(HandleEvent::new(id, PlayerEventKind::Ended));
            }
        }));
    }
}

#[async_trait]
impl Player for SimulatedPlayer {
    fn id(&self) -> HandleId {
        self.id
    }

    fn subscribe(&mut self, events: EventSender) {
        self.events = Some(events);
    }

    async fn prepare(&mut self) -> Result<()> {
        self.journal.record(EngineCall::Prepare(self.id));
        lock(&self.playhead).transition_to(PlayerState::Preparing)?;

        // completion arrives asynchronously
        tokio::task::yield_now().await;

        let mut playhead = lock(&self.playhead);
        if playhead.state != PlayerState::Preparing {
            return Err(DomainError::HandleReleased(self.id));
        }
        if self.settings.fail_prepare {
            playhead.transition_to(PlayerState::Failed)?;
            return Err(DomainError::Preparation(format!(
                "unable to load {}",
                self.source
            )));
        }
        playhead.transition_to(PlayerState::Ready)
    }

    async fn play_pause(&mut self) -> Result<bool> {
        self.journal.record(EngineCall::PlayPause(self.id));
        if self.settings.fail_play {
            return Err(DomainError::Playback(format!(
                "output device rejected {}",
                self.source
            )));
        }

        let now = self.clock.now();
        let playing = {
            let mut playhead = lock(&self.playhead);
            match playhead.state {
                PlayerState::Ready | PlayerState::Paused => {
                    playhead.transition_to(PlayerState::Playing)?;
                    playhead.resumed_at = Some(now);
                    true
                }
                PlayerState::Playing => {
                    playhead.rebase(now);
                    playhead.resumed_at = None;
                    playhead.transition_to(PlayerState::Paused)?;
                    false
                }
                PlayerState::Terminal => return Err(DomainError::HandleReleased(self.id)),
                other => {
                    return Err(DomainError::Playback(format!(
                        "player is not ready ({:?})",
                        other
                    )))
                }
            }
        };

        if playing {
            self.arm_end_timer();
        } else {
            self.cancel_end_timer();
            self.notify(PlayerEventKind::Paused);
        }
        Ok(playing)
    }

    async fn stop(&mut self) {
        self.journal.record(EngineCall::Stop(self.id));
        self.cancel_end_timer();

        let mut playhead = lock(&self.playhead);
        if playhead.state.can_stop() && playhead.transition_to(PlayerState::Ready).is_ok() {
            playhead.offset_secs = 0.0;
            playhead.resumed_at = None;
        }
    }

    async fn seek(&mut self, position_secs: f64) {
        self.journal.record(EngineCall::Seek(self.id, position_secs));
        let now = self.clock.now();
        let playing = {
            let mut playhead = lock(&self.playhead);
            if !playhead.state.can_play() {
                warn!("Ignoring seek on player {} in {:?}", self.id, playhead.state);
                return;
            }
            playhead.offset_secs = position_secs.clamp(0.0, playhead.duration_secs.max(0.0));
            if playhead.resumed_at.is_some() {
                playhead.resumed_at = Some(now);
            }
            playhead.state == PlayerState::Playing
        };

        if playing {
            self.arm_end_timer();
        }
    }

    fn destroy(&mut self) {
        self.journal.record(EngineCall::DestroyPlayer(self.id));
        self.cancel_end_timer();
        self.events = None;

        let mut playhead = lock(&self.playhead);
        if playhead.state != PlayerState::Terminal {
            playhead.state = PlayerState::Terminal;
            playhead.resumed_at = None;
        }
    }

    fn current_time(&self) -> f64 {
        lock(&self.playhead).position(self.clock.now())
    }

    fn duration(&self) -> f64 {
        let playhead = lock(&self.playhead);
        match playhead.state {
            PlayerState::Ready | PlayerState::Playing | PlayerState::Paused => {
                playhead.duration_secs
            }
            _ => -1.0,
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot::from_state(self.state())
    }

    fn set_looping(&mut self, looping: bool) {
        self.journal.record(EngineCall::SetLooping(self.id, looping));
        let now = self.clock.now();
        {
            let mut playhead = lock(&self.playhead);
            playhead.rebase(now);
            playhead.looping = looping;
        }
        self.arm_end_timer();
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.cancel_end_timer();
    }
}

pub struct SimulatedRecorder {
    id: HandleId,
    target: String,
    fail_record: bool,
    journal: EngineJournal,
    state: RecorderState,
}

impl SimulatedRecorder {
    fn new(id: HandleId, target: String, fail_record: bool, journal: EngineJournal) -> Self {
        Self {
            id,
            target,
            fail_record,
            journal,
            state: RecorderState::Idle,
        }
    }

    fn transition_to(&mut self, new_state: RecorderState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot transition recorder from {:?} to {:?}",
                self.state, new_state
            )));
        }
        self.state = new_state;
        Ok(())
    }
}

#[async_trait]
impl Recorder for SimulatedRecorder {
    fn id(&self) -> HandleId {
        self.id
    }

    async fn toggle_record(&mut self) -> Result<RecordToggle> {
        self.journal.record(EngineCall::ToggleRecord(self.id));
        tokio::task::yield_now().await;

        if self.fail_record {
            return Err(DomainError::Recording(format!(
                "cannot open {} for writing",
                self.target
            )));
        }

        match self.state {
            RecorderState::Idle => {
                self.transition_to(RecorderState::Recording)?;
                Ok(RecordToggle::Started)
            }
            RecorderState::Recording => {
                self.transition_to(RecorderState::Idle)?;
                info!("Recording written to {}", self.target);
                Ok(RecordToggle::Stopped)
            }
            RecorderState::Terminal => Err(DomainError::HandleReleased(self.id)),
        }
    }

    fn destroy(&mut self) {
        self.journal.record(EngineCall::DestroyRecorder(self.id));
        if let Err(e) = self.transition_to(RecorderState::Terminal) {
            debug!("Recorder {} already released: {}", self.id, e);
        }
    }

    fn is_recording(&self) -> bool {
        self.state.is_recording()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::event_channel;
    use crate::infrastructure::clock::TokioClock;

    fn engine(settings: SimulationSettings) -> SimulatedEngine {
        SimulatedEngine::new(settings, Arc::new(TokioClock))
    }

    fn short_source() -> SimulationSettings {
        SimulationSettings {
            duration_secs: 2.0,
            ..SimulationSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_and_play() {
        let engine = engine(short_source());
        let mut player = engine.create_player(HandleId::new(1), "a.mp3", &PlayerOptions::default());

        assert!(!player.snapshot().can_play);
        assert!(player.duration() < 0.0);

        player.prepare().await.unwrap();
        assert!(player.snapshot().can_play);
        assert_eq!(player.duration(), 2.0);

        assert!(player.play_pause().await.unwrap());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!((player.current_time() - 0.5).abs() < 1e-9);
        assert!(player.snapshot().can_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_failure() {
        let engine = engine(SimulationSettings {
            fail_prepare: true,
            ..short_source()
        });
        let mut player =
            engine.create_player(HandleId::new(1), "missing.mp3", &PlayerOptions::default());

        let err = player.prepare().await.unwrap_err();
        assert!(matches!(err, DomainError::Preparation(_)));
        assert!(!player.snapshot().can_play);
        assert!(player.snapshot().is_stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_raises_event_and_holds_position() {
        let engine = engine(short_source());
        let (tx, mut rx) = event_channel();
        let mut player = engine.create_player(HandleId::new(4), "a.mp3", &PlayerOptions::default());
        player.subscribe(tx);
        player.prepare().await.unwrap();

        player.play_pause().await.unwrap();
        tokio::time::advance(Duration::from_millis(300)).await;
        assert!(!player.play_pause().await.unwrap());

        let event = rx.recv().await.unwrap();
        assert_eq!(event, HandleEvent::new(HandleId::new(4), PlayerEventKind::Paused));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!((player.current_time() - 0.3).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_natural_end_raises_ended() {
        let engine = engine(short_source());
        let (tx, mut rx) = event_channel();
        let mut player = engine.create_player(HandleId::new(2), "a.mp3", &PlayerOptions::default());
        player.subscribe(tx);
        player.prepare().await.unwrap();
        player.play_pause().await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, PlayerEventKind::Ended);
        assert!(player.snapshot().is_stopped);
        assert!(player.snapshot().can_play);
    }

    #[tokio::test(start_paused = true)]
    async fn test_looping_wraps_instead_of_ending() {
        let engine = engine(short_source());
        let (tx, mut rx) = event_channel();
        let mut player = engine.create_player(HandleId::new(3), "a.mp3", &PlayerOptions::default());
        player.subscribe(tx);
        player.prepare().await.unwrap();
        player.set_looping(true);
        player.play_pause().await.unwrap();

        tokio::time::advance(Duration::from_millis(2500)).await;
        assert!(player.snapshot().is_playing);
        assert!((player.current_time() - 0.5).abs() < 1e-9);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_source_never_ends() {
        let engine = engine(SimulationSettings {
            duration_secs: f64::INFINITY,
            ..SimulationSettings::default()
        });
        let (tx, mut rx) = event_channel();
        let mut player = engine.create_player(HandleId::new(5), "live", &PlayerOptions::default());
        player.subscribe(tx);
        player.prepare().await.unwrap();
        player.play_pause().await.unwrap();

        tokio::time::advance(Duration::from_secs(3600)).await;
        tokio::task::yield_now().await;

        assert!(player.snapshot().is_playing);
        assert!(rx.try_recv().is_err());
        assert!(!player.play_pause().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_rewinds() {
        let engine = engine(short_source());
        let mut player = engine.create_player(HandleId::new(1), "a.mp3", &PlayerOptions::default());
        player.prepare().await.unwrap();
        player.play_pause().await.unwrap();
        tokio::time::advance(Duration::from_millis(700)).await;

        player.stop().await;
        assert_eq!(player.current_time(), 0.0);
        assert!(player.snapshot().is_stopped);
        assert!(!player.snapshot().can_stop);

        // stopping again changes nothing
        player.stop().await;
        assert_eq!(player.snapshot(), PlayerSnapshot::from_state(PlayerState::Ready));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_clamps_to_duration() {
        let engine = engine(short_source());
        let mut player = engine.create_player(HandleId::new(1), "a.mp3", &PlayerOptions::default());
        player.prepare().await.unwrap();

        player.seek(1.5).await;
        assert_eq!(player.current_time(), 1.5);
        player.seek(9.0).await;
        assert_eq!(player.current_time(), 2.0);
    }

    #[tokio::test]
    async fn test_recorder_toggles() {
        let engine = engine(SimulationSettings::default());
        let mut recorder =
            engine.create_recorder(HandleId::new(1), "file.mp4", &RecorderOptions::default());

        assert_eq!(recorder.toggle_record().await.unwrap(), RecordToggle::Started);
        assert!(recorder.is_recording());
        assert_eq!(recorder.toggle_record().await.unwrap(), RecordToggle::Stopped);
        assert!(!recorder.is_recording());

        recorder.destroy();
        recorder.destroy();
        assert!(!recorder.is_recording());
        assert!(matches!(
            recorder.toggle_record().await,
            Err(DomainError::HandleReleased(_))
        ));
    }

    #[tokio::test]
    async fn test_journal_orders_calls() {
        let engine = engine(SimulationSettings::default());
        let journal = engine.journal();
        let mut player = engine.create_player(HandleId::new(1), "a.mp3", &PlayerOptions::default());
        let mut recorder =
            engine.create_recorder(HandleId::new(2), "file.mp4", &RecorderOptions::default());

        player.destroy();
        recorder.toggle_record().await.unwrap();

        let destroyed = journal.position(&EngineCall::DestroyPlayer(HandleId::new(1))).unwrap();
        let toggled = journal.position(&EngineCall::ToggleRecord(HandleId::new(2))).unwrap();
        assert!(destroyed < toggled);
        assert_eq!(journal.count(|c| matches!(c, EngineCall::CreatePlayer(_))), 1);
    }
}
