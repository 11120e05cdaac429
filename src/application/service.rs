//! Controller service
//!
//! Runs the controller on a single task. UI commands, player notifications
//! and poller ticks are all funnelled through one `select!` loop, so handle
//! state is never touched from two places at once.

use super::controller::{ControlCommand, PlaybackRecordingController};
use super::poller::ProgressPoller;
use crate::domain::media::EventReceiver;
use crate::domain::playback::UiState;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 32;

enum Envelope {
    Command(ControlCommand, oneshot::Sender<Result<()>>),
    Shutdown,
}

/// What is left once the service loop has exited
pub struct StoppedService {
    pub controller: PlaybackRecordingController,
    pub poller: ProgressPoller,
}

pub struct ControllerService;

impl ControllerService {
    /// Initialize the controller, start the poller and spawn the event loop
    pub async fn start(
        mut controller: PlaybackRecordingController,
        mut poller: ProgressPoller,
        mut handle_events: EventReceiver,
    ) -> Result<ControllerHandle> {
        controller.initialize().await?;
        if let Err(e) = poller.start() {
            controller.teardown();
            return Err(e);
        }

        let state = controller.subscribe();
        let (commands_tx, mut commands) = mpsc::channel(COMMAND_BUFFER);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    envelope = commands.recv() => match envelope {
                        Some(Envelope::Command(command, reply)) => {
                            debug!("Executing {:?}", command);
                            let outcome = controller.execute(command).await;
                            // caller may have stopped waiting
                            let _ = reply.send(outcome);
                        }
                        Some(Envelope::Shutdown) | None => break,
                    },
                    Some(event) = handle_events.recv() => controller.handle_event(event),
                    _ = poller.tick() => {
                        controller.refresh_progress();
                    }
                }
            }

            // poller goes first so no tick can read a half-destroyed handle
            if let Err(e) = poller.stop() {
                warn!("Stopping progress poller: {}", e);
            }
            controller.teardown();
            info!("Controller service stopped");

            StoppedService { controller, poller }
        });

        Ok(ControllerHandle {
            commands: commands_tx,
            state,
            task,
        })
    }
}

/// Entry point for a presentation binding
pub struct ControllerHandle {
    commands: mpsc::Sender<Envelope>,
    state: watch::Receiver<UiState>,
    task: JoinHandle<StoppedService>,
}

impl ControllerHandle {
    pub async fn play_pause(&self) -> Result<()> {
        self.send(ControlCommand::PlayPause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(ControlCommand::Stop).await
    }

    pub async fn seek(&self, fraction: f64) -> Result<()> {
        self.send(ControlCommand::Seek(fraction)).await
    }

    pub async fn toggle_recording(&self) -> Result<()> {
        self.send(ControlCommand::ToggleRecording).await
    }

    pub async fn set_looping(&self, enabled: bool) -> Result<()> {
        self.send(ControlCommand::SetLooping(enabled)).await
    }

    /// Latest published state
    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.clone()
    }

    /// Stop the loop, cancel the poller, then release both handles
    pub async fn shutdown(self) -> Result<StoppedService> {
        if self.commands.send(Envelope::Shutdown).await.is_err() {
            debug!("Controller loop already gone");
        }
        self.task
            .await
            .map_err(|e| DomainError::TaskFailed(e.to_string()))
    }

    async fn send(&self, command: ControlCommand) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Envelope::Command(command, reply_tx))
            .await
            .map_err(|_| DomainError::ServiceStopped)?;
        reply_rx.await.map_err(|_| DomainError::ServiceStopped)?
    }
}
