use playdeck::application::{
    ControllerHandle, ControllerService, ControllerSettings, PlaybackRecordingController,
    ProgressPoller,
};
use playdeck::config::Config;
use playdeck::domain::media::event_channel;
use playdeck::domain::playback::UiState;
use playdeck::infrastructure::{SimulatedEngine, SimulationSettings, TokioClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PLAYDECK_CONFIG").ok())
        .map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    info!("Starting playdeck v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration loaded: {:?}", config);

    let clock = Arc::new(TokioClock);
    let engine = Arc::new(SimulatedEngine::new(
        SimulationSettings {
            duration_secs: config.simulation.duration_secs,
            fail_prepare: config.simulation.fail_prepare,
            ..SimulationSettings::default()
        },
        clock.clone(),
    ));

    let (events_tx, events_rx) = event_channel();
    let controller = PlaybackRecordingController::new(
        engine,
        clock,
        ControllerSettings::from(&config),
        events_tx,
    );
    let poller = ProgressPoller::new(config.progress.poll_interval());

    let handle = ControllerService::start(controller, poller, events_rx).await?;
    let watcher = tokio::spawn(log_state_changes(handle.subscribe()));

    tokio::select! {
        result = run_demo(&handle) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    info!("Final state: {}", handle.state().to_json()?);
    let stopped = handle.shutdown().await?;
    info!(
        "Shut down after {} progress ticks",
        stopped.poller.ticks()
    );
    watcher.abort();

    Ok(())
}

/// Walk through every control once
async fn run_demo(handle: &ControllerHandle) -> anyhow::Result<()> {
    info!("=== Playback ===");
    handle.play_pause().await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    handle.seek(0.5).await?;
    handle.set_looping(true).await?;
    tokio::time::sleep(Duration::from_millis(600)).await;

    handle.play_pause().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.stop().await?;

    info!("=== Recording ===");
    handle.toggle_recording().await?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.toggle_recording().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    info!("=== Demo complete ===");
    Ok(())
}

/// Log gate changes at info and progress-only changes at debug
async fn log_state_changes(mut updates: tokio::sync::watch::Receiver<UiState>) {
    let (mut last_gates, mut last_error) = {
        let state = updates.borrow();
        (state.gates(), state.error.clone())
    };

    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        let json = match state.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("Cannot serialize UI state: {}", e);
                continue;
            }
        };

        if state.gates() != last_gates || state.error != last_error {
            info!("ui: {}", json);
            last_gates = state.gates();
            last_error = state.error;
        } else {
            debug!("ui: {}", json);
        }
    }
}
