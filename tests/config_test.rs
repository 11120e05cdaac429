use playdeck::config::Config;
use playdeck::domain::media::RecordingQuality;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// `Config::load` reads the process environment; tests touching it take turns
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[test]
fn test_load_without_file_uses_defaults() {
    let _env = env_lock();
    let config = Config::load(None).unwrap();
    assert_eq!(config.progress.poll_interval(), Duration::from_millis(100));
    assert_eq!(config.progress.seek_debounce(), Duration::from_millis(200));
    assert_eq!(config.media.recording_target, "file.mp4");
}

#[test]
fn test_load_layers_file_over_defaults() {
    let _env = env_lock();
    let path = std::env::temp_dir().join(format!("playdeck-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"
[media]
source_uri = "file:///tmp/intro.mp3"

[recorder]
quality = "low"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.media.source_uri, "file:///tmp/intro.mp3");
    assert_eq!(config.recorder.quality, RecordingQuality::Low);
    assert_eq!(config.recorder.bitrate, 256_000);
    assert_eq!(config.progress.poll_interval(), Duration::from_millis(100));
}

#[test]
fn test_load_rejects_invalid_file() {
    let _env = env_lock();
    let path = std::env::temp_dir().join(format!("playdeck-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "[progress]\npoll_interval_ms = 0\n").unwrap();

    let result = Config::load(Some(&path));
    std::fs::remove_file(&path).unwrap();

    assert!(result.is_err());
}

#[test]
fn test_environment_overrides_file() {
    let _env = env_lock();
    let path = std::env::temp_dir().join(format!("playdeck-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "[progress]\npoll_interval_ms = 250\nseek_debounce_ms = 400\n").unwrap();

    std::env::set_var("PLAYDECK__PROGRESS__POLL_INTERVAL_MS", "50");
    let result = Config::load(Some(&path));
    std::env::remove_var("PLAYDECK__PROGRESS__POLL_INTERVAL_MS");
    std::fs::remove_file(&path).unwrap();

    let config = result.unwrap();
    assert_eq!(config.progress.poll_interval(), Duration::from_millis(50));
    assert_eq!(config.progress.seek_debounce(), Duration::from_millis(400));
}

#[test]
fn test_environment_value_is_validated() {
    let _env = env_lock();
    std::env::set_var("PLAYDECK__PROGRESS__POLL_INTERVAL_MS", "0");
    let result = Config::load(None);
    std::env::remove_var("PLAYDECK__PROGRESS__POLL_INTERVAL_MS");

    assert!(result.is_err());
}
