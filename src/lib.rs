pub mod models;
pub mod services;
pub mod api;
pub mod web;

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use api::AppState;
use services::{build_detector, AppConfig, ConfigStore};

static PROCESS_START: OnceLock<Instant> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_PREFIX: &str = "ai-detector_";

fn startup_elapsed_ms() -> u128 {
    PROCESS_START
        .get()
        .map(|t| t.elapsed().as_millis())
        .unwrap_or(0)
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

/// Initialize logging system with timestamped log files
pub fn init_logging() {
    let disable_file_log = env_flag("AI_DETECTOR_DISABLE_FILE_LOG");
    let disable_cleanup = env_flag("AI_DETECTOR_DISABLE_LOG_CLEANUP");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if disable_file_log {
        init_console_only_logging(env_filter);
        info!("File logging disabled via AI_DETECTOR_DISABLE_FILE_LOG");
        return;
    }

    let logs_dir = match std::env::var("AI_DETECTOR_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => get_logs_dir(),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        init_console_only_logging(env_filter);
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("{}{}.log", LOG_PREFIX, timestamp);

    // One file per session; writes go through a background worker.
    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    info!("=== AI Detector Started ===");
    info!("Log file: {}/{}", logs_dir.display(), log_filename);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if !disable_cleanup {
        std::thread::spawn(move || {
            cleanup_old_logs(&logs_dir, 30);
        });
    }
}

/// Get the logs directory path
fn get_logs_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join(services::APP_DIR_NAME).join("logs");
    }
    PathBuf::from("logs")
}

fn cleanup_old_logs(logs_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with(LOG_PREFIX) && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    entries.sort_by_key(|e| {
        e.metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}

/// Console-only subscriber, also used by the CLI.
pub fn init_console_only_logging(env_filter: EnvFilter) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

/// Load config from `config_path` (or the default location) with env overrides.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<(AppConfig, ConfigStore)> {
    let store = ConfigStore::resolve(config_path);
    let mut config = store
        .load()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load {}", store.config_file().display()))?;
    config.apply_env_overrides();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Invalid config {}", store.config_file().display()))?;
    Ok((config, store))
}

/// Server options coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Build state: the model handle is created once and shared by every entry point.
pub async fn build_state(config: &AppConfig, store: Option<&ConfigStore>) -> AppState {
    let t0 = Instant::now();
    match build_detector(config, store).await {
        Ok(detector) => {
            info!(
                model = detector.model_name(),
                load_ms = t0.elapsed().as_millis() as u64,
                "model.loaded"
            );
            AppState::ready(detector)
        }
        Err(e) => {
            error!(error = %e, "model.load_failed");
            warn!("Serving without a model; detection requests will report it as not loaded");
            AppState::unavailable(
                config.detection.input_policy(),
                config.classifier.model.clone(),
                e.to_string(),
            )
        }
    }
}

pub async fn run(options: ServeOptions) -> anyhow::Result<()> {
    PROCESS_START.get_or_init(Instant::now);

    let logging_t0 = Instant::now();
    init_logging();
    info!(startup_ms = startup_elapsed_ms(), logging_ms = logging_t0.elapsed().as_millis(), "logging.initialized");

    let (mut config, store) = load_config(options.config_path.as_deref())?;
    if let Some(host) = options.host {
        config.server.host = host;
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    info!(
        config = %store.config_file().display(),
        min_input_length = config.detection.min_input_length,
        max_input_chars = config.detection.max_input_chars,
        "config.loaded"
    );

    let state = build_state(&config, Some(&store)).await;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(startup_ms = startup_elapsed_ms(), %addr, "server.listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("=== AI Detector Shutting Down ===");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.json");
        fs::write(&path, r#"{"server": {"port": 9001}}"#).unwrap();

        let (config, store) = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(store.config_file(), path.as_path());
    }

    #[test]
    fn test_load_config_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_load_config_rejects_zero_input_budget() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.json");
        fs::write(&path, r#"{"detection": {"maxInputChars": 0}}"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_cleanup_old_logs_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{}{}.log", LOG_PREFIX, i)), "x").unwrap();
        }
        fs::write(dir.path().join("unrelated.log"), "x").unwrap();

        cleanup_old_logs(dir.path(), 2);

        let remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with(LOG_PREFIX))
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(dir.path().join("unrelated.log").exists());
    }

    #[tokio::test]
    async fn test_build_state_is_ready_with_default_config() {
        let state = build_state(&AppConfig::default(), None).await;
        assert!(state.detector.is_some());
        assert!(state.load_error.is_none());
    }
}
