//! File logging for the sandbox.
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform log directory.
///
/// - macOS: `~/Library/Caches/automaton/logs`
/// - Linux: `~/.cache/automaton/logs` (or `$XDG_CACHE_HOME/automaton/logs`)
/// - Windows: `%LOCALAPPDATA%\automaton\logs`
/// - Fallback: `/tmp/automaton/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "automaton")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/automaton"))
        .join("logs")
}

/// Logs to `sandbox.log` in [`log_dir`], and also to stderr unless the
/// terminal is being drawn on.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the whole run.
pub fn setup_logging(to_stderr: bool) -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, "sandbox.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Log file: {}/sandbox.log", dir.display());
    Ok(guard)
}
