//! Logging bootstrap: console always, file optionally.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{RagError, Result};

/// Initialize the global tracing subscriber.
///
/// Writes formatted events to stderr; when `log_file` is given, also writes
/// to that file through a non-blocking appender. The returned guard flushes
/// the appender on drop — hold it for the process lifetime.
///
/// The filter honors `RUST_LOG`, defaulting to `info`. Call once at
/// startup.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if the log directory cannot be created
/// or a subscriber is already installed.
pub fn init(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(console_layer);

    match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| {
                    RagError::ConfigError(format!("log path '{}' has no file name", path.display()))
                })?
                .to_owned();
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => Path::new(".").to_path_buf(),
            };
            fs::create_dir_all(&dir).map_err(|e| {
                RagError::ConfigError(format!(
                    "failed to create log directory '{}': {e}",
                    dir.display()
                ))
            })?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);

            registry.with(file_layer).try_init().map_err(|e| {
                RagError::ConfigError(format!("failed to initialize logging: {e}"))
            })?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init().map_err(|e| {
                RagError::ConfigError(format!("failed to initialize logging: {e}"))
            })?;
            Ok(None)
        }
    }
}
