//! Logging setup.

use pricecache_config::LoggingConfig;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging from the logging config.
///
/// `RUST_LOG` overrides the configured level. When a log file is configured,
/// events are also written there; keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match config.file.as_deref() {
        Some(file) => {
            let (dir, name) = split_log_path(file);
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if config.format == "json" {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer().pretty()).try_init()?;
    }

    Ok(guard)
}

/// Split a log file path into directory and file name.
fn split_log_path(file: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name().map(Path::new).unwrap_or_else(|| Path::new("pricecache.log"));
    (dir.to_path_buf(), name.to_path_buf())
}
