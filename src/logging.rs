//! Tracing subscriber setup

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log file to write to, or `None` for stderr
///
/// An explicit file wins; without one logs go to [`config::log_path`].
pub fn destination(log_file: Option<&Path>, stderr: bool) -> Option<PathBuf> {
    if stderr {
        return None;
    }
    Some(log_file.map_or_else(config::log_path, Path::to_path_buf))
}

/// Install the global subscriber
///
/// Logs go to `log_file` through a non-blocking writer when given, otherwise
/// to stderr. The returned guard flushes the file writer on drop and must be
/// kept alive for the life of the program.
pub fn init(log_file: Option<&Path>, json: bool) -> std::io::Result<Option<WorkerGuard>> {
    let Some(path) = log_file else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr);
        if json {
            builder.json().try_init().ok();
        } else {
            builder.try_init().ok();
        }
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "update-resolver.log".into());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false);
    if json {
        builder.json().try_init().ok();
    } else {
        builder.try_init().ok();
    }

    Ok(Some(guard))
}
