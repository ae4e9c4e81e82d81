//! Tracing setup shared by smtm binaries.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub const LOG_FILE_PREFIX: &str = "smtm.log";

static TRACING_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the global subscriber: env-configurable filter, compact console
/// output and, when `log_dir` is given, a daily-rolling file.
///
/// Keep the returned guard alive for as long as file output should be flushed.
/// Calling this again after a subscriber is installed leaves the first one in place.
pub fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(file_layer);
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        let _ = TRACING_HANDLE.set(handle);
    }
    debug!(file_output = log_dir.is_some(), "tracing initialized");
    Ok(guard)
}

/// Swap the active filter, e.g. with the level from configuration.
pub fn reload_tracing_filter(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)?;
    if let Some(handle) = TRACING_HANDLE.get() {
        handle.reload(filter)?;
    }
    Ok(())
}
