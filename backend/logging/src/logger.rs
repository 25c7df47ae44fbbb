//! Structured Logger
//!
//! Wraps `tracing` with console output, optional daily-rotated NDJSON files,
//! and environment-based level control (`RUST_LOG` wins over `level`).

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global logger.
///
/// Console output goes to stderr so commands can print JSON on stdout.
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logger(level: &str, json: bool, log_dir: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {level}"))?;

    // Rolling file appender: `quizpilot.log.YYYY-MM-DD`
    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "quizpilot.log");
            Some(fmt::layer().json().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_plain = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_plain)
        .with(console_json)
        .with(file_layer)
        .try_init();
    Ok(())
}
