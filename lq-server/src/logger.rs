use crate::error::{Result as ServerErrorResult, ServerError};

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record, info};

/// Initialize the fern logger.
///
/// Output goes to `log_file` when set, stdout otherwise. Colors apply only
/// to the stdout path. Transport crates under the server are pinned to warn
/// so the subscription pipeline's own logs stay readable at debug.
pub fn initialize(
    log_level: lq_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let base_dispatch = Dispatch::new()
        .level(log_level.0)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("tower", LevelFilter::Warn)
        .level_for("mio", LevelFilter::Warn);

    let dispatch = if let Some(ref log_path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| ServerError::Logger {
                message: format!("Cannot open log file {}: {}", log_path.display(), e),
            })?;

        // Files never get colors
        Dispatch::new().format(plain_format).chain(file)
    } else if colored {
        let colors = ColoredLevelConfig::new()
            .trace(Color::Magenta)
            .debug(Color::Blue)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red);

        Dispatch::new()
            .format(move |out, message, record| {
                write_line(out, message, record, colors.color(record.level()));
            })
            .chain(std::io::stdout())
    } else {
        // Plain text under systemd and docker log capture
        Dispatch::new().format(plain_format).chain(std::io::stdout())
    };

    base_dispatch
        .chain(dispatch)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: format!("Logger install failed: {e}"),
        })?;

    match log_file {
        Some(ref path) => info!("Logging at {:?} to {}", log_level.0, path.display()),
        None => info!("Logging at {:?} to stdout", log_level.0),
    }

    // Let tracing emitters in the HTTP stack join the log sink
    tracing_log::LogTracer::init().ok();

    Ok(())
}

fn plain_format(out: FormatCallback<'_>, message: &fmt::Arguments<'_>, record: &Record<'_>) {
    write_line(out, message, record, record.level());
}

fn write_line(
    out: FormatCallback<'_>,
    message: &fmt::Arguments<'_>,
    record: &Record<'_>,
    level: impl fmt::Display,
) {
    out.finish(format_args!(
        "[{date} {level}] {message} ({file}:{line})",
        date = humantime::format_rfc3339(SystemTime::now()),
        level = level,
        message = message,
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
