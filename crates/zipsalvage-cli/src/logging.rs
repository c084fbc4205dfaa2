//! Logging setup: concise console output plus a detailed log file.

use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use chrono::NaiveDateTime;
use indicatif::MultiProgress;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logging options taken from the global CLI flags.
pub struct LogOptions<'a> {
    pub verbose: bool,
    pub quiet: bool,
    pub log_dir: &'a Path,
    pub file: bool,
}

/// Keeps the file writer alive; dropping it flushes pending lines.
pub struct LogSession {
    _guard: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// Console lines go to stderr through `progress` so they never tear the
/// progress bars. The file receives every event down to TRACE.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(options: &LogOptions<'_>, progress: &MultiProgress) -> Result<LogSession> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options.verbose, options.quiet)));

    let writer = ProgressWriter {
        progress: progress.clone(),
    };
    let console_layer = fmt::layer()
        .with_writer(move || writer.clone())
        .with_target(false)
        .without_time()
        .with_ansi(console::colors_enabled_stderr())
        .with_filter(console_filter);

    let (file_layer, guard, file) = if options.file {
        fs::create_dir_all(options.log_dir).with_context(|| {
            format!(
                "failed to create log directory '{}'",
                options.log_dir.display()
            )
        })?;
        let name = log_file_name(Local::now().naive_local());
        let appender = tracing_appender::rolling::never(options.log_dir, &name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(LevelFilter::TRACE);
        (Some(layer), Some(guard), Some(options.log_dir.join(name)))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install logger")?;

    if let Some(path) = &file {
        tracing::debug!(log_file = %path.display(), "logging to file");
    }

    Ok(LogSession { _guard: guard })
}

fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

fn log_file_name(time: NaiveDateTime) -> String {
    format!("zipsalvage_{}.log", time.format("%Y%m%d_%H%M%S"))
}

/// Writes to stderr while the progress bars are suspended.
#[derive(Clone)]
struct ProgressWriter {
    progress: MultiProgress,
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
