//! Diagnostic logging.
//!
//! The terminal belongs to the UI, so events are written to a log file in the
//! data directory. `KOTO_LOG` takes an `EnvFilter` directive and overrides the
//! `--log-level` flag.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive such as `koto=debug`.
pub const LOG_ENV: &str = "KOTO_LOG";

/// Verbosity selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Filter from `KOTO_LOG`, falling back to the given level for this crate only.
pub fn filter_for(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_directive(default_level))
}

fn default_directive(level: LogLevel) -> EnvFilter {
    EnvFilter::new(format!("warn,koto={}", Level::from(level)))
}

/// Append log events to `log_path`, creating its directory when needed.
pub fn init_to_file(log_path: &Path, default_level: LogLevel) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    let layer = tracing_subscriber::fmt::layer().with_writer(log_file).with_ansi(false);
    tracing_subscriber::registry()
        .with(filter_for(default_level))
        .with(layer)
        .try_init()?;
    Ok(())
}
