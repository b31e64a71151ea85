//! Structured logging infrastructure for OutageMap.
//!
//! A thin layer over `tracing-subscriber`: the configured level becomes the
//! default directive of an `EnvFilter` (so `RUST_LOG` still wins), noisy
//! storage crates are capped at `warn`, and output goes to stdout or a
//! non-blocking file writer.

#[cfg(test)]
mod tests;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Keeps the file writer alive for the lifetime of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Directives appended to every filter
const QUIET_DIRECTIVES: &[&str] = &["surrealdb=warn", "surrealdb_core=warn", "rocksdb=warn"];

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the logging system with the given configuration.
///
/// Calling this when a global subscriber is already installed is not an error.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    let result = match (&config.file, config.stdout) {
        (Some(path), false) => {
            let (writer, guard) = create_non_blocking_file(path)?;
            let result = init_with_writer(config, filter, writer);
            if result.is_ok() {
                let _ = FILE_GUARD.set(guard);
            }
            result
        }
        (Some(_), true) => {
            let result = init_with_writer(config, filter, std::io::stdout);
            tracing::warn!("Configured for stdout; file logging ignored");
            result
        }
        (None, true) => init_with_writer(config, filter, std::io::stdout),
        (None, false) => Ok(()),
    };

    // If the error is "already set", ignore it
    if let Err(LogError::SubscriberError(ref e)) = result
        && (e.to_string().contains("SetGlobalDefaultError")
            || e.to_string().contains("global default trace dispatcher has already been set"))
    {
        return Ok(());
    }

    result
}

fn init_with_writer<W>(config: &LoggingConfig, filter: EnvFilter, writer: W) -> Result<()>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_level(true)
        .with_target(true);

    match config.format {
        LogFormat::Json => builder
            .json()
            .with_line_number(true)
            .with_thread_ids(true)
            .try_init()?,
        LogFormat::Compact => builder.compact().try_init()?,
        LogFormat::Pretty => builder.pretty().with_line_number(true).try_init()?,
        LogFormat::Default => builder.try_init()?,
    }

    Ok(())
}

/// Build an `EnvFilter` from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(level: &LogLevel) -> EnvFilter {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    for directive in QUIET_DIRECTIVES {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    filter
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::IoError(std::io::Error::other("log path has no file name")))?;

    let file_appender = tracing_appender::rolling::never(
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        file_name,
    );

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
        }
    }
}

impl std::error::Error for LogError {}
