//! Structured logging with runtime-adjustable log levels.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` behind a
//! reload layer, so the level can change after startup. `RUST_LOG` takes
//! precedence over the configured level when set.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

use crate::errors::LoggingError;

/// Handle for runtime log level adjustment.
pub struct LogLevelSwitch {
    handle: reload::Handle<EnvFilter, Registry>,
    level: AtomicU8,
}

impl LogLevelSwitch {
    /// Set the minimum log level at runtime.
    pub fn set_level(&self, level: Level) -> Result<(), LoggingError> {
        self.handle.reload(level_filter(level))?;
        self.level.store(level_to_u8(level), Ordering::SeqCst);
        Ok(())
    }

    /// Get the current log level.
    pub fn level(&self) -> Level {
        u8_to_level(self.level.load(Ordering::SeqCst))
    }
}

/// Log format for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for machine parsing (production).
    #[default]
    Json,
    /// Human-readable format (development).
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = std::convert::Infallible;

    /// Parse from string, case-insensitive. Defaults to Json for unknown values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "text" | "human" => Self::Pretty,
            _ => Self::Json,
        })
    }
}

/// Parse log level from string.
pub fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" | "crit" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn level_to_u8(level: Level) -> u8 {
    match level {
        Level::ERROR => 1,
        Level::WARN => 2,
        Level::INFO => 3,
        Level::DEBUG => 4,
        _ => 5,
    }
}

fn u8_to_level(val: u8) -> Level {
    match val {
        0 | 1 => Level::ERROR,
        2 => Level::WARN,
        3 => Level::INFO,
        4 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

/// Initialize the logging system from configuration strings.
///
/// Convenience wrapper that parses level and format from strings.
///
/// # Example
///
/// ```no_run
/// use klaytn_operations::observability::logging::init_logging_from_config;
///
/// let level_switch = init_logging_from_config("info", "json").unwrap();
/// tracing::info!(version = "0.1.0", "decoder ready");
/// ```
pub fn init_logging_from_config(level: &str, format: &str) -> Result<LogLevelSwitch, LoggingError> {
    let level = parse_level(level);
    let format: LogFormat = format.parse().unwrap_or_default();
    init_logging(level, format)
}

/// Initialize the logging system.
///
/// Installs the global subscriber and returns a handle to adjust the level
/// at runtime. Fails if a global subscriber is already set.
///
/// # Example
///
/// ```no_run
/// use klaytn_operations::observability::logging::{init_logging, LogFormat};
/// use tracing::Level;
///
/// let level_switch = init_logging(Level::INFO, LogFormat::Json).unwrap();
/// tracing::info!("decoder ready");
///
/// // Adjust level at runtime
/// level_switch.set_level(Level::DEBUG).unwrap();
/// ```
pub fn init_logging(level: Level, format: LogFormat) -> Result<LogLevelSwitch, LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(level));
    let (filter, handle) = reload::Layer::new(filter);

    let output = match format {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()?;

    Ok(LogLevelSwitch {
        handle,
        level: AtomicU8::new(level_to_u8(level)),
    })
}
