//! Observability infrastructure.
//!
//! - **Logging**: Structured JSON or pretty logging via `tracing` with
//!   runtime-adjustable levels

pub mod logging;

pub use logging::{init_logging, init_logging_from_config, parse_level, LogFormat, LogLevelSwitch};
