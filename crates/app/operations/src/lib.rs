//! Operations infrastructure for Klaytn transaction tooling.
//!
//! - **Config**: YAML-based configuration with fail-fast validation, bridged
//!   to a [`klaytn_tx::TransactionDecoder`] and [`klaytn_tx::FillPolicy`]
//! - **Observability**: `tracing` subscriber setup with a runtime level switch
//!
//! # Example
//!
//! ```no_run
//! use klaytn_operations::{config::load_config, init_logging_from_config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("klaytn-tx.yaml")?;
//!     let _level_switch = init_logging_from_config(
//!         &config.observability.log_level,
//!         &config.observability.log_format,
//!     )?;
//!
//!     let decoder = config.decoder();
//!     let tx = decoder.decode_hex("0x08f87a...")?;
//!     tracing::info!(tx_type = %klaytn_tx::TypedTransaction::tx_type(&tx), "decoded");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod observability;

pub use config::{load_config, ObservabilityConfig, TxConfig};
pub use errors::{ConfigError, LoggingError};
pub use observability::{init_logging, init_logging_from_config, parse_level, LogFormat, LogLevelSwitch};
