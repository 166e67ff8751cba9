//! Configuration validation.
//!
//! Validates configuration and collects all errors before returning,
//! enabling users to fix multiple issues in a single iteration.

use crate::config::types::{
    ChainConfig, CodecConfig, DefaultsConfig, ObservabilityConfig, TxConfig,
};
use crate::errors::ConfigError;

/// Minimum base fee multiplier.
const MIN_BASE_FEE_MULTIPLIER: u64 = 1;
/// Maximum base fee multiplier.
const MAX_BASE_FEE_MULTIPLIER: u64 = 100;

/// Validate the entire configuration.
///
/// Collects all validation errors and returns them together, allowing users
/// to fix multiple issues at once.
pub fn validate_config(config: &TxConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_chain_config(&config.chain, &mut errors);
    validate_codec_config(&config.codec, &mut errors);
    validate_defaults_config(&config.defaults, &mut errors);
    validate_observability_config(&config.observability, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(errors))
    }
}

fn validate_chain_config(config: &ChainConfig, errors: &mut Vec<String>) {
    if config.chain_id == Some(0) {
        errors.push("chain.chain_id must be greater than 0".to_string());
    }
}

fn validate_codec_config(config: &CodecConfig, errors: &mut Vec<String>) {
    if config.allowed_types.is_empty() {
        errors.push("codec.allowed_types cannot be empty".to_string());
    }

    let mut seen = std::collections::BTreeSet::new();
    for tx_type in &config.allowed_types {
        if !seen.insert(*tx_type) {
            errors.push(format!("codec.allowed_types lists {tx_type} more than once"));
        }
    }
}

fn validate_defaults_config(config: &DefaultsConfig, errors: &mut Vec<String>) {
    if config.base_fee_multiplier < MIN_BASE_FEE_MULTIPLIER {
        errors.push(format!(
            "defaults.base_fee_multiplier must be at least {}",
            MIN_BASE_FEE_MULTIPLIER
        ));
    }

    if config.base_fee_multiplier > MAX_BASE_FEE_MULTIPLIER {
        errors.push(format!(
            "defaults.base_fee_multiplier must be at most {}",
            MAX_BASE_FEE_MULTIPLIER
        ));
    }
}

fn validate_observability_config(config: &ObservabilityConfig, errors: &mut Vec<String>) {
    let valid_levels = [
        "trace", "debug", "info", "warn", "warning", "error", "critical", "crit",
    ];
    if !valid_levels.contains(&config.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_level '{}' is invalid. Valid levels: trace, debug, info, warn, error",
            config.log_level
        ));
    }

    let valid_formats = ["json", "pretty", "text", "human"];
    if !valid_formats.contains(&config.log_format.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_format '{}' is invalid. Valid formats: json, pretty",
            config.log_format
        ));
    }
}
