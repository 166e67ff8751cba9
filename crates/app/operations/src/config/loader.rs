//! Configuration file loading.

use crate::config::types::TxConfig;
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::path::Path;

/// Load and validate configuration from a YAML file.
///
/// This function:
/// 1. Reads the file from disk
/// 2. Parses the YAML content
/// 3. Validates all configuration values
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is invalid or names an unknown transaction type
/// - Any configuration value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TxConfig, ConfigError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path_str.clone(),
        source: e,
    })?;

    load_config_from_str(&content, &path_str)
}

/// Load and validate configuration from a YAML string.
///
/// Useful for testing or when config is provided via other means.
pub fn load_config_from_str(content: &str, source_name: &str) -> Result<TxConfig, ConfigError> {
    let config: TxConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: source_name.to_string(),
        source: e,
    })?;

    validate_config(&config)?;

    tracing::debug!(
        source = source_name,
        allowed_types = config.codec.allowed_types.len(),
        "loaded config"
    );
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use klaytn_tx::TxType;
    use std::io::Write;

    const VALID_CONFIG: &str = r#"
chain:
  chain_id: 8217

codec:
  allowed_types:
    - TxTypeLegacyTransaction
    - TxTypeFeeDelegatedValueTransfer

defaults:
  base_fee_multiplier: 3

observability:
  log_level: debug
  log_format: pretty
"#;

    #[test]
    fn test_load_valid_config() {
        let config = load_config_from_str(VALID_CONFIG, "config.yaml").unwrap();
        assert_eq!(config.chain.chain_id, Some(8217));
        assert_eq!(
            config.codec.allowed_types,
            vec![TxType::Legacy, TxType::FeeDelegatedValueTransfer]
        );
        assert_eq!(config.fill_policy().base_fee_multiplier, 3);
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fill_policy().chain_id, Some(8217));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/klaytn-tx.yaml");
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let config_with_unknown = r#"
chain:
  chain_id: 1
  unknown_field: "bad"
"#;
        let result = load_config_from_str(config_with_unknown, "config.yaml");
        match result.unwrap_err() {
            ConfigError::Parse { .. } => {}
            e => panic!("Expected Parse error, got {:?}", e),
        }
    }

    #[test]
    fn test_unknown_type_name_rejected() {
        let config = r#"
codec:
  allowed_types: [TxTypeTeleport]
"#;
        let result = load_config_from_str(config, "config.yaml");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_config_from_str("{}", "config.yaml").unwrap();

        assert_eq!(config.chain.chain_id, None);
        assert_eq!(config.codec.allowed_types.len(), TxType::ALL.len());
        assert_eq!(config.defaults.base_fee_multiplier, 2);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_invalid_yaml_syntax() {
        let bad_yaml = "chain:\n  chain_id: [invalid";
        let result = load_config_from_str(bad_yaml, "config.yaml");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let config_with_invalid_values = r#"
chain:
  chain_id: 0
defaults:
  base_fee_multiplier: 0
"#;
        let result = load_config_from_str(config_with_invalid_values, "config.yaml");
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }
}
