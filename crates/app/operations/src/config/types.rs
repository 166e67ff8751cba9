//! Configuration types for transaction tooling.

use klaytn_tx::{FillPolicy, TransactionDecoder, TxType};
use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxConfig {
    /// Chain-specific configuration.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Which transaction types the decoder accepts.
    #[serde(default)]
    pub codec: CodecConfig,

    /// Values used when filling unset transaction fields.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl TxConfig {
    /// Decoder restricted to `codec.allowed_types`.
    pub fn decoder(&self) -> TransactionDecoder {
        TransactionDecoder::with_types(self.codec.allowed_types.iter().copied())
    }

    /// Fill policy built from `chain` and `defaults`.
    pub fn fill_policy(&self) -> FillPolicy {
        FillPolicy {
            chain_id: self.chain.chain_id,
            base_fee_multiplier: self.defaults.base_fee_multiplier,
        }
    }
}

/// Chain-specific configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Chain id used instead of asking the node. Must be > 0 when set.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Decoder configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Accepted type names, e.g. `TxTypeValueTransfer`. Default: every type.
    #[serde(default = "CodecConfig::default_allowed_types")]
    pub allowed_types: Vec<TxType>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            allowed_types: Self::default_allowed_types(),
        }
    }
}

impl CodecConfig {
    fn default_allowed_types() -> Vec<TxType> {
        TxType::ALL.to_vec()
    }
}

/// Default filling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Multiplier applied to the base fee for `maxFeePerGas`. Default: 2.
    #[serde(default = "DefaultsConfig::default_base_fee_multiplier")]
    pub base_fee_multiplier: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            base_fee_multiplier: Self::default_base_fee_multiplier(),
        }
    }
}

impl DefaultsConfig {
    const fn default_base_fee_multiplier() -> u64 {
        klaytn_tx::provider::DEFAULT_BASE_FEE_MULTIPLIER
    }
}

/// Observability configuration for logging.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level: trace, debug, info, warn, error. Default: info.
    #[serde(default = "ObservabilityConfig::default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty. Default: json.
    #[serde(default = "ObservabilityConfig::default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: Self::default_log_format(),
        }
    }
}

impl ObservabilityConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_log_format() -> String {
        "json".to_string()
    }
}
