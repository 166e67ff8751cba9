//! Transaction-specific error types.

use alloy_primitives::Address;
use thiserror::Error;

use crate::tx_type::TxType;

/// Opaque error produced by an external collaborator (keyring or RPC).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the transaction codec and signing routines.
///
/// Every variant is a local, synchronous validation failure. Nothing here is
/// retryable; collaborator failures are carried through untouched.
#[derive(Debug, Error)]
pub enum TxError {
    // Decoding / dispatch
    #[error("transaction type tag mismatch: expected {expected}, got {actual}")]
    TypeTagMismatch { expected: String, actual: String },

    #[error("failed to decode {tx_type}: {source}")]
    UnknownVariant {
        tx_type: TxType,
        #[source]
        source: Box<TxError>,
    },

    #[error("transaction type {0} is not allowed by this decoder")]
    TxTypeNotAllowed(TxType),

    #[error("empty transaction input")]
    EmptyInput,

    #[error("trailing bytes after transaction")]
    TrailingBytes,

    #[error("rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    // Field validation
    #[error("unsupported code format {0}: only EVM (0) is supported")]
    UnsupportedCodeFormat(u64),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid storage key: {0}")]
    InvalidStorageKey(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("fee ratio {0} is out of range, must be within [1, 99]")]
    FeeRatioOutOfRange(u64),

    #[error("invalid human readable flag {0}, must be 0 or 1")]
    InvalidHumanReadableFlag(u64),

    #[error("`{first}` and `{second}` cannot be set at the same time")]
    MutuallyExclusiveFields {
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid account key: {0}")]
    InvalidAccountKey(String),

    // Signatures
    #[error("{0} already holds a signature and cannot include more than one")]
    DuplicateSignature(TxType),

    #[error("{tx_type} accepts a single signature, got {count}")]
    TooManySignatures { tx_type: TxType, count: usize },

    #[error("invalid y-parity {0}, must be 0 or 1")]
    InvalidYParity(u64),

    #[error("no signature to recover from")]
    EmptySignature,

    #[error("failed to recover signer from signature: {0}")]
    SignatureRecovery(String),

    #[error("{0} is not a fee delegated transaction type")]
    NotFeeDelegated(TxType),

    #[error("signer {actual} does not match transaction address {expected}")]
    SignerMismatch { expected: Address, actual: Address },

    #[error("cannot combine signatures: {0}")]
    CombineMismatch(String),

    // Collaborators
    #[error("signer failed: {0}")]
    Signer(#[source] BoxError),

    #[error("provider failed: {0}")]
    Provider(#[source] BoxError),
}

/// Result type for transaction operations.
pub type TxResult<T> = Result<T, TxError>;
