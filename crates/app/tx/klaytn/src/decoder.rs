//! Tag-dispatching transaction decoder.

use std::collections::BTreeSet;

use crate::error::{TxError, TxResult};
use crate::transaction::{
    EthereumAccessListTx, EthereumDynamicFeeTx, KlaytnTx, LegacyTx, Transaction,
};
use crate::tx_type::{TxFamily, TxType};

/// Type a raw transaction declares through its prefix.
///
/// Anything that is not a known tag is treated as legacy.
pub fn detect_type(bytes: &[u8]) -> TxResult<TxType> {
    if bytes.is_empty() {
        return Err(TxError::EmptyInput);
    }
    Ok(TxType::from_prefix(bytes).unwrap_or(TxType::Legacy))
}

/// Decodes any transaction.
///
/// Reads the tag (two bytes for the Ethereum envelope), decodes the matching
/// variant and falls back to legacy decoding for unknown prefixes. A failure
/// inside the chosen variant surfaces as [`TxError::UnknownVariant`].
pub fn decode_transaction(bytes: &[u8]) -> TxResult<Transaction> {
    let tx_type = detect_type(bytes)?;
    decode_as(tx_type, bytes).map_err(|source| {
        tracing::debug!(tx_type = %tx_type, error = %source, "transaction decode failed");
        TxError::UnknownVariant {
            tx_type,
            source: Box::new(source),
        }
    })
}

fn decode_as(tx_type: TxType, bytes: &[u8]) -> TxResult<Transaction> {
    tracing::trace!(tx_type = %tx_type, len = bytes.len(), "decoding transaction");
    match tx_type.family() {
        TxFamily::Legacy => LegacyTx::decode(bytes).map(Transaction::Legacy),
        TxFamily::ValueTransfer
        | TxFamily::ValueTransferMemo
        | TxFamily::AccountUpdate
        | TxFamily::SmartContractDeploy
        | TxFamily::SmartContractExecution
        | TxFamily::Cancel
        | TxFamily::ChainDataAnchoring => {
            KlaytnTx::decode_as(tx_type, bytes).map(Transaction::Klaytn)
        }
        TxFamily::EthereumAccessList => {
            EthereumAccessListTx::decode(bytes).map(Transaction::EthereumAccessList)
        }
        TxFamily::EthereumDynamicFee => {
            EthereumDynamicFeeTx::decode(bytes).map(Transaction::EthereumDynamicFee)
        }
    }
}

/// Configurable decoder for Klaytn transactions.
///
/// Allows restricting which transaction types are accepted, useful for
/// callers that only relay specific types.
#[derive(Clone, Debug)]
pub struct TransactionDecoder {
    allowed_types: BTreeSet<TxType>,
}

impl TransactionDecoder {
    /// Create a decoder that accepts every type in the tag table.
    pub fn klaytn() -> Self {
        Self {
            allowed_types: TxType::ALL.into_iter().collect(),
        }
    }

    /// Create a decoder that accepts specific transaction types.
    pub fn with_types(types: impl IntoIterator<Item = TxType>) -> Self {
        Self {
            allowed_types: types.into_iter().collect(),
        }
    }

    /// Add a transaction type to the allowed set.
    pub fn allow_type(&mut self, tx_type: TxType) -> &mut Self {
        self.allowed_types.insert(tx_type);
        self
    }

    /// Check if a transaction type is allowed.
    pub fn is_allowed(&self, tx_type: TxType) -> bool {
        self.allowed_types.contains(&tx_type)
    }

    pub fn allowed_types(&self) -> impl Iterator<Item = TxType> + '_ {
        self.allowed_types.iter().copied()
    }

    /// Decodes `bytes`, rejecting types outside the allowed set before
    /// touching the payload.
    pub fn decode(&self, bytes: &[u8]) -> TxResult<Transaction> {
        let tx_type = detect_type(bytes)?;
        if !self.is_allowed(tx_type) {
            return Err(TxError::TxTypeNotAllowed(tx_type));
        }
        decode_transaction(bytes)
    }

    /// Hex variant of [`TransactionDecoder::decode`].
    pub fn decode_hex(&self, raw: &str) -> TxResult<Transaction> {
        self.decode(&crate::codec::decode_hex(raw)?)
    }
}

impl Default for TransactionDecoder {
    fn default() -> Self {
        Self::klaytn()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fields::TxFields;
    use crate::traits::TypedTransaction;
    use alloy_primitives::{Address, U256};

    fn cancel_raw() -> Vec<u8> {
        Transaction::create(
            TxType::Cancel,
            TxFields::new()
                .from(Address::repeat_byte(1))
                .nonce(1u64)
                .gas_price(1u128)
                .gas(1u64),
        )
        .unwrap()
        .encode()
        .unwrap()
    }

    #[test]
    fn test_klaytn_decoder_types() {
        let decoder = TransactionDecoder::klaytn();
        for tx_type in TxType::ALL {
            assert!(decoder.is_allowed(tx_type));
        }
    }

    #[test]
    fn test_custom_types() {
        let decoder = TransactionDecoder::with_types([TxType::Legacy, TxType::ValueTransfer]);

        assert!(decoder.is_allowed(TxType::Legacy));
        assert!(decoder.is_allowed(TxType::ValueTransfer));
        assert!(!decoder.is_allowed(TxType::Cancel));
        assert!(matches!(
            decoder.decode(&cancel_raw()),
            Err(TxError::TxTypeNotAllowed(TxType::Cancel))
        ));
    }

    #[test]
    fn test_allow_type_builder() {
        let mut decoder = TransactionDecoder::with_types([]);
        decoder.allow_type(TxType::Cancel);

        assert!(decoder.is_allowed(TxType::Cancel));
        assert_eq!(decoder.decode(&cancel_raw()).unwrap().tx_type(), TxType::Cancel);
    }

    #[test]
    fn test_unknown_prefix_falls_back_to_legacy() {
        let legacy = Transaction::create(
            TxType::Legacy,
            TxFields::new()
                .nonce(0u64)
                .gas_price(1u128)
                .gas(21_000u64)
                .chain_id(1u64)
                .value(U256::from(1)),
        )
        .unwrap();
        let raw = legacy.encode().unwrap();
        assert_eq!(detect_type(&raw).unwrap(), TxType::Legacy);
        assert_eq!(decode_transaction(&raw).unwrap().tx_type(), TxType::Legacy);

        // an unknown tag byte is handed to the legacy decoder, which fails
        let err = decode_transaction(&[0x07, 0xc0]).unwrap_err();
        assert!(matches!(
            err,
            TxError::UnknownVariant {
                tx_type: TxType::Legacy,
                ..
            }
        ));
    }

    #[test]
    fn test_structural_failure_is_wrapped() {
        let mut raw = cancel_raw();
        raw.truncate(raw.len() - 1);
        let err = decode_transaction(&raw).unwrap_err();
        assert!(matches!(
            err,
            TxError::UnknownVariant {
                tx_type: TxType::Cancel,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            decode_transaction(&[]),
            Err(TxError::EmptyInput)
        ));
    }
}
