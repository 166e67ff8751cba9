//! Transaction variants.
//!
//! - [`LegacyTx`]: untagged pre-typed transactions with EIP-155 signatures
//! - [`KlaytnTx`]: the 21 native Klaytn shapes, driven by a per-family field layout
//! - [`EthereumAccessListTx`] / [`EthereumDynamicFeeTx`]: EIP-2930 and EIP-1559
//!   transactions nested under the `0x78` envelope tag
//! - [`Transaction`]: the closed union of all of the above

pub mod eip1559;
pub mod eip2930;
pub mod envelope;
pub mod legacy;
pub mod native;

use alloy_primitives::Address;

use crate::error::{TxError, TxResult};
use crate::recovery::public_key_to_address;
use crate::signature::SignatureSet;
use crate::traits::TypedTransaction;

pub use eip1559::EthereumDynamicFeeTx;
pub use eip2930::EthereumAccessListTx;
pub use envelope::Transaction;
pub use legacy::LegacyTx;
pub use native::{FieldKind, KlaytnTx};

/// Fields every transaction carries.
///
/// Signatures are only reachable through methods that enforce the
/// cardinality and `v` rules of the owning type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonFields {
    pub from: Address,
    pub nonce: Option<u64>,
    pub gas: u64,
    pub chain_id: Option<u64>,
    pub(crate) signatures: SignatureSet,
}

impl CommonFields {
    pub(crate) fn require_nonce(&self) -> TxResult<u64> {
        self.nonce.ok_or(TxError::MissingField("nonce"))
    }

    pub(crate) fn require_chain_id(&self) -> TxResult<u64> {
        self.chain_id.ok_or(TxError::MissingField("chainId"))
    }
}

pub(crate) fn require_gas_price(gas_price: Option<u128>) -> TxResult<u128> {
    gas_price.ok_or(TxError::MissingField("gasPrice"))
}

/// Checks that `bytes` starts with `expected` and returns the remainder.
pub(crate) fn strip_tag<'a>(bytes: &'a [u8], expected: &[u8], name: &str) -> TxResult<&'a [u8]> {
    if bytes.is_empty() {
        return Err(TxError::EmptyInput);
    }
    bytes
        .strip_prefix(expected)
        .ok_or_else(|| TxError::TypeTagMismatch {
            expected: name.to_string(),
            actual: crate::codec::to_hex(bytes.get(..expected.len()).unwrap_or(bytes)),
        })
}

/// Recovers the sender of a decoded transaction whose encoding carries no
/// `from` field. Unrecoverable signatures leave the zero address.
pub(crate) fn recover_sender<T: TypedTransaction>(tx: &T) -> Address {
    match tx.recover_public_keys() {
        Ok(keys) => keys.first().map(public_key_to_address).unwrap_or_default(),
        Err(err) => {
            tracing::debug!(tx_type = %tx.tx_type(), error = %err, "could not recover sender");
            Address::ZERO
        }
    }
}
