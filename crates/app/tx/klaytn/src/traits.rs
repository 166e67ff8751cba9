//! Core traits for typed transactions.

use alloy_primitives::{keccak256, Address, B256, U256};
use secp256k1::PublicKey;

use crate::codec::to_hex;
use crate::error::{TxError, TxResult};
use crate::recovery::recover_public_key;
use crate::signature::SignatureSet;
use crate::tx_type::TxType;

/// Core trait that all transaction variants implement.
///
/// Covers the shared contract: field access, the sender signing payload,
/// the wire encoding and signature handling. Fee delegation specifics live on
/// [`crate::KlaytnTx`].
pub trait TypedTransaction: Send + Sync {
    fn tx_type(&self) -> TxType;

    /// Returns the sender address.
    ///
    /// For legacy and Ethereum envelope transactions this is the zero address
    /// until it is set or recovered from a signature.
    fn from(&self) -> Address;

    fn nonce(&self) -> Option<u64>;

    fn gas(&self) -> u64;

    fn chain_id(&self) -> Option<u64>;

    /// Returns the recipient address, if the type has one.
    fn to(&self) -> Option<Address>;

    fn value(&self) -> U256;

    fn input(&self) -> &[u8];

    fn signatures(&self) -> &SignatureSet;

    /// Fails with [`TxError::MissingField`] when a value needed to sign or
    /// encode is still unset.
    fn validate_required_fields(&self) -> TxResult<()>;

    /// Bytes the sender signs (before hashing).
    fn signing_payload(&self) -> TxResult<Vec<u8>>;

    /// Full wire encoding, tag included.
    fn encode(&self) -> TxResult<Vec<u8>>;

    /// Adds sender signatures according to the type's cardinality rules.
    fn append_signatures(&mut self, signatures: SignatureSet) -> TxResult<()>;

    /// Keccak256 of [`TypedTransaction::signing_payload`].
    fn signature_hash(&self) -> TxResult<B256> {
        Ok(keccak256(self.signing_payload()?))
    }

    /// Keccak256 of the full wire encoding.
    fn transaction_hash(&self) -> TxResult<B256> {
        Ok(keccak256(self.encode()?))
    }

    /// One public key per sender signature.
    fn recover_public_keys(&self) -> TxResult<Vec<PublicKey>> {
        if self.signatures().is_empty() {
            return Err(TxError::EmptySignature);
        }
        let hash = self.signature_hash()?;
        self.signatures()
            .iter()
            .map(|signature| recover_public_key(hash, signature))
            .collect()
    }

    fn encode_hex(&self) -> TxResult<String> {
        Ok(to_hex(&self.encode()?))
    }
}
