//! Keyring boundary and the sender / fee payer signing routines.

use alloy_primitives::{Address, B256};

use crate::error::{BoxError, TxError, TxResult};
use crate::signature::{SignatureData, SignatureSet};
use crate::traits::TypedTransaction;
use crate::transaction::Transaction;
use crate::tx_type::TxFamily;

/// Key a keyring should sign with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Transaction,
    AccountUpdate,
    FeePayer,
}

/// Something that holds private keys for one address.
///
/// Implementations may hold several keys per role (multisig) and return one
/// signature per key. `index` selects a single key when set.
pub trait TxSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Signs `hash` with an EIP-155 style `v` (`chain_id * 2 + 35 + parity`).
    fn sign(
        &self,
        hash: B256,
        chain_id: u64,
        role: KeyRole,
        index: Option<usize>,
    ) -> Result<Vec<SignatureData>, BoxError>;

    /// Signs `hash` with a raw y-parity `v`.
    fn ecsign(
        &self,
        hash: B256,
        role: KeyRole,
        index: Option<usize>,
    ) -> Result<Vec<SignatureData>, BoxError>;
}

impl Transaction {
    /// Signs as the sender and appends the result.
    ///
    /// Legacy and Ethereum envelope transactions without a `from` adopt the
    /// signer's address. Account update types use the account update key.
    /// On failure the transaction is left untouched.
    pub fn sign<S: TxSigner + ?Sized>(&mut self, signer: &S, index: Option<usize>) -> TxResult<()> {
        let address = signer.address();
        let family = self.tx_type().family();
        // `from` is not part of these payloads
        let adopt_from = !family.is_native() && self.common().from.is_zero();
        let from = if adopt_from { address } else { self.from() };
        if from != address {
            return Err(TxError::SignerMismatch {
                expected: from,
                actual: address,
            });
        }

        let role = if family == TxFamily::AccountUpdate {
            KeyRole::AccountUpdate
        } else {
            KeyRole::Transaction
        };
        let hash = self.signature_hash()?;
        let signatures = if family.is_ethereum_envelope() {
            signer.ecsign(hash, role, index)
        } else {
            signer.sign(hash, self.effective_chain_id()?, role, index)
        }
        .map_err(TxError::Signer)?;

        tracing::debug!(
            tx_type = %self.tx_type(),
            signer = %address,
            count = signatures.len(),
            "signed transaction"
        );
        self.append_signatures(SignatureSet::normalize(signatures))?;
        if adopt_from {
            self.common_mut().from = address;
        }
        Ok(())
    }

    /// Signs as the fee payer and appends to the fee payer signatures.
    ///
    /// An unset fee payer becomes the signer's address once signing
    /// succeeds.
    pub fn sign_as_fee_payer<S: TxSigner + ?Sized>(
        &mut self,
        signer: &S,
        index: Option<usize>,
    ) -> TxResult<()> {
        if !self.is_fee_delegated() {
            return Err(TxError::NotFeeDelegated(self.tx_type()));
        }
        let address = signer.address();
        // the fee payer is part of its own payload, so stage it on a copy
        let mut staged = self.clone();
        match staged.fee_payer() {
            None => staged.set_fee_payer(address)?,
            Some(fee_payer) if fee_payer != address => {
                return Err(TxError::SignerMismatch {
                    expected: fee_payer,
                    actual: address,
                })
            }
            Some(_) => {}
        }

        let payload = staged.fee_payer_signing_payload()?;
        let hash = alloy_primitives::keccak256(payload);
        let chain_id = staged
            .chain_id()
            .ok_or(TxError::MissingField("chainId"))?;
        let signatures = signer
            .sign(hash, chain_id, KeyRole::FeePayer, index)
            .map_err(TxError::Signer)?;

        tracing::debug!(
            tx_type = %staged.tx_type(),
            fee_payer = %address,
            count = signatures.len(),
            "signed as fee payer"
        );
        staged.append_fee_payer_signatures(SignatureSet::normalize(signatures))?;
        *self = staged;
        Ok(())
    }

    /// Chain id used for EIP-155 `v` values; legacy may infer it from an
    /// existing signature.
    fn effective_chain_id(&self) -> TxResult<u64> {
        self.chain_id()
            .or_else(|| self.signatures().first().eip155_chain_id())
            .ok_or(TxError::MissingField("chainId"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fields::TxFields;
    use crate::recovery::public_key_to_address;
    use crate::tx_type::TxType;
    use alloy_primitives::U256;
    use k256::ecdsa::{signature::hazmat::PrehashSigner, SigningKey, VerifyingKey};

    struct Keyring {
        keys: Vec<SigningKey>,
        address: Address,
    }

    impl Keyring {
        fn new(seeds: &[u8]) -> Self {
            let keys: Vec<_> = seeds
                .iter()
                .map(|seed| SigningKey::from_slice(&[*seed; 32]).unwrap())
                .collect();
            let point = VerifyingKey::from(&keys[0]).to_encoded_point(false);
            let hash = alloy_primitives::keccak256(&point.as_bytes()[1..]);
            Self {
                keys,
                address: Address::from_slice(&hash[12..]),
            }
        }

        fn raw(&self, hash: B256, v_base: u64, index: Option<usize>) -> Vec<SignatureData> {
            self.keys
                .iter()
                .enumerate()
                .filter(|(i, _)| index.map_or(true, |wanted| wanted == *i))
                .map(|(_, key)| {
                    let (sig, recid) = key.sign_prehash(hash.as_ref()).unwrap();
                    SignatureData::new(
                        v_base + u64::from(recid.is_y_odd()),
                        U256::from_be_slice(&sig.r().to_bytes()),
                        U256::from_be_slice(&sig.s().to_bytes()),
                    )
                })
                .collect()
        }
    }

    impl TxSigner for Keyring {
        fn address(&self) -> Address {
            self.address
        }

        fn sign(
            &self,
            hash: B256,
            chain_id: u64,
            _role: KeyRole,
            index: Option<usize>,
        ) -> Result<Vec<SignatureData>, BoxError> {
            Ok(self.raw(hash, chain_id * 2 + 35, index))
        }

        fn ecsign(
            &self,
            hash: B256,
            _role: KeyRole,
            index: Option<usize>,
        ) -> Result<Vec<SignatureData>, BoxError> {
            Ok(self.raw(hash, 0, index))
        }
    }

    struct Broken(Address);

    impl TxSigner for Broken {
        fn address(&self) -> Address {
            self.0
        }

        fn sign(&self, _: B256, _: u64, _: KeyRole, _: Option<usize>) -> Result<Vec<SignatureData>, BoxError> {
            Err("keystore locked".into())
        }

        fn ecsign(&self, _: B256, _: KeyRole, _: Option<usize>) -> Result<Vec<SignatureData>, BoxError> {
            Err("keystore locked".into())
        }
    }

    fn base(from: Address) -> TxFields {
        TxFields::new()
            .from(from)
            .to(Address::repeat_byte(0x22))
            .value(U256::from(1))
            .nonce(0u64)
            .gas_price(25_000_000_000u128)
            .gas(100_000u64)
            .chain_id(1001u64)
    }

    #[test]
    fn test_multisig_sender_signs_with_every_key() {
        let keyring = Keyring::new(&[1, 2, 3]);
        let mut tx = Transaction::create(TxType::ValueTransfer, base(keyring.address)).unwrap();
        tx.sign(&keyring, None).unwrap();
        assert_eq!(tx.signatures().len(), 3);
        assert!(tx.signatures().iter().all(|sig| sig.v == 2037 || sig.v == 2038));

        let keys = tx.recover_public_keys().unwrap();
        assert_eq!(public_key_to_address(&keys[0]), keyring.address);
    }

    #[test]
    fn test_sign_with_index_uses_one_key() {
        let keyring = Keyring::new(&[1, 2]);
        let mut tx = Transaction::create(TxType::Cancel, base(keyring.address)).unwrap();
        tx.sign(&keyring, Some(1)).unwrap();
        assert_eq!(tx.signatures().len(), 1);
    }

    #[test]
    fn test_signer_mismatch() {
        let keyring = Keyring::new(&[1]);
        let mut tx = Transaction::create(TxType::Cancel, base(Address::repeat_byte(9))).unwrap();
        assert!(matches!(
            tx.sign(&keyring, None),
            Err(TxError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn test_envelope_adopts_signer_and_uses_y_parity() {
        let keyring = Keyring::new(&[7]);
        let mut tx = Transaction::create(
            TxType::EthereumDynamicFee,
            TxFields {
                from: None,
                ..base(Address::ZERO)
            }
            .max_fee_per_gas(2u128)
            .max_priority_fee_per_gas(1u128),
        )
        .unwrap();
        tx.sign(&keyring, None).unwrap();
        assert_eq!(tx.from(), keyring.address);
        assert!(tx.signatures().first().v <= 1);

        let decoded = Transaction::decode(&tx.encode().unwrap()).unwrap();
        assert_eq!(decoded.from(), keyring.address);
    }

    #[test]
    fn test_fee_payer_flow() {
        let sender = Keyring::new(&[1]);
        let payer = Keyring::new(&[2]);
        let mut tx =
            Transaction::create(TxType::FeeDelegatedValueTransfer, base(sender.address)).unwrap();
        tx.sign(&sender, None).unwrap();
        tx.sign_as_fee_payer(&payer, None).unwrap();

        assert_eq!(tx.fee_payer(), Some(payer.address));
        assert_eq!(tx.fee_payer_signatures().unwrap().len(), 1);
        let keys = tx.recover_fee_payer_public_keys().unwrap();
        assert_eq!(public_key_to_address(&keys[0]), payer.address);
    }

    #[test]
    fn test_fee_payer_rejected_for_basic_type() {
        let payer = Keyring::new(&[2]);
        let mut tx = Transaction::create(TxType::ValueTransfer, base(Address::repeat_byte(1))).unwrap();
        assert!(matches!(
            tx.sign_as_fee_payer(&payer, None),
            Err(TxError::NotFeeDelegated(TxType::ValueTransfer))
        ));
    }

    #[test]
    fn test_keyring_failure_is_opaque() {
        let mut tx = Transaction::create(TxType::Legacy, base(Address::ZERO)).unwrap();
        assert!(matches!(
            tx.sign(&Broken(Address::ZERO), None),
            Err(TxError::Signer(_))
        ));
    }

    #[test]
    fn test_failed_sign_leaves_tx_untouched() {
        for tx_type in [TxType::Legacy, TxType::EthereumAccessList] {
            let mut tx = Transaction::create(tx_type, base(Address::ZERO)).unwrap();
            let before = tx.clone();
            let raw = tx.encode().unwrap();

            let result = tx.sign(&Broken(Address::repeat_byte(0x09)), None);
            assert!(matches!(result, Err(TxError::Signer(_))));
            assert_eq!(tx, before);
            assert!(tx.from().is_zero());
            assert_eq!(tx.encode().unwrap(), raw);
        }
    }

    #[test]
    fn test_failed_fee_payer_sign_leaves_tx_untouched() {
        let sender = Keyring::new(&[1]);
        let mut tx =
            Transaction::create(TxType::FeeDelegatedValueTransfer, base(sender.address)).unwrap();
        tx.sign(&sender, None).unwrap();
        let before = tx.clone();
        let raw = tx.encode().unwrap();

        let result = tx.sign_as_fee_payer(&Broken(Address::repeat_byte(0x09)), None);
        assert!(matches!(result, Err(TxError::Signer(_))));
        assert_eq!(tx.fee_payer(), None);
        assert_eq!(tx, before);
        assert_eq!(tx.encode().unwrap(), raw);
    }
}
