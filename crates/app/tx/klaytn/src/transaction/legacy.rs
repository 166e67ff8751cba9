//! Legacy (untagged) transaction type.

use alloy_primitives::{Address, Bytes, U256};

use crate::codec::{RlpList, RlpReader};
use crate::error::{TxError, TxResult};
use crate::fields::TxFields;
use crate::signature::{SignatureData, SignatureSet};
use crate::traits::TypedTransaction;
use crate::transaction::{recover_sender, require_gas_price, CommonFields};
use crate::tx_type::TxType;

/// A legacy transaction.
///
/// Legacy transactions carry no type prefix and a single signature whose `v`
/// embeds the chain id (EIP-155). `from` is not part of the encoding; it is
/// recovered from the signature when decoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyTx {
    pub common: CommonFields,
    pub gas_price: Option<u128>,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

impl LegacyTx {
    pub fn create(mut fields: TxFields) -> TxResult<Self> {
        let gas = fields.require_gas()?;
        let input = fields.take_input()?.unwrap_or_default();
        let signatures = match fields.signatures {
            Some(signatures) => SignatureSet::checked(signatures, TxType::Legacy)?,
            None => SignatureSet::empty(),
        };
        Ok(Self {
            common: CommonFields {
                from: fields.from.unwrap_or_default(),
                nonce: fields.nonce,
                gas,
                chain_id: fields.chain_id,
                signatures,
            },
            gas_price: fields.gas_price,
            to: fields.to,
            value: fields.value.unwrap_or_default(),
            input,
        })
    }

    /// Decodes `RLP([nonce, gasPrice, gas, to, value, input, v, r, s])`.
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        if bytes.is_empty() {
            return Err(TxError::EmptyInput);
        }
        let mut reader = RlpReader::open_exact(bytes)?;
        let nonce = reader.u64()?;
        let gas_price = reader.u128()?;
        let gas = reader.u64()?;
        let to = reader.optional_address()?;
        let value = reader.u256()?;
        let input = reader.bytes()?;
        let signature = SignatureData::new(reader.u64()?, reader.u256()?, reader.u256()?);
        reader.finish()?;

        let mut tx = Self {
            common: CommonFields {
                from: Address::ZERO,
                nonce: Some(nonce),
                gas,
                chain_id: signature.eip155_chain_id(),
                signatures: SignatureSet::from(signature),
            },
            gas_price: Some(gas_price),
            to,
            value,
            input,
        };
        tx.common.from = recover_sender(&tx);
        Ok(tx)
    }

    /// Chain id used in the signing payload.
    ///
    /// Falls back to the value implied by the signature when unset: `v < 35`
    /// means chain 1, otherwise `(v - 35) >> 1`.
    fn effective_chain_id(&self) -> TxResult<u64> {
        if let Some(chain_id) = self.common.chain_id {
            return Ok(chain_id);
        }
        if self.common.signatures.is_empty() {
            return Err(TxError::MissingField("chainId"));
        }
        Ok(self.common.signatures.first().eip155_chain_id().unwrap_or(1))
    }

    fn push_body(&self, list: &mut RlpList) -> TxResult<()> {
        list.push(&self.common.require_nonce()?)
            .push(&require_gas_price(self.gas_price)?)
            .push(&self.common.gas)
            .push_optional_address(self.to.as_ref())
            .push(&self.value)
            .push_bytes(&self.input);
        Ok(())
    }
}

impl TypedTransaction for LegacyTx {
    fn tx_type(&self) -> TxType {
        TxType::Legacy
    }

    fn from(&self) -> Address {
        self.common.from
    }

    fn nonce(&self) -> Option<u64> {
        self.common.nonce
    }

    fn gas(&self) -> u64 {
        self.common.gas
    }

    fn chain_id(&self) -> Option<u64> {
        self.common.chain_id
    }

    fn to(&self) -> Option<Address> {
        self.to
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn input(&self) -> &[u8] {
        &self.input
    }

    fn signatures(&self) -> &SignatureSet {
        &self.common.signatures
    }

    /// A signed transaction may omit `chainId`: it is implied by `v`.
    fn validate_required_fields(&self) -> TxResult<()> {
        self.common.require_nonce()?;
        require_gas_price(self.gas_price)?;
        self.effective_chain_id()?;
        Ok(())
    }

    fn signing_payload(&self) -> TxResult<Vec<u8>> {
        self.validate_required_fields()?;
        let mut list = RlpList::new();
        self.push_body(&mut list)?;
        list.push(&self.effective_chain_id()?).push_empty().push_empty();
        Ok(list.finish())
    }

    /// The wire format has no chain id field, so only `nonce` and
    /// `gasPrice` are required here.
    fn encode(&self) -> TxResult<Vec<u8>> {
        let signature = self.common.signatures.first();
        let mut list = RlpList::new();
        self.push_body(&mut list)?;
        list.push(&signature.v).push(&signature.r).push(&signature.s);
        Ok(list.finish())
    }

    fn append_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        self.common.signatures.append(signatures, TxType::Legacy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, hex};

    // EIP-155 example transaction (chain id 1).
    const EIP155_TX: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    #[test]
    fn test_decode_eip155_vector() {
        let raw = hex::decode(EIP155_TX).unwrap();
        let tx = LegacyTx::decode(&raw).unwrap();

        assert_eq!(tx.common.nonce, Some(9));
        assert_eq!(tx.gas_price, Some(20_000_000_000));
        assert_eq!(tx.common.gas, 21_000);
        assert_eq!(tx.common.chain_id, Some(1));
        assert_eq!(
            tx.to,
            Some(address!("3535353535353535353535353535353535353535"))
        );
        assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(
            tx.from(),
            address!("9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F")
        );
        assert_eq!(
            tx.transaction_hash().unwrap(),
            b256!("33469b22e9f636356c4160a87eb19df52b7412e8eac32a4a55ffe88ea8350788")
        );
        assert_eq!(tx.encode().unwrap(), raw);
    }

    #[test]
    fn test_unsigned_legacy_encodes_placeholder() {
        let tx = LegacyTx::create(
            TxFields::new()
                .nonce(0u64)
                .gas_price(0u128)
                .gas(21_000u64)
                .chain_id(1u64),
        )
        .unwrap();
        let encoded = tx.encode().unwrap();
        // v = 1, r = s = empty
        assert!(encoded.ends_with(&[0x01, 0x80, 0x80]));
        assert!(matches!(
            tx.recover_public_keys(),
            Err(TxError::EmptySignature)
        ));
    }

    #[test]
    fn test_unsigned_legacy_roundtrip() {
        let tx = LegacyTx::create(
            TxFields::new()
                .nonce(0u64)
                .gas_price(1u128)
                .gas(21_000u64)
                .to(Address::repeat_byte(0x35))
                .chain_id(1001u64),
        )
        .unwrap();
        let encoded = tx.encode().unwrap();

        let decoded = LegacyTx::decode(&encoded).unwrap();
        // nothing on the wire carries the chain id of an unsigned tx
        assert_eq!(decoded.common.chain_id, None);
        assert_eq!(decoded.encode().unwrap(), encoded);
        assert_eq!(
            LegacyTx {
                common: CommonFields {
                    chain_id: Some(1001),
                    ..decoded.common.clone()
                },
                ..decoded
            },
            tx
        );
    }

    #[test]
    fn test_zero_signature_is_kept() {
        let zero = SignatureData::new(0, U256::ZERO, U256::ZERO);
        let tx = LegacyTx::create(
            TxFields::new()
                .nonce(0u64)
                .gas_price(1u128)
                .gas(21_000u64)
                .signatures(SignatureSet::from(zero)),
        )
        .unwrap();
        assert_eq!(tx.signatures().first(), zero);

        let encoded = tx.encode().unwrap();
        assert!(encoded.ends_with(&[0x80, 0x80, 0x80]));
        assert_eq!(LegacyTx::decode(&encoded).unwrap().encode().unwrap(), encoded);
    }

    #[test]
    fn test_missing_fields() {
        let tx = LegacyTx::create(TxFields::new().gas(21_000u64)).unwrap();
        assert!(matches!(
            tx.validate_required_fields(),
            Err(TxError::MissingField("nonce"))
        ));

        let tx = LegacyTx::create(TxFields::new().gas(21_000u64).nonce(1u64).gas_price(1u128))
            .unwrap();
        assert!(matches!(
            tx.signing_payload(),
            Err(TxError::MissingField("chainId"))
        ));
        assert!(tx.encode().is_ok());

        let tx = LegacyTx::create(TxFields::new().gas(21_000u64).nonce(1u64)).unwrap();
        assert!(matches!(
            tx.encode(),
            Err(TxError::MissingField("gasPrice"))
        ));

        assert!(matches!(
            LegacyTx::create(TxFields::new()),
            Err(TxError::MissingField("gas"))
        ));
    }

    #[test]
    fn test_single_signature_only() {
        let mut tx = LegacyTx::create(TxFields::new().gas(21_000u64)).unwrap();
        let sig = SignatureData::new(37, U256::from(1), U256::from(2));
        tx.append_signatures(sig.into()).unwrap();
        let err = tx
            .append_signatures(SignatureData::new(38, U256::from(3), U256::from(4)).into())
            .unwrap_err();
        assert!(matches!(err, TxError::DuplicateSignature(TxType::Legacy)));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut raw = hex::decode(EIP155_TX).unwrap();
        raw.push(0x00);
        assert!(matches!(
            LegacyTx::decode(&raw),
            Err(TxError::TrailingBytes)
        ));
    }
}
