//! Klaytn native transaction types.
//!
//! All 21 native shapes share one representation. The family of the type
//! selects an ordered field layout, and the fee delegation mode decides
//! whether the `feeRatio` slot and the fee payer suffix are present:
//!
//! ```text
//! raw            = tag || RLP([nonce, gasPrice, gas, <layout>, signatures(, feePayer, feePayerSignatures)])
//! common         = RLP([tag, nonce, gasPrice, gas, <layout>])
//! sender payload = RLP([common, chainId, "", ""])
//! payer payload  = RLP([common, feePayer, chainId, "", ""])
//! ```

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use secp256k1::PublicKey;

use crate::account::Account;
use crate::codec::{RlpList, RlpReader};
use crate::error::{TxError, TxResult};
use crate::fields::TxFields;
use crate::recovery::recover_public_key;
use crate::signature::SignatureSet;
use crate::traits::TypedTransaction;
use crate::transaction::{require_gas_price, strip_tag, CommonFields};
use crate::tx_type::{CodeFormat, TxFamily, TxType};

/// A positional field in a native layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    To,
    Value,
    From,
    Input,
    HumanReadable,
    /// Only present for `WithRatio` types.
    FeeRatio,
    CodeFormat,
    AccountKey,
}

impl TxFamily {
    /// Ordered fields between `gas` and the signatures.
    pub const fn layout(self) -> &'static [FieldKind] {
        use FieldKind::*;
        match self {
            TxFamily::ValueTransfer => &[To, Value, From, FeeRatio],
            TxFamily::ValueTransferMemo => &[To, Value, From, Input, FeeRatio],
            TxFamily::AccountUpdate => &[From, AccountKey, FeeRatio],
            TxFamily::SmartContractDeploy => {
                &[To, Value, From, Input, HumanReadable, FeeRatio, CodeFormat]
            }
            TxFamily::SmartContractExecution => &[To, Value, From, Input, FeeRatio],
            TxFamily::Cancel => &[From, FeeRatio],
            TxFamily::ChainDataAnchoring => &[From, Input, FeeRatio],
            TxFamily::Legacy | TxFamily::EthereumAccessList | TxFamily::EthereumDynamicFee => &[],
        }
    }

    fn has_field(self, kind: FieldKind) -> bool {
        self.layout().contains(&kind)
    }
}

/// Any Klaytn native transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KlaytnTx {
    tx_type: TxType,
    pub common: CommonFields,
    pub gas_price: Option<u128>,
    /// `None` for deploy and for the families without a recipient.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub human_readable: bool,
    pub code_format: CodeFormat,
    pub account: Option<Account>,
    /// `Some` only for `WithRatio` types, always within `[1, 99]`.
    fee_ratio: Option<u64>,
    /// Empty until the fee payer is known.
    pub fee_payer: Option<Address>,
    pub fee_payer_signatures: SignatureSet,
}

impl KlaytnTx {
    /// Builds a native transaction of `tx_type`, validating its required
    /// fields. Fields outside the type's layout are ignored.
    pub fn create(tx_type: TxType, mut fields: TxFields) -> TxResult<Self> {
        let family = tx_type.family();
        if !family.is_native() {
            return Err(TxError::TypeTagMismatch {
                expected: "a native Klaytn transaction type".to_string(),
                actual: tx_type.to_string(),
            });
        }

        let gas = fields.require_gas()?;
        let from = fields.from.ok_or(TxError::MissingField("from"))?;
        let input = fields.take_input()?;

        let to = if family == TxFamily::SmartContractDeploy {
            match fields.to {
                Some(to) if !to.is_zero() => {
                    return Err(TxError::InvalidAddress(format!(
                        "{tx_type} must not set `to`, got {to}"
                    )))
                }
                _ => None,
            }
        } else if family.has_field(FieldKind::To) {
            Some(fields.to.ok_or(TxError::MissingField("to"))?)
        } else {
            None
        };

        let value = match family {
            TxFamily::ValueTransfer | TxFamily::ValueTransferMemo => {
                fields.value.ok_or(TxError::MissingField("value"))?
            }
            _ if family.has_field(FieldKind::Value) => fields.value.unwrap_or_default(),
            _ => U256::ZERO,
        };

        let input = if family.has_field(FieldKind::Input) {
            input.ok_or(TxError::MissingField("input"))?
        } else {
            Bytes::new()
        };

        let account = if family == TxFamily::AccountUpdate {
            let account = fields.account.take().ok_or(TxError::MissingField("account"))?;
            if account.address() != from {
                return Err(TxError::InvalidAddress(format!(
                    "account address {} does not match from {from}",
                    account.address()
                )));
            }
            Some(account)
        } else {
            None
        };

        let code_format = CodeFormat::try_from(fields.code_format.unwrap_or_default())?;

        let fee_ratio = if tx_type.has_fee_ratio() {
            let ratio = fields.fee_ratio.ok_or(TxError::MissingField("feeRatio"))?;
            Some(check_fee_ratio(ratio)?)
        } else {
            None
        };

        let (fee_payer, fee_payer_signatures) = if tx_type.is_fee_delegated() {
            (
                fields.fee_payer.filter(|payer| !payer.is_zero()),
                fields.fee_payer_signatures.take().unwrap_or_default(),
            )
        } else {
            (None, SignatureSet::empty())
        };

        Ok(Self {
            tx_type,
            common: CommonFields {
                from,
                nonce: fields.nonce,
                gas,
                chain_id: fields.chain_id,
                signatures: fields.signatures.take().unwrap_or_default(),
            },
            gas_price: fields.gas_price,
            to,
            value,
            input,
            human_readable: family.has_field(FieldKind::HumanReadable)
                && fields.human_readable.unwrap_or(false),
            code_format,
            account,
            fee_ratio,
            fee_payer,
            fee_payer_signatures,
        })
    }

    /// Decodes any native type, taking the type from the tag byte.
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let first = *bytes.first().ok_or(TxError::EmptyInput)?;
        let tx_type = TxType::from_tag(first).ok_or_else(|| TxError::TypeTagMismatch {
            expected: "a native Klaytn transaction tag".to_string(),
            actual: format!("0x{first:02x}"),
        })?;
        Self::decode_as(tx_type, bytes)
    }

    /// Decodes `bytes` as `tx_type`, failing if the tag differs.
    pub fn decode_as(tx_type: TxType, bytes: &[u8]) -> TxResult<Self> {
        let payload = strip_tag(bytes, tx_type.tag_bytes(), tx_type.name())?;
        let family = tx_type.family();
        if !family.is_native() {
            return Err(TxError::TypeTagMismatch {
                expected: "a native Klaytn transaction type".to_string(),
                actual: tx_type.to_string(),
            });
        }

        let mut reader = RlpReader::open_exact(payload)?;
        let nonce = reader.u64()?;
        let gas_price = reader.u128()?;
        let gas = reader.u64()?;

        let mut from = Address::ZERO;
        let mut to = None;
        let mut value = U256::ZERO;
        let mut input = Bytes::new();
        let mut human_readable = false;
        let mut code_format = CodeFormat::Evm;
        let mut account_key = None;
        let mut fee_ratio = None;

        for kind in family.layout() {
            match kind {
                FieldKind::To => {
                    to = reader.optional_address()?;
                    if family == TxFamily::SmartContractDeploy {
                        match to {
                            Some(address) if !address.is_zero() => {
                                return Err(TxError::InvalidAddress(format!(
                                    "{tx_type} must not set `to`, got {address}"
                                )))
                            }
                            _ => to = None,
                        }
                    } else if to.is_none() {
                        return Err(TxError::MissingField("to"));
                    }
                }
                FieldKind::Value => value = reader.u256()?,
                FieldKind::From => from = reader.address()?,
                FieldKind::Input => input = reader.bytes()?,
                FieldKind::HumanReadable => human_readable = reader.bool()?,
                FieldKind::FeeRatio if tx_type.has_fee_ratio() => {
                    fee_ratio = Some(check_fee_ratio(reader.u64()?)?);
                }
                FieldKind::FeeRatio => {}
                FieldKind::CodeFormat => code_format = CodeFormat::try_from(reader.u64()?)?,
                FieldKind::AccountKey => account_key = Some(reader.bytes()?),
            }
        }

        let signatures = SignatureSet::decode_from(&mut reader)?;
        let (fee_payer, fee_payer_signatures) = if tx_type.is_fee_delegated() {
            let payer = reader.optional_address()?.filter(|payer| !payer.is_zero());
            (payer, SignatureSet::decode_from(&mut reader)?)
        } else {
            (None, SignatureSet::empty())
        };
        reader.finish()?;

        let account = account_key
            .map(|key| Account::create_from_rlp_encoding(from, key))
            .transpose()?;

        Ok(Self {
            tx_type,
            common: CommonFields {
                from,
                nonce: Some(nonce),
                gas,
                chain_id: None,
                signatures,
            },
            gas_price: Some(gas_price),
            to,
            value,
            input,
            human_readable,
            code_format,
            account,
            fee_ratio,
            fee_payer,
            fee_payer_signatures,
        })
    }

    pub fn fee_ratio(&self) -> Option<u64> {
        self.fee_ratio
    }

    /// Sets the fee ratio of a `WithRatio` type.
    pub fn set_fee_ratio(&mut self, ratio: u64) -> TxResult<()> {
        if !self.tx_type.has_fee_ratio() {
            return Err(TxError::TypeTagMismatch {
                expected: "a fee delegated type with ratio".to_string(),
                actual: self.tx_type.to_string(),
            });
        }
        self.fee_ratio = Some(check_fee_ratio(ratio)?);
        Ok(())
    }

    pub fn is_fee_delegated(&self) -> bool {
        self.tx_type.is_fee_delegated()
    }

    fn require_fee_delegated(&self) -> TxResult<()> {
        if self.is_fee_delegated() {
            Ok(())
        } else {
            Err(TxError::NotFeeDelegated(self.tx_type))
        }
    }

    fn push_layout(&self, list: &mut RlpList) -> TxResult<()> {
        for kind in self.tx_type.family().layout() {
            match kind {
                FieldKind::To => {
                    list.push_optional_address(self.to.as_ref());
                }
                FieldKind::Value => {
                    list.push(&self.value);
                }
                FieldKind::From => {
                    list.push(&self.common.from);
                }
                FieldKind::Input => {
                    list.push_bytes(&self.input);
                }
                FieldKind::HumanReadable => {
                    list.push(&self.human_readable);
                }
                FieldKind::FeeRatio => {
                    if self.tx_type.has_fee_ratio() {
                        list.push(&self.fee_ratio.ok_or(TxError::MissingField("feeRatio"))?);
                    }
                }
                FieldKind::CodeFormat => {
                    list.push(&u64::from(self.code_format.as_u8()));
                }
                FieldKind::AccountKey => {
                    let account = self.account.as_ref().ok_or(TxError::MissingField("account"))?;
                    list.push_bytes(account.get_rlp_encoding_account_key());
                }
            }
        }
        Ok(())
    }

    fn body(&self) -> TxResult<RlpList> {
        let mut list = RlpList::new();
        list.push(&self.common.require_nonce()?)
            .push(&require_gas_price(self.gas_price)?)
            .push(&self.common.gas);
        self.push_layout(&mut list)?;
        Ok(list)
    }

    /// `RLP([tag, nonce, gasPrice, gas, <layout>])`, shared by both signing
    /// payloads.
    pub fn common_rlp_encoding(&self) -> TxResult<Vec<u8>> {
        self.validate_required_fields()?;
        let mut list = RlpList::new();
        list.push_bytes(self.tx_type.tag_bytes())
            .push(&self.common.require_nonce()?)
            .push(&require_gas_price(self.gas_price)?)
            .push(&self.common.gas);
        self.push_layout(&mut list)?;
        Ok(list.finish())
    }

    /// Bytes the fee payer signs.
    pub fn fee_payer_signing_payload(&self) -> TxResult<Vec<u8>> {
        self.require_fee_delegated()?;
        let common = self.common_rlp_encoding()?;
        let mut list = RlpList::new();
        list.push_bytes(&common)
            .push_optional_address(self.fee_payer.as_ref())
            .push(&self.common.require_chain_id()?)
            .push_empty()
            .push_empty();
        Ok(list.finish())
    }

    pub fn fee_payer_signature_hash(&self) -> TxResult<B256> {
        Ok(keccak256(self.fee_payer_signing_payload()?))
    }

    /// Adds fee payer signatures; multisig rules apply.
    pub fn append_fee_payer_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        self.require_fee_delegated()?;
        self.fee_payer_signatures.append(signatures, self.tx_type)
    }

    pub fn recover_fee_payer_public_keys(&self) -> TxResult<Vec<PublicKey>> {
        self.require_fee_delegated()?;
        if self.fee_payer_signatures.is_empty() {
            return Err(TxError::EmptySignature);
        }
        let hash = self.fee_payer_signature_hash()?;
        self.fee_payer_signatures
            .iter()
            .map(|signature| recover_public_key(hash, signature))
            .collect()
    }

    /// Hash of the encoding without the fee payer suffix.
    ///
    /// Identical for every fee payer, so it identifies what the sender signed.
    pub fn sender_tx_hash(&self) -> TxResult<B256> {
        let mut list = self.body()?;
        list.push(&self.common.signatures);
        let mut raw = self.tx_type.tag_bytes().to_vec();
        raw.extend(list.finish());
        Ok(keccak256(raw))
    }
}

fn check_fee_ratio(ratio: u64) -> TxResult<u64> {
    if (1..=99).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(TxError::FeeRatioOutOfRange(ratio))
    }
}

impl TypedTransaction for KlaytnTx {
    fn tx_type(&self) -> TxType {
        self.tx_type
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

    fn validate_required_fields(&self) -> TxResult<()> {
        self.common.require_nonce()?;
        require_gas_price(self.gas_price)?;
        self.common.require_chain_id()?;
        Ok(())
    }

    fn signing_payload(&self) -> TxResult<Vec<u8>> {
        let common = self.common_rlp_encoding()?;
        let mut list = RlpList::new();
        list.push_bytes(&common)
            .push(&self.common.require_chain_id()?)
            .push_empty()
            .push_empty();
        Ok(list.finish())
    }

    /// Encoding does not need `chainId`: it is only part of the signing
    /// payloads.
    fn encode(&self) -> TxResult<Vec<u8>> {
        let mut list = self.body()?;
        list.push(&self.common.signatures);
        if self.is_fee_delegated() {
            list.push_optional_address(self.fee_payer.as_ref())
                .push(&self.fee_payer_signatures);
        }
        let mut raw = self.tx_type.tag_bytes().to_vec();
        raw.extend(list.finish());
        Ok(raw)
    }

    fn append_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        self.common.signatures.append(signatures, self.tx_type)
    }
}
