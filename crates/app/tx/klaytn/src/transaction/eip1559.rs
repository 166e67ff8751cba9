//! EIP-1559 dynamic fee transaction inside the Klaytn Ethereum envelope.

use alloy_primitives::{Address, Bytes, U256};

use crate::access_list::AccessList;
use crate::codec::{RlpList, RlpReader};
use crate::error::{TxError, TxResult};
use crate::fields::TxFields;
use crate::signature::{SignatureData, SignatureSet};
use crate::traits::TypedTransaction;
use crate::transaction::{recover_sender, strip_tag, CommonFields};
use crate::tx_type::{tag, TxType};

/// A dynamic fee transaction.
///
/// Wire form is `0x78 0x02 || RLP([chainId, nonce, maxPriorityFeePerGas,
/// maxFeePerGas, gas, to, value, input, accessList, v, r, s])`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EthereumDynamicFeeTx {
    pub common: CommonFields,
    pub max_priority_fee_per_gas: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
}

impl EthereumDynamicFeeTx {
    pub fn create(mut fields: TxFields) -> TxResult<Self> {
        let gas = fields.require_gas()?;
        let input = fields.take_input()?.unwrap_or_default();
        let signatures = match fields.signatures.take() {
            Some(signatures) => SignatureSet::checked(signatures, TxType::EthereumDynamicFee)?,
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
            max_priority_fee_per_gas: fields.max_priority_fee_per_gas,
            max_fee_per_gas: fields.max_fee_per_gas,
            to: fields.to,
            value: fields.value.unwrap_or_default(),
            input,
            access_list: fields.access_list.take().unwrap_or_default(),
        })
    }

    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let payload = strip_tag(
            bytes,
            TxType::EthereumDynamicFee.tag_bytes(),
            TxType::EthereumDynamicFee.name(),
        )?;
        let mut reader = RlpReader::open_exact(payload)?;
        let chain_id = reader.u64()?;
        let nonce = reader.u64()?;
        let max_priority_fee_per_gas = reader.u128()?;
        let max_fee_per_gas = reader.u128()?;
        let gas = reader.u64()?;
        let to = reader.optional_address()?;
        let value = reader.u256()?;
        let input = reader.bytes()?;
        let access_list = AccessList::decode_from(&mut reader)?;
        let signature = SignatureData::new(reader.u64()?, reader.u256()?, reader.u256()?);
        reader.finish()?;

        let mut tx = Self {
            common: CommonFields {
                from: Address::ZERO,
                nonce: Some(nonce),
                gas,
                chain_id: Some(chain_id),
                signatures: SignatureSet::checked([signature], TxType::EthereumDynamicFee)?,
            },
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
            max_fee_per_gas: Some(max_fee_per_gas),
            to,
            value,
            input,
            access_list,
        };
        tx.common.from = recover_sender(&tx);
        Ok(tx)
    }

    fn require_fees(&self) -> TxResult<(u128, u128)> {
        let priority = self
            .max_priority_fee_per_gas
            .ok_or(TxError::MissingField("maxPriorityFeePerGas"))?;
        let max = self
            .max_fee_per_gas
            .ok_or(TxError::MissingField("maxFeePerGas"))?;
        Ok((priority, max))
    }

    fn body(&self) -> TxResult<RlpList> {
        let (priority, max) = self.require_fees()?;
        let mut list = RlpList::new();
        list.push(&self.common.require_chain_id()?)
            .push(&self.common.require_nonce()?)
            .push(&priority)
            .push(&max)
            .push(&self.common.gas)
            .push_optional_address(self.to.as_ref())
            .push(&self.value)
            .push_bytes(&self.input)
            .push(&self.access_list);
        Ok(list)
    }
}

impl TypedTransaction for EthereumDynamicFeeTx {
    fn tx_type(&self) -> TxType {
        TxType::EthereumDynamicFee
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
        self.require_fees()?;
        self.common.require_chain_id()?;
        Ok(())
    }

    fn signing_payload(&self) -> TxResult<Vec<u8>> {
        self.validate_required_fields()?;
        let mut payload = vec![tag::ETHEREUM_DYNAMIC_FEE];
        payload.extend(self.body()?.finish());
        Ok(payload)
    }

    fn encode(&self) -> TxResult<Vec<u8>> {
        self.validate_required_fields()?;
        let signature = self.common.signatures.first();
        let mut list = self.body()?;
        list.push(&signature.v).push(&signature.r).push(&signature.s);
        let mut raw = TxType::EthereumDynamicFee.tag_bytes().to_vec();
        raw.extend(list.finish());
        Ok(raw)
    }

    fn append_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        self.common
            .signatures
            .append(signatures, TxType::EthereumDynamicFee)
    }
}
