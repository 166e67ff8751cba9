//! EIP-2930 access list transaction inside the Klaytn Ethereum envelope.

use alloy_primitives::{Address, Bytes, U256};

use crate::access_list::AccessList;
use crate::codec::{RlpList, RlpReader};
use crate::error::{TxError, TxResult};
use crate::fields::TxFields;
use crate::signature::{SignatureData, SignatureSet};
use crate::traits::TypedTransaction;
use crate::transaction::{recover_sender, require_gas_price, strip_tag, CommonFields};
use crate::tx_type::{tag, TxType};

/// An access list transaction.
///
/// Wire form is `0x78 0x01 || RLP([chainId, nonce, gasPrice, gas, to, value,
/// input, accessList, v, r, s])`. The sender signs the plain EIP-2930 payload,
/// prefixed with `0x01` only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EthereumAccessListTx {
    pub common: CommonFields,
    pub gas_price: Option<u128>,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
}

impl EthereumAccessListTx {
    pub fn create(mut fields: TxFields) -> TxResult<Self> {
        let gas = fields.require_gas()?;
        let input = fields.take_input()?.unwrap_or_default();
        let signatures = match fields.signatures.take() {
            Some(signatures) => SignatureSet::checked(signatures, TxType::EthereumAccessList)?,
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
            access_list: fields.access_list.take().unwrap_or_default(),
        })
    }

    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let payload = strip_tag(
            bytes,
            TxType::EthereumAccessList.tag_bytes(),
            TxType::EthereumAccessList.name(),
        )?;
        let mut reader = RlpReader::open_exact(payload)?;
        let chain_id = reader.u64()?;
        let nonce = reader.u64()?;
        let gas_price = reader.u128()?;
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
                signatures: SignatureSet::checked([signature], TxType::EthereumAccessList)?,
            },
            gas_price: Some(gas_price),
            to,
            value,
            input,
            access_list,
        };
        tx.common.from = recover_sender(&tx);
        Ok(tx)
    }

    fn body(&self) -> TxResult<RlpList> {
        let mut list = RlpList::new();
        list.push(&self.common.require_chain_id()?)
            .push(&self.common.require_nonce()?)
            .push(&require_gas_price(self.gas_price)?)
            .push(&self.common.gas)
            .push_optional_address(self.to.as_ref())
            .push(&self.value)
            .push_bytes(&self.input)
            .push(&self.access_list);
        Ok(list)
    }
}

impl TypedTransaction for EthereumAccessListTx {
    fn tx_type(&self) -> TxType {
        TxType::EthereumAccessList
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
        self.validate_required_fields()?;
        let mut payload = vec![tag::ETHEREUM_ACCESS_LIST];
        payload.extend(self.body()?.finish());
        Ok(payload)
    }

    fn encode(&self) -> TxResult<Vec<u8>> {
        self.validate_required_fields()?;
        let signature = self.common.signatures.first();
        let mut list = self.body()?;
        list.push(&signature.v).push(&signature.r).push(&signature.s);
        let mut raw = TxType::EthereumAccessList.tag_bytes().to_vec();
        raw.extend(list.finish());
        Ok(raw)
    }

    fn append_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        self.common
            .signatures
            .append(signatures, TxType::EthereumAccessList)
    }
}
