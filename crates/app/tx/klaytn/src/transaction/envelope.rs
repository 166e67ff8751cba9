//! Closed union over every supported transaction variant.

use alloy_primitives::{Address, B256, U256};
use secp256k1::PublicKey;

use crate::codec::decode_hex;
use crate::decoder::decode_transaction;
use crate::error::{TxError, TxResult};
use crate::fields::TxFields;
use crate::signature::{SignaturePolicy, SignatureSet};
use crate::traits::TypedTransaction;
use crate::transaction::{
    CommonFields, EthereumAccessListTx, EthereumDynamicFeeTx, KlaytnTx, LegacyTx,
};
use crate::tx_type::{TxFamily, TxType};

/// Any transaction the codec understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    /// Untagged legacy transaction.
    Legacy(LegacyTx),
    /// One of the 21 native Klaytn types.
    Klaytn(KlaytnTx),
    /// `0x78 0x01`.
    EthereumAccessList(EthereumAccessListTx),
    /// `0x78 0x02`.
    EthereumDynamicFee(EthereumDynamicFeeTx),
}

macro_rules! delegate {
    ($self:expr, $tx:ident => $body:expr) => {
        match $self {
            Transaction::Legacy($tx) => $body,
            Transaction::Klaytn($tx) => $body,
            Transaction::EthereumAccessList($tx) => $body,
            Transaction::EthereumDynamicFee($tx) => $body,
        }
    };
}

impl Transaction {
    /// Builds a transaction of `tx_type` from loose fields.
    pub fn create(tx_type: TxType, fields: TxFields) -> TxResult<Self> {
        match tx_type.family() {
            TxFamily::Legacy => LegacyTx::create(fields).map(Transaction::Legacy),
            TxFamily::ValueTransfer
            | TxFamily::ValueTransferMemo
            | TxFamily::AccountUpdate
            | TxFamily::SmartContractDeploy
            | TxFamily::SmartContractExecution
            | TxFamily::Cancel
            | TxFamily::ChainDataAnchoring => {
                KlaytnTx::create(tx_type, fields).map(Transaction::Klaytn)
            }
            TxFamily::EthereumAccessList => {
                EthereumAccessListTx::create(fields).map(Transaction::EthereumAccessList)
            }
            TxFamily::EthereumDynamicFee => {
                EthereumDynamicFeeTx::create(fields).map(Transaction::EthereumDynamicFee)
            }
        }
    }

    /// Decodes raw bytes of any type.
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        decode_transaction(bytes)
    }

    /// Decodes a hex string, `0x` optional.
    pub fn decode_hex(raw: &str) -> TxResult<Self> {
        Self::decode(&decode_hex(raw)?)
    }

    pub fn common(&self) -> &CommonFields {
        delegate!(self, tx => &tx.common)
    }

    pub fn common_mut(&mut self) -> &mut CommonFields {
        delegate!(self, tx => &mut tx.common)
    }

    /// Replaces the sender signatures, enforcing the rules of this type.
    pub fn set_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        let signatures = SignatureSet::checked(signatures, self.tx_type())?;
        self.common_mut().signatures = signatures;
        Ok(())
    }

    pub fn as_klaytn(&self) -> Option<&KlaytnTx> {
        match self {
            Transaction::Klaytn(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_klaytn_mut(&mut self) -> Option<&mut KlaytnTx> {
        match self {
            Transaction::Klaytn(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn is_fee_delegated(&self) -> bool {
        self.tx_type().is_fee_delegated()
    }

    pub fn is_dynamic_fee(&self) -> bool {
        matches!(self, Transaction::EthereumDynamicFee(_))
    }

    /// `gasPrice`, absent for dynamic fee transactions.
    pub fn gas_price(&self) -> Option<u128> {
        match self {
            Transaction::Legacy(tx) => tx.gas_price,
            Transaction::Klaytn(tx) => tx.gas_price,
            Transaction::EthereumAccessList(tx) => tx.gas_price,
            Transaction::EthereumDynamicFee(_) => None,
        }
    }

    /// Sets `gasPrice`; dynamic fee transactions ignore it.
    pub fn set_gas_price(&mut self, gas_price: u128) {
        match self {
            Transaction::Legacy(tx) => tx.gas_price = Some(gas_price),
            Transaction::Klaytn(tx) => tx.gas_price = Some(gas_price),
            Transaction::EthereumAccessList(tx) => tx.gas_price = Some(gas_price),
            Transaction::EthereumDynamicFee(_) => {}
        }
    }

    pub fn max_priority_fee_per_gas(&self) -> Option<u128> {
        match self {
            Transaction::EthereumDynamicFee(tx) => tx.max_priority_fee_per_gas,
            _ => None,
        }
    }

    pub fn max_fee_per_gas(&self) -> Option<u128> {
        match self {
            Transaction::EthereumDynamicFee(tx) => tx.max_fee_per_gas,
            _ => None,
        }
    }

    /// Sets both dynamic fees; other types ignore them.
    pub fn set_dynamic_fees(&mut self, max_priority_fee_per_gas: u128, max_fee_per_gas: u128) {
        if let Transaction::EthereumDynamicFee(tx) = self {
            tx.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
            tx.max_fee_per_gas = Some(max_fee_per_gas);
        }
    }

    fn klaytn_fee_delegated(&self) -> TxResult<&KlaytnTx> {
        self.as_klaytn()
            .filter(|tx| tx.is_fee_delegated())
            .ok_or(TxError::NotFeeDelegated(self.tx_type()))
    }

    fn klaytn_fee_delegated_mut(&mut self) -> TxResult<&mut KlaytnTx> {
        let tx_type = self.tx_type();
        self.as_klaytn_mut()
            .filter(|tx| tx.is_fee_delegated())
            .ok_or(TxError::NotFeeDelegated(tx_type))
    }

    /// Fee payer of a fee delegated type; `None` until one is set.
    pub fn fee_payer(&self) -> Option<Address> {
        self.as_klaytn().and_then(|tx| tx.fee_payer)
    }

    pub fn set_fee_payer(&mut self, fee_payer: Address) -> TxResult<()> {
        let tx = self.klaytn_fee_delegated_mut()?;
        tx.fee_payer = (!fee_payer.is_zero()).then_some(fee_payer);
        Ok(())
    }

    pub fn fee_payer_signatures(&self) -> Option<&SignatureSet> {
        self.as_klaytn()
            .filter(|tx| tx.is_fee_delegated())
            .map(|tx| &tx.fee_payer_signatures)
    }

    pub fn fee_payer_signing_payload(&self) -> TxResult<Vec<u8>> {
        self.klaytn_fee_delegated()?.fee_payer_signing_payload()
    }

    pub fn append_fee_payer_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        self.klaytn_fee_delegated_mut()?
            .append_fee_payer_signatures(signatures)
    }

    pub fn recover_fee_payer_public_keys(&self) -> TxResult<Vec<PublicKey>> {
        self.klaytn_fee_delegated()?.recover_fee_payer_public_keys()
    }

    /// Hash of what the sender signed off on.
    ///
    /// For fee delegated types the fee payer suffix is left out; for every
    /// other type this equals [`TypedTransaction::transaction_hash`].
    pub fn sender_tx_hash(&self) -> TxResult<B256> {
        match self {
            Transaction::Klaytn(tx) if tx.is_fee_delegated() => tx.sender_tx_hash(),
            _ => self.transaction_hash(),
        }
    }

    /// Merges the signatures of independently signed copies of this
    /// transaction.
    ///
    /// Every raw transaction must decode to the same type and the same fields
    /// apart from signatures, fee payer and recovered sender.
    pub fn combine_signatures<B: AsRef<[u8]>>(&mut self, raws: &[B]) -> TxResult<()> {
        let template = self.unsigned_view();
        for raw in raws {
            let other = Transaction::decode(raw.as_ref())?;
            if other.tx_type() != self.tx_type() {
                return Err(TxError::CombineMismatch(format!(
                    "expected {}, got {}",
                    self.tx_type(),
                    other.tx_type()
                )));
            }
            if other.unsigned_view() != template {
                return Err(TxError::CombineMismatch(
                    "transaction fields differ".to_string(),
                ));
            }
            self.merge_signatures(other)?;
        }
        tracing::debug!(
            tx_type = %self.tx_type(),
            count = raws.len(),
            signatures = self.signatures().len(),
            "combined signatures"
        );
        Ok(())
    }

    /// Copy with every signing artifact and value not carried by the
    /// encoding cleared.
    fn unsigned_view(&self) -> Transaction {
        let mut view = self.clone();
        let tx_type = view.tx_type();
        let common = view.common_mut();
        common.signatures = SignatureSet::empty();
        match tx_type.family() {
            TxFamily::Legacy => {
                common.from = Address::ZERO;
                common.chain_id = None;
            }
            TxFamily::EthereumAccessList | TxFamily::EthereumDynamicFee => {
                common.from = Address::ZERO;
            }
            _ => common.chain_id = None,
        }
        if let Transaction::Klaytn(tx) = &mut view {
            tx.fee_payer = None;
            tx.fee_payer_signatures = SignatureSet::empty();
        }
        view
    }

    fn merge_signatures(&mut self, other: Transaction) -> TxResult<()> {
        let tx_type = self.tx_type();
        let incoming = other.signatures().clone();
        if SignaturePolicy::for_type(tx_type) == SignaturePolicy::Multiple {
            self.append_signatures(incoming)?;
        } else if !incoming.is_empty() {
            if self.signatures().is_empty() {
                self.append_signatures(incoming)?;
            } else if self.signatures() != &incoming {
                return Err(TxError::CombineMismatch(
                    "conflicting signatures for a single-signature type".to_string(),
                ));
            }
        }
        if self.common().from.is_zero() {
            self.common_mut().from = other.from();
        }

        if let (Transaction::Klaytn(tx), Transaction::Klaytn(other)) = (self, other) {
            if !tx.is_fee_delegated() {
                return Ok(());
            }
            match (tx.fee_payer, other.fee_payer) {
                (None, Some(payer)) => tx.fee_payer = Some(payer),
                (Some(ours), Some(theirs)) if ours != theirs => {
                    return Err(TxError::CombineMismatch(format!(
                        "fee payer {theirs} differs from {ours}"
                    )))
                }
                _ => {}
            }
            tx.append_fee_payer_signatures(other.fee_payer_signatures)?;
        }
        Ok(())
    }
}

impl TypedTransaction for Transaction {
    fn tx_type(&self) -> TxType {
        delegate!(self, tx => tx.tx_type())
    }

    fn from(&self) -> Address {
        delegate!(self, tx => tx.from())
    }

    fn nonce(&self) -> Option<u64> {
        delegate!(self, tx => tx.nonce())
    }

    fn gas(&self) -> u64 {
        delegate!(self, tx => tx.gas())
    }

    fn chain_id(&self) -> Option<u64> {
        delegate!(self, tx => tx.chain_id())
    }

    fn to(&self) -> Option<Address> {
        delegate!(self, tx => tx.to())
    }

    fn value(&self) -> U256 {
        delegate!(self, tx => tx.value())
    }

    fn input(&self) -> &[u8] {
        delegate!(self, tx => tx.input())
    }

    fn signatures(&self) -> &SignatureSet {
        delegate!(self, tx => tx.signatures())
    }

    fn validate_required_fields(&self) -> TxResult<()> {
        delegate!(self, tx => tx.validate_required_fields())
    }

    fn signing_payload(&self) -> TxResult<Vec<u8>> {
        delegate!(self, tx => tx.signing_payload())
    }

    fn encode(&self) -> TxResult<Vec<u8>> {
        delegate!(self, tx => tx.encode())
    }

    fn append_signatures(&mut self, signatures: SignatureSet) -> TxResult<()> {
        delegate!(self, tx => tx.append_signatures(signatures))
    }

    fn recover_public_keys(&self) -> TxResult<Vec<PublicKey>> {
        delegate!(self, tx => tx.recover_public_keys())
    }
}

impl From<LegacyTx> for Transaction {
    fn from(tx: LegacyTx) -> Self {
        Transaction::Legacy(tx)
    }
}

impl From<KlaytnTx> for Transaction {
    fn from(tx: KlaytnTx) -> Self {
        Transaction::Klaytn(tx)
    }
}

impl From<EthereumAccessListTx> for Transaction {
    fn from(tx: EthereumAccessListTx) -> Self {
        Transaction::EthereumAccessList(tx)
    }
}

impl From<EthereumDynamicFeeTx> for Transaction {
    fn from(tx: EthereumDynamicFeeTx) -> Self {
        Transaction::EthereumDynamicFee(tx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::signature::SignatureData;

    fn fields() -> TxFields {
        TxFields::new()
            .from(Address::repeat_byte(0x11))
            .to(Address::repeat_byte(0x22))
            .value(U256::from(1))
            .nonce(5u64)
            .gas_price(25_000_000_000u128)
            .gas(100_000u64)
            .chain_id(1001u64)
    }

    fn sig(v: u64, r: u64) -> SignatureData {
        SignatureData::new(v, U256::from(r), U256::from(r + 1))
    }

    #[test]
    fn test_create_dispatches_by_family() {
        for tx_type in TxType::ALL {
            let mut f = fields().input(vec![0x01u8]).fee_ratio(10u64);
            if tx_type.family() == TxFamily::SmartContractDeploy {
                f.to = None;
            }
            if tx_type.family() == TxFamily::AccountUpdate {
                f = f.account(crate::account::Account::legacy(Address::repeat_byte(0x11)));
            }
            if tx_type == TxType::EthereumDynamicFee {
                f = f.max_fee_per_gas(2u128).max_priority_fee_per_gas(1u128);
            }
            let tx = Transaction::create(tx_type, f).unwrap();
            assert_eq!(tx.tx_type(), tx_type);
        }
    }

    #[test]
    fn test_fee_payer_operations_require_fee_delegation() {
        let mut tx = Transaction::create(TxType::ValueTransfer, fields()).unwrap();
        assert!(matches!(
            tx.set_fee_payer(Address::repeat_byte(1)),
            Err(TxError::NotFeeDelegated(TxType::ValueTransfer))
        ));
        assert!(tx.fee_payer_signatures().is_none());
        assert!(matches!(
            tx.recover_fee_payer_public_keys(),
            Err(TxError::NotFeeDelegated(_))
        ));
    }

    #[test]
    fn test_sender_tx_hash_equals_tx_hash_for_basic_types() {
        let tx = Transaction::create(TxType::ValueTransfer, fields()).unwrap();
        assert_eq!(tx.sender_tx_hash().unwrap(), tx.transaction_hash().unwrap());
    }

    #[test]
    fn test_combine_multisig_signatures() {
        let base = Transaction::create(TxType::FeeDelegatedValueTransfer, fields()).unwrap();

        let mut first = base.clone();
        first.append_signatures(sig(2037, 1).into()).unwrap();
        let mut second = base.clone();
        second.append_signatures(sig(2038, 10).into()).unwrap();
        let mut payer = base.clone();
        payer.set_fee_payer(Address::repeat_byte(0x33)).unwrap();
        payer
            .append_fee_payer_signatures(sig(2037, 20).into())
            .unwrap();

        let mut combined = first.clone();
        combined
            .combine_signatures(&[second.encode().unwrap(), payer.encode().unwrap()])
            .unwrap();

        assert_eq!(combined.signatures().len(), 2);
        assert_eq!(combined.fee_payer(), Some(Address::repeat_byte(0x33)));
        assert_eq!(combined.fee_payer_signatures().unwrap().len(), 1);
    }

    #[test]
    fn test_combine_rejects_different_fields() {
        let mut tx = Transaction::create(TxType::ValueTransfer, fields()).unwrap();
        let other = Transaction::create(TxType::ValueTransfer, fields().nonce(6u64)).unwrap();
        assert!(matches!(
            tx.combine_signatures(&[other.encode().unwrap()]),
            Err(TxError::CombineMismatch(_))
        ));

        let other_type = Transaction::create(TxType::ValueTransferMemo, fields().input(vec![1u8]))
            .unwrap();
        assert!(matches!(
            tx.combine_signatures(&[other_type.encode().unwrap()]),
            Err(TxError::CombineMismatch(_))
        ));
    }

    #[test]
    fn test_combine_rejects_conflicting_fee_payers() {
        let base = Transaction::create(TxType::FeeDelegatedCancel, fields()).unwrap();
        let mut ours = base.clone();
        ours.set_fee_payer(Address::repeat_byte(0x01)).unwrap();
        let mut theirs = base;
        theirs.set_fee_payer(Address::repeat_byte(0x02)).unwrap();
        assert!(matches!(
            ours.combine_signatures(&[theirs.encode().unwrap()]),
            Err(TxError::CombineMismatch(_))
        ));
    }

    #[test]
    fn test_set_signatures_enforces_type_rules() {
        let mut tx = Transaction::create(TxType::EthereumAccessList, fields()).unwrap();
        assert!(matches!(
            tx.set_signatures(sig(37, 1).into()),
            Err(TxError::InvalidYParity(37))
        ));
        assert!(tx.signatures().is_empty());

        tx.set_signatures(sig(1, 1).into()).unwrap();
        assert_eq!(tx.signatures().first(), sig(1, 1));

        let mut legacy = Transaction::create(TxType::Legacy, fields()).unwrap();
        assert!(matches!(
            legacy.set_signatures(vec![sig(37, 1), sig(38, 5)].into()),
            Err(TxError::TooManySignatures { count: 2, .. })
        ));

        let mut multisig = Transaction::create(TxType::Cancel, fields()).unwrap();
        multisig
            .set_signatures(vec![sig(2037, 1), sig(2038, 5)].into())
            .unwrap();
        assert_eq!(multisig.signatures().len(), 2);
    }

    #[test]
    fn test_decode_hex_accepts_prefix() {
        let tx = Transaction::create(TxType::Cancel, fields()).unwrap();
        let encoded = tx.encode_hex().unwrap();
        assert!(encoded.starts_with("0x38"));
        let decoded = Transaction::decode_hex(&encoded).unwrap();
        let bare = Transaction::decode_hex(encoded.trim_start_matches("0x")).unwrap();
        assert_eq!(decoded, bare);
        assert_eq!(decoded.nonce(), Some(5));
    }
}
