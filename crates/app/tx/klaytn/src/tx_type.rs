//! Transaction type registry.
//!
//! The fixed, process-wide mapping between a transaction type name and its
//! wire tag. Native Klaytn types carry a single tag byte; the Ethereum
//! compatible types are nested under the [`tag::ETHEREUM_ENVELOPE`] byte
//! followed by an inner selector; legacy transactions carry no tag at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TxError, TxResult};

/// Raw tag bytes.
pub mod tag {
    pub const VALUE_TRANSFER: u8 = 0x08;
    pub const FEE_DELEGATED_VALUE_TRANSFER: u8 = 0x09;
    pub const FEE_DELEGATED_VALUE_TRANSFER_WITH_RATIO: u8 = 0x0a;

    pub const VALUE_TRANSFER_MEMO: u8 = 0x10;
    pub const FEE_DELEGATED_VALUE_TRANSFER_MEMO: u8 = 0x11;
    pub const FEE_DELEGATED_VALUE_TRANSFER_MEMO_WITH_RATIO: u8 = 0x12;

    pub const ACCOUNT_UPDATE: u8 = 0x20;
    pub const FEE_DELEGATED_ACCOUNT_UPDATE: u8 = 0x21;
    pub const FEE_DELEGATED_ACCOUNT_UPDATE_WITH_RATIO: u8 = 0x22;

    pub const SMART_CONTRACT_DEPLOY: u8 = 0x28;
    pub const FEE_DELEGATED_SMART_CONTRACT_DEPLOY: u8 = 0x29;
    pub const FEE_DELEGATED_SMART_CONTRACT_DEPLOY_WITH_RATIO: u8 = 0x2a;

    pub const SMART_CONTRACT_EXECUTION: u8 = 0x30;
    pub const FEE_DELEGATED_SMART_CONTRACT_EXECUTION: u8 = 0x31;
    pub const FEE_DELEGATED_SMART_CONTRACT_EXECUTION_WITH_RATIO: u8 = 0x32;

    pub const CANCEL: u8 = 0x38;
    pub const FEE_DELEGATED_CANCEL: u8 = 0x39;
    pub const FEE_DELEGATED_CANCEL_WITH_RATIO: u8 = 0x3a;

    pub const CHAIN_DATA_ANCHORING: u8 = 0x48;
    pub const FEE_DELEGATED_CHAIN_DATA_ANCHORING: u8 = 0x49;
    pub const FEE_DELEGATED_CHAIN_DATA_ANCHORING_WITH_RATIO: u8 = 0x4a;

    /// Outer tag shared by the Ethereum compatible types.
    pub const ETHEREUM_ENVELOPE: u8 = 0x78;
    /// EIP-2930 selector inside the Ethereum envelope.
    pub const ETHEREUM_ACCESS_LIST: u8 = 0x01;
    /// EIP-1559 selector inside the Ethereum envelope.
    pub const ETHEREUM_DYNAMIC_FEE: u8 = 0x02;
}

/// Every transaction shape understood by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum TxType {
    Legacy,
    ValueTransfer,
    FeeDelegatedValueTransfer,
    FeeDelegatedValueTransferWithRatio,
    ValueTransferMemo,
    FeeDelegatedValueTransferMemo,
    FeeDelegatedValueTransferMemoWithRatio,
    AccountUpdate,
    FeeDelegatedAccountUpdate,
    FeeDelegatedAccountUpdateWithRatio,
    SmartContractDeploy,
    FeeDelegatedSmartContractDeploy,
    FeeDelegatedSmartContractDeployWithRatio,
    SmartContractExecution,
    FeeDelegatedSmartContractExecution,
    FeeDelegatedSmartContractExecutionWithRatio,
    Cancel,
    FeeDelegatedCancel,
    FeeDelegatedCancelWithRatio,
    ChainDataAnchoring,
    FeeDelegatedChainDataAnchoring,
    FeeDelegatedChainDataAnchoringWithRatio,
    EthereumAccessList,
    EthereumDynamicFee,
}

/// Field layout family a [`TxType`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxFamily {
    Legacy,
    ValueTransfer,
    ValueTransferMemo,
    AccountUpdate,
    SmartContractDeploy,
    SmartContractExecution,
    Cancel,
    ChainDataAnchoring,
    EthereumAccessList,
    EthereumDynamicFee,
}

/// How gas fees of a transaction are paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeDelegation {
    /// The sender pays the whole fee.
    Basic,
    /// A fee payer pays the whole fee.
    FeeDelegated,
    /// A fee payer pays `feeRatio` percent of the fee.
    PartialFeeDelegated,
}

impl TxType {
    /// All transaction types, legacy first, in tag order.
    pub const ALL: [TxType; 24] = [
        TxType::Legacy,
        TxType::ValueTransfer,
        TxType::FeeDelegatedValueTransfer,
        TxType::FeeDelegatedValueTransferWithRatio,
        TxType::ValueTransferMemo,
        TxType::FeeDelegatedValueTransferMemo,
        TxType::FeeDelegatedValueTransferMemoWithRatio,
        TxType::AccountUpdate,
        TxType::FeeDelegatedAccountUpdate,
        TxType::FeeDelegatedAccountUpdateWithRatio,
        TxType::SmartContractDeploy,
        TxType::FeeDelegatedSmartContractDeploy,
        TxType::FeeDelegatedSmartContractDeployWithRatio,
        TxType::SmartContractExecution,
        TxType::FeeDelegatedSmartContractExecution,
        TxType::FeeDelegatedSmartContractExecutionWithRatio,
        TxType::Cancel,
        TxType::FeeDelegatedCancel,
        TxType::FeeDelegatedCancelWithRatio,
        TxType::ChainDataAnchoring,
        TxType::FeeDelegatedChainDataAnchoring,
        TxType::FeeDelegatedChainDataAnchoringWithRatio,
        TxType::EthereumAccessList,
        TxType::EthereumDynamicFee,
    ];

    /// The canonical type name, e.g. `TxTypeFeeDelegatedValueTransfer`.
    pub const fn name(self) -> &'static str {
        match self {
            TxType::Legacy => "TxTypeLegacyTransaction",
            TxType::ValueTransfer => "TxTypeValueTransfer",
            TxType::FeeDelegatedValueTransfer => "TxTypeFeeDelegatedValueTransfer",
            TxType::FeeDelegatedValueTransferWithRatio => {
                "TxTypeFeeDelegatedValueTransferWithRatio"
            }
            TxType::ValueTransferMemo => "TxTypeValueTransferMemo",
            TxType::FeeDelegatedValueTransferMemo => "TxTypeFeeDelegatedValueTransferMemo",
            TxType::FeeDelegatedValueTransferMemoWithRatio => {
                "TxTypeFeeDelegatedValueTransferMemoWithRatio"
            }
            TxType::AccountUpdate => "TxTypeAccountUpdate",
            TxType::FeeDelegatedAccountUpdate => "TxTypeFeeDelegatedAccountUpdate",
            TxType::FeeDelegatedAccountUpdateWithRatio => {
                "TxTypeFeeDelegatedAccountUpdateWithRatio"
            }
            TxType::SmartContractDeploy => "TxTypeSmartContractDeploy",
            TxType::FeeDelegatedSmartContractDeploy => "TxTypeFeeDelegatedSmartContractDeploy",
            TxType::FeeDelegatedSmartContractDeployWithRatio => {
                "TxTypeFeeDelegatedSmartContractDeployWithRatio"
            }
            TxType::SmartContractExecution => "TxTypeSmartContractExecution",
            TxType::FeeDelegatedSmartContractExecution => {
                "TxTypeFeeDelegatedSmartContractExecution"
            }
            TxType::FeeDelegatedSmartContractExecutionWithRatio => {
                "TxTypeFeeDelegatedSmartContractExecutionWithRatio"
            }
            TxType::Cancel => "TxTypeCancel",
            TxType::FeeDelegatedCancel => "TxTypeFeeDelegatedCancel",
            TxType::FeeDelegatedCancelWithRatio => "TxTypeFeeDelegatedCancelWithRatio",
            TxType::ChainDataAnchoring => "TxTypeChainDataAnchoring",
            TxType::FeeDelegatedChainDataAnchoring => "TxTypeFeeDelegatedChainDataAnchoring",
            TxType::FeeDelegatedChainDataAnchoringWithRatio => {
                "TxTypeFeeDelegatedChainDataAnchoringWithRatio"
            }
            TxType::EthereumAccessList => "TxTypeEthereumAccessList",
            TxType::EthereumDynamicFee => "TxTypeEthereumDynamicFee",
        }
    }

    /// Wire prefix of this type: empty for legacy, one byte for native
    /// types, envelope byte plus selector for Ethereum types.
    pub const fn tag_bytes(self) -> &'static [u8] {
        match self {
            TxType::Legacy => &[],
            TxType::ValueTransfer => &[tag::VALUE_TRANSFER],
            TxType::FeeDelegatedValueTransfer => &[tag::FEE_DELEGATED_VALUE_TRANSFER],
            TxType::FeeDelegatedValueTransferWithRatio => {
                &[tag::FEE_DELEGATED_VALUE_TRANSFER_WITH_RATIO]
            }
            TxType::ValueTransferMemo => &[tag::VALUE_TRANSFER_MEMO],
            TxType::FeeDelegatedValueTransferMemo => &[tag::FEE_DELEGATED_VALUE_TRANSFER_MEMO],
            TxType::FeeDelegatedValueTransferMemoWithRatio => {
                &[tag::FEE_DELEGATED_VALUE_TRANSFER_MEMO_WITH_RATIO]
            }
            TxType::AccountUpdate => &[tag::ACCOUNT_UPDATE],
            TxType::FeeDelegatedAccountUpdate => &[tag::FEE_DELEGATED_ACCOUNT_UPDATE],
            TxType::FeeDelegatedAccountUpdateWithRatio => {
                &[tag::FEE_DELEGATED_ACCOUNT_UPDATE_WITH_RATIO]
            }
            TxType::SmartContractDeploy => &[tag::SMART_CONTRACT_DEPLOY],
            TxType::FeeDelegatedSmartContractDeploy => &[tag::FEE_DELEGATED_SMART_CONTRACT_DEPLOY],
            TxType::FeeDelegatedSmartContractDeployWithRatio => {
                &[tag::FEE_DELEGATED_SMART_CONTRACT_DEPLOY_WITH_RATIO]
            }
            TxType::SmartContractExecution => &[tag::SMART_CONTRACT_EXECUTION],
            TxType::FeeDelegatedSmartContractExecution => {
                &[tag::FEE_DELEGATED_SMART_CONTRACT_EXECUTION]
            }
            TxType::FeeDelegatedSmartContractExecutionWithRatio => {
                &[tag::FEE_DELEGATED_SMART_CONTRACT_EXECUTION_WITH_RATIO]
            }
            TxType::Cancel => &[tag::CANCEL],
            TxType::FeeDelegatedCancel => &[tag::FEE_DELEGATED_CANCEL],
            TxType::FeeDelegatedCancelWithRatio => &[tag::FEE_DELEGATED_CANCEL_WITH_RATIO],
            TxType::ChainDataAnchoring => &[tag::CHAIN_DATA_ANCHORING],
            TxType::FeeDelegatedChainDataAnchoring => &[tag::FEE_DELEGATED_CHAIN_DATA_ANCHORING],
            TxType::FeeDelegatedChainDataAnchoringWithRatio => {
                &[tag::FEE_DELEGATED_CHAIN_DATA_ANCHORING_WITH_RATIO]
            }
            TxType::EthereumAccessList => &[tag::ETHEREUM_ENVELOPE, tag::ETHEREUM_ACCESS_LIST],
            TxType::EthereumDynamicFee => &[tag::ETHEREUM_ENVELOPE, tag::ETHEREUM_DYNAMIC_FEE],
        }
    }

    /// Leading tag byte, `None` for legacy.
    pub fn tag(self) -> Option<u8> {
        self.tag_bytes().first().copied()
    }

    /// Looks up a native (single byte tagged) type.
    pub fn from_tag(tag: u8) -> Option<TxType> {
        Self::ALL
            .into_iter()
            .find(|tx_type| tx_type.family().is_native() && tx_type.tag_bytes() == [tag])
    }

    /// Looks up the type a raw transaction starts with.
    ///
    /// Reads one byte for native types and two for the Ethereum envelope.
    /// Returns `None` when the prefix is not in the table, which callers treat
    /// as a legacy transaction.
    pub fn from_prefix(bytes: &[u8]) -> Option<TxType> {
        match bytes {
            [tag::ETHEREUM_ENVELOPE, tag::ETHEREUM_ACCESS_LIST, ..] => {
                Some(TxType::EthereumAccessList)
            }
            [tag::ETHEREUM_ENVELOPE, tag::ETHEREUM_DYNAMIC_FEE, ..] => {
                Some(TxType::EthereumDynamicFee)
            }
            [first, ..] => Self::from_tag(*first),
            [] => None,
        }
    }

    pub const fn family(self) -> TxFamily {
        match self {
            TxType::Legacy => TxFamily::Legacy,
            TxType::ValueTransfer
            | TxType::FeeDelegatedValueTransfer
            | TxType::FeeDelegatedValueTransferWithRatio => TxFamily::ValueTransfer,
            TxType::ValueTransferMemo
            | TxType::FeeDelegatedValueTransferMemo
            | TxType::FeeDelegatedValueTransferMemoWithRatio => TxFamily::ValueTransferMemo,
            TxType::AccountUpdate
            | TxType::FeeDelegatedAccountUpdate
            | TxType::FeeDelegatedAccountUpdateWithRatio => TxFamily::AccountUpdate,
            TxType::SmartContractDeploy
            | TxType::FeeDelegatedSmartContractDeploy
            | TxType::FeeDelegatedSmartContractDeployWithRatio => TxFamily::SmartContractDeploy,
            TxType::SmartContractExecution
            | TxType::FeeDelegatedSmartContractExecution
            | TxType::FeeDelegatedSmartContractExecutionWithRatio => {
                TxFamily::SmartContractExecution
            }
            TxType::Cancel | TxType::FeeDelegatedCancel | TxType::FeeDelegatedCancelWithRatio => {
                TxFamily::Cancel
            }
            TxType::ChainDataAnchoring
            | TxType::FeeDelegatedChainDataAnchoring
            | TxType::FeeDelegatedChainDataAnchoringWithRatio => TxFamily::ChainDataAnchoring,
            TxType::EthereumAccessList => TxFamily::EthereumAccessList,
            TxType::EthereumDynamicFee => TxFamily::EthereumDynamicFee,
        }
    }

    pub const fn fee_delegation(self) -> FeeDelegation {
        match self {
            TxType::FeeDelegatedValueTransfer
            | TxType::FeeDelegatedValueTransferMemo
            | TxType::FeeDelegatedAccountUpdate
            | TxType::FeeDelegatedSmartContractDeploy
            | TxType::FeeDelegatedSmartContractExecution
            | TxType::FeeDelegatedCancel
            | TxType::FeeDelegatedChainDataAnchoring => FeeDelegation::FeeDelegated,
            TxType::FeeDelegatedValueTransferWithRatio
            | TxType::FeeDelegatedValueTransferMemoWithRatio
            | TxType::FeeDelegatedAccountUpdateWithRatio
            | TxType::FeeDelegatedSmartContractDeployWithRatio
            | TxType::FeeDelegatedSmartContractExecutionWithRatio
            | TxType::FeeDelegatedCancelWithRatio
            | TxType::FeeDelegatedChainDataAnchoringWithRatio => {
                FeeDelegation::PartialFeeDelegated
            }
            TxType::Legacy
            | TxType::ValueTransfer
            | TxType::ValueTransferMemo
            | TxType::AccountUpdate
            | TxType::SmartContractDeploy
            | TxType::SmartContractExecution
            | TxType::Cancel
            | TxType::ChainDataAnchoring
            | TxType::EthereumAccessList
            | TxType::EthereumDynamicFee => FeeDelegation::Basic,
        }
    }

    /// Returns true if a fee payer signs this type.
    pub const fn is_fee_delegated(self) -> bool {
        !matches!(self.fee_delegation(), FeeDelegation::Basic)
    }

    /// Returns true if this type carries a `feeRatio` field.
    pub const fn has_fee_ratio(self) -> bool {
        matches!(self.fee_delegation(), FeeDelegation::PartialFeeDelegated)
    }

    /// Returns true if this type holds at most one sender signature.
    pub const fn is_single_signature(self) -> bool {
        !self.family().is_native()
    }
}

impl TxFamily {
    /// Returns true for the Klaytn native families (single tag byte).
    pub const fn is_native(self) -> bool {
        !matches!(
            self,
            TxFamily::Legacy | TxFamily::EthereumAccessList | TxFamily::EthereumDynamicFee
        )
    }

    /// Returns true for the types nested under the Ethereum envelope tag.
    pub const fn is_ethereum_envelope(self) -> bool {
        matches!(
            self,
            TxFamily::EthereumAccessList | TxFamily::EthereumDynamicFee
        )
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TxType {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tx_type| tx_type.name() == s)
            .ok_or_else(|| TxError::TypeTagMismatch {
                expected: "a known transaction type name".to_string(),
                actual: s.to_string(),
            })
    }
}

impl From<TxType> for &'static str {
    fn from(tx_type: TxType) -> Self {
        tx_type.name()
    }
}

impl TryFrom<String> for TxType {
    type Error = TxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Format of the code deployed by a smart contract deploy transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CodeFormat {
    #[default]
    Evm,
}

impl CodeFormat {
    pub const fn as_u8(self) -> u8 {
        match self {
            CodeFormat::Evm => 0,
        }
    }
}

impl TryFrom<u64> for CodeFormat {
    type Error = TxError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CodeFormat::Evm),
            other => Err(TxError::UnsupportedCodeFormat(other)),
        }
    }
}

/// Returns the wire value for a code format, rejecting anything but EVM.
pub fn code_format_tag(value: u64) -> TxResult<u8> {
    CodeFormat::try_from(value).map(CodeFormat::as_u8)
}
