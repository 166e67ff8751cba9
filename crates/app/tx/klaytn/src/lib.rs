//! Klaytn transaction codec and signing protocol.
//!
//! This crate defines every Klaytn transaction shape, encodes and decodes each
//! to its exact wire format (a type tag followed by an RLP list) and manages
//! the signature and fee delegation rules that apply before broadcast.
//!
//! # Transaction Types
//!
//! - **Legacy**: untagged, EIP-155 signatures
//! - **Native** (`0x08`..`0x4a`): value transfer, memo, account update,
//!   contract deploy/execution, cancel and chain data anchoring, each in a
//!   basic, fee delegated and partially fee delegated form
//! - **Ethereum envelope** (`0x78 0x01`, `0x78 0x02`): EIP-2930 and EIP-1559
//!
//! # Usage
//!
//! ```text
//! use klaytn_tx::{Transaction, TxFields, TxType, TypedTransaction};
//!
//! let mut tx = Transaction::create(TxType::FeeDelegatedValueTransfer, fields)?;
//! fill_defaults(&mut tx, &provider, &FillPolicy::default()).await?;
//! tx.sign(&sender_keyring, None)?;
//! tx.sign_as_fee_payer(&fee_payer_keyring, None)?;
//! let raw = tx.encode_hex()?;
//! ```
//!
//! # Architecture
//!
//! 1. [`TxType`] - the fixed tag table
//! 2. [`TypedTransaction`] - shared contract every variant implements
//! 3. [`Transaction`] - enum holding any supported variant
//! 4. [`TransactionDecoder`] - tag dispatch with an allow list
//! 5. [`TxSigner`] / [`ChainProvider`] - keyring and node boundaries

pub mod access_list;
pub mod account;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod provider;
pub mod recovery;
pub mod signature;
pub mod signer;
pub mod traits;
pub mod transaction;
pub mod tx_type;

pub use access_list::{AccessList, AccessTuple};
pub use account::{Account, AccountKeyType};
pub use decoder::{decode_transaction, detect_type, TransactionDecoder};
pub use error::{BoxError, TxError, TxResult};
pub use fields::TxFields;
pub use provider::{fetch_transaction, fill_defaults, ChainProvider, FillPolicy};
pub use recovery::{public_key_to_address, recover_address, recover_public_key};
pub use signature::{SignatureData, SignaturePolicy, SignatureSet};
pub use signer::{KeyRole, TxSigner};
pub use traits::TypedTransaction;
pub use transaction::{
    CommonFields, EthereumAccessListTx, EthereumDynamicFeeTx, FieldKind, KlaytnTx, LegacyTx,
    Transaction,
};
pub use tx_type::{code_format_tag, tag, CodeFormat, FeeDelegation, TxFamily, TxType};
