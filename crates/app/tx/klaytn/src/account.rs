//! Account key boundary used by account update transactions.
//!
//! The key itself is owned by the account subsystem; the codec only carries
//! its RLP encoding: a one byte key kind followed by an RLP payload.

use alloy_primitives::{Address, Bytes};

use crate::codec::{decode_hex, RlpReader};
use crate::error::{TxError, TxResult};

/// Account key kinds by leading byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKeyType {
    /// `0x80`, keeps the current key.
    Nil,
    Legacy,
    Public,
    Fail,
    WeightedMultiSig,
    RoleBased,
}

impl AccountKeyType {
    fn from_prefix(byte: u8) -> Option<Self> {
        match byte {
            0x80 => Some(Self::Nil),
            0x01 => Some(Self::Legacy),
            0x02 => Some(Self::Public),
            0x03 => Some(Self::Fail),
            0x04 => Some(Self::WeightedMultiSig),
            0x05 => Some(Self::RoleBased),
            _ => None,
        }
    }
}

/// An address paired with the RLP encoding of its new account key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    address: Address,
    account_key: Bytes,
    key_type: AccountKeyType,
}

impl Account {
    /// Wraps an RLP encoded account key after checking its shape.
    pub fn create_from_rlp_encoding(address: Address, rlp_account_key: impl Into<Bytes>) -> TxResult<Self> {
        let account_key = rlp_account_key.into();
        let key_type = validate_account_key(&account_key)?;
        Ok(Self {
            address,
            account_key,
            key_type,
        })
    }

    /// Hex variant of [`Account::create_from_rlp_encoding`].
    pub fn from_hex(address: Address, rlp_account_key: &str) -> TxResult<Self> {
        let bytes = decode_hex(rlp_account_key)
            .map_err(|_| TxError::InvalidAccountKey(rlp_account_key.to_string()))?;
        Self::create_from_rlp_encoding(address, bytes)
    }

    /// An account switching to the legacy key (`0x01c0`).
    pub fn legacy(address: Address) -> Self {
        Self {
            address,
            account_key: Bytes::from_static(&[0x01, 0xc0]),
            key_type: AccountKeyType::Legacy,
        }
    }

    /// An account that can no longer sign (`0x03c0`).
    pub fn fail(address: Address) -> Self {
        Self {
            address,
            account_key: Bytes::from_static(&[0x03, 0xc0]),
            key_type: AccountKeyType::Fail,
        }
    }

    /// An account keyed by one compressed secp256k1 public key.
    pub fn with_public_key(address: Address, public_key: &secp256k1::PublicKey) -> Self {
        let mut account_key = vec![0x02];
        account_key.extend(alloy_rlp::encode(public_key.serialize().as_slice()));
        Self {
            address,
            account_key: account_key.into(),
            key_type: AccountKeyType::Public,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn key_type(&self) -> AccountKeyType {
        self.key_type
    }

    pub fn get_rlp_encoding_account_key(&self) -> &Bytes {
        &self.account_key
    }
}

fn validate_account_key(key: &[u8]) -> TxResult<AccountKeyType> {
    let invalid = |reason: &str| TxError::InvalidAccountKey(format!("{reason}: {key:02x?}"));
    let (first, rest) = key.split_first().ok_or_else(|| invalid("empty key"))?;
    let key_type = AccountKeyType::from_prefix(*first).ok_or_else(|| invalid("unknown key type"))?;
    match key_type {
        AccountKeyType::Nil => {
            if !rest.is_empty() {
                return Err(invalid("nil key carries a payload"));
            }
        }
        AccountKeyType::Legacy | AccountKeyType::Fail => {
            if rest != [0xc0] {
                return Err(invalid("expected an empty list payload"));
            }
        }
        AccountKeyType::Public => {
            let mut item = rest;
            let header = alloy_rlp::Header::decode(&mut item)?;
            if header.list || header.payload_length != 33 || item.len() != 33 {
                return Err(invalid("expected a 33 byte compressed public key"));
            }
        }
        AccountKeyType::WeightedMultiSig | AccountKeyType::RoleBased => {
            RlpReader::open_exact(rest).map_err(|_| invalid("malformed key list"))?;
        }
    }
    Ok(key_type)
}
