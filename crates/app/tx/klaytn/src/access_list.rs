//! EIP-2930 access lists.

use alloy_primitives::{Address, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_hex, parse_address, RlpReader};
use crate::error::{TxError, TxResult};

/// One address with the storage slots it touches.
///
/// Storage keys are always held in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTuple {
    pub address: Address,
    pub storage_keys: Vec<B256>,
}

impl AccessTuple {
    /// Builds a tuple from hex strings.
    ///
    /// Every key must be exactly 32 bytes.
    pub fn new<K: AsRef<str>>(address: &str, storage_keys: &[K]) -> TxResult<Self> {
        let address = parse_address(address)?;
        let storage_keys = storage_keys
            .iter()
            .map(|key| parse_storage_key(key.as_ref()))
            .collect::<TxResult<Vec<_>>>()?;
        Ok(Self::from_parts(address, storage_keys))
    }

    pub fn from_parts(address: Address, mut storage_keys: Vec<B256>) -> Self {
        storage_keys.sort_unstable();
        Self {
            address,
            storage_keys,
        }
    }

    fn keys_payload_length(&self) -> usize {
        self.storage_keys.iter().map(Encodable::length).sum()
    }

    fn payload_length(&self) -> usize {
        let keys = self.keys_payload_length();
        self.address.length() + alloy_rlp::length_of_length(keys) + keys
    }

    fn decode_from(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        let mut item = reader.list()?;
        let address = item.address()?;
        let mut keys = item.list()?;
        let mut storage_keys = Vec::new();
        while !keys.is_empty() {
            storage_keys.push(keys.b256()?);
        }
        item.finish()?;
        Ok(Self::from_parts(address, storage_keys))
    }
}

fn parse_storage_key(key: &str) -> TxResult<B256> {
    let bytes = decode_hex(key).map_err(|_| TxError::InvalidStorageKey(key.to_string()))?;
    if bytes.len() != 32 {
        return Err(TxError::InvalidStorageKey(format!(
            "{key}: expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

impl Encodable for AccessTuple {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.address.encode(out);
        Header {
            list: true,
            payload_length: self.keys_payload_length(),
        }
        .encode(out);
        for key in &self.storage_keys {
            key.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        alloy_rlp::length_of_length(payload_length) + payload_length
    }
}

/// Ordered list of [`AccessTuple`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessList(pub Vec<AccessTuple>);

impl AccessList {
    pub fn new(tuples: Vec<AccessTuple>) -> Self {
        Self(tuples)
    }

    /// Decodes `[[address, [key, ...]], ...]`.
    pub fn decode(mut bytes: &[u8]) -> TxResult<Self> {
        let list = Self::decode_rlp(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(TxError::TrailingBytes);
        }
        Ok(list)
    }

    fn decode_rlp(buf: &mut &[u8]) -> TxResult<Self> {
        let mut reader = RlpReader::open(buf)?;
        let mut tuples = Vec::new();
        while !reader.is_empty() {
            tuples.push(AccessTuple::decode_from(&mut reader)?);
        }
        Ok(Self(tuples))
    }

    pub(crate) fn decode_from(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        let mut raw = reader.raw()?;
        Self::decode_rlp(&mut raw)
    }

    pub fn encode_to_bytes(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    /// Tuple-by-tuple comparison; order matters.
    pub fn is_equal(&self, other: &AccessList) -> bool {
        self == other
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccessTuple> {
        self.0.iter()
    }

    fn payload_length(&self) -> usize {
        self.0.iter().map(Encodable::length).sum()
    }
}

impl Encodable for AccessList {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        for tuple in &self.0 {
            tuple.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        alloy_rlp::length_of_length(payload_length) + payload_length
    }
}

impl Decodable for AccessList {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Self::decode_rlp(buf).map_err(|err| match err {
            TxError::Rlp(err) => err,
            _ => alloy_rlp::Error::Custom("invalid access list"),
        })
    }
}

impl From<Vec<AccessTuple>> for AccessList {
    fn from(tuples: Vec<AccessTuple>) -> Self {
        Self(tuples)
    }
}
