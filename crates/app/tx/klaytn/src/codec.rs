//! RLP and hex helpers shared by every transaction variant.
//!
//! Encoding goes through [`RlpList`], a flat payload buffer that is wrapped in
//! a list header on [`RlpList::finish`]. Decoding goes through [`RlpReader`],
//! a cursor over the payload of one list that yields positional items.
//!
//! Numeric fields are decoded leniently: leading zero bytes are stripped
//! before the value is interpreted, so `0x0001` and `0x01` read the same.

use alloy_primitives::{hex, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, Header};

use crate::error::{TxError, TxResult};

/// Builder for an RLP list.
#[derive(Clone, Debug, Default)]
pub struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one encodable item.
    pub fn push<E: Encodable + ?Sized>(&mut self, item: &E) -> &mut Self {
        item.encode(&mut self.payload);
        self
    }

    /// Appends an already RLP-encoded item verbatim.
    pub fn push_raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.payload.extend_from_slice(encoded);
        self
    }

    /// Appends `bytes` as an RLP string.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        bytes.encode(&mut self.payload);
        self
    }

    /// Appends an optional address; `None` encodes as the empty string.
    pub fn push_optional_address(&mut self, address: Option<&Address>) -> &mut Self {
        match address {
            Some(address) => self.push(address),
            None => self.push_bytes(&[]),
        }
    }

    /// Appends the empty string (`0x80`).
    pub fn push_empty(&mut self) -> &mut Self {
        self.push_bytes(&[])
    }

    /// Wraps the payload in a list header.
    pub fn finish(&self) -> Vec<u8> {
        let header = Header {
            list: true,
            payload_length: self.payload.len(),
        };
        let mut out = Vec::with_capacity(header.length() + self.payload.len());
        header.encode(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Positional cursor over the items of one RLP list.
#[derive(Clone, Copy, Debug)]
pub struct RlpReader<'a> {
    buf: &'a [u8],
}

impl<'a> RlpReader<'a> {
    /// Opens the list at the front of `buf` and advances `buf` past it.
    pub fn open(buf: &mut &'a [u8]) -> TxResult<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString.into());
        }
        let payload = take(buf, header.payload_length)?;
        Ok(Self { buf: payload })
    }

    /// Opens a list that must span the whole input.
    pub fn open_exact(mut buf: &'a [u8]) -> TxResult<Self> {
        let reader = Self::open(&mut buf)?;
        if !buf.is_empty() {
            return Err(TxError::TrailingBytes);
        }
        Ok(reader)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Fails unless every item has been consumed.
    pub fn finish(self) -> TxResult<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(alloy_rlp::Error::ListLengthMismatch {
                expected: 0,
                got: self.buf.len(),
            }
            .into())
        }
    }

    /// Next item as a raw string payload.
    pub fn string(&mut self) -> TxResult<&'a [u8]> {
        let mut cursor = self.buf;
        let header = Header::decode(&mut cursor)?;
        if header.list {
            return Err(alloy_rlp::Error::UnexpectedList.into());
        }
        let payload = take(&mut cursor, header.payload_length)?;
        self.buf = cursor;
        Ok(payload)
    }

    /// Next item as a nested list.
    pub fn list(&mut self) -> TxResult<RlpReader<'a>> {
        RlpReader::open(&mut self.buf)
    }

    /// Next item including its header, without interpretation.
    pub fn raw(&mut self) -> TxResult<&'a [u8]> {
        let start = self.buf;
        let mut cursor = self.buf;
        let header = Header::decode(&mut cursor)?;
        take(&mut cursor, header.payload_length)?;
        let consumed = start.len() - cursor.len();
        self.buf = cursor;
        start
            .get(..consumed)
            .ok_or_else(|| alloy_rlp::Error::InputTooShort.into())
    }

    pub fn u64(&mut self) -> TxResult<u64> {
        let bytes = trim_leading_zeros(self.string()?);
        if bytes.len() > 8 {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    pub fn u128(&mut self) -> TxResult<u128> {
        let bytes = trim_leading_zeros(self.string()?);
        if bytes.len() > 16 {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        Ok(bytes.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b)))
    }

    pub fn u256(&mut self) -> TxResult<U256> {
        let bytes = trim_leading_zeros(self.string()?);
        U256::try_from_be_slice(bytes).ok_or_else(|| alloy_rlp::Error::Overflow.into())
    }

    pub fn bool(&mut self) -> TxResult<bool> {
        match self.u64()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(TxError::InvalidHumanReadableFlag(other)),
        }
    }

    pub fn address(&mut self) -> TxResult<Address> {
        self.optional_address()?
            .ok_or_else(|| TxError::InvalidAddress("empty address".to_string()))
    }

    /// An address that may be encoded as the empty string.
    pub fn optional_address(&mut self) -> TxResult<Option<Address>> {
        let bytes = self.string()?;
        match bytes.len() {
            0 => Ok(None),
            20 => Ok(Some(Address::from_slice(bytes))),
            n => Err(TxError::InvalidAddress(format!(
                "expected 20 bytes, got {n}"
            ))),
        }
    }

    pub fn bytes(&mut self) -> TxResult<Bytes> {
        Ok(Bytes::copy_from_slice(self.string()?))
    }

    pub fn b256(&mut self) -> TxResult<B256> {
        let bytes = self.string()?;
        if bytes.len() != 32 {
            return Err(TxError::InvalidStorageKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(B256::from_slice(bytes))
    }
}

fn take<'a>(buf: &mut &'a [u8], len: usize) -> TxResult<&'a [u8]> {
    let (head, tail) = buf
        .split_at_checked(len)
        .ok_or(alloy_rlp::Error::InputTooShort)?;
    *buf = tail;
    Ok(head)
}

/// Strips leading zero bytes.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes.get(start..).unwrap_or_default()
}

/// Removes an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decodes a hex string with or without `0x`. An odd digit count is padded
/// with a leading zero.
pub fn decode_hex(s: &str) -> TxResult<Vec<u8>> {
    let digits = strip_hex_prefix(s.trim());
    let result = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    result.map_err(|err| TxError::InvalidHex(format!("{s}: {err}")))
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_prefixed(bytes)
}

/// Parses a 20-byte address from hex. The empty string and `0x` are not
/// addresses.
pub fn parse_address(s: &str) -> TxResult<Address> {
    let bytes = decode_hex(s).map_err(|_| TxError::InvalidAddress(s.to_string()))?;
    if bytes.len() != 20 {
        return Err(TxError::InvalidAddress(s.to_string()));
    }
    Ok(Address::from_slice(&bytes))
}

/// Parses a numeric quantity from hex, ignoring leading zeros.
pub fn parse_quantity(s: &str) -> TxResult<U256> {
    let bytes = decode_hex(s)?;
    U256::try_from_be_slice(trim_leading_zeros(&bytes))
        .ok_or_else(|| TxError::InvalidHex(format!("{s}: quantity exceeds 256 bits")))
}
