//! Signature triples and normalized signature sets.

use alloy_primitives::U256;
use alloy_rlp::{BufMut, Encodable, Header};
use serde::{Deserialize, Serialize};

use crate::codec::{parse_quantity, RlpReader};
use crate::error::{TxError, TxResult};
use crate::tx_type::TxType;

/// A raw `(v, r, s)` signature triple.
///
/// `v` is kept exactly as produced by the signer: a y-parity bit, a `27/28`
/// recovery value or an EIP-155 value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[U256; 3]", into = "[U256; 3]")]
pub struct SignatureData {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl SignatureData {
    /// The "no signature" placeholder, encoded as `[0x01, 0x, 0x]`.
    pub const EMPTY: SignatureData = SignatureData {
        v: 1,
        r: U256::ZERO,
        s: U256::ZERO,
    };

    pub const fn new(v: u64, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Parses a triple of hex quantities, `0x` optional, leading zeros ignored.
    pub fn from_hex(v: &str, r: &str, s: &str) -> TxResult<Self> {
        let v = parse_quantity(v)?;
        let v = u64::try_from(v).map_err(|_| TxError::InvalidHex(format!("v {v} exceeds 64 bits")))?;
        Ok(Self {
            v,
            r: parse_quantity(r)?,
            s: parse_quantity(s)?,
        })
    }

    /// True only for [`SignatureData::EMPTY`]. A zero `r`/`s` with any
    /// other `v` is kept as given so it re-encodes unchanged.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn is_y_parity(&self) -> bool {
        self.v <= 1
    }

    /// Recovery id encoded in `v`.
    ///
    /// Accepts a raw y-parity, the pre-EIP-155 `27/28` form, and the EIP-155
    /// form `chain_id * 2 + 35 + parity`.
    pub fn recovery_id(&self) -> TxResult<u8> {
        match self.v {
            0 | 1 => Ok(self.v as u8),
            27 | 28 => Ok((self.v - 27) as u8),
            v if v >= 35 => Ok(((v - 35) % 2) as u8),
            v => Err(TxError::SignatureRecovery(format!("invalid v value {v}"))),
        }
    }

    /// Chain id carried by an EIP-155 `v`, if any.
    pub fn eip155_chain_id(&self) -> Option<u64> {
        (self.v >= 35).then(|| (self.v - 35) >> 1)
    }

    pub(crate) fn decode_from(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        let mut item = reader.list()?;
        let signature = Self {
            v: item.u64()?,
            r: item.u256()?,
            s: item.u256()?,
        };
        item.finish()?;
        Ok(signature)
    }

    fn payload_length(&self) -> usize {
        self.v.length() + self.r.length() + self.s.length()
    }
}

impl Default for SignatureData {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Encodable for SignatureData {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.v.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        alloy_rlp::length_of_length(payload_length) + payload_length
    }
}

impl From<(u64, U256, U256)> for SignatureData {
    fn from((v, r, s): (u64, U256, U256)) -> Self {
        Self { v, r, s }
    }
}

impl TryFrom<[U256; 3]> for SignatureData {
    type Error = TxError;

    fn try_from([v, r, s]: [U256; 3]) -> Result<Self, Self::Error> {
        let v = u64::try_from(v).map_err(|_| TxError::InvalidHex(format!("v {v} exceeds 64 bits")))?;
        Ok(Self { v, r, s })
    }
}

impl From<SignatureData> for [U256; 3] {
    fn from(signature: SignatureData) -> Self {
        [U256::from(signature.v), signature.r, signature.s]
    }
}

/// How many signatures a transaction type may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignaturePolicy {
    /// Klaytn native types, multisig capable.
    Multiple,
    /// Legacy: exactly one signature.
    Single,
    /// Ethereum envelopes: one signature with `v` in `{0, 1}`.
    SingleYParity,
}

impl SignaturePolicy {
    pub fn for_type(tx_type: TxType) -> Self {
        match tx_type.family() {
            crate::tx_type::TxFamily::Legacy => SignaturePolicy::Single,
            family if family.is_ethereum_envelope() => SignaturePolicy::SingleYParity,
            _ => SignaturePolicy::Multiple,
        }
    }
}

/// An ordered, deduplicated, never-empty list of signatures.
///
/// A set without real signatures holds exactly one [`SignatureData::EMPTY`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<SignatureData>", into = "Vec<SignatureData>")]
pub struct SignatureSet(Vec<SignatureData>);

impl SignatureSet {
    /// The unsigned set.
    pub fn empty() -> Self {
        Self(vec![SignatureData::EMPTY])
    }

    /// Deduplicates keeping the first occurrence, drops the placeholder when
    /// any real signature is present and falls back to the placeholder when
    /// nothing is left.
    pub fn normalize(raw: impl IntoIterator<Item = SignatureData>) -> Self {
        let mut out: Vec<SignatureData> = Vec::new();
        for signature in raw {
            if !out.contains(&signature) {
                out.push(signature);
            }
        }
        if out.iter().any(|sig| !sig.is_empty()) {
            out.retain(|sig| !sig.is_empty());
        } else {
            out.clear();
        }
        if out.is_empty() {
            out.push(SignatureData::EMPTY);
        }
        Self(out)
    }

    /// Normalizes `raw` and enforces the cardinality rules of `tx_type`.
    pub fn checked(raw: impl IntoIterator<Item = SignatureData>, tx_type: TxType) -> TxResult<Self> {
        let set = Self::normalize(raw);
        set.check_policy(SignaturePolicy::for_type(tx_type), tx_type)?;
        Ok(set)
    }

    /// Adds signatures, respecting the policy of `tx_type`.
    ///
    /// Multisig types concatenate and re-normalize. Single-signature types
    /// refuse to replace a present signature and accept exactly one new one.
    pub fn append(
        &mut self,
        new: impl IntoIterator<Item = SignatureData>,
        tx_type: TxType,
    ) -> TxResult<()> {
        let new = Self::normalize(new);
        let policy = SignaturePolicy::for_type(tx_type);
        match policy {
            SignaturePolicy::Multiple => {
                let merged = self.0.iter().chain(new.0.iter()).copied();
                *self = Self::normalize(merged.collect::<Vec<_>>());
            }
            SignaturePolicy::Single | SignaturePolicy::SingleYParity => {
                if !self.is_empty() {
                    return Err(TxError::DuplicateSignature(tx_type));
                }
                new.check_policy(policy, tx_type)?;
                *self = new;
            }
        }
        tracing::trace!(tx_type = %tx_type, count = self.len(), "appended signatures");
        Ok(())
    }

    fn check_policy(&self, policy: SignaturePolicy, tx_type: TxType) -> TxResult<()> {
        if policy == SignaturePolicy::Multiple {
            return Ok(());
        }
        if self.0.len() > 1 {
            return Err(TxError::TooManySignatures {
                tx_type,
                count: self.0.len(),
            });
        }
        if policy == SignaturePolicy::SingleYParity {
            if let Some(signature) = self.0.iter().find(|sig| !sig.is_y_parity()) {
                return Err(TxError::InvalidYParity(signature.v));
            }
        }
        Ok(())
    }

    /// True if the set is the single placeholder.
    pub fn is_empty(&self) -> bool {
        matches!(self.0.as_slice(), [only] if only.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SignatureData> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SignatureData] {
        &self.0
    }

    /// The first signature, which for single-signature types is the only one.
    pub fn first(&self) -> SignatureData {
        self.0.first().copied().unwrap_or_default()
    }

    pub(crate) fn decode_from(reader: &mut RlpReader<'_>) -> TxResult<Self> {
        let mut list = reader.list()?;
        let mut signatures = Vec::new();
        while !list.is_empty() {
            signatures.push(SignatureData::decode_from(&mut list)?);
        }
        Ok(Self::normalize(signatures))
    }

    fn payload_length(&self) -> usize {
        self.0.iter().map(Encodable::length).sum()
    }
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl Encodable for SignatureSet {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        for signature in &self.0 {
            signature.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        alloy_rlp::length_of_length(payload_length) + payload_length
    }
}

impl From<SignatureData> for SignatureSet {
    fn from(signature: SignatureData) -> Self {
        Self::normalize([signature])
    }
}

impl From<(u64, U256, U256)> for SignatureSet {
    fn from(triple: (u64, U256, U256)) -> Self {
        Self::normalize([SignatureData::from(triple)])
    }
}

impl From<Vec<SignatureData>> for SignatureSet {
    fn from(signatures: Vec<SignatureData>) -> Self {
        Self::normalize(signatures)
    }
}

impl From<Vec<(u64, U256, U256)>> for SignatureSet {
    fn from(triples: Vec<(u64, U256, U256)>) -> Self {
        Self::normalize(triples.into_iter().map(SignatureData::from))
    }
}

impl From<SignatureSet> for Vec<SignatureData> {
    fn from(set: SignatureSet) -> Self {
        set.0
    }
}

impl FromIterator<SignatureData> for SignatureSet {
    fn from_iter<I: IntoIterator<Item = SignatureData>>(iter: I) -> Self {
        Self::normalize(iter)
    }
}

impl IntoIterator for SignatureSet {
    type Item = SignatureData;
    type IntoIter = std::vec::IntoIter<SignatureData>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SignatureSet {
    type Item = &'a SignatureData;
    type IntoIter = std::slice::Iter<'a, SignatureData>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
