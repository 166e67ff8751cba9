use alloy_primitives::{keccak256, Address, B256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1};
use std::sync::OnceLock;

use crate::error::{TxError, TxResult};
use crate::signature::SignatureData;

/// Recovers the public key that produced `signature` over `hash`.
pub fn recover_public_key(hash: B256, signature: &SignatureData) -> TxResult<PublicKey> {
    if signature.is_empty() {
        return Err(TxError::EmptySignature);
    }

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r.to_be_bytes::<32>());
    compact[32..].copy_from_slice(&signature.s.to_be_bytes::<32>());

    let recid = RecoveryId::from_i32(i32::from(signature.recovery_id()?))
        .map_err(|err| TxError::SignatureRecovery(err.to_string()))?;
    let recoverable = RecoverableSignature::from_compact(&compact, recid)
        .map_err(|err| TxError::SignatureRecovery(err.to_string()))?;

    let msg = Message::from_digest_slice(hash.as_slice())
        .map_err(|err| TxError::SignatureRecovery(err.to_string()))?;
    secp()
        .recover_ecdsa(&msg, &recoverable)
        .map_err(|err| TxError::SignatureRecovery(err.to_string()))
}

/// Ethereum style address of an uncompressed public key.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(uncompressed.get(1..).unwrap_or_default());
    Address::from_slice(hash.as_slice().get(12..).unwrap_or_default())
}

/// Recovers the signer address of `signature` over `hash`.
pub fn recover_address(hash: B256, signature: &SignatureData) -> TxResult<Address> {
    recover_public_key(hash, signature).map(|key| public_key_to_address(&key))
}

fn secp() -> &'static Secp256k1<All> {
    static SECP: OnceLock<Secp256k1<All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use k256::ecdsa::{signature::hazmat::PrehashSigner, SigningKey, VerifyingKey};
    use rand::rngs::OsRng;

    fn sign_hash(signing_key: &SigningKey, hash: B256, v_offset: u64) -> SignatureData {
        let (sig, recovery_id) = signing_key.sign_prehash(hash.as_ref()).expect("sign");
        let r = U256::from_be_slice(&sig.r().to_bytes());
        let s = U256::from_be_slice(&sig.s().to_bytes());
        SignatureData::new(v_offset + u64::from(recovery_id.is_y_odd()), r, s)
    }

    fn get_address(signing_key: &SigningKey) -> Address {
        let verifying_key = VerifyingKey::from(signing_key);
        let public_key = verifying_key.to_encoded_point(false);
        let public_key_bytes = &public_key.as_bytes()[1..];
        let hash = keccak256(public_key_bytes);
        Address::from_slice(&hash[12..])
    }

    #[test]
    fn test_recover_from_every_v_form() {
        let signing_key = SigningKey::random(&mut OsRng);
        let hash = keccak256(b"klaytn-sender-recovery");
        // y-parity, pre-EIP-155, and EIP-155 with chain id 1001
        for offset in [0, 27, 1001 * 2 + 35] {
            let signature = sign_hash(&signing_key, hash, offset);
            let recovered = recover_address(hash, &signature).expect("recover");
            assert_eq!(recovered, get_address(&signing_key), "offset {offset}");
        }
    }

    #[test]
    fn test_recover_rejects_invalid_signature_components() {
        let hash = keccak256(b"invalid-signature-components");
        let invalid = SignatureData::new(0, U256::MAX, U256::MAX);
        assert!(matches!(
            recover_public_key(hash, &invalid),
            Err(TxError::SignatureRecovery(_))
        ));
    }

    #[test]
    fn test_recover_rejects_placeholder() {
        let hash = keccak256(b"placeholder");
        assert!(matches!(
            recover_public_key(hash, &SignatureData::EMPTY),
            Err(TxError::EmptySignature)
        ));
    }

    #[test]
    fn test_recover_detects_forged_recovery_id() {
        let signing_key = SigningKey::random(&mut OsRng);
        let hash = keccak256(b"forged-recovery-id");
        let valid = sign_hash(&signing_key, hash, 0);
        let forged = SignatureData::new(1 - valid.v, valid.r, valid.s);

        let recovered_valid = recover_address(hash, &valid).expect("recover valid");
        let recovered_forged = recover_address(hash, &forged).expect("recover forged");

        assert_ne!(recovered_valid, recovered_forged);
    }
}
