//! Fuzz target for raw transaction decoding.
//!
//! This is the primary attack surface - arbitrary bytes fed to the decoder.
//! We're looking for:
//! - Panics (unwraps, out-of-bounds, etc.)
//! - Infinite loops / excessive CPU
//! - Excessive memory allocation

#![no_main]

use libfuzzer_sys::fuzz_target;

use klaytn_tx::{decode_transaction, TypedTransaction};

fuzz_target!(|data: &[u8]| {
    // Try to decode - errors are fine, panics are not
    if let Ok(tx) = decode_transaction(data) {
        // If decode succeeds, all accessors must not panic
        let _ = tx.tx_type();
        let _ = tx.from();
        let _ = tx.nonce();
        let _ = tx.gas();
        let _ = tx.chain_id();
        let _ = tx.to();
        let _ = tx.value();
        let _ = tx.input();
        let _ = tx.transaction_hash();
        let _ = tx.sender_tx_hash();
        let _ = tx.signing_payload();
        let _ = tx.recover_public_keys();
        let _ = tx.fee_payer_signing_payload();
        let _ = tx.recover_fee_payer_public_keys();
    }
});
