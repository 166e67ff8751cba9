//! Fuzz target for encode/decode roundtrip consistency.
//!
//! If we can decode a transaction, re-encoding and decoding again
//! should produce identical results.

#![no_main]

use libfuzzer_sys::fuzz_target;

use klaytn_tx::{decode_transaction, TypedTransaction};

fuzz_target!(|data: &[u8]| {
    let Ok(tx1) = decode_transaction(data) else {
        return;
    };

    let encoded = tx1.encode().expect("decoded transaction must encode");

    let Ok(tx2) = decode_transaction(&encoded) else {
        panic!("Failed to decode re-encoded transaction");
    };

    assert_eq!(tx1.tx_type(), tx2.tx_type(), "tx_type mismatch");
    assert_eq!(tx1.from(), tx2.from(), "from mismatch");
    assert_eq!(tx1.nonce(), tx2.nonce(), "nonce mismatch");
    assert_eq!(tx1.gas(), tx2.gas(), "gas mismatch");
    assert_eq!(tx1.chain_id(), tx2.chain_id(), "chain_id mismatch");
    assert_eq!(tx1.to(), tx2.to(), "to mismatch");
    assert_eq!(tx1.value(), tx2.value(), "value mismatch");
    assert_eq!(tx1.input(), tx2.input(), "input mismatch");
    assert_eq!(tx1.signatures(), tx2.signatures(), "signatures mismatch");
    assert_eq!(tx1.fee_payer(), tx2.fee_payer(), "fee payer mismatch");
    assert_eq!(tx1, tx2, "decoded transactions differ");

    // the first encoding is canonical, so it must be reproduced exactly
    assert_eq!(tx2.encode().ok(), Some(encoded), "re-encoding mismatch");
});
