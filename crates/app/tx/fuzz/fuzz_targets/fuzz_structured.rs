//! Structured fuzzing with arbitrary transaction generation.
//!
//! This builds valid-looking transactions of every type and tests the full
//! pipeline: construction, signature appends, encoding and decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;

use alloy_primitives::{Address, Bytes, U256};
use klaytn_tx::{
    decode_transaction, Account, SignatureData, SignatureSet, Transaction, TxFamily, TxFields,
    TxType, TypedTransaction,
};

/// Fuzzable transaction parameters
#[derive(Debug, Arbitrary)]
struct FuzzTx {
    type_index: u8,
    from: [u8; 20],
    to: [u8; 20],
    fee_payer: Option<[u8; 20]>,
    nonce: u64,
    gas_price: u64,
    gas: u64,
    value: [u8; 32],
    input: Vec<u8>,
    chain_id: u64,
    fee_ratio: u8,
    human_readable: bool,
    max_fee_per_gas: u64,
    max_priority_fee_per_gas: u64,
}

/// Fuzzable signature (note: these won't be cryptographically valid)
#[derive(Debug, Arbitrary)]
struct FuzzSignature {
    v: u64,
    r: [u8; 32],
    s: [u8; 32],
}

/// Combined fuzz input
#[derive(Debug, Arbitrary)]
enum FuzzInput {
    Built(FuzzTx, Vec<FuzzSignature>),
    Raw(Vec<u8>),
}

impl FuzzSignature {
    fn to_signature(&self) -> SignatureData {
        SignatureData::new(self.v, U256::from_be_bytes(self.r), U256::from_be_bytes(self.s))
    }
}

impl FuzzTx {
    fn tx_type(&self) -> TxType {
        TxType::ALL[usize::from(self.type_index) % TxType::ALL.len()]
    }

    fn fields(&self) -> TxFields {
        let from = Address::from(self.from);
        let mut fields = TxFields::new()
            .from(from)
            .nonce(self.nonce)
            .gas_price(u128::from(self.gas_price))
            .gas(self.gas)
            .value(U256::from_be_bytes(self.value))
            .input(Bytes::from(self.input.clone()))
            .chain_id(self.chain_id)
            .fee_ratio(u64::from(self.fee_ratio))
            .human_readable(self.human_readable)
            .max_fee_per_gas(u128::from(self.max_fee_per_gas))
            .max_priority_fee_per_gas(u128::from(self.max_priority_fee_per_gas));
        if let Some(fee_payer) = self.fee_payer {
            fields = fields.fee_payer(Address::from(fee_payer));
        }
        match self.tx_type().family() {
            TxFamily::SmartContractDeploy => fields,
            TxFamily::AccountUpdate => fields.account(Account::legacy(from)),
            _ => fields.to(Address::from(self.to)),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::Built(tx_data, sig_data) => {
            // Out of range ratios and similar are rejected, not panicked on
            let Ok(mut tx) = Transaction::create(tx_data.tx_type(), tx_data.fields()) else {
                return;
            };

            let signatures: SignatureSet = sig_data.iter().map(FuzzSignature::to_signature).collect();
            if tx.append_signatures(signatures).is_err() {
                return;
            }

            let Ok(encoded) = tx.encode() else {
                return;
            };

            // Random signatures won't recover, but decoding must succeed
            let decoded = decode_transaction(&encoded).expect("built transaction must decode");
            assert_eq!(decoded.tx_type(), tx.tx_type(), "tx_type mismatch");
            assert_eq!(decoded.nonce(), tx.nonce(), "nonce mismatch");
            assert_eq!(decoded.gas(), tx.gas(), "gas mismatch");
            assert_eq!(decoded.to(), tx.to(), "to mismatch");
            assert_eq!(decoded.input(), tx.input(), "input mismatch");
            assert_eq!(decoded.signatures(), tx.signatures(), "signatures mismatch");
            assert_eq!(decoded.encode().ok(), Some(encoded), "re-encoding mismatch");

            let _ = decoded.recover_public_keys();
            let _ = decoded.sender_tx_hash();
        }

        FuzzInput::Raw(data) => {
            // Pure random bytes - same as fuzz_decode
            if let Ok(tx) = decode_transaction(&data) {
                let _ = tx.tx_type();
                let _ = tx.from();
                let _ = tx.transaction_hash();
                let _ = tx.nonce();
                let _ = tx.gas();
                let _ = tx.chain_id();
                let _ = tx.to();
                let _ = tx.value();
                let _ = tx.input();
            }
        }
    }
});
