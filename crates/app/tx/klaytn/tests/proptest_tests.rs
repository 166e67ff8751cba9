//! Property-based tests for the transaction codec.

#![allow(clippy::unwrap_used)]

use alloy_primitives::{Address, Bytes, B256, U256};
use klaytn_tx::{
    decode_transaction, AccessList, AccessTuple, SignatureData, SignatureSet, Transaction,
    TxFamily, TxFields, TxType, TypedTransaction,
};
use proptest::prelude::*;

// Strategies for generating test data

fn arb_address() -> impl Strategy<Value = Address> {
    prop::array::uniform20(any::<u8>()).prop_map(Address::from)
}

fn arb_nonzero_address() -> impl Strategy<Value = Address> {
    arb_address().prop_filter("non-zero address", |address| !address.is_zero())
}

fn arb_bytes(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..max_len).prop_map(Bytes::from)
}

fn arb_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| U256::from_be_bytes(bytes))
}

fn arb_signature() -> impl Strategy<Value = SignatureData> {
    (any::<u64>(), arb_u256(), arb_u256()).prop_map(|(v, r, s)| SignatureData::new(v, r, s))
}

fn arb_native_type() -> impl Strategy<Value = TxType> {
    let native: Vec<TxType> = TxType::ALL
        .into_iter()
        .filter(|tx_type| tx_type.family().is_native())
        .collect();
    prop::sample::select(native)
}

// Zero is the interesting case for every quantity: it encodes as `0x80`.
fn arb_u64() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), any::<u64>()]
}

fn arb_u128() -> impl Strategy<Value = u128> {
    prop_oneof![Just(0u128), any::<u128>()]
}

fn arb_value() -> impl Strategy<Value = U256> {
    prop_oneof![Just(U256::ZERO), arb_u256()]
}

fn arb_y_parity_signature() -> impl Strategy<Value = SignatureData> {
    (0u64..2, arb_u256(), arb_u256()).prop_map(|(v, r, s)| SignatureData::new(v, r, s))
}

prop_compose! {
    fn arb_any_tx()(
        tx_type in prop::sample::select(TxType::ALL.to_vec()),
        (from, to, fee_payer) in (
            arb_nonzero_address(),
            arb_address(),
            prop::option::of(arb_nonzero_address()),
        ),
        (nonce, gas_price, gas, value) in (arb_u64(), arb_u128(), arb_u64(), arb_value()),
        (max_fee_per_gas, max_priority_fee_per_gas, chain_id) in (arb_u128(), arb_u128(), arb_u64()),
        input in arb_bytes(64),
        (fee_ratio, human_readable) in (1u64..100, any::<bool>()),
        signatures in prop::collection::vec(arb_signature(), 0..4),
        y_parity_signature in prop::option::of(arb_y_parity_signature()),
        storage_keys in prop::collection::vec(prop::array::uniform32(any::<u8>()), 0..3),
    ) -> Transaction {
        let family = tx_type.family();
        let mut fields = TxFields::new()
            .from(from)
            .nonce(nonce)
            .gas_price(gas_price)
            .gas(gas)
            .value(value)
            .input(input)
            .chain_id(chain_id)
            .fee_ratio(fee_ratio)
            .human_readable(human_readable)
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(max_priority_fee_per_gas);
        if let Some(fee_payer) = fee_payer {
            fields = fields.fee_payer(fee_payer);
        }

        let signatures: SignatureSet = if family.is_ethereum_envelope() {
            y_parity_signature.into_iter().collect()
        } else if family == TxFamily::Legacy {
            signatures.into_iter().take(1).collect()
        } else {
            signatures.into_iter().collect()
        };
        fields = fields.signatures(signatures);

        if family.is_ethereum_envelope() {
            let keys = storage_keys.into_iter().map(B256::from).collect();
            fields = fields.access_list(AccessList::new(vec![AccessTuple::from_parts(to, keys)]));
        }
        match family {
            TxFamily::SmartContractDeploy => {}
            TxFamily::AccountUpdate => fields = fields.account(klaytn_tx::Account::legacy(from)),
            _ => fields = fields.to(to),
        }
        Transaction::create(tx_type, fields).unwrap()
    }
}

prop_compose! {
    fn arb_native_tx()(
        tx_type in arb_native_type(),
        from in arb_nonzero_address(),
        to in arb_nonzero_address(),
        fee_payer in arb_nonzero_address(),
        nonce in any::<u64>(),
        gas_price in any::<u128>(),
        gas in any::<u64>(),
        value in arb_u256(),
        input in arb_bytes(64),
        fee_ratio in 1u64..100,
        human_readable in any::<bool>(),
        signatures in prop::collection::vec(arb_signature(), 1..4),
    ) -> Transaction {
        let mut fields = TxFields::new()
            .from(from)
            .nonce(nonce)
            .gas_price(gas_price)
            .gas(gas)
            .value(value)
            .input(input)
            .fee_ratio(fee_ratio)
            .human_readable(human_readable)
            .signatures(SignatureSet::normalize(signatures))
            .fee_payer(fee_payer);
        match tx_type.family() {
            TxFamily::SmartContractDeploy => {}
            TxFamily::AccountUpdate => fields = fields.account(klaytn_tx::Account::legacy(from)),
            _ => fields = fields.to(to),
        }
        Transaction::create(tx_type, fields).unwrap()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Encoding a native transaction and decoding it yields the same
    /// transaction and the same bytes.
    #[test]
    fn native_encoding_is_stable(tx in arb_native_tx()) {
        let raw = tx.encode().unwrap();
        prop_assert_eq!(&raw[..1], tx.tx_type().tag_bytes());

        let decoded = decode_transaction(&raw).unwrap();
        prop_assert_eq!(decoded.tx_type(), tx.tx_type());
        prop_assert_eq!(decoded.nonce(), tx.nonce());
        prop_assert_eq!(decoded.gas(), tx.gas());
        prop_assert_eq!(decoded.from(), tx.from());
        prop_assert_eq!(decoded.to(), tx.to());
        prop_assert_eq!(decoded.signatures(), tx.signatures());
        prop_assert_eq!(decoded.fee_payer(), tx.fee_payer());
        prop_assert_eq!(decoded.encode().unwrap(), raw);
    }

    /// Every type, signed or not, decodes back to itself and re-encodes to
    /// the same bytes. Only values the encoding does not carry may differ:
    /// the recovered sender of legacy and envelope types and the chain id of
    /// legacy and native types.
    #[test]
    fn every_type_roundtrips(tx in arb_any_tx()) {
        let raw = tx.encode().unwrap();
        let mut decoded = decode_transaction(&raw).unwrap();
        prop_assert_eq!(decoded.encode().unwrap(), raw);

        let family = tx.tx_type().family();
        if !family.is_native() {
            decoded.common_mut().from = tx.from();
        }
        if !family.is_ethereum_envelope() {
            decoded.common_mut().chain_id = tx.chain_id();
        }
        prop_assert_eq!(decoded, tx);
    }

    /// The decoder never panics on arbitrary input.
    #[test]
    fn decode_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_transaction(&bytes);
    }

    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(signatures in prop::collection::vec(arb_signature(), 0..6)) {
        let once = SignatureSet::normalize(signatures);
        let twice = SignatureSet::normalize(once.clone());
        prop_assert_eq!(&once, &twice);
        prop_assert!(!once.is_empty() || once.len() == 1);
    }

    /// Storage keys come out sorted whatever order they went in.
    #[test]
    fn access_list_keys_are_sorted(
        address in arb_address(),
        keys in prop::collection::vec(prop::array::uniform32(any::<u8>()), 0..8),
    ) {
        let keys = keys.into_iter().map(Into::into).collect::<Vec<_>>();
        let list = AccessList::new(vec![AccessTuple::from_parts(address, keys)]);
        let decoded = AccessList::decode(&list.encode_to_bytes()).unwrap();
        prop_assert!(decoded.is_equal(&list));
        for tuple in decoded.iter() {
            prop_assert!(tuple.storage_keys.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    /// Hex encoding is the prefixed form of the binary encoding.
    #[test]
    fn encode_hex_matches_encode(tx in arb_native_tx()) {
        let raw = tx.encode().unwrap();
        prop_assert_eq!(tx.encode_hex().unwrap(), format!("0x{}", hex::encode(&raw)));
        let back = Transaction::decode_hex(&tx.encode_hex().unwrap()).unwrap();
        prop_assert_eq!(back.encode().unwrap(), raw);
    }
}
