//! Loose field set used to construct any transaction variant.

use alloy_primitives::{Address, Bytes, U256};

use crate::access_list::AccessList;
use crate::account::Account;
use crate::error::{TxError, TxResult};
use crate::signature::SignatureSet;

/// Optional inputs for [`crate::Transaction::create`].
///
/// Fields that do not belong to the requested type are ignored. `input` and
/// `data` are aliases; supplying both is an error.
#[derive(Clone, Debug, Default)]
pub struct TxFields {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub input: Option<Bytes>,
    pub data: Option<Bytes>,
    pub nonce: Option<u64>,
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub chain_id: Option<u64>,
    pub fee_payer: Option<Address>,
    pub fee_ratio: Option<u64>,
    pub human_readable: Option<bool>,
    pub code_format: Option<u64>,
    pub account: Option<Account>,
    pub access_list: Option<AccessList>,
    pub signatures: Option<SignatureSet>,
    pub fee_payer_signatures: Option<SignatureSet>,
}

macro_rules! setter {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(mut self, $name: impl Into<$ty>) -> Self {
                self.$name = Some($name.into());
                self
            }
        )*
    };
}

impl TxFields {
    pub fn new() -> Self {
        Self::default()
    }

    setter! {
        from: Address,
        to: Address,
        value: U256,
        input: Bytes,
        data: Bytes,
        nonce: u64,
        gas: u64,
        gas_price: u128,
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
        chain_id: u64,
        fee_payer: Address,
        fee_ratio: u64,
        human_readable: bool,
        code_format: u64,
        account: Account,
        access_list: AccessList,
        signatures: SignatureSet,
        fee_payer_signatures: SignatureSet,
    }

    /// Resolves the `input`/`data` alias.
    pub(crate) fn take_input(&mut self) -> TxResult<Option<Bytes>> {
        match (self.input.take(), self.data.take()) {
            (Some(_), Some(_)) => Err(TxError::MutuallyExclusiveFields {
                first: "input",
                second: "data",
            }),
            (input, data) => Ok(input.or(data)),
        }
    }

    pub(crate) fn require_gas(&self) -> TxResult<u64> {
        self.gas.ok_or(TxError::MissingField("gas"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let fields = TxFields::new()
            .nonce(7u64)
            .gas(21_000u64)
            .value(U256::from(5))
            .to(Address::repeat_byte(0xaa));
        assert_eq!(fields.nonce, Some(7));
        assert_eq!(fields.gas, Some(21_000));
        assert_eq!(fields.to, Some(Address::repeat_byte(0xaa)));
        assert_eq!(fields.require_gas().unwrap(), 21_000);
    }

    #[test]
    fn test_input_data_alias() {
        let mut fields = TxFields::new().data(vec![1u8, 2]);
        assert_eq!(fields.take_input().unwrap().unwrap().as_ref(), &[1, 2]);

        let mut both = TxFields::new().data(vec![1u8]).input(vec![2u8]);
        assert!(matches!(
            both.take_input(),
            Err(TxError::MutuallyExclusiveFields { .. })
        ));
    }

    #[test]
    fn test_missing_gas() {
        assert!(matches!(
            TxFields::new().require_gas(),
            Err(TxError::MissingField("gas"))
        ));
    }
}
