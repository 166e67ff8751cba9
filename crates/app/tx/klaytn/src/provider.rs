//! Node RPC boundary and default filling.
//!
//! The codec never talks to a node itself. Callers inject a [`ChainProvider`]
//! and [`fill_defaults`] asks it only for the values a transaction is still
//! missing.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::decoder::TransactionDecoder;
use crate::error::{BoxError, TxError, TxResult};
use crate::traits::TypedTransaction;
use crate::transaction::Transaction;

/// Default multiplier applied to the base fee when deriving `maxFeePerGas`.
pub const DEFAULT_BASE_FEE_MULTIPLIER: u64 = 2;

/// Read-only node queries needed before broadcasting.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    async fn chain_id(&self) -> Result<u64, BoxError>;

    async fn gas_price(&self) -> Result<u128, BoxError>;

    /// Pending transaction count of `address`, i.e. its next nonce.
    async fn transaction_count(&self, address: Address) -> Result<u64, BoxError>;

    async fn base_fee(&self) -> Result<u128, BoxError>;

    async fn max_priority_fee_per_gas(&self) -> Result<u128, BoxError>;

    /// Raw encoding of a transaction by hash, `None` if unknown.
    async fn raw_transaction_by_hash(&self, hash: B256) -> Result<Option<Bytes>, BoxError>;
}

/// Local overrides for [`fill_defaults`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillPolicy {
    /// Used instead of querying the node when set.
    pub chain_id: Option<u64>,
    pub base_fee_multiplier: u64,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            chain_id: None,
            base_fee_multiplier: DEFAULT_BASE_FEE_MULTIPLIER,
        }
    }
}

fn skip<T: Send + 'static>() -> BoxFuture<'static, TxResult<Option<T>>> {
    future::ready(Ok(None)).boxed()
}

fn query<'a, T, F>(fut: F) -> BoxFuture<'a, TxResult<Option<T>>>
where
    T: Send + 'a,
    F: std::future::Future<Output = Result<T, BoxError>> + Send + 'a,
{
    fut.map(|result| result.map(Some).map_err(TxError::Provider))
        .boxed()
}

/// Fills unset `chainId`, `nonce` and fee fields from `provider`.
///
/// Only missing values are requested and the requests run concurrently. For
/// dynamic fee transactions `maxFeePerGas` becomes
/// `baseFee * multiplier + maxPriorityFeePerGas`; both are left alone when
/// either is already set.
pub async fn fill_defaults<P: ChainProvider + ?Sized>(
    tx: &mut Transaction,
    provider: &P,
    policy: &FillPolicy,
) -> TxResult<()> {
    if tx.chain_id().is_none() {
        if let Some(chain_id) = policy.chain_id {
            tx.common_mut().chain_id = Some(chain_id);
        }
    }

    let needs_nonce = tx.nonce().is_none();
    if needs_nonce && tx.from().is_zero() {
        return Err(TxError::MissingField("from"));
    }
    let needs_chain_id = tx.chain_id().is_none();
    let dynamic = tx.is_dynamic_fee();
    let needs_gas_price = !dynamic && tx.gas_price().is_none();
    let needs_dynamic_fees =
        dynamic && tx.max_fee_per_gas().is_none() && tx.max_priority_fee_per_gas().is_none();
    if dynamic && !needs_dynamic_fees {
        if tx.max_fee_per_gas().is_none() {
            return Err(TxError::MissingField("maxFeePerGas"));
        }
        if tx.max_priority_fee_per_gas().is_none() {
            return Err(TxError::MissingField("maxPriorityFeePerGas"));
        }
    }

    let from = tx.from();
    let (chain_id, nonce, gas_price, base_fee, priority_fee) = futures::try_join!(
        if needs_chain_id { query(provider.chain_id()) } else { skip() },
        if needs_nonce { query(provider.transaction_count(from)) } else { skip() },
        if needs_gas_price { query(provider.gas_price()) } else { skip() },
        if needs_dynamic_fees { query(provider.base_fee()) } else { skip() },
        if needs_dynamic_fees { query(provider.max_priority_fee_per_gas()) } else { skip() },
    )?;

    if let Some(chain_id) = chain_id {
        tx.common_mut().chain_id = Some(chain_id);
    }
    if let Some(nonce) = nonce {
        tx.common_mut().nonce = Some(nonce);
    }
    if let Some(gas_price) = gas_price {
        tx.set_gas_price(gas_price);
    }
    if let (Some(base_fee), Some(priority_fee)) = (base_fee, priority_fee) {
        let max_fee = base_fee
            .saturating_mul(u128::from(policy.base_fee_multiplier))
            .saturating_add(priority_fee);
        tx.set_dynamic_fees(priority_fee, max_fee);
    }

    tracing::debug!(
        tx_type = %tx.tx_type(),
        chain_id = ?tx.chain_id(),
        nonce = ?tx.nonce(),
        "filled transaction defaults"
    );
    Ok(())
}

/// Looks up a transaction by hash and decodes it.
pub async fn fetch_transaction<P: ChainProvider + ?Sized>(
    provider: &P,
    decoder: &TransactionDecoder,
    hash: B256,
) -> TxResult<Option<Transaction>> {
    let raw = provider
        .raw_transaction_by_hash(hash)
        .await
        .map_err(TxError::Provider)?;
    raw.map(|raw| decoder.decode(&raw)).transpose()
}
