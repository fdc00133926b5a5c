//! # Chain Client
//!
//! The node capabilities fee estimation depends on, and their implementation
//! on top of an `ethers` JSON-RPC [`Provider`].

use crate::error::ClientError;
use crate::types::CallMsg;
use async_trait::async_trait;
use ethers::providers::{JsonRpcClient, Middleware, Provider, ProviderError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Eip1559TransactionRequest, TransactionRequest, U256};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const METHOD_GAS_PRICE: &str = "eth_gasPrice";
pub const METHOD_MAX_PRIORITY_FEE: &str = "eth_maxPriorityFeePerGas";
pub const METHOD_ESTIMATE_GAS: &str = "eth_estimateGas";

/// Node operations used by the fee strategies.
///
/// The cancellation token is the caller's; implementations decide how to
/// honour it.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Suggested legacy gas price, in wei.
    async fn suggest_gas_price(&self, cancel: &CancellationToken) -> Result<U256, ClientError>;

    /// Suggested priority fee per gas, in wei.
    async fn suggest_gas_tip_cap(&self, cancel: &CancellationToken) -> Result<U256, ClientError>;

    /// Gas the call is expected to use, without any margin.
    async fn estimate_gas(
        &self,
        cancel: &CancellationToken,
        msg: &CallMsg,
    ) -> Result<u64, ClientError>;
}

#[async_trait]
impl<C: ChainClient + ?Sized> ChainClient for Arc<C> {
    async fn suggest_gas_price(&self, cancel: &CancellationToken) -> Result<U256, ClientError> {
        (**self).suggest_gas_price(cancel).await
    }

    async fn suggest_gas_tip_cap(
        &self,
        cancel: &CancellationToken,
    ) -> Result<U256, ClientError> {
        (**self).suggest_gas_tip_cap(cancel).await
    }

    async fn estimate_gas(
        &self,
        cancel: &CancellationToken,
        msg: &CallMsg,
    ) -> Result<u64, ClientError> {
        (**self).estimate_gas(cancel, msg).await
    }
}

#[async_trait]
impl<P> ChainClient for Provider<P>
where
    P: JsonRpcClient + 'static,
{
    async fn suggest_gas_price(&self, cancel: &CancellationToken) -> Result<U256, ClientError> {
        cancellable(cancel, METHOD_GAS_PRICE, self.get_gas_price()).await
    }

    async fn suggest_gas_tip_cap(
        &self,
        cancel: &CancellationToken,
    ) -> Result<U256, ClientError> {
        cancellable(
            cancel,
            METHOD_MAX_PRIORITY_FEE,
            self.request::<_, U256>(METHOD_MAX_PRIORITY_FEE, ()),
        )
        .await
    }

    async fn estimate_gas(
        &self,
        cancel: &CancellationToken,
        msg: &CallMsg,
    ) -> Result<u64, ClientError> {
        let tx = to_typed_transaction(msg);
        let gas = cancellable(
            cancel,
            METHOD_ESTIMATE_GAS,
            Middleware::estimate_gas(self, &tx, None),
        )
        .await?;

        if gas > U256::from(u64::MAX) {
            return Err(ClientError::InvalidResponse {
                method: METHOD_ESTIMATE_GAS,
                reason: format!("gas estimate {} does not fit in u64", gas),
            });
        }
        Ok(gas.as_u64())
    }
}

async fn cancellable<T, F>(
    cancel: &CancellationToken,
    method: &'static str,
    request: F,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(ClientError::Cancelled { method }),
        result = request => result.map_err(|e| ClientError::rpc(method, e)),
    }
}

/// Build the `eth_estimateGas` payload. The envelope follows whichever price
/// fields are set on the message.
pub fn to_typed_transaction(msg: &CallMsg) -> TypedTransaction {
    if msg.gas_tip_cap.is_some() || msg.gas_fee_cap.is_some() {
        let mut tx = Eip1559TransactionRequest::new()
            .from(msg.from)
            .value(msg.value)
            .data(msg.data.clone());
        if let Some(to) = msg.to {
            tx = tx.to(to);
        }
        tx.max_priority_fee_per_gas = msg.gas_tip_cap;
        tx.max_fee_per_gas = msg.gas_fee_cap;
        tx.into()
    } else {
        let mut tx = TransactionRequest::new()
            .from(msg.from)
            .value(msg.value)
            .data(msg.data.clone());
        if let Some(to) = msg.to {
            tx = tx.to(to);
        }
        tx.gas_price = msg.gas_price;
        tx.into()
    }
}
