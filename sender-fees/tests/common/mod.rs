#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use sender_fees::client::{METHOD_ESTIMATE_GAS, METHOD_GAS_PRICE, METHOD_MAX_PRIORITY_FEE};
use sender_fees::{AuthContext, CallMsg, ChainClient, ClientError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Chain client returning scripted results and recording every simulation.
pub struct MockChainClient {
    gas_price: Result<U256, ClientError>,
    gas_tip_cap: Result<U256, ClientError>,
    estimate: Result<u64, ClientError>,
    price_calls: AtomicUsize,
    tip_calls: AtomicUsize,
    estimate_calls: Mutex<Vec<CallMsg>>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            gas_price: Ok(U256::from(1_000_000_000u64)),
            gas_tip_cap: Ok(U256::from(2u64)),
            estimate: Ok(100_000),
            price_calls: AtomicUsize::new(0),
            tip_calls: AtomicUsize::new(0),
            estimate_calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = Ok(U256::from(gas_price));
        self
    }

    pub fn with_gas_tip_cap(mut self, gas_tip_cap: u64) -> Self {
        self.gas_tip_cap = Ok(U256::from(gas_tip_cap));
        self
    }

    pub fn with_estimate(mut self, raw: u64) -> Self {
        self.estimate = Ok(raw);
        self
    }

    pub fn failing_gas_price(mut self) -> Self {
        self.gas_price = Err(price_error());
        self
    }

    pub fn failing_gas_tip_cap(mut self) -> Self {
        self.gas_tip_cap = Err(tip_error());
        self
    }

    pub fn failing_estimate(mut self) -> Self {
        self.estimate = Err(estimate_error());
        self
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn tip_calls(&self) -> usize {
        self.tip_calls.load(Ordering::SeqCst)
    }

    pub fn estimate_calls(&self) -> Vec<CallMsg> {
        self.estimate_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn suggest_gas_price(&self, cancel: &CancellationToken) -> Result<U256, ClientError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled {
                method: METHOD_GAS_PRICE,
            });
        }
        self.gas_price.clone()
    }

    async fn suggest_gas_tip_cap(
        &self,
        cancel: &CancellationToken,
    ) -> Result<U256, ClientError> {
        self.tip_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled {
                method: METHOD_MAX_PRIORITY_FEE,
            });
        }
        self.gas_tip_cap.clone()
    }

    async fn estimate_gas(
        &self,
        cancel: &CancellationToken,
        msg: &CallMsg,
    ) -> Result<u64, ClientError> {
        self.estimate_calls.lock().unwrap().push(msg.clone());
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled {
                method: METHOD_ESTIMATE_GAS,
            });
        }
        self.estimate.clone()
    }
}

pub fn price_error() -> ClientError {
    ClientError::rpc(METHOD_GAS_PRICE, "connection refused")
}

pub fn tip_error() -> ClientError {
    ClientError::rpc(METHOD_MAX_PRIORITY_FEE, "method not found")
}

pub fn estimate_error() -> ClientError {
    ClientError::rpc(METHOD_ESTIMATE_GAS, "execution reverted")
}

pub fn sender() -> AuthContext {
    AuthContext::new(Address::repeat_byte(0xaa)).with_nonce(7)
}

pub fn target() -> Option<Address> {
    Some(Address::repeat_byte(0xbb))
}

pub fn payload() -> Bytes {
    Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb])
}
