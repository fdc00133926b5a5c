//! # Fee Estimator
//!
//! Prices a pending call under the legacy or the dynamic fee model and sizes
//! its gas limit from a node simulation.
//!
//! Failure policy:
//! - a failed price or tip suggestion is returned as is, there is nothing to
//!   fall back to;
//! - a failed limit estimation is returned as is when the caller's fallback
//!   gas limit is zero, otherwise the fallback becomes the limit.
//!
//! Node calls are never retried and node errors are never rewrapped.

use crate::base_fee::{BaseFeeSource, BaseFeeTracker};
use crate::client::ChainClient;
use crate::config::FeeConfig;
use crate::error::{ClientError, ConfigError};
use crate::metrics::EstimationStats;
use crate::types::{AuthContext, CallMsg, CallRequest, FeeData, FeeModel, GasLimitSource};
use ethers::providers::{Http, Provider};
use ethers::types::{Address, Bytes, U256};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Safety margin applied to simulated gas: `raw * 12 / 10`.
pub const GAS_LIMIT_MARGIN_NUMERATOR: u128 = 12;
pub const GAS_LIMIT_MARGIN_DENOMINATOR: u128 = 10;

/// Multiplier applied to the base fee when deriving the fee cap.
pub const BASE_FEE_MULTIPLIER: u64 = 2;

/// Pads a raw gas estimate by 20%, rounding down.
pub fn apply_gas_margin(raw_estimate: u64) -> u64 {
    let padded =
        u128::from(raw_estimate) * GAS_LIMIT_MARGIN_NUMERATOR / GAS_LIMIT_MARGIN_DENOMINATOR;
    u64::try_from(padded).unwrap_or(u64::MAX)
}

/// `tip + 2 * base_fee`. A zero base fee leaves the tip as the cap.
pub fn fee_cap(gas_tip_cap: U256, base_fee_per_gas: u64) -> U256 {
    let base_fee = U256::from(base_fee_per_gas) * U256::from(BASE_FEE_MULTIPLIER);
    gas_tip_cap.saturating_add(base_fee)
}

#[derive(Debug)]
pub struct FeeEstimator<C, B = BaseFeeTracker> {
    client: C,
    base_fee: B,
    cancel: CancellationToken,
    stats: Arc<EstimationStats>,
    fee_model: FeeModel,
    fallback_gas_limit: u64,
}

impl<B: BaseFeeSource> FeeEstimator<Provider<Http>, B> {
    /// Estimator backed by an HTTP JSON-RPC provider at `config.endpoint`,
    /// defaulting to the configured tx type and fallback gas limit.
    pub fn connect(config: &FeeConfig, base_fee: B) -> Result<Self, ConfigError> {
        config.validate()?;
        let provider = Provider::<Http>::try_from(config.endpoint.as_str()).map_err(|_| {
            ConfigError::InvalidRpcUrl {
                url: config.endpoint.clone(),
            }
        })?;
        Ok(Self::new(provider, base_fee)
            .with_fee_model(config.tx_type)
            .with_fallback_gas_limit(config.fallback_gas_limit))
    }
}

impl<C, B> FeeEstimator<C, B>
where
    C: ChainClient,
    B: BaseFeeSource,
{
    pub fn new(client: C, base_fee: B) -> Self {
        Self {
            client,
            base_fee,
            cancel: CancellationToken::new(),
            stats: Arc::new(EstimationStats::default()),
            fee_model: FeeModel::default(),
            fallback_gas_limit: 0,
        }
    }

    /// Fee model used by [`estimate_configured_fee`](Self::estimate_configured_fee).
    pub fn with_fee_model(mut self, fee_model: FeeModel) -> Self {
        self.fee_model = fee_model;
        self
    }

    /// Fallback used by [`estimate_fee`](Self::estimate_fee) when the request
    /// carries none. Zero disables it.
    pub fn with_fallback_gas_limit(mut self, fallback_gas_limit: u64) -> Self {
        self.fallback_gas_limit = fallback_gas_limit;
        self
    }

    pub fn fee_model(&self) -> FeeModel {
        self.fee_model
    }

    pub fn fallback_gas_limit(&self) -> u64 {
        self.fallback_gas_limit
    }

    /// Token passed to every node call made by this estimator.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_stats(mut self, stats: Arc<EstimationStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn stats(&self) -> &Arc<EstimationStats> {
        &self.stats
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Estimate fees with the strategy for `model`.
    ///
    /// A request without its own fallback gas limit gets the estimator's.
    pub async fn estimate_fee(
        &self,
        model: FeeModel,
        call: &CallRequest,
    ) -> Result<FeeData, ClientError> {
        let fallback_gas_limit = match call.fallback_gas_limit {
            0 => self.fallback_gas_limit,
            limit => limit,
        };

        match model {
            FeeModel::Legacy => {
                self.estimate_legacy_fee(
                    &call.auth,
                    call.to,
                    call.value,
                    call.data.clone(),
                    fallback_gas_limit,
                )
                .await
            }
            FeeModel::DynamicFee => {
                self.estimate_dynamic_fee(
                    &call.auth,
                    call.to,
                    call.value,
                    call.data.clone(),
                    fallback_gas_limit,
                )
                .await
            }
        }
    }

    /// [`estimate_fee`](Self::estimate_fee) with the configured fee model.
    pub async fn estimate_configured_fee(
        &self,
        call: &CallRequest,
    ) -> Result<FeeData, ClientError> {
        self.estimate_fee(self.fee_model, call).await
    }

    /// Single gas price plus estimated limit.
    pub async fn estimate_legacy_fee(
        &self,
        auth: &AuthContext,
        to: Option<Address>,
        value: U256,
        data: Bytes,
        fallback_gas_limit: u64,
    ) -> Result<FeeData, ClientError> {
        let gas_price = match self.client.suggest_gas_price(&self.cancel).await {
            Ok(gas_price) => gas_price,
            Err(err) => {
                self.stats.record_price_failure();
                error!(error = %err, "estimate_legacy_fee suggest_gas_price failure");
                return Err(err);
            }
        };

        let msg = CallMsg {
            from: auth.from,
            to,
            gas_price: Some(gas_price),
            gas_tip_cap: None,
            gas_fee_cap: None,
            value,
            data,
        };

        let (gas_limit, source) = match self.estimate_gas_limit(&msg).await {
            Ok(gas_limit) => (gas_limit, GasLimitSource::Estimated),
            Err(err) => {
                error!(
                    gas_price = %gas_price,
                    from = ?auth.from,
                    nonce = ?auth.nonce,
                    to = ?to,
                    fallback_gas_limit,
                    error = %err,
                    "estimate_legacy_fee estimate_gas_limit failure"
                );
                self.fall_back(fallback_gas_limit, err)?
            }
        };

        let fee = FeeData::legacy(gas_price, gas_limit, source);
        self.record_quote(&fee);
        Ok(fee)
    }

    /// Tip cap, fee cap derived from the base fee snapshot, and estimated limit.
    pub async fn estimate_dynamic_fee(
        &self,
        auth: &AuthContext,
        to: Option<Address>,
        value: U256,
        data: Bytes,
        fallback_gas_limit: u64,
    ) -> Result<FeeData, ClientError> {
        let gas_tip_cap = match self.client.suggest_gas_tip_cap(&self.cancel).await {
            Ok(gas_tip_cap) => gas_tip_cap,
            Err(err) => {
                self.stats.record_price_failure();
                error!(error = %err, "estimate_dynamic_fee suggest_gas_tip_cap failure");
                return Err(err);
            }
        };

        let base_fee_per_gas = self.base_fee.base_fee_per_gas();
        let gas_fee_cap = fee_cap(gas_tip_cap, base_fee_per_gas);

        let msg = CallMsg {
            from: auth.from,
            to,
            gas_price: None,
            gas_tip_cap: Some(gas_tip_cap),
            gas_fee_cap: Some(gas_fee_cap),
            value,
            data,
        };

        let (gas_limit, source) = match self.estimate_gas_limit(&msg).await {
            Ok(gas_limit) => (gas_limit, GasLimitSource::Estimated),
            Err(err) => {
                error!(
                    from = ?auth.from,
                    nonce = ?auth.nonce,
                    to = ?to,
                    fallback_gas_limit,
                    error = %err,
                    "estimate_dynamic_fee estimate_gas_limit failure"
                );
                self.fall_back(fallback_gas_limit, err)?
            }
        };

        let fee = FeeData::dynamic(gas_tip_cap, gas_fee_cap, gas_limit, source);
        self.record_quote(&fee);
        Ok(fee)
    }

    /// Simulate `msg` once and pad the result with the 20% margin.
    pub async fn estimate_gas_limit(&self, msg: &CallMsg) -> Result<u64, ClientError> {
        match self.client.estimate_gas(&self.cancel, msg).await {
            Ok(raw) => Ok(apply_gas_margin(raw)),
            Err(err) => {
                error!(
                    from = ?msg.from,
                    to = ?msg.to,
                    gas_price = ?msg.gas_price,
                    gas_tip_cap = ?msg.gas_tip_cap,
                    gas_fee_cap = ?msg.gas_fee_cap,
                    error = %err,
                    "estimate_gas_limit estimate_gas failure"
                );
                Err(err)
            }
        }
    }

    fn fall_back(
        &self,
        fallback_gas_limit: u64,
        err: ClientError,
    ) -> Result<(u64, GasLimitSource), ClientError> {
        self.stats.record_limit_failure();
        match fallback_gas_limit {
            0 => Err(err),
            limit => Ok((limit, GasLimitSource::Fallback)),
        }
    }

    fn record_quote(&self, fee: &FeeData) {
        match fee.gas_limit_source() {
            GasLimitSource::Estimated => self.stats.record_estimated(),
            GasLimitSource::Fallback => self.stats.record_fallback(),
        }
        debug!(
            fee_model = %fee.fee_model(),
            gas_price = ?fee.gas_price(),
            gas_tip_cap = ?fee.gas_tip_cap(),
            gas_fee_cap = ?fee.gas_fee_cap(),
            gas_limit = fee.gas_limit(),
            fallback = fee.used_fallback(),
            "fee estimated"
        );
    }
}
