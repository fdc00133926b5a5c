//! # Fee Types
//!
//! Inputs and outputs of fee estimation: the call being priced, the
//! simulation descriptor sent to the node, and the resulting [`FeeData`].

use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee model a transaction is priced under.
///
/// Serialized with the sender's tx type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FeeModel {
    /// Single uniform gas price.
    #[serde(rename = "LegacyTx")]
    Legacy,
    /// Priority tip plus fee cap.
    #[default]
    #[serde(rename = "DynamicFeeTx")]
    DynamicFee,
}

impl fmt::Display for FeeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeModel::Legacy => write!(f, "LegacyTx"),
            FeeModel::DynamicFee => write!(f, "DynamicFeeTx"),
        }
    }
}

/// Sender identity attached to an estimation. Only used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthContext {
    pub from: Address,
    pub nonce: Option<u64>,
}

impl AuthContext {
    pub fn new(from: Address) -> Self {
        Self { from, nonce: None }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// A pending contract call waiting for fee parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallRequest {
    pub auth: AuthContext,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    /// Gas limit used when simulation fails. Zero disables the fallback.
    pub fallback_gas_limit: u64,
}

impl CallRequest {
    pub fn new(auth: AuthContext, to: Option<Address>, data: Bytes) -> Self {
        Self {
            auth,
            to,
            value: U256::zero(),
            data,
            fallback_gas_limit: 0,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_fallback_gas_limit(mut self, fallback_gas_limit: u64) -> Self {
        self.fallback_gas_limit = fallback_gas_limit;
        self
    }
}

/// Call descriptor handed to the node for gas simulation.
///
/// Either `gas_price` or the `gas_tip_cap`/`gas_fee_cap` pair is set, the
/// unused fields stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallMsg {
    pub from: Address,
    pub to: Option<Address>,
    pub gas_price: Option<U256>,
    pub gas_tip_cap: Option<U256>,
    pub gas_fee_cap: Option<U256>,
    pub value: U256,
    pub data: Bytes,
}

/// Price component of a [`FeeData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePricing {
    Legacy { gas_price: U256 },
    Dynamic { gas_tip_cap: U256, gas_fee_cap: U256 },
}

/// Where the gas limit of a [`FeeData`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimitSource {
    /// Node simulation plus the safety margin.
    Estimated,
    /// Caller-supplied fallback after simulation failed.
    Fallback,
}

/// Fee parameters for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeData {
    pricing: FeePricing,
    gas_limit: u64,
    gas_limit_source: GasLimitSource,
}

impl FeeData {
    pub(crate) fn legacy(gas_price: U256, gas_limit: u64, source: GasLimitSource) -> Self {
        Self {
            pricing: FeePricing::Legacy { gas_price },
            gas_limit,
            gas_limit_source: source,
        }
    }

    pub(crate) fn dynamic(
        gas_tip_cap: U256,
        gas_fee_cap: U256,
        gas_limit: u64,
        source: GasLimitSource,
    ) -> Self {
        Self {
            pricing: FeePricing::Dynamic {
                gas_tip_cap,
                gas_fee_cap,
            },
            gas_limit,
            gas_limit_source: source,
        }
    }

    pub fn pricing(&self) -> FeePricing {
        self.pricing
    }

    pub fn fee_model(&self) -> FeeModel {
        match self.pricing {
            FeePricing::Legacy { .. } => FeeModel::Legacy,
            FeePricing::Dynamic { .. } => FeeModel::DynamicFee,
        }
    }

    pub fn gas_price(&self) -> Option<U256> {
        match self.pricing {
            FeePricing::Legacy { gas_price } => Some(gas_price),
            FeePricing::Dynamic { .. } => None,
        }
    }

    pub fn gas_tip_cap(&self) -> Option<U256> {
        match self.pricing {
            FeePricing::Legacy { .. } => None,
            FeePricing::Dynamic { gas_tip_cap, .. } => Some(gas_tip_cap),
        }
    }

    pub fn gas_fee_cap(&self) -> Option<U256> {
        match self.pricing {
            FeePricing::Legacy { .. } => None,
            FeePricing::Dynamic { gas_fee_cap, .. } => Some(gas_fee_cap),
        }
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_limit_source(&self) -> GasLimitSource {
        self.gas_limit_source
    }

    pub fn used_fallback(&self) -> bool {
        self.gas_limit_source == GasLimitSource::Fallback
    }
}
