//! # Sender Fees - Fee Estimation for the Rollup Transaction Sender
//!
//! Decides the fee parameters and gas limit attached to a contract call
//! before the sender signs and broadcasts it.
//!
//! ## Modules
//!
//! - [`base_fee`] - Shared base fee snapshot and the accessor trait
//! - [`client`] - Chain node capabilities and the `ethers` provider binding
//! - [`config`] - TOML configuration for the sender's fee settings
//! - [`error`] - Typed error handling with thiserror
//! - [`estimator`] - Legacy and dynamic fee strategies, gas limit estimation
//! - [`metrics`] - Estimation outcome counters
//! - [`types`] - Call requests and fee quotes

pub mod base_fee;
pub mod client;
pub mod config;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod types;
pub(crate) mod utils;

pub use base_fee::{BaseFeeSource, BaseFeeTracker};
pub use client::ChainClient;
pub use config::FeeConfig;
pub use error::{ClientError, ConfigError};
pub use estimator::{apply_gas_margin, fee_cap, FeeEstimator};
pub use metrics::{EstimationSnapshot, EstimationStats};
pub use types::{
    AuthContext, CallMsg, CallRequest, FeeData, FeeModel, FeePricing, GasLimitSource,
};

pub use utils::{setup_logger, setup_logger_in, setup_logger_with_file};
