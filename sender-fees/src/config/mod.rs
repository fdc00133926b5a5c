//! # Fee Configuration
//!
//! Sender-side settings read from TOML:
//!
//! ```toml
//! endpoint = "http://localhost:8545"
//! tx_type = "DynamicFeeTx"
//! fallback_gas_limit = 0
//! ```

use crate::error::ConfigError;
use crate::types::FeeModel;
use serde::Deserialize;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeConfig {
    /// JSON-RPC endpoint of the chain node.
    pub endpoint: String,
    /// Fee model the sender prices transactions with.
    pub tx_type: FeeModel,
    /// Default fallback gas limit; zero disables the fallback.
    pub fallback_gas_limit: u64,
}

impl FeeConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            tx_type: FeeModel::default(),
            fallback_gas_limit: 0,
        }
    }

    pub fn with_tx_type(mut self, tx_type: FeeModel) -> Self {
        self.tx_type = tx_type;
        self
    }

    pub fn with_fallback_gas_limit(mut self, fallback_gas_limit: u64) -> Self {
        self.fallback_gas_limit = fallback_gas_limit;
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<inline>")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: display });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: display.clone(),
            msg: e.to_string(),
        })?;

        Self::parse(&contents, &display)
    }

    fn parse(contents: &str, source: &str) -> Result<Self, ConfigError> {
        let raw: FeeConfigToml = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: source.to_string(),
            reason: e.to_string(),
        })?;

        let config = Self::try_from(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|_| ConfigError::InvalidRpcUrl {
            url: self.endpoint.clone(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                reason: format!("unsupported scheme '{}', expected http or https", other),
            }),
        }
    }
}

/// Deserialize helper for FeeConfig from TOML
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeeConfigToml {
    pub endpoint: Option<String>,
    pub tx_type: Option<FeeModel>,
    pub fallback_gas_limit: Option<u64>,
}

impl TryFrom<FeeConfigToml> for FeeConfig {
    type Error = ConfigError;

    fn try_from(toml: FeeConfigToml) -> Result<Self, Self::Error> {
        let endpoint = toml
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: "endpoint".to_string(),
            })?;

        Ok(Self {
            endpoint,
            tx_type: toml.tx_type.unwrap_or_default(),
            fallback_gas_limit: toml.fallback_gas_limit.unwrap_or(0),
        })
    }
}
