//! # Error Types
//!
//! Centralized error definitions for the sender-fees crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Parse error in {path}: {reason}")]
    ParseError { path: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Errors reported by a chain node client.
///
/// Produced by [`ChainClient`](crate::ChainClient) implementations and handed
/// back to the caller of a fee strategy exactly as the client returned them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("RPC call {method} failed: {reason}")]
    Rpc { method: &'static str, reason: String },

    #[error("Invalid response to {method}: {reason}")]
    InvalidResponse { method: &'static str, reason: String },

    #[error("RPC call {method} cancelled")]
    Cancelled { method: &'static str },
}

impl ClientError {
    pub fn rpc(method: &'static str, reason: impl ToString) -> Self {
        ClientError::Rpc {
            method,
            reason: reason.to_string(),
        }
    }

    /// Name of the JSON-RPC method that failed.
    pub fn method(&self) -> &'static str {
        match self {
            ClientError::Rpc { method, .. }
            | ClientError::InvalidResponse { method, .. }
            | ClientError::Cancelled { method } => method,
        }
    }
}
