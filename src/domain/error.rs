// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

/// Failure causes observed at the wallet/ledger bridge boundary.
///
/// Kept distinct so callers can tell a missing wallet apart from a rejected
/// prompt or a flaky RPC endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Request rejected by user")]
    UserRejected,

    #[error("{method} reverted: {reason}")]
    Reverted { method: &'static str, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out waiting for {method}")]
    Timeout { method: &'static str },

    #[error("Unexpected output from {method}: expected {expected}")]
    UnexpectedOutput {
        method: &'static str,
        expected: &'static str,
    },

    #[error("Failed to decode {method} result: {reason}")]
    Decode { method: &'static str, reason: String },

    #[error("{method} is not supported as a {kind}")]
    Unsupported {
        method: &'static str,
        kind: &'static str,
    },
}

impl BridgeError {
    /// Whether retrying the same read could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::Network(_) | BridgeError::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Address {0} is invalid")]
    InvalidAddress(String),

    #[error("Vault {vault_id} not found")]
    VaultNotFound { vault_id: String },

    #[error("Total allocation would exceed 100% ({projected_bps} > {cap_bps} bps)")]
    AllocationCapExceeded { projected_bps: u64, cap_bps: u64 },

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
