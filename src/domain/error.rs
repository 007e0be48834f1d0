// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Transaction failed: {hash:?}, reason: {reason}")]
    Transaction { hash: String, reason: String },

    #[error("Replication error: {0}")]
    Replication(String),

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Address {0} is invalid or not checksummed")]
    InvalidAddress(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Why a router call could not be turned into a swap intent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("call data too short for a selector ({0} bytes)")]
    ShortInput(usize),

    #[error("unsupported router selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("malformed {function} arguments: {reason}")]
    Malformed {
        function: &'static str,
        reason: String,
    },

    #[error("{function} path has {len} token(s); at least two are required")]
    ShortPath { function: &'static str, len: usize },

    #[error("{function} native leg is {found:#x}, expected wrapped native {expected:#x}")]
    NativeLegMismatch {
        function: &'static str,
        expected: Address,
        found: Address,
    },
}

/// Reasons a sized replica order is dropped before submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Abandon {
    #[error("copy amount rounds to zero")]
    ZeroAmount,

    #[error("insufficient follower balance. Required: {required}, Available: {available}")]
    InsufficientFunds { required: U256, available: U256 },

    #[error("balance query failed: {0}")]
    BalanceQuery(String),
}
