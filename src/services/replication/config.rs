// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::constants::{
    DEFAULT_APPROVAL_GAS_LIMIT, DEFAULT_APPROVAL_PAUSE_MS, DEFAULT_DEADLINE_SECS,
    DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_GWEI, DEFAULT_MAX_BLOCKS_PER_PASS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SLIPPAGE_PERCENT, WBNB_BSC, WEI_PER_GWEI,
};
use crate::common::error::AppError;
use crate::services::replication::sizing::CopyPercentage;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::collections::HashSet;
use std::time::Duration;

/// What to do when an approval receipt does not show up in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutAction {
    Proceed,
    Abort,
}

/// How long to hold the swap back after broadcasting an approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalWait {
    /// Sleep a fixed interval and assume the approval landed.
    Fixed(Duration),
    /// Poll the approval receipt until it appears or `timeout` elapses.
    Receipt {
        poll: Duration,
        timeout: Duration,
        on_timeout: TimeoutAction,
    },
}

/// When a filtered master transaction is recorded in the dedup ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DedupPolicy {
    /// After any processing attempt, including undecodable calls.
    MarkAlways,
    /// Only once the call decoded into a swap intent.
    MarkOnDecode,
}

/// Immutable engine settings, fully resolved before the engine starts.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub master: Address,
    pub follower: PrivateKeySigner,
    pub router: Address,
    pub wrapped_native: Address,
    pub copy_percentage: CopyPercentage,
    pub gas_price_wei: u128,
    pub gas_limit: u64,
    pub approval_gas_limit: u64,
    pub testnet: bool,
    pub poll_interval: Duration,
    pub max_blocks_per_pass: u64,
    pub slippage_percent: u64,
    pub deadline: Duration,
    pub approval_wait: ApprovalWait,
    pub dedup_policy: DedupPolicy,
    pub require_swap_event: bool,
    /// Empty means every token is replicated.
    pub token_allowlist: HashSet<Address>,
    pub dry_run: bool,
}

impl EngineConfig {
    /// Config with the stock BSC defaults for everything but the identities.
    pub fn new(master: Address, follower: PrivateKeySigner, router: Address) -> Self {
        Self {
            master,
            follower,
            router,
            wrapped_native: WBNB_BSC,
            copy_percentage: CopyPercentage::FULL,
            gas_price_wei: (DEFAULT_GAS_PRICE_GWEI as u128) * WEI_PER_GWEI,
            gas_limit: DEFAULT_GAS_LIMIT,
            approval_gas_limit: DEFAULT_APPROVAL_GAS_LIMIT,
            testnet: false,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_blocks_per_pass: DEFAULT_MAX_BLOCKS_PER_PASS,
            slippage_percent: DEFAULT_SLIPPAGE_PERCENT,
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
            approval_wait: ApprovalWait::Fixed(Duration::from_millis(DEFAULT_APPROVAL_PAUSE_MS)),
            dedup_policy: DedupPolicy::MarkAlways,
            require_swap_event: true,
            token_allowlist: HashSet::new(),
            dry_run: false,
        }
    }

    pub fn follower_address(&self) -> Address {
        self.follower.address()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.master == Address::ZERO {
            return Err(invalid("master", "master address must be set"));
        }
        if self.router == Address::ZERO {
            return Err(invalid("router", "router address must be set"));
        }
        if self.master == self.follower_address() {
            return Err(invalid("follower", "follower must differ from master"));
        }
        if self.slippage_percent >= 100 {
            return Err(invalid("slippage_percent", "must be below 100"));
        }
        if self.max_blocks_per_pass == 0 {
            return Err(invalid("max_blocks_per_pass", "must be at least 1"));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("poll_interval", "must be positive"));
        }
        if self.gas_limit == 0 || self.approval_gas_limit == 0 {
            return Err(invalid("gas_limit", "gas limits must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
