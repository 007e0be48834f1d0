// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// Common assets
pub const WBNB_BSC: Address = address!("BB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
pub const PANCAKE_V2_ROUTER_BSC: Address = address!("10ED43C718714eb63d5aA57B78B54704E256024E");

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_BSC: u64 = 56;
pub const CHAIN_BSC_TESTNET: u64 = 97;

pub const DEFAULT_MAINNET_RPC: &str = "https://bsc-dataseed1.binance.org";
pub const DEFAULT_TESTNET_RPC: &str = "https://data-seed-prebsc-1-s1.binance.org:8545";

pub fn network_name(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_BSC => "bsc",
        CHAIN_BSC_TESTNET => "bsc-testnet",
        _ => "unknown",
    }
}

// =============================================================================
// SCHEDULER CONSTANTS
// =============================================================================

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_MAX_BLOCKS_PER_PASS: u64 = 10;

// =============================================================================
// GAS & TRANSACTION CONSTANTS
// =============================================================================

pub const WEI_PER_GWEI: u128 = 1_000_000_000;
pub const DEFAULT_GAS_PRICE_GWEI: f64 = 5.0;
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
pub const DEFAULT_APPROVAL_GAS_LIMIT: u64 = 50_000;

// =============================================================================
// REPLICATION CONSTANTS
// =============================================================================

pub const DEFAULT_COPY_PERCENTAGE: f64 = 100.0;
pub const DEFAULT_SLIPPAGE_PERCENT: u64 = 5;
/// Replica deadline offset from submission time.
pub const DEFAULT_DEADLINE_SECS: u64 = 20 * 60;
pub const DEFAULT_APPROVAL_PAUSE_MS: u64 = 3_000;
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 500;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 12_000;
