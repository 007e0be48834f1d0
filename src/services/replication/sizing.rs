// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::Abandon;
use crate::common::time_utils::deadline_from;
use crate::network::chain::ChainClient;
use crate::services::replication::erc20::token_balance;
use crate::services::replication::intent::{ReplicaOrder, SwapIntent};
use alloy::primitives::{Address, U256};
use std::fmt;
use std::time::Duration;

const BPS_DENOM: u64 = 10_000;

/// Share of the master's trade the follower replicates, in basis points of a percent
/// (100% == 10_000). Always strictly positive; values above 100% are allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyPercentage {
    bps: u64,
}

impl CopyPercentage {
    pub const FULL: Self = Self { bps: BPS_DENOM };

    /// Percent with up to two decimals, e.g. `12.5`.
    pub fn from_percent(percent: f64) -> Option<Self> {
        if !percent.is_finite() || percent <= 0.0 {
            return None;
        }
        let bps = (percent * 100.0).round();
        if bps < 1.0 || bps >= u64::MAX as f64 {
            return None;
        }
        Some(Self { bps: bps as u64 })
    }

    pub fn from_whole(percent: u64) -> Option<Self> {
        let bps = percent.checked_mul(100)?;
        (bps > 0).then_some(Self { bps })
    }

    pub fn bps(&self) -> u64 {
        self.bps
    }

    /// `floor(amount * percent / 100)`, exact for any amount whose result fits.
    pub fn scale(&self, amount: U256) -> U256 {
        mul_div_floor(amount, self.bps, BPS_DENOM)
    }
}

impl fmt::Display for CopyPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.bps / 100, self.bps % 100)
    }
}

fn mul_div_floor(amount: U256, numerator: u64, denominator: u64) -> U256 {
    let num = U256::from(numerator);
    let den = U256::from(denominator);
    let whole = (amount / den).saturating_mul(num);
    let part = (amount % den) * num / den;
    whole.saturating_add(part)
}

/// Computes the follower's order from a master intent.
#[derive(Clone, Debug)]
pub struct ReplicaSizer {
    master: Address,
    follower: Address,
    copy: CopyPercentage,
    slippage_percent: u64,
    deadline_offset: Duration,
}

impl ReplicaSizer {
    pub fn new(
        master: Address,
        follower: Address,
        copy: CopyPercentage,
        slippage_percent: u64,
        deadline_offset: Duration,
    ) -> Self {
        Self {
            master,
            follower,
            copy,
            slippage_percent: slippage_percent.min(100),
            deadline_offset,
        }
    }

    pub fn copy_amount_in(&self, master_amount_in: U256) -> U256 {
        self.copy.scale(master_amount_in)
    }

    /// Scale first, then shave the slippage tolerance. Two separate floors.
    pub fn copy_amount_out_min(&self, master_amount_out_min: U256) -> U256 {
        let scaled = self.copy.scale(master_amount_out_min);
        mul_div_floor(scaled, 100 - self.slippage_percent, 100)
    }

    /// Size `intent` for the follower at wall-clock `now` (UNIX seconds).
    ///
    /// Native-input swaps are sized from the master's current native balance,
    /// not from the value attached to the master's transaction.
    pub async fn size<C>(
        &self,
        client: &C,
        intent: SwapIntent,
        now: u64,
    ) -> Result<ReplicaOrder, Abandon>
    where
        C: ChainClient + ?Sized,
    {
        let base = match intent.amount_in() {
            Some(amount) => amount,
            None => client
                .balance_of(self.master)
                .await
                .map_err(|e| Abandon::BalanceQuery(format!("master balance: {e}")))?,
        };

        let amount_in = self.copy_amount_in(base);
        if amount_in.is_zero() {
            return Err(Abandon::ZeroAmount);
        }

        let available = match intent.sold_token() {
            None => client.balance_of(self.follower).await,
            Some(token) => token_balance(client, token, self.follower).await,
        }
        .map_err(|e| Abandon::BalanceQuery(format!("follower balance: {e}")))?;
        if available < amount_in {
            return Err(Abandon::InsufficientFunds {
                required: amount_in,
                available,
            });
        }

        let kind = intent.kind();
        let amount_out_min = self.copy_amount_out_min(intent.amount_out_min());
        Ok(ReplicaOrder {
            kind,
            amount_in,
            amount_out_min,
            path: intent.into_path(),
            recipient: self.follower,
            deadline: U256::from(deadline_from(now, self.deadline_offset)),
        })
    }
}
