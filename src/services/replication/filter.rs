// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::network::chain::{ChainClient, LedgerBlock, LedgerTx};
use crate::services::replication::dedup::DedupLedger;
use alloy::primitives::Address;

/// Picks the master's router calls out of a block.
#[derive(Clone, Copy, Debug)]
pub struct SwapFilter {
    master: Address,
    router: Address,
}

impl SwapFilter {
    pub fn new(master: Address, router: Address) -> Self {
        Self { master, router }
    }

    /// Transactions in `block` sent by the master to the router, in block order.
    ///
    /// Already-processed hashes and non-router destinations are dropped before
    /// the sender is resolved, so they never cost an RPC round trip.
    pub async fn candidates<'b, C>(
        &self,
        client: &C,
        block: &'b LedgerBlock,
        dedup: &DedupLedger,
    ) -> Vec<&'b LedgerTx>
    where
        C: ChainClient + ?Sized,
    {
        let mut matches = Vec::new();
        for tx in &block.transactions {
            if dedup.is_processed(&tx.hash) {
                tracing::trace!(target: "filter", tx = %tx.hash, "Already processed");
                continue;
            }
            if tx.to != Some(self.router) {
                continue;
            }
            match client.sender_of(tx, block.hash, tx.index).await {
                Ok(sender) if sender == self.master => matches.push(tx),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        target: "filter",
                        block = block.number,
                        tx = %tx.hash,
                        error = %e,
                        "Sender not resolvable; skipping"
                    );
                }
            }
        }
        matches
    }
}
