// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::constants::{CHAIN_BSC, CHAIN_BSC_TESTNET, network_name};
use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::common::time_utils::current_unix;
use crate::network::chain::{ChainClient, LedgerReceipt, LedgerTx};
use crate::services::replication::config::{DedupPolicy, EngineConfig};
use crate::services::replication::cursor::LedgerCursor;
use crate::services::replication::decode::SwapDecoder;
use crate::services::replication::dedup::DedupLedger;
use crate::services::replication::filter::SwapFilter;
use crate::services::replication::intent::SwapIntent;
use crate::services::replication::routers::UniV2Pair;
use crate::services::replication::sizing::ReplicaSizer;
use crate::services::replication::stats::ReplicationStats;
use crate::services::replication::submitter::ReplicaSubmitter;
use alloy::primitives::B256;
use alloy::primitives::utils::format_ether;
use alloy_sol_types::SolEvent;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

const BOOTSTRAP_ATTEMPTS: usize = 3;
const BOOTSTRAP_BACKOFF: Duration = Duration::from_millis(250);

/// Result of handling one filtered master transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Receipt missing, unreadable, reverted, or without a pair swap.
    Unconfirmed,
    Undecodable,
    /// Decoded, but no path token is on the allowlist.
    NotAllowlisted,
    Abandoned,
    Failed,
    Submitted(B256),
}

impl Outcome {
    fn decoded(self) -> bool {
        !matches!(self, Outcome::Unconfirmed | Outcome::Undecodable)
    }
}

/// Single-flight scan and replicate loop.
pub struct CopyEngine<C: ChainClient> {
    client: Arc<C>,
    config: EngineConfig,
    cursor: LedgerCursor,
    dedup: DedupLedger,
    filter: SwapFilter,
    decoder: SwapDecoder,
    sizer: ReplicaSizer,
    submitter: ReplicaSubmitter,
    stats: ReplicationStats,
    shutdown: CancellationToken,
}

impl<C: ChainClient> CopyEngine<C> {
    pub fn new(
        client: Arc<C>,
        config: EngineConfig,
        chain_id: u64,
        head: u64,
        shutdown: CancellationToken,
    ) -> Self {
        let follower = config.follower_address();
        Self {
            cursor: LedgerCursor::starting_at(head),
            dedup: DedupLedger::new(),
            filter: SwapFilter::new(config.master, config.router),
            decoder: SwapDecoder::new(config.wrapped_native),
            sizer: ReplicaSizer::new(
                config.master,
                follower,
                config.copy_percentage,
                config.slippage_percent,
                config.deadline,
            ),
            submitter: ReplicaSubmitter::new(&config, chain_id),
            stats: ReplicationStats::default(),
            client,
            config,
            shutdown,
        }
    }

    /// Validate config and read the chain head and id. Any failure here is fatal.
    pub async fn bootstrap(
        client: Arc<C>,
        config: EngineConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let rpc: &C = client.as_ref();
        let head = retry_async(
            "current_height",
            move |_| rpc.current_height(),
            BOOTSTRAP_ATTEMPTS,
            BOOTSTRAP_BACKOFF,
        )
        .await
        .map_err(|e| AppError::Initialization(format!("Failed to get latest block: {e}")))?;
        let chain_id = retry_async(
            "network_id",
            move |_| rpc.network_id(),
            BOOTSTRAP_ATTEMPTS,
            BOOTSTRAP_BACKOFF,
        )
        .await
        .map_err(|e| AppError::Initialization(format!("Failed to get chain id: {e}")))?;

        let expected = if config.testnet {
            CHAIN_BSC_TESTNET
        } else {
            CHAIN_BSC
        };
        if chain_id != expected {
            tracing::warn!(
                target: "engine",
                chain_id,
                expected,
                testnet = config.testnet,
                "Connected chain does not match the network flag"
            );
        }

        let follower = config.follower_address();
        match rpc.balance_of(follower).await {
            Ok(balance) => tracing::info!(
                target: "engine",
                follower = %follower,
                balance = %format_ether(balance),
                "Follower native balance"
            ),
            Err(e) => tracing::warn!(target: "engine", error = %e, "Follower balance unavailable"),
        }

        tracing::info!(
            target: "engine",
            network = network_name(chain_id),
            chain_id,
            head,
            master = %config.master,
            follower = %follower,
            router = %config.router,
            copy = %config.copy_percentage,
            allowlist = config.token_allowlist.len(),
            dry_run = config.dry_run,
            "Copy trading engine ready"
        );

        Ok(Self::new(client, config, chain_id, head, shutdown))
    }

    pub fn cursor(&self) -> &LedgerCursor {
        &self.cursor
    }

    pub fn dedup(&self) -> &DedupLedger {
        &self.dedup
    }

    pub fn stats(&self) -> &ReplicationStats {
        &self.stats
    }

    /// Tick every poll interval until shutdown is requested. A pass in flight
    /// always completes its current block before the loop exits.
    pub async fn run(mut self) -> Result<(), AppError> {
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if self.shutdown.is_cancelled() {
                break;
            }
            self.scan_pass().await;
        }

        tracing::info!(target: "engine", last_scanned = self.cursor.last_scanned(), "Shutting down");
        self.stats.log_summary("shutdown");
        Ok(())
    }

    /// One scheduler tick. Returns the blocks attempted, `None` when there was
    /// nothing new or the head could not be read.
    pub async fn scan_pass(&mut self) -> Option<RangeInclusive<u64>> {
        let head = match self.client.current_height().await {
            Ok(head) => head,
            Err(e) => {
                tracing::warn!(target: "scan", error = %e, "Error getting latest block");
                return None;
            }
        };
        let range = self
            .cursor
            .next_range(head, self.config.max_blocks_per_pass)?;
        tracing::info!(
            target: "scan",
            from = *range.start(),
            to = *range.end(),
            head,
            "Scanning blocks"
        );

        let mut last_attempted = None;
        for height in range.clone() {
            if self.shutdown.is_cancelled() {
                tracing::info!(target: "scan", next = height, "Shutdown requested; ending pass early");
                break;
            }
            self.scan_block(height).await;
            last_attempted = Some(height);
        }

        self.stats.passes += 1;
        let last = last_attempted?;
        self.cursor.advance_to(last);
        tracing::debug!(target: "scan", stats = ?self.stats, "Pass complete");
        Some(*range.start()..=last)
    }

    async fn scan_block(&mut self, height: u64) {
        let block = match self.client.block_by_height(height).await {
            Ok(block) => block,
            Err(e) => {
                self.stats.block_errors += 1;
                tracing::warn!(target: "scan", block = height, error = %e, "Error getting block");
                return;
            }
        };
        self.stats.blocks_scanned += 1;

        let candidates = self
            .filter
            .candidates(self.client.as_ref(), &block, &self.dedup)
            .await;
        for tx in candidates {
            self.handle_candidate(block.number, tx).await;
        }
    }

    async fn handle_candidate(&mut self, block_number: u64, tx: &LedgerTx) {
        self.stats.candidates += 1;
        tracing::info!(target: "engine", block = block_number, tx = %tx.hash, "New swap detected from master wallet");

        let outcome = self.replicate(tx).await;
        let mark = match self.config.dedup_policy {
            DedupPolicy::MarkAlways => true,
            DedupPolicy::MarkOnDecode => outcome.decoded(),
        };
        if mark {
            self.dedup.mark_processed(tx.hash);
        }
        tracing::debug!(target: "engine", tx = %tx.hash, ?outcome, marked = mark, "Candidate handled");
    }

    async fn replicate(&mut self, tx: &LedgerTx) -> Outcome {
        if let Err(reason) = self.confirm_master_swap(tx).await {
            self.stats.unconfirmed += 1;
            tracing::warn!(target: "engine", tx = %tx.hash, %reason, "Master swap not confirmed; skipping");
            return Outcome::Unconfirmed;
        }

        let intent = match self.decoder.decode(&tx.input, tx.value) {
            Ok(intent) => intent,
            Err(e) => {
                self.stats.undecodable += 1;
                tracing::warn!(target: "decode", tx = %tx.hash, error = %e, "Skipping router call");
                return Outcome::Undecodable;
            }
        };
        tracing::info!(
            target: "decode",
            tx = %tx.hash,
            kind = %intent.kind(),
            path = ?intent.path(),
            attached_value = ?intent.attached_value(),
            "Swap method detected"
        );

        if !self.admits(&intent) {
            self.stats.filtered += 1;
            tracing::info!(target: "engine", tx = %tx.hash, "No path token on the allowlist; skipping");
            return Outcome::NotAllowlisted;
        }

        let order = match self
            .sizer
            .size(self.client.as_ref(), intent, current_unix())
            .await
        {
            Ok(order) => order,
            Err(reason) => {
                self.stats.abandoned += 1;
                tracing::warn!(target: "sizer", tx = %tx.hash, %reason, "Replica order abandoned");
                return Outcome::Abandoned;
            }
        };
        tracing::info!(
            target: "sizer",
            kind = %order.kind,
            amount_in = %order.amount_in,
            amount_in_native = %format_ether(order.amount_in),
            min_out = %order.amount_out_min,
            path = ?order.path,
            "Executing replica swap"
        );

        match self.submitter.submit(self.client.as_ref(), &order).await {
            Ok(hash) => {
                self.stats.submitted += 1;
                Outcome::Submitted(hash)
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!(target: "submit", source_tx = %tx.hash, error = %e, "Replica submission failed");
                Outcome::Failed
            }
        }
    }

    /// The master's receipt must exist and succeed; with `require_swap_event`
    /// it must also carry at least one pair `Swap` log. Multi-hop swaps emit
    /// several and are still replicated once.
    async fn confirm_master_swap(&self, tx: &LedgerTx) -> Result<usize, String> {
        let receipt: LedgerReceipt = self
            .client
            .receipt_of(tx.hash)
            .await
            .map_err(|e| format!("error getting receipt: {e}"))?
            .ok_or_else(|| "receipt not found".to_string())?;
        if !receipt.success {
            return Err("master transaction reverted".into());
        }

        let mut swaps = 0usize;
        for log in &receipt.logs {
            if log.topics.first() != Some(&UniV2Pair::Swap::SIGNATURE_HASH) {
                continue;
            }
            match UniV2Pair::Swap::decode_raw_log(log.topics.iter().copied(), &log.data) {
                Ok(swap) => {
                    swaps += 1;
                    tracing::debug!(
                        target: "engine",
                        pair = %log.address,
                        amount0_in = %swap.amount0In,
                        amount1_in = %swap.amount1In,
                        amount0_out = %swap.amount0Out,
                        amount1_out = %swap.amount1Out,
                        "Pair swap event"
                    );
                }
                Err(e) => {
                    tracing::debug!(target: "engine", pair = %log.address, error = %e, "Error unpacking swap event");
                }
            }
        }

        if swaps == 0 && self.config.require_swap_event {
            return Err("no pair Swap event in receipt".into());
        }
        Ok(swaps)
    }

    fn admits(&self, intent: &SwapIntent) -> bool {
        self.config.token_allowlist.is_empty()
            || intent
                .path()
                .iter()
                .any(|token| self.config.token_allowlist.contains(token))
    }
}
