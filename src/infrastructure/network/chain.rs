// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

//! Ledger view consumed by the replication engine.
//!
//! The engine never talks to alloy directly; it sees blocks, transactions and
//! receipts through [`ChainClient`]. [`super::rpc_client::RpcChainClient`] is the
//! production implementation, tests drive the engine with an in-memory chain.

use crate::common::error::AppError;
use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

/// A transaction as seen inside a mined block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerTx {
    pub hash: B256,
    /// Position inside the block.
    pub index: usize,
    /// `None` for contract creation.
    pub to: Option<Address>,
    /// Sender reported by the node alongside the block, when it carried one.
    pub sender: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerBlock {
    pub number: u64,
    pub hash: B256,
    pub transactions: Vec<LedgerTx>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub logs: Vec<LedgerLog>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn current_height(&self) -> Result<u64, AppError>;

    async fn block_by_height(&self, height: u64) -> Result<LedgerBlock, AppError>;

    /// Resolve the signer of `tx`, located at `index` in block `block_hash`.
    async fn sender_of(
        &self,
        tx: &LedgerTx,
        block_hash: B256,
        index: usize,
    ) -> Result<Address, AppError>;

    /// `Ok(None)` when the node does not know the transaction yet.
    async fn receipt_of(&self, tx_hash: B256) -> Result<Option<LedgerReceipt>, AppError>;

    async fn balance_of(&self, address: Address) -> Result<U256, AppError>;

    async fn pending_nonce_of(&self, address: Address) -> Result<u64, AppError>;

    async fn network_id(&self) -> Result<u64, AppError>;

    /// Read-only contract call against the latest state.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError>;

    /// Broadcast an EIP-2718 encoded signed transaction, returning its hash.
    async fn broadcast(&self, raw: Bytes) -> Result<B256, AppError>;
}
