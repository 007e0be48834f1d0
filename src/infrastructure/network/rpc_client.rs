// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::network::chain::{ChainClient, LedgerBlock, LedgerLog, LedgerReceipt, LedgerTx};
use crate::network::provider::HttpProvider;
use alloy::consensus::Transaction as ConsensusTxTrait;
use alloy::network::TransactionResponse;
use alloy::primitives::{Address, B256, Bytes, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::BlockNumberOrTag;
use alloy::rpc::types::eth::{Transaction, TransactionInput, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

/// [`ChainClient`] backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: HttpProvider,
    rpc_timeout: Option<Duration>,
}

impl RpcChainClient {
    pub fn new(provider: HttpProvider, rpc_timeout: Option<Duration>) -> Self {
        Self {
            provider,
            rpc_timeout,
        }
    }

    async fn timed<F, T, E>(&self, call: &'static str, fut: F) -> Result<T, AppError>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        let res = match self.rpc_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                AppError::Connection(format!("{call} timed out after {}ms", limit.as_millis()))
            })?,
            None => fut.await,
        };
        res.map_err(|e| AppError::Connection(format!("{call} failed: {e}")))
    }
}

fn ledger_tx(index: usize, tx: &Transaction) -> LedgerTx {
    LedgerTx {
        hash: TransactionResponse::tx_hash(tx),
        index,
        to: match ConsensusTxTrait::kind(tx) {
            TxKind::Call(addr) => Some(addr),
            TxKind::Create => None,
        },
        sender: Some(tx.inner.signer()),
        value: ConsensusTxTrait::value(tx),
        input: ConsensusTxTrait::input(tx).clone(),
    }
}

fn ledger_receipt(receipt: &TransactionReceipt) -> LedgerReceipt {
    LedgerReceipt {
        tx_hash: receipt.transaction_hash,
        success: receipt.status(),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| LedgerLog {
                address: log.inner.address,
                topics: log.topics().to_vec(),
                data: log.data().data.clone(),
            })
            .collect(),
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn current_height(&self) -> Result<u64, AppError> {
        self.timed("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn block_by_height(&self, height: u64) -> Result<LedgerBlock, AppError> {
        let block = self
            .timed(
                "eth_getBlockByNumber",
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Number(height))
                    .full(),
            )
            .await?
            .ok_or_else(|| AppError::Connection(format!("block {height} not available")))?;

        let transactions = block
            .transactions
            .as_transactions()
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(index, tx)| ledger_tx(index, tx))
            .collect();

        Ok(LedgerBlock {
            number: height,
            hash: block.header.hash,
            transactions,
        })
    }

    async fn sender_of(
        &self,
        tx: &LedgerTx,
        block_hash: B256,
        index: usize,
    ) -> Result<Address, AppError> {
        if let Some(sender) = tx.sender {
            return Ok(sender);
        }

        let fetched = self
            .timed(
                "eth_getTransactionByBlockHashAndIndex",
                self.provider
                    .get_transaction_by_block_hash_and_index(block_hash, index),
            )
            .await?;
        match fetched {
            Some(found) if TransactionResponse::tx_hash(&found) == tx.hash => {
                Ok(found.inner.signer())
            }
            Some(found) => Err(AppError::Connection(format!(
                "sender lookup mismatch at {block_hash:#x}[{index}]: expected {:#x}, node returned {:#x}",
                tx.hash,
                TransactionResponse::tx_hash(&found)
            ))),
            None => Err(AppError::Connection(format!(
                "sender of {:#x} is not recoverable",
                tx.hash
            ))),
        }
    }

    async fn receipt_of(&self, tx_hash: B256) -> Result<Option<LedgerReceipt>, AppError> {
        let receipt = self
            .timed(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(tx_hash),
            )
            .await?;
        Ok(receipt.as_ref().map(ledger_receipt))
    }

    async fn balance_of(&self, address: Address) -> Result<U256, AppError> {
        self.timed("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    async fn pending_nonce_of(&self, address: Address) -> Result<u64, AppError> {
        self.timed(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    async fn network_id(&self) -> Result<u64, AppError> {
        self.timed("eth_chainId", self.provider.get_chain_id()).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError> {
        let request = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        self.timed("eth_call", self.provider.call(request)).await
    }

    async fn broadcast(&self, raw: Bytes) -> Result<B256, AppError> {
        let pending = self
            .timed(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(&raw),
            )
            .await?;
        Ok(*pending.tx_hash())
    }
}
