// SPDX-License-Identifier: MIT
// In-memory chain used to drive the replication engine without a node.

#![allow(dead_code)]

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, B256, Bytes, U256, address, keccak256};
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use oxidity_copytrader::common::constants::{CHAIN_BSC, PANCAKE_V2_ROUTER_BSC, WBNB_BSC};
use oxidity_copytrader::domain::error::AppError;
use oxidity_copytrader::network::chain::{
    ChainClient, LedgerBlock, LedgerLog, LedgerReceipt, LedgerTx,
};
use oxidity_copytrader::services::replication::config::{ApprovalWait, EngineConfig};
use oxidity_copytrader::services::replication::routers::{ERC20, UniV2Pair};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const MASTER: Address = address!("1111111111111111111111111111111111111111");
pub const STRANGER: Address = address!("3333333333333333333333333333333333333333");
pub const PAIR: Address = address!("0eD7e52944161450477ee417DE9Cd3a859b14fD0");
pub const CAKE: Address = address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82");
pub const BUSD: Address = address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56");
pub const ROUTER: Address = PANCAKE_V2_ROUTER_BSC;
pub const WBNB: Address = WBNB_BSC;

/// Receipt the fake node records for follower broadcasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BroadcastReceipt {
    #[default]
    Success,
    Reverted,
    Withheld,
}

#[derive(Default)]
pub struct ChainState {
    pub head: u64,
    pub head_unavailable: bool,
    pub chain_id: u64,
    pub blocks: HashMap<u64, LedgerBlock>,
    pub receipts: HashMap<B256, LedgerReceipt>,
    pub balances: HashMap<Address, U256>,
    /// (token, owner) -> balance
    pub token_balances: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) -> allowance
    pub allowances: HashMap<(Address, Address, Address), U256>,
    pub nonces: HashMap<Address, u64>,
    pub broadcasts: Vec<Bytes>,
    pub broadcast_receipt: BroadcastReceipt,
    pub sender_lookups: usize,
    pub unresolvable_senders: HashSet<B256>,
}

pub struct FakeChain {
    pub state: Mutex<ChainState>,
}

impl FakeChain {
    pub fn new(head: u64) -> Self {
        Self {
            state: Mutex::new(ChainState {
                head,
                chain_id: CHAIN_BSC,
                ..ChainState::default()
            }),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn set_head(&self, head: u64) {
        self.with(|s| s.head = head);
    }

    /// Put `txs` into block `number` and give each a successful receipt
    /// carrying one pair swap event.
    pub fn mine(&self, number: u64, txs: Vec<LedgerTx>) {
        self.with(|s| {
            for tx in &txs {
                s.receipts
                    .entry(tx.hash)
                    .or_insert_with(|| swap_receipt(tx.hash, true));
            }
            s.blocks.insert(
                number,
                LedgerBlock {
                    number,
                    hash: B256::left_padding_from(&number.to_be_bytes()),
                    transactions: txs,
                },
            );
        });
    }

    pub fn broadcasts(&self) -> Vec<Bytes> {
        self.with(|s| s.broadcasts.clone())
    }

    pub fn broadcast_txs(&self) -> Vec<alloy::consensus::TxLegacy> {
        self.broadcasts()
            .iter()
            .map(|raw| {
                let mut buf: &[u8] = &raw[..];
                match TxEnvelope::decode_2718(&mut buf).expect("decode") {
                    TxEnvelope::Legacy(signed) => signed.tx().clone(),
                    other => panic!("expected legacy tx, got {other:?}"),
                }
            })
            .collect()
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn current_height(&self) -> Result<u64, AppError> {
        self.with(|s| {
            if s.head_unavailable {
                Err(AppError::Connection("head unavailable".into()))
            } else {
                Ok(s.head)
            }
        })
    }

    async fn block_by_height(&self, height: u64) -> Result<LedgerBlock, AppError> {
        self.with(|s| {
            s.blocks
                .get(&height)
                .cloned()
                .ok_or_else(|| AppError::Connection(format!("block {height} unavailable")))
        })
    }

    async fn sender_of(
        &self,
        tx: &LedgerTx,
        _block_hash: B256,
        _index: usize,
    ) -> Result<Address, AppError> {
        self.with(|s| {
            s.sender_lookups += 1;
            if s.unresolvable_senders.contains(&tx.hash) {
                return Err(AppError::Connection("sender unavailable".into()));
            }
            tx.sender
                .ok_or_else(|| AppError::Connection("sender unavailable".into()))
        })
    }

    async fn receipt_of(&self, tx_hash: B256) -> Result<Option<LedgerReceipt>, AppError> {
        Ok(self.with(|s| s.receipts.get(&tx_hash).cloned()))
    }

    async fn balance_of(&self, address: Address) -> Result<U256, AppError> {
        Ok(self.with(|s| s.balances.get(&address).copied().unwrap_or_default()))
    }

    async fn pending_nonce_of(&self, address: Address) -> Result<u64, AppError> {
        Ok(self.with(|s| s.nonces.get(&address).copied().unwrap_or_default()))
    }

    async fn network_id(&self) -> Result<u64, AppError> {
        Ok(self.with(|s| s.chain_id))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| AppError::Connection("empty call".into()))?;
        let value = match selector {
            ERC20::balanceOfCall::SELECTOR => {
                let call = ERC20::balanceOfCall::abi_decode(&data)
                    .map_err(|e| AppError::Connection(e.to_string()))?;
                self.with(|s| {
                    s.token_balances
                        .get(&(to, call.owner))
                        .copied()
                        .unwrap_or_default()
                })
            }
            ERC20::allowanceCall::SELECTOR => {
                let call = ERC20::allowanceCall::abi_decode(&data)
                    .map_err(|e| AppError::Connection(e.to_string()))?;
                self.with(|s| {
                    s.allowances
                        .get(&(to, call.owner, call.spender))
                        .copied()
                        .unwrap_or_default()
                })
            }
            _ => return Err(AppError::Connection("execution reverted".into())),
        };
        Ok(Bytes::from(value.abi_encode()))
    }

    async fn broadcast(&self, raw: Bytes) -> Result<B256, AppError> {
        let hash = keccak256(&raw);
        self.with(|s| {
            let success = match s.broadcast_receipt {
                BroadcastReceipt::Success => Some(true),
                BroadcastReceipt::Reverted => Some(false),
                BroadcastReceipt::Withheld => None,
            };
            if let Some(success) = success {
                s.receipts.insert(
                    hash,
                    LedgerReceipt {
                        tx_hash: hash,
                        success,
                        logs: Vec::new(),
                    },
                );
            }
            s.broadcasts.push(raw);
        });
        Ok(hash)
    }
}

pub fn tx_hash(tag: u8) -> B256 {
    B256::repeat_byte(tag)
}

pub fn router_tx(tag: u8, index: usize, sender: Address, value: U256, input: Vec<u8>) -> LedgerTx {
    LedgerTx {
        hash: tx_hash(tag),
        index,
        to: Some(ROUTER),
        sender: Some(sender),
        value,
        input: Bytes::from(input),
    }
}

pub fn swap_receipt(hash: B256, success: bool) -> LedgerReceipt {
    let event = UniV2Pair::Swap {
        sender: ROUTER,
        amount0In: U256::from(1_000u64),
        amount1In: U256::ZERO,
        amount0Out: U256::ZERO,
        amount1Out: U256::from(200u64),
        to: MASTER,
    };
    let log = event.encode_log_data();
    LedgerReceipt {
        tx_hash: hash,
        success,
        logs: vec![LedgerLog {
            address: PAIR,
            topics: log.topics().to_vec(),
            data: log.data.clone(),
        }],
    }
}

pub fn engine_config(follower: PrivateKeySigner) -> EngineConfig {
    let mut config = EngineConfig::new(MASTER, follower, ROUTER);
    config.approval_wait = ApprovalWait::Fixed(Duration::ZERO);
    config.poll_interval = Duration::from_millis(10);
    config
}
