// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::network::chain::ChainClient;
use crate::network::nonce::NonceManager;
use crate::services::replication::config::{ApprovalWait, EngineConfig, TimeoutAction};
use crate::services::replication::erc20::{allowance, max_approval_calldata};
use crate::services::replication::intent::{ReplicaOrder, SwapKind};
use crate::services::replication::routers::UniV2Router;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use tokio::time::{Instant, sleep};

/// Router call data and attached native value for `order`.
pub fn swap_calldata(order: &ReplicaOrder) -> (Bytes, U256) {
    let path = order.path.clone();
    match order.kind {
        SwapKind::NativeForTokens => (
            UniV2Router::swapExactETHForTokensCall {
                amountOutMin: order.amount_out_min,
                path,
                to: order.recipient,
                deadline: order.deadline,
            }
            .abi_encode()
            .into(),
            order.amount_in,
        ),
        SwapKind::TokensForNative => (
            UniV2Router::swapExactTokensForETHCall {
                amountIn: order.amount_in,
                amountOutMin: order.amount_out_min,
                path,
                to: order.recipient,
                deadline: order.deadline,
            }
            .abi_encode()
            .into(),
            U256::ZERO,
        ),
        SwapKind::TokensForTokens => (
            UniV2Router::swapExactTokensForTokensCall {
                amountIn: order.amount_in,
                amountOutMin: order.amount_out_min,
                path,
                to: order.recipient,
                deadline: order.deadline,
            }
            .abi_encode()
            .into(),
            U256::ZERO,
        ),
    }
}

/// Signs and broadcasts replica swaps (and their approvals) as the follower.
pub struct ReplicaSubmitter {
    signer: PrivateKeySigner,
    router: Address,
    chain_id: u64,
    gas_price: u128,
    gas_limit: u64,
    approval_gas_limit: u64,
    approval_wait: ApprovalWait,
    nonces: NonceManager,
    dry_run: bool,
}

impl ReplicaSubmitter {
    pub fn new(config: &EngineConfig, chain_id: u64) -> Self {
        Self {
            signer: config.follower.clone(),
            router: config.router,
            chain_id,
            gas_price: config.gas_price_wei,
            gas_limit: config.gas_limit,
            approval_gas_limit: config.approval_gas_limit,
            approval_wait: config.approval_wait,
            nonces: NonceManager::new(config.follower_address()),
            dry_run: config.dry_run,
        }
    }

    /// Realise `order` on-chain. No internal retry; the returned hash is the
    /// swap transaction (computed locally in dry-run mode).
    pub async fn submit<C>(&mut self, client: &C, order: &ReplicaOrder) -> Result<B256, AppError>
    where
        C: ChainClient + ?Sized,
    {
        self.nonces.begin_order();
        if let Some(token) = order.sold_token() {
            self.ensure_allowance(client, token, order.amount_in).await?;
        }

        let (calldata, value) = swap_calldata(order);
        let hash = self
            .send(client, self.router, value, self.gas_limit, calldata, order.kind.function_name())
            .await?;
        tracing::info!(
            target: "submit",
            tx = %hash,
            kind = %order.kind,
            amount_in = %order.amount_in,
            min_out = %order.amount_out_min,
            dry_run = self.dry_run,
            "Replica swap sent"
        );
        Ok(hash)
    }

    async fn ensure_allowance<C>(
        &mut self,
        client: &C,
        token: Address,
        required: U256,
    ) -> Result<(), AppError>
    where
        C: ChainClient + ?Sized,
    {
        let owner = self.nonces.address();
        match allowance(client, token, owner, self.router).await {
            Ok(current) if current >= required => {
                tracing::debug!(target: "submit", token = %token, allowance = %current, "Allowance sufficient");
                return Ok(());
            }
            Ok(current) => {
                tracing::info!(target: "submit", token = %token, allowance = %current, required = %required, "Approving router");
            }
            Err(e) => {
                tracing::warn!(target: "submit", token = %token, error = %e, "Allowance query failed; approving anyway");
            }
        }

        let hash = self
            .send(
                client,
                token,
                U256::ZERO,
                self.approval_gas_limit,
                max_approval_calldata(self.router),
                "approve",
            )
            .await?;
        tracing::info!(target: "submit", tx = %hash, token = %token, "Token approval sent");

        if self.dry_run {
            return Ok(());
        }
        self.wait_for_approval(client, hash).await
    }

    async fn wait_for_approval<C>(&self, client: &C, hash: B256) -> Result<(), AppError>
    where
        C: ChainClient + ?Sized,
    {
        let (poll, timeout, on_timeout) = match self.approval_wait {
            ApprovalWait::Fixed(pause) => {
                if !pause.is_zero() {
                    sleep(pause).await;
                }
                return Ok(());
            }
            ApprovalWait::Receipt {
                poll,
                timeout,
                on_timeout,
            } => (poll, timeout, on_timeout),
        };

        let deadline = Instant::now() + timeout;
        loop {
            match client.receipt_of(hash).await {
                Ok(Some(receipt)) if receipt.success => return Ok(()),
                Ok(Some(_)) => {
                    return Err(AppError::Transaction {
                        hash: format!("{hash:#x}"),
                        reason: "approval reverted".into(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(target: "submit", tx = %hash, error = %e, "Approval receipt poll failed");
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(poll).await;
        }

        match on_timeout {
            TimeoutAction::Proceed => {
                tracing::warn!(
                    target: "submit",
                    tx = %hash,
                    timeout_ms = timeout.as_millis() as u64,
                    "Approval receipt not seen; proceeding with swap"
                );
                Ok(())
            }
            TimeoutAction::Abort => Err(AppError::Transaction {
                hash: format!("{hash:#x}"),
                reason: format!("approval not included within {}ms", timeout.as_millis()),
            }),
        }
    }

    async fn send<C>(
        &mut self,
        client: &C,
        to: Address,
        value: U256,
        gas_limit: u64,
        input: Bytes,
        label: &str,
    ) -> Result<B256, AppError>
    where
        C: ChainClient + ?Sized,
    {
        let nonce = self.nonces.next_nonce(client).await?;
        let (raw, hash) = self.sign_legacy(to, value, gas_limit, nonce, input)?;

        if self.dry_run {
            tracing::info!(target: "submit", call = label, tx = %hash, nonce, "Dry-run: not broadcasting");
            return Ok(hash);
        }

        let accepted = client.broadcast(raw).await.map_err(|e| AppError::Transaction {
            hash: format!("{hash:#x}"),
            reason: format!("{label} broadcast failed: {e}"),
        })?;
        self.nonces.mark_used(nonce);
        if accepted != hash {
            tracing::warn!(target: "submit", local = %hash, node = %accepted, "Node reported a different tx hash");
        }
        Ok(accepted)
    }

    /// EIP-155 legacy transaction at the configured fixed gas price.
    fn sign_legacy(
        &self,
        to: Address,
        value: U256,
        gas_limit: u64,
        nonce: u64,
        input: Bytes,
    ) -> Result<(Bytes, B256), AppError> {
        let mut tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price: self.gas_price,
            gas_limit,
            to: TxKind::Call(to),
            value,
            input,
        };
        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
            .map_err(|e| AppError::Replication(format!("Sign tx failed: {}", e)))?;
        let signed: TxEnvelope = tx.into_signed(sig).into();
        Ok((Bytes::from(signed.encoded_2718()), *signed.tx_hash()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const CAKE: Address = address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82");
    const WBNB: Address = address!("BB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");

    fn order(kind: SwapKind) -> ReplicaOrder {
        ReplicaOrder {
            kind,
            amount_in: U256::from(500u64),
            amount_out_min: U256::from(95u64),
            path: vec![CAKE, WBNB],
            recipient: address!("2222222222222222222222222222222222222222"),
            deadline: U256::from(1_700_001_200u64),
        }
    }

    #[test]
    fn token_input_swaps_carry_no_value() {
        let (data, value) = swap_calldata(&order(SwapKind::TokensForNative));
        assert_eq!(value, U256::ZERO);
        let call = UniV2Router::swapExactTokensForETHCall::abi_decode(&data).expect("decode");
        assert_eq!(call.amountIn, U256::from(500u64));
        assert_eq!(call.amountOutMin, U256::from(95u64));
        assert_eq!(call.deadline, U256::from(1_700_001_200u64));
    }

    #[test]
    fn native_input_swap_attaches_amount_as_value() {
        let mut native = order(SwapKind::NativeForTokens);
        native.path = vec![WBNB, CAKE];
        let (data, value) = swap_calldata(&native);
        assert_eq!(value, U256::from(500u64));
        let call = UniV2Router::swapExactETHForTokensCall::abi_decode(&data).expect("decode");
        assert_eq!(call.path, vec![WBNB, CAKE]);
        assert_eq!(call.to, native.recipient);
    }
}
