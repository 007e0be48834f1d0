// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::network::chain::ChainClient;
use alloy::primitives::Address;

/// Hands out follower nonces strictly in submission order.
///
/// Every request re-reads the pending nonce from the node. Within one order the
/// last broadcast nonce is remembered so that an approval followed immediately
/// by its swap never reuses a nonce when the node has not indexed the approval
/// yet. A new order starts from the node's view again, so a dropped
/// transaction never leaves a permanent nonce gap.
#[derive(Debug, Clone)]
pub struct NonceManager {
    address: Address,
    last_used: Option<u64>,
}

impl NonceManager {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            last_used: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn next_nonce<C>(&self, client: &C) -> Result<u64, AppError>
    where
        C: ChainClient + ?Sized,
    {
        let pending = client
            .pending_nonce_of(self.address)
            .await
            .map_err(|e| AppError::Connection(format!("Failed to fetch nonce: {}", e)))?;
        let next = reconcile(pending, self.last_used);
        if next != pending {
            tracing::debug!(
                target: "nonce",
                pending,
                next,
                "Node pending nonce lags local submissions"
            );
        }
        Ok(next)
    }

    /// Forget nonces used by the previous order.
    pub fn begin_order(&mut self) {
        self.last_used = None;
    }

    /// Record a nonce whose transaction was accepted by the node.
    pub fn mark_used(&mut self, nonce: u64) {
        self.last_used = Some(self.last_used.map_or(nonce, |last| last.max(nonce)));
    }
}

fn reconcile(pending: u64, last_used: Option<u64>) -> u64 {
    match last_used {
        Some(last) if last >= pending => last + 1,
        _ => pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_nonce_wins_when_node_is_ahead() {
        assert_eq!(reconcile(7, None), 7);
        assert_eq!(reconcile(7, Some(5)), 7);
        assert_eq!(reconcile(7, Some(6)), 7);
    }

    #[test]
    fn local_nonce_wins_when_node_lags() {
        assert_eq!(reconcile(7, Some(7)), 8);
        assert_eq!(reconcile(3, Some(9)), 10);
    }

    #[test]
    fn mark_used_is_monotonic() {
        let mut nonces = NonceManager::new(Address::ZERO);
        nonces.mark_used(4);
        nonces.mark_used(2);
        assert_eq!(nonces.last_used, Some(4));
    }

    #[test]
    fn new_order_trusts_pending_nonce_again() {
        let mut nonces = NonceManager::new(Address::ZERO);
        nonces.mark_used(7);
        assert_eq!(reconcile(7, nonces.last_used), 8);
        nonces.begin_order();
        assert_eq!(reconcile(7, nonces.last_used), 7);
    }
}
