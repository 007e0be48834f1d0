// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::B256;
use std::collections::HashSet;

/// Source transactions already handled during this process lifetime.
///
/// Unbounded: the ledger never replays a transaction hash, and the set is
/// rebuilt empty on every start.
#[derive(Debug, Default)]
pub struct DedupLedger {
    processed: HashSet<B256>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only the first time `tx_hash` is marked.
    pub fn mark_processed(&mut self, tx_hash: B256) -> bool {
        self.processed.insert(tx_hash)
    }

    pub fn is_processed(&self, tx_hash: &B256) -> bool {
        self.processed.contains(tx_hash)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_is_idempotent() {
        let mut ledger = DedupLedger::new();
        let hash = B256::repeat_byte(0xab);
        assert!(!ledger.is_processed(&hash));
        assert!(ledger.mark_processed(hash));
        assert!(!ledger.mark_processed(hash));
        assert!(ledger.is_processed(&hash));
        assert_eq!(ledger.len(), 1);
    }
}
