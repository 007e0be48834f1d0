// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use std::ops::RangeInclusive;

/// Last fully scanned block height. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerCursor {
    last_scanned: u64,
}

impl LedgerCursor {
    /// Cursor positioned so that the first pass starts at `head`.
    pub fn starting_at(head: u64) -> Self {
        Self {
            last_scanned: head.saturating_sub(1),
        }
    }

    pub fn last_scanned(&self) -> u64 {
        self.last_scanned
    }

    /// Blocks to scan on this tick, bounded to `max_blocks`. `None` when the
    /// chain has not moved past the cursor.
    pub fn next_range(&self, head: u64, max_blocks: u64) -> Option<RangeInclusive<u64>> {
        let start = self.last_scanned.checked_add(1)?;
        if start > head || max_blocks == 0 {
            return None;
        }
        let end = self.last_scanned.saturating_add(max_blocks).min(head);
        Some(start..=end)
    }

    pub fn advance_to(&mut self, height: u64) {
        self.last_scanned = self.last_scanned.max(height);
    }
}
