// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

/// Running counters for the replication loop. Owned by the single worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplicationStats {
    pub passes: u64,
    pub blocks_scanned: u64,
    pub block_errors: u64,
    pub candidates: u64,
    pub unconfirmed: u64,
    pub undecodable: u64,
    pub filtered: u64,
    pub abandoned: u64,
    pub submitted: u64,
    pub failed: u64,
}

impl ReplicationStats {
    pub fn log_summary(&self, reason: &str) {
        tracing::info!(
            target: "engine",
            reason,
            passes = self.passes,
            blocks = self.blocks_scanned,
            block_errors = self.block_errors,
            candidates = self.candidates,
            unconfirmed = self.unconfirmed,
            undecodable = self.undecodable,
            filtered = self.filtered,
            abandoned = self.abandoned,
            submitted = self.submitted,
            failed = self.failed,
            "Replication stats"
        );
    }
}
