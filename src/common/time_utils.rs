// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Return the current UNIX timestamp in seconds.
pub fn current_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Absolute UNIX deadline `offset` from `now`.
pub fn deadline_from(now: u64, offset: Duration) -> u64 {
    now.saturating_add(offset.as_secs())
}
