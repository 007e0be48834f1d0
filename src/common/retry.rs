// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry an async RPC operation with exponential backoff, logging each failed attempt
/// under `label`. Only used during bootstrap; scan-time calls are never retried.
pub async fn retry_async<F, Fut, T, E>(
    label: &str,
    mut op: F,
    attempts: usize,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delay = initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    target: "rpc",
                    call = label,
                    attempt,
                    attempts,
                    error = %e,
                    "RPC call failed; backing off"
                );
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_until_head_is_served() {
        let counter = AtomicUsize::new(0);
        let res: Result<u64, String> = retry_async(
            "current_height",
            |_| {
                let current = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if current < 2 {
                        Err("connection refused".to_string())
                    } else {
                        Ok(41_000_000)
                    }
                }
            },
            4,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(res.unwrap(), 41_000_000);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn gives_up_after_last_attempt() {
        let counter = AtomicUsize::new(0);
        let res: Result<u64, &str> = retry_async(
            "network_id",
            |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                async { Err("head unavailable") }
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(res, Err("head unavailable"));
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }
}
