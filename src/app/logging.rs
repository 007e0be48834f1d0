// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const QUIET_DEPENDENCIES: &str = "h2=info,hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info,alloy_rpc_client=info";

/// Expand a bare level (`debug`) with quieter defaults for transport crates.
/// Directive strings containing `,` or `=` are used verbatim.
pub fn filter_directives(log_level: &str) -> String {
    let normalized = log_level.trim();
    if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else if normalized.is_empty() {
        format!("info,{QUIET_DEPENDENCIES}")
    } else {
        format!("{normalized},{QUIET_DEPENDENCIES}")
    }
}

pub fn setup_logging(log_level: &str, json_format: bool) {
    // RUST_LOG wins over the configured level when present.
    let filter_spec = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| filter_directives(log_level));
    let filter = EnvFilter::from_str(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        let json_layer = fmt::layer().json().with_target(true).with_current_span(false);
        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_target(true).compact();
        subscriber.with(fmt_layer).init();
    }

    let base = filter_spec.split(',').next().unwrap_or("info").trim();
    tracing::info!(
        base,
        format = if json_format { "json" } else { "compact" },
        "Logging initialized"
    );
}
