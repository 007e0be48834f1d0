// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use clap::Parser;
use oxidity_copytrader::app::config::Settings;
use oxidity_copytrader::app::logging::setup_logging;
use oxidity_copytrader::domain::error::AppError;
use oxidity_copytrader::infrastructure::network::provider::ConnectionFactory;
use oxidity_copytrader::infrastructure::network::rpc_client::RpcChainClient;
use oxidity_copytrader::services::replication::CopyEngine;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about = "oxidity copy trader")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,json} if present)
    #[arg(long)]
    config: Option<String>,

    /// Sign and log replica transactions without broadcasting them
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Copy percentage (overrides config/env)
    #[arg(long)]
    copy_percentage: Option<f64>,

    /// Use the testnet RPC endpoint
    #[arg(long, default_value_t = false)]
    testnet: bool,
}

/// Cancel the engine only for a delivered signal. A listener that failed to
/// install leaves the engine running.
fn cancel_on_signal(received: std::io::Result<()>, token: &CancellationToken) -> bool {
    match received {
        Ok(()) => {
            tracing::info!(target: "engine", "Shutdown signal received");
            token.cancel();
            true
        }
        Err(e) => {
            tracing::error!(target: "engine", error = %e, "Failed to listen for ctrl-c");
            false
        }
    }
}

async fn shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                let received = tokio::select! {
                    res = tokio::signal::ctrl_c() => res,
                    _ = term.recv() => Ok(()),
                };
                if !cancel_on_signal(received, &token) && term.recv().await.is_some() {
                    cancel_on_signal(Ok(()), &token);
                }
            }
            Err(e) => {
                tracing::warn!(target: "engine", error = %e, "SIGTERM handler unavailable");
                cancel_on_signal(tokio::signal::ctrl_c().await, &token);
            }
        }
    }
    #[cfg(not(unix))]
    {
        cancel_on_signal(tokio::signal::ctrl_c().await, &token);
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut settings = Settings::load_with_path(cli.config.as_deref())?;
    if let Some(copy) = cli.copy_percentage {
        settings.copy_percentage = copy;
    }
    if cli.testnet {
        settings.testnet = true;
    }
    setup_logging(settings.log_level(), settings.log_json);

    let engine_config = settings.engine_config(cli.dry_run)?;
    let rpc_url = settings.rpc_url().to_string();
    tracing::info!(target: "rpc", rpc = %rpc_url, testnet = settings.testnet, "Connecting to node");
    let provider = ConnectionFactory::http(&rpc_url)?;
    let client = Arc::new(RpcChainClient::new(provider, settings.rpc_timeout()));

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    CopyEngine::bootstrap(client, engine_config, shutdown)
        .await?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_signal_listener_keeps_engine_running() {
        let token = CancellationToken::new();
        let err = std::io::Error::other("no signal driver");
        assert!(!cancel_on_signal(Err(err), &token));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn delivered_signal_cancels_engine() {
        let token = CancellationToken::new();
        assert!(cancel_on_signal(Ok(()), &token));
        assert!(token.is_cancelled());
    }
}
