// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::parsing::{
    normalize_private_key, parse_address_hex, parse_address_list, parse_boolish,
};
use crate::domain::constants;
use crate::domain::error::AppError;
use crate::services::replication::config::{
    ApprovalWait, DedupPolicy, EngineConfig, TimeoutAction,
};
use crate::services::replication::sizing::CopyPercentage;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Raw settings as read from the config file and environment. Field names
/// match the environment variables (`BSC_NODE_URL` -> `bsc_node_url`).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    // General
    #[serde(default = "default_false", deserialize_with = "deserialize_boolish")]
    pub debug: bool,
    #[serde(default = "default_false", deserialize_with = "deserialize_boolish")]
    pub log_json: bool,

    // Network
    #[serde(default = "default_mainnet_rpc", alias = "rpc_url")]
    pub bsc_node_url: String,
    #[serde(default = "default_testnet_rpc", alias = "testnet_rpc_url")]
    pub bsc_testnet_url: String,
    #[serde(default = "default_false", deserialize_with = "deserialize_boolish")]
    pub testnet: bool,
    /// 0 disables the per-call deadline.
    #[serde(default)]
    pub rpc_timeout_ms: u64,

    // Identity
    #[serde(default)]
    pub master_wallet_address: String,
    #[serde(default)]
    pub follower_private_key: String,

    // Replication
    #[serde(default = "default_copy_percentage")]
    pub copy_percentage: f64,
    /// Comma separated allowlist; empty replicates every token.
    #[serde(default)]
    pub token_addresses: Option<String>,
    #[serde(default)]
    pub router_address: Option<String>,
    #[serde(default)]
    pub wbnb_address: Option<String>,
    #[serde(default = "default_slippage_percent")]
    pub slippage_percent: u64,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_true", deserialize_with = "deserialize_boolish")]
    pub require_swap_event: bool,
    #[serde(default = "default_dedup_policy")]
    pub dedup_policy: String,

    // Transaction
    #[serde(default = "default_gas_price_gwei")]
    pub gas_price_gwei: f64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_approval_gas_limit")]
    pub approval_gas_limit: u64,
    #[serde(default = "default_approval_wait")]
    pub approval_wait: String,
    #[serde(default = "default_approval_pause_ms")]
    pub approval_pause_ms: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    #[serde(default = "default_approval_timeout_action")]
    pub approval_timeout_action: String,

    // Scheduler
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_blocks_per_pass")]
    pub max_blocks_per_pass: u64,
}

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_mainnet_rpc() -> String {
    constants::DEFAULT_MAINNET_RPC.to_string()
}
fn default_testnet_rpc() -> String {
    constants::DEFAULT_TESTNET_RPC.to_string()
}
fn default_copy_percentage() -> f64 {
    constants::DEFAULT_COPY_PERCENTAGE
}
fn default_slippage_percent() -> u64 {
    constants::DEFAULT_SLIPPAGE_PERCENT
}
fn default_deadline_secs() -> u64 {
    constants::DEFAULT_DEADLINE_SECS
}
fn default_dedup_policy() -> String {
    "mark_always".to_string()
}
fn default_gas_price_gwei() -> f64 {
    constants::DEFAULT_GAS_PRICE_GWEI
}
fn default_gas_limit() -> u64 {
    constants::DEFAULT_GAS_LIMIT
}
fn default_approval_gas_limit() -> u64 {
    constants::DEFAULT_APPROVAL_GAS_LIMIT
}
fn default_approval_wait() -> String {
    "fixed".to_string()
}
fn default_approval_pause_ms() -> u64 {
    constants::DEFAULT_APPROVAL_PAUSE_MS
}
fn default_receipt_poll_ms() -> u64 {
    constants::DEFAULT_RECEIPT_POLL_MS
}
fn default_receipt_timeout_ms() -> u64 {
    constants::DEFAULT_RECEIPT_TIMEOUT_MS
}
fn default_approval_timeout_action() -> String {
    "proceed".to_string()
}
fn default_poll_interval_secs() -> u64 {
    constants::DEFAULT_POLL_INTERVAL_SECS
}
fn default_max_blocks_per_pass() -> u64 {
    constants::DEFAULT_MAX_BLOCKS_PER_PASS
}

/// Accepts real booleans from files and `1/0/yes/no/on/off` strings from env.
fn deserialize_boolish<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{Error, Visitor};
    use std::fmt;

    struct BoolishVisitor;

    impl Visitor<'_> for BoolishVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or boolean-like string")
        }

        fn visit_bool<E: Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<bool, E> {
            parse_boolish(v).ok_or_else(|| E::custom(format!("invalid boolean: {v}")))
        }
    }

    deserializer.deserialize_any(BoolishVisitor)
}

impl Settings {
    /// Precedence: CLI (applied in main) > env/.env > config file.
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(Path::new(path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        builder = builder.add_source(Environment::default());

        Self::from_config(builder.build()?)
    }

    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let settings: Settings = config.try_deserialize()?;
        if settings.master_wallet_address.trim().is_empty() {
            return Err(AppError::Config("MASTER_WALLET_ADDRESS is missing".into()));
        }
        if settings.follower_private_key.trim().is_empty() {
            return Err(AppError::Config("FOLLOWER_PRIVATE_KEY is missing".into()));
        }
        Ok(settings)
    }

    pub fn rpc_url(&self) -> &str {
        if self.testnet {
            &self.bsc_testnet_url
        } else {
            &self.bsc_node_url
        }
    }

    pub fn rpc_timeout(&self) -> Option<Duration> {
        (self.rpc_timeout_ms > 0).then(|| Duration::from_millis(self.rpc_timeout_ms))
    }

    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    fn signer(&self) -> Result<PrivateKeySigner, AppError> {
        PrivateKeySigner::from_str(normalize_private_key(&self.follower_private_key))
            .map_err(|e| AppError::Config(format!("Invalid follower private key: {e}")))
    }

    fn gas_price_wei(&self) -> Result<u128, AppError> {
        let gwei = self.gas_price_gwei;
        if !gwei.is_finite() || gwei <= 0.0 {
            return Err(invalid("gas_price_gwei", "must be positive"));
        }
        Ok((gwei * constants::WEI_PER_GWEI as f64).round() as u128)
    }

    fn approval_wait_policy(&self) -> Result<ApprovalWait, AppError> {
        let on_timeout = match self.approval_timeout_action.trim().to_ascii_lowercase().as_str() {
            "proceed" => TimeoutAction::Proceed,
            "abort" => TimeoutAction::Abort,
            other => {
                return Err(invalid(
                    "approval_timeout_action",
                    &format!("expected proceed|abort, got {other}"),
                ));
            }
        };
        match self.approval_wait.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ApprovalWait::Fixed(Duration::from_millis(
                self.approval_pause_ms,
            ))),
            "receipt" => {
                if self.receipt_poll_ms == 0 {
                    return Err(invalid("receipt_poll_ms", "must be positive"));
                }
                Ok(ApprovalWait::Receipt {
                    poll: Duration::from_millis(self.receipt_poll_ms),
                    timeout: Duration::from_millis(self.receipt_timeout_ms),
                    on_timeout,
                })
            }
            other => Err(invalid(
                "approval_wait",
                &format!("expected fixed|receipt, got {other}"),
            )),
        }
    }

    fn dedup(&self) -> Result<DedupPolicy, AppError> {
        match self.dedup_policy.trim().to_ascii_lowercase().as_str() {
            "mark_always" | "always" => Ok(DedupPolicy::MarkAlways),
            "mark_on_decode" | "on_decode" => Ok(DedupPolicy::MarkOnDecode),
            other => Err(invalid(
                "dedup_policy",
                &format!("expected mark_always|mark_on_decode, got {other}"),
            )),
        }
    }

    fn token_allowlist(&self) -> Result<HashSet<Address>, AppError> {
        let Some(raw) = self.token_addresses.as_deref() else {
            return Ok(HashSet::new());
        };
        let tokens = parse_address_list(raw).map_err(AppError::InvalidAddress)?;
        Ok(tokens.into_iter().collect())
    }

    /// Resolve and validate everything the engine needs. Any error is fatal.
    pub fn engine_config(&self, dry_run: bool) -> Result<EngineConfig, AppError> {
        let master = address_setting(&self.master_wallet_address)?;
        let follower = self.signer()?;
        let router = match self.router_address.as_deref() {
            Some(raw) if !raw.trim().is_empty() => address_setting(raw)?,
            _ => constants::PANCAKE_V2_ROUTER_BSC,
        };

        let copy_percentage = CopyPercentage::from_percent(self.copy_percentage)
            .ok_or_else(|| invalid("copy_percentage", "must be greater than zero"))?;
        if self.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs", "must be at least 1"));
        }

        let mut config = EngineConfig::new(master, follower, router);
        if let Some(raw) = self.wbnb_address.as_deref()
            && !raw.trim().is_empty()
        {
            config.wrapped_native = address_setting(raw)?;
        }
        config.copy_percentage = copy_percentage;
        config.gas_price_wei = self.gas_price_wei()?;
        config.gas_limit = self.gas_limit;
        config.approval_gas_limit = self.approval_gas_limit;
        config.testnet = self.testnet;
        config.poll_interval = Duration::from_secs(self.poll_interval_secs);
        config.max_blocks_per_pass = self.max_blocks_per_pass;
        config.slippage_percent = self.slippage_percent;
        config.deadline = Duration::from_secs(self.deadline_secs);
        config.approval_wait = self.approval_wait_policy()?;
        config.dedup_policy = self.dedup()?;
        config.require_swap_event = self.require_swap_event;
        config.token_allowlist = self.token_allowlist()?;
        config.dry_run = dry_run;

        config.validate()?;
        Ok(config)
    }
}

fn address_setting(raw: &str) -> Result<Address, AppError> {
    parse_address_hex(raw).ok_or_else(|| AppError::InvalidAddress(raw.trim().to_string()))
}

fn invalid(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
