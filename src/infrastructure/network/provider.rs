// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "RPC URL must be http(s), got scheme `{}`",
                url.scheme()
            )));
        }

        Ok(RootProvider::new_http(url))
    }
}
