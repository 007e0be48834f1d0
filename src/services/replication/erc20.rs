// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::network::chain::ChainClient;
use crate::services::replication::routers::ERC20;
use alloy::primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};

async fn read_u256<C>(client: &C, token: Address, data: Vec<u8>, what: &str) -> Result<U256, AppError>
where
    C: ChainClient + ?Sized,
{
    let raw = client.call(token, Bytes::from(data)).await?;
    U256::abi_decode(&raw).map_err(|e| {
        AppError::Replication(format!("{what} of {token:#x} returned undecodable data: {e}"))
    })
}

pub async fn token_balance<C>(client: &C, token: Address, owner: Address) -> Result<U256, AppError>
where
    C: ChainClient + ?Sized,
{
    let data = ERC20::balanceOfCall { owner }.abi_encode();
    read_u256(client, token, data, "balanceOf").await
}

pub async fn allowance<C>(
    client: &C,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, AppError>
where
    C: ChainClient + ?Sized,
{
    let data = ERC20::allowanceCall { owner, spender }.abi_encode();
    read_u256(client, token, data, "allowance").await
}

/// Calldata granting `spender` the maximal allowance.
pub fn max_approval_calldata(spender: Address) -> Bytes {
    Bytes::from(
        ERC20::approveCall {
            spender,
            amount: U256::MAX,
        }
        .abi_encode(),
    )
}
