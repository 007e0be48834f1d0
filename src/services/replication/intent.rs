// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, U256};
use std::fmt;

/// The three router entry points the engine replicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwapKind {
    NativeForTokens,
    TokensForNative,
    TokensForTokens,
}

impl SwapKind {
    pub fn function_name(self) -> &'static str {
        match self {
            SwapKind::NativeForTokens => "swapExactETHForTokens",
            SwapKind::TokensForNative => "swapExactTokensForETH",
            SwapKind::TokensForTokens => "swapExactTokensForTokens",
        }
    }

    /// Whether the sold asset is an ERC20 that the router must be allowed to pull.
    pub fn spends_token(self) -> bool {
        !matches!(self, SwapKind::NativeForTokens)
    }
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// A master router call, decoded once into typed arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapIntent {
    /// Input amount is not part of the call data; `attached_value` is the native
    /// value the master sent. It is logged but never used for sizing.
    NativeForTokens {
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
        attached_value: U256,
    },
    TokensForNative {
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    },
    TokensForTokens {
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        recipient: Address,
        deadline: U256,
    },
}

impl SwapIntent {
    pub fn kind(&self) -> SwapKind {
        match self {
            SwapIntent::NativeForTokens { .. } => SwapKind::NativeForTokens,
            SwapIntent::TokensForNative { .. } => SwapKind::TokensForNative,
            SwapIntent::TokensForTokens { .. } => SwapKind::TokensForTokens,
        }
    }

    /// Master input amount, `None` for native-input swaps.
    pub fn amount_in(&self) -> Option<U256> {
        match self {
            SwapIntent::NativeForTokens { .. } => None,
            SwapIntent::TokensForNative { amount_in, .. }
            | SwapIntent::TokensForTokens { amount_in, .. } => Some(*amount_in),
        }
    }

    /// Native value the master attached, only present for native-input swaps.
    pub fn attached_value(&self) -> Option<U256> {
        match self {
            SwapIntent::NativeForTokens { attached_value, .. } => Some(*attached_value),
            _ => None,
        }
    }

    pub fn amount_out_min(&self) -> U256 {
        match self {
            SwapIntent::NativeForTokens { amount_out_min, .. }
            | SwapIntent::TokensForNative { amount_out_min, .. }
            | SwapIntent::TokensForTokens { amount_out_min, .. } => *amount_out_min,
        }
    }

    pub fn path(&self) -> &[Address] {
        match self {
            SwapIntent::NativeForTokens { path, .. }
            | SwapIntent::TokensForNative { path, .. }
            | SwapIntent::TokensForTokens { path, .. } => path,
        }
    }

    pub fn into_path(self) -> Vec<Address> {
        match self {
            SwapIntent::NativeForTokens { path, .. }
            | SwapIntent::TokensForNative { path, .. }
            | SwapIntent::TokensForTokens { path, .. } => path,
        }
    }

    /// ERC20 sold by the swap, if the input is not native.
    pub fn sold_token(&self) -> Option<Address> {
        if self.kind().spends_token() {
            self.path().first().copied()
        } else {
            None
        }
    }
}

/// Follower-side order derived from a [`SwapIntent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicaOrder {
    pub kind: SwapKind,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub recipient: Address,
    pub deadline: U256,
}

impl ReplicaOrder {
    pub fn sold_token(&self) -> Option<Address> {
        if self.kind.spends_token() {
            self.path.first().copied()
        } else {
            None
        }
    }
}
