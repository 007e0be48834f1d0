// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod config;
pub mod cursor;
pub mod decode;
pub mod dedup;
pub mod engine;
pub mod erc20;
pub mod filter;
pub mod intent;
pub mod routers;
pub mod sizing;
pub mod stats;
pub mod submitter;

pub use engine::CopyEngine;
