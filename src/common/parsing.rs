// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::Address;
use std::str::FromStr;

pub fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    let trimmed = strip_0x(s.trim());
    if trimmed.len() != 40 {
        return None;
    }
    Address::from_str(trimmed).ok()
}

/// Parse a comma separated address list, ignoring blank entries.
/// Returns the first entry that fails to parse as the error.
pub fn parse_address_list(raw: &str) -> Result<Vec<Address>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_address_hex(part).ok_or_else(|| part.to_string()))
        .collect()
}

/// Normalise a hex private key to the `0x`-less form expected by the signer.
pub fn normalize_private_key(raw: &str) -> &str {
    strip_0x(raw.trim())
}
