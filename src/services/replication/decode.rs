// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::DecodeError;
use crate::services::replication::intent::{SwapIntent, SwapKind};
use crate::services::replication::routers::UniV2Router;
use alloy::primitives::{Address, U256};
use alloy_sol_types::SolCall;

/// Classifies master router calls into [`SwapIntent`]s.
#[derive(Clone, Copy, Debug)]
pub struct SwapDecoder {
    wrapped_native: Address,
}

impl SwapDecoder {
    pub fn new(wrapped_native: Address) -> Self {
        Self { wrapped_native }
    }

    /// Decode `input` and check that any native leg routes through the
    /// configured wrapped-native token.
    pub fn decode(&self, input: &[u8], value: U256) -> Result<SwapIntent, DecodeError> {
        let intent = decode_swap_input(input, value)?;
        self.check_native_leg(&intent)?;
        Ok(intent)
    }

    fn check_native_leg(&self, intent: &SwapIntent) -> Result<(), DecodeError> {
        let native_leg = match intent.kind() {
            SwapKind::NativeForTokens => intent.path().first(),
            SwapKind::TokensForNative => intent.path().last(),
            SwapKind::TokensForTokens => None,
        };
        match native_leg {
            Some(found) if *found != self.wrapped_native => Err(DecodeError::NativeLegMismatch {
                function: intent.kind().function_name(),
                expected: self.wrapped_native,
                found: *found,
            }),
            _ => Ok(()),
        }
    }
}

/// Decode one of the three supported V2 router swaps from raw call data.
pub fn decode_swap_input(input: &[u8], value: U256) -> Result<SwapIntent, DecodeError> {
    let selector: [u8; 4] = input
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or(DecodeError::ShortInput(input.len()))?;

    let intent = match selector {
        UniV2Router::swapExactETHForTokensCall::SELECTOR => {
            let call = UniV2Router::swapExactETHForTokensCall::abi_decode(input)
                .map_err(|e| malformed(SwapKind::NativeForTokens, e))?;
            SwapIntent::NativeForTokens {
                amount_out_min: call.amountOutMin,
                path: call.path,
                recipient: call.to,
                deadline: call.deadline,
                attached_value: value,
            }
        }
        UniV2Router::swapExactTokensForETHCall::SELECTOR => {
            let call = UniV2Router::swapExactTokensForETHCall::abi_decode(input)
                .map_err(|e| malformed(SwapKind::TokensForNative, e))?;
            SwapIntent::TokensForNative {
                amount_in: call.amountIn,
                amount_out_min: call.amountOutMin,
                path: call.path,
                recipient: call.to,
                deadline: call.deadline,
            }
        }
        UniV2Router::swapExactTokensForTokensCall::SELECTOR => {
            let call = UniV2Router::swapExactTokensForTokensCall::abi_decode(input)
                .map_err(|e| malformed(SwapKind::TokensForTokens, e))?;
            SwapIntent::TokensForTokens {
                amount_in: call.amountIn,
                amount_out_min: call.amountOutMin,
                path: call.path,
                recipient: call.to,
                deadline: call.deadline,
            }
        }
        other => return Err(DecodeError::UnknownSelector(other)),
    };

    if intent.path().len() < 2 {
        return Err(DecodeError::ShortPath {
            function: intent.kind().function_name(),
            len: intent.path().len(),
        });
    }
    Ok(intent)
}

fn malformed(kind: SwapKind, err: alloy_sol_types::Error) -> DecodeError {
    DecodeError::Malformed {
        function: kind.function_name(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::WBNB_BSC;
    use alloy::primitives::address;

    const CAKE: Address = address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82");
    const BUSD: Address = address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56");
    const MASTER: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn decodes_native_for_tokens_and_keeps_attached_value() {
        let data = UniV2Router::swapExactETHForTokensCall {
            amountOutMin: U256::from(5u64),
            path: vec![WBNB_BSC, CAKE],
            to: MASTER,
            deadline: U256::from(100u64),
        }
        .abi_encode();

        let intent = SwapDecoder::new(WBNB_BSC)
            .decode(&data, U256::from(7u64))
            .expect("decode");
        assert_eq!(intent.kind(), SwapKind::NativeForTokens);
        assert_eq!(intent.amount_in(), None);
        assert_eq!(intent.amount_out_min(), U256::from(5u64));
        assert_eq!(intent.sold_token(), None);
        assert_eq!(intent.attached_value(), Some(U256::from(7u64)));
        match intent {
            SwapIntent::NativeForTokens { attached_value, .. } => {
                assert_eq!(attached_value, U256::from(7u64))
            }
            other => panic!("unexpected intent {other:?}"),
        }
    }

    #[test]
    fn decodes_token_input_variants() {
        let sell = UniV2Router::swapExactTokensForETHCall {
            amountIn: U256::from(1_000u64),
            amountOutMin: U256::from(200u64),
            path: vec![CAKE, WBNB_BSC],
            to: MASTER,
            deadline: U256::from(100u64),
        }
        .abi_encode();
        let intent = decode_swap_input(&sell, U256::ZERO).expect("sell");
        assert_eq!(intent.kind(), SwapKind::TokensForNative);
        assert_eq!(intent.amount_in(), Some(U256::from(1_000u64)));
        assert_eq!(intent.sold_token(), Some(CAKE));
        assert_eq!(intent.attached_value(), None);

        let rotate = UniV2Router::swapExactTokensForTokensCall {
            amountIn: U256::from(3u64),
            amountOutMin: U256::from(1u64),
            path: vec![CAKE, WBNB_BSC, BUSD],
            to: MASTER,
            deadline: U256::from(100u64),
        }
        .abi_encode();
        let intent = decode_swap_input(&rotate, U256::ZERO).expect("rotate");
        assert_eq!(intent.kind(), SwapKind::TokensForTokens);
        assert_eq!(intent.path(), &[CAKE, WBNB_BSC, BUSD]);
    }

    #[test]
    fn unknown_selector_is_reported() {
        let data = [0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 0];
        assert_eq!(
            decode_swap_input(&data, U256::ZERO),
            Err(DecodeError::UnknownSelector([0xde, 0xad, 0xbe, 0xef]))
        );
        assert_eq!(
            decode_swap_input(&[0x38, 0xed], U256::ZERO),
            Err(DecodeError::ShortInput(2))
        );
    }

    #[test]
    fn truncated_arguments_are_malformed() {
        let mut data = UniV2Router::swapExactTokensForTokensCall {
            amountIn: U256::from(3u64),
            amountOutMin: U256::from(1u64),
            path: vec![CAKE, BUSD],
            to: MASTER,
            deadline: U256::from(100u64),
        }
        .abi_encode();
        data.truncate(40);
        assert!(matches!(
            decode_swap_input(&data, U256::ZERO),
            Err(DecodeError::Malformed {
                function: "swapExactTokensForTokens",
                ..
            })
        ));
    }

    #[test]
    fn single_token_path_is_rejected() {
        let data = UniV2Router::swapExactTokensForTokensCall {
            amountIn: U256::from(3u64),
            amountOutMin: U256::from(1u64),
            path: vec![CAKE],
            to: MASTER,
            deadline: U256::from(100u64),
        }
        .abi_encode();
        assert_eq!(
            decode_swap_input(&data, U256::ZERO),
            Err(DecodeError::ShortPath {
                function: "swapExactTokensForTokens",
                len: 1
            })
        );
    }

    #[test]
    fn native_leg_must_be_wrapped_native() {
        let data = UniV2Router::swapExactTokensForETHCall {
            amountIn: U256::from(1u64),
            amountOutMin: U256::from(1u64),
            path: vec![CAKE, BUSD],
            to: MASTER,
            deadline: U256::from(100u64),
        }
        .abi_encode();
        assert_eq!(
            SwapDecoder::new(WBNB_BSC).decode(&data, U256::ZERO),
            Err(DecodeError::NativeLegMismatch {
                function: "swapExactTokensForETH",
                expected: WBNB_BSC,
                found: BUSD,
            })
        );
    }
}
