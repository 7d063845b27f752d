// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Smart contract interfaces for the Tokamak staking contracts and the Uniswap V3 position
//! manager.

use std::fmt::Debug;

use alloy::{rpc::types::Log, sol_types::SolEvent};
use anyhow::{Context, Result};

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface IDepositManager {
        event Deposited(address indexed layer2, address depositor, uint256 amount);
        event WithdrawalRequested(address indexed layer2, address depositor, uint256 amount);
        event WithdrawalProcessed(address indexed layer2, address depositor, uint256 amount);
    }
}

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface ISeigManager {
        event Comitted(address indexed layer2);

        function stakeOf(address account) external view returns (uint256);
        function coinages(address layer2) external view returns (address);
    }
}

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface ICoinage {
        function balanceOf(address account) external view returns (uint256);
    }
}

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface IStakeTON {
        event Staked(address indexed to, uint256 amount);

        function endBlock() external view returns (uint256);
        function getUserStaked(address user) external view returns (
            uint256 amount,
            uint256 claimedBlock,
            uint256 claimedAmount,
            uint256 releasedBlock,
            uint256 releasedAmount,
            uint256 releasedTOSAmount,
            bool released
        );
    }
}

alloy::sol! {
    #[sol(rpc, all_derives)]
    interface INonfungiblePositionManager {
        event IncreaseLiquidity(uint256 indexed tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);
        event DecreaseLiquidity(uint256 indexed tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);

        function positions(uint256 tokenId) external view returns (
            uint96 nonce,
            address operator,
            address token0,
            address token1,
            uint24 fee,
            int24 tickLower,
            int24 tickUpper,
            uint128 liquidity,
            uint256 feeGrowthInside0LastX128,
            uint256 feeGrowthInside1LastX128,
            uint128 tokensOwed0,
            uint128 tokensOwed1
        );
    }
}

/// Decode every log in `logs` whose first topic is the signature of `E`.
///
/// Logs with a different signature are skipped. A log that carries the signature but fails to
/// decode is an error.
pub fn decode_logs<E: SolEvent + Debug + Clone>(logs: &[Log]) -> Result<Vec<Log<E>>> {
    logs.iter()
        .filter_map(|log| {
            if log.topic0().map(|topic| E::SIGNATURE_HASH == *topic).unwrap_or(false) {
                Some(
                    log.log_decode::<E>()
                        .with_context(|| format!("failed to decode event {}", E::SIGNATURE)),
                )
            } else {
                tracing::trace!("skipping log; does not match {}: {log:?}", E::SIGNATURE);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256, U256};

    use super::*;

    #[test]
    fn decode_logs_skips_other_signatures() {
        let layer2 = address!("0x0F42D1C40b95DF7A1478639918fc358B4aF5298D");
        let depositor = address!("0x00000000000000000000000000000000000000aa");
        let deposited = IDepositManager::Deposited { layer2, depositor, amount: U256::from(7) };
        let requested =
            IDepositManager::WithdrawalRequested { layer2, depositor, amount: U256::from(3) };

        let logs: Vec<Log> = [deposited.encode_log_data(), requested.encode_log_data()]
            .into_iter()
            .enumerate()
            .map(|(i, data)| Log {
                inner: alloy::primitives::Log { address: Default::default(), data },
                transaction_hash: Some(b256!(
                    "0x1111111111111111111111111111111111111111111111111111111111111111"
                )),
                log_index: Some(i as u64),
                ..Default::default()
            })
            .collect();

        let decoded = decode_logs::<IDepositManager::Deposited>(&logs).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].inner.data.layer2, layer2);
        assert_eq!(decoded[0].inner.data.depositor, depositor);
        assert_eq!(decoded[0].inner.data.amount, U256::from(7));
        assert_eq!(decoded[0].log_index, Some(0));
    }
}
