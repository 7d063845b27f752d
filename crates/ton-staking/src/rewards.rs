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

//! Seigniorage reward accrual of a staker on one layer2.

use alloy::{
    eips::BlockId,
    primitives::{Address, I256, U256},
    providers::Provider,
    rpc::types::Filter,
    sol_types::SolEvent,
};
use anyhow::{Context, Result};

use crate::{
    contracts::{ICoinage, IDepositManager, ISeigManager},
    events::{StakingEvent, StakingEventKind},
    query_logs_chunked,
};

/// Coinage balance of a staker around one `Comitted` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReward {
    pub block_number: u64,
    /// Balance at `block_number - 1`.
    pub balance_before: U256,
    /// Balance at `block_number`.
    pub balance_after: U256,
}

impl CommitReward {
    /// Balance change caused by the commit block. Negative when the staker withdrew in it.
    pub fn delta(&self) -> I256 {
        I256::from_raw(self.balance_after).wrapping_sub(I256::from_raw(self.balance_before))
    }
}

/// Reward history of a staker on a layer2.
#[derive(Debug, Clone)]
pub struct RewardHistory {
    pub staker: Address,
    pub layer2: Address,
    pub coinage: Address,
    pub first_deposit_block: u64,
    pub rewards: Vec<CommitReward>,
}

impl RewardHistory {
    pub fn total(&self) -> I256 {
        self.rewards.iter().fold(I256::ZERO, |acc, r| acc.wrapping_add(r.delta()))
    }
}

/// First block in which `staker` deposited to `layer2`, if any.
pub fn first_deposit_block(events: &[StakingEvent], staker: Address, layer2: Address) -> Option<u64> {
    events
        .iter()
        .filter(|e| {
            e.kind == StakingEventKind::Deposited && e.depositor == staker && e.layer2 == layer2
        })
        .map(|e| e.block_number)
        .min()
}

/// Reconstruct the coinage balance change of `staker` on `layer2` at every `Comitted` block since
/// its first deposit in `[from_block, to_block]`.
///
/// Returns `None` when the staker never deposited to the layer2 in that range. Requires an
/// archive node.
#[allow(clippy::too_many_arguments)]
pub async fn compute_reward_history<P: Provider>(
    provider: &P,
    deposit_manager: Address,
    seig_manager: Address,
    staker: Address,
    layer2: Address,
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> Result<Option<RewardHistory>> {
    let deposit_filter = Filter::new()
        .address(deposit_manager)
        .event_signature(IDepositManager::Deposited::SIGNATURE_HASH)
        .topic1(layer2.into_word());
    let deposit_logs =
        query_logs_chunked(provider, deposit_filter, from_block, to_block, chunk_size)
            .await
            .context("failed to get Deposited logs")?;
    let deposits = deposit_logs
        .iter()
        .filter_map(|log| StakingEvent::from_log(log).transpose())
        .collect::<Result<Vec<_>>>()?;

    let Some(first_deposit_block) = first_deposit_block(&deposits, staker, layer2) else {
        tracing::warn!("{staker} has no deposit to {layer2} in blocks {from_block}..={to_block}");
        return Ok(None);
    };
    tracing::info!("First deposit of {staker} to {layer2} at block {first_deposit_block}");

    let commit_filter = Filter::new()
        .address(seig_manager)
        .event_signature(ISeigManager::Comitted::SIGNATURE_HASH)
        .topic1(layer2.into_word());
    let commit_logs =
        query_logs_chunked(provider, commit_filter, first_deposit_block, to_block, chunk_size)
            .await
            .context("failed to get Comitted logs")?;
    let mut commit_blocks: Vec<u64> =
        commit_logs.iter().filter_map(|log| log.block_number).collect();
    commit_blocks.sort_unstable();
    commit_blocks.dedup();
    tracing::info!("Found {} commits of {layer2}", commit_blocks.len());

    let coinage_address = ISeigManager::new(seig_manager, provider)
        .coinages(layer2)
        .call()
        .await
        .with_context(|| format!("failed to get coinage of {layer2}"))?;
    let coinage = ICoinage::new(coinage_address, provider);

    let mut rewards = Vec::with_capacity(commit_blocks.len());
    for block_number in commit_blocks {
        let before_block = block_number.saturating_sub(1);
        let balance_before = coinage
            .balanceOf(staker)
            .block(BlockId::number(before_block))
            .call()
            .await
            .with_context(|| format!("failed to read balance at block {before_block}"))?;
        let balance_after = coinage
            .balanceOf(staker)
            .block(BlockId::number(block_number))
            .call()
            .await
            .with_context(|| format!("failed to read balance at block {block_number}"))?;
        rewards.push(CommitReward { block_number, balance_before, balance_after });
    }

    Ok(Some(RewardHistory {
        staker,
        layer2,
        coinage: coinage_address,
        first_deposit_block,
        rewards,
    }))
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{address, LogData, B256},
        providers::ProviderBuilder,
        rpc::types::Log,
        transports::mock::Asserter,
    };

    use super::*;

    fn rpc_log(address: Address, data: LogData, block_number: u64) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            block_number: Some(block_number),
            transaction_hash: Some(B256::repeat_byte(1)),
            log_index: Some(0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failed_read_at_genesis_commit_names_block_zero() {
        let deposit_manager = Address::repeat_byte(0xd0);
        let seig_manager = Address::repeat_byte(0x5e);
        let coinage = Address::repeat_byte(0xc0);
        let staker = Address::repeat_byte(0xa1);
        let layer2 = Address::repeat_byte(0x12);

        let asserter = Asserter::new();
        let deposited =
            IDepositManager::Deposited { layer2, depositor: staker, amount: U256::from(1) };
        asserter.push_success(&vec![rpc_log(deposit_manager, deposited.encode_log_data(), 0)]);
        let comitted = ISeigManager::Comitted { layer2 };
        asserter.push_success(&vec![rpc_log(seig_manager, comitted.encode_log_data(), 0)]);
        asserter.push_success(&coinage.into_word());
        asserter.push_failure_msg("header not found");

        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter);
        let err = compute_reward_history(
            &provider,
            deposit_manager,
            seig_manager,
            staker,
            layer2,
            0,
            0,
            100,
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to read balance at block 0"));
    }

    #[test]
    fn delta_and_total() {
        let history = RewardHistory {
            staker: Address::ZERO,
            layer2: Address::ZERO,
            coinage: Address::ZERO,
            first_deposit_block: 1,
            rewards: vec![
                CommitReward {
                    block_number: 10,
                    balance_before: U256::from(100),
                    balance_after: U256::from(130),
                },
                CommitReward {
                    block_number: 20,
                    balance_before: U256::from(130),
                    balance_after: U256::from(120),
                },
            ],
        };
        assert_eq!(history.rewards[0].delta(), I256::try_from(30).unwrap());
        assert_eq!(history.rewards[1].delta(), I256::try_from(-10).unwrap());
        assert_eq!(history.total(), I256::try_from(20).unwrap());
    }

    #[test]
    fn first_deposit_matches_staker_and_layer2() {
        let staker = address!("0x00000000000000000000000000000000000000a1");
        let layer2 = address!("0x36101b31e74c5E8f9a9cec378407Bbb776287761");
        let event = |depositor, layer2, block_number| StakingEvent {
            kind: StakingEventKind::Deposited,
            layer2,
            depositor,
            amount: U256::from(1),
            block_number,
            transaction_hash: B256::ZERO,
            log_index: 0,
        };
        let events = [
            event(staker, Address::ZERO, 5),
            event(Address::ZERO, layer2, 6),
            event(staker, layer2, 9),
            event(staker, layer2, 7),
        ];
        assert_eq!(first_deposit_block(&events, staker, layer2), Some(7));
        assert_eq!(first_deposit_block(&events, staker, Address::repeat_byte(1)), None);
    }
}
