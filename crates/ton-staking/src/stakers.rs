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

//! Staker set reconstruction from deposit history.

use std::collections::{BTreeMap, HashMap};

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::Filter,
    sol_types::SolEvent,
};
use anyhow::{Context, Result};

use crate::{
    contracts::{decode_logs, ISeigManager, IStakeTON},
    events::{StakingEvent, StakingEventKind},
    query_logs_chunked,
};

/// A staker and its staked amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakerAmount {
    pub address: Address,
    pub amount: U256,
}

/// Depositors found in a set of events, with the block of their first deposit.
pub fn first_deposits(events: &[StakingEvent]) -> BTreeMap<Address, u64> {
    let mut first: BTreeMap<Address, u64> = BTreeMap::new();
    for event in events.iter().filter(|e| e.kind == StakingEventKind::Deposited) {
        first
            .entry(event.depositor)
            .and_modify(|block| *block = (*block).min(event.block_number))
            .or_insert(event.block_number);
    }
    first
}

/// Depositors of `recent` that do not appear in `original`, ordered by first deposit block.
pub fn new_stakers(
    original: &BTreeMap<Address, u64>,
    recent: &BTreeMap<Address, u64>,
) -> Vec<(Address, u64)> {
    let mut new: Vec<(Address, u64)> = recent
        .iter()
        .filter(|(addr, _)| !original.contains_key(*addr))
        .map(|(addr, block)| (*addr, *block))
        .collect();
    new.sort_by_key(|(addr, block)| (*block, *addr));
    new
}

/// Sort stakers by amount, largest first. Ties are ordered by address.
pub fn rank(mut stakers: Vec<StakerAmount>) -> Vec<StakerAmount> {
    stakers.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.address.cmp(&b.address)));
    stakers
}

/// Sum of all staked amounts.
pub fn total_staked(stakers: &[StakerAmount]) -> U256 {
    stakers.iter().fold(U256::ZERO, |acc, s| acc + s.amount)
}

/// Read `stakeOf` for each account from the SeigManager, returning stakers ranked by amount.
///
/// If `block` is set, balances are read at that block.
pub async fn fetch_stakes<P: Provider>(
    provider: &P,
    seig_manager: Address,
    accounts: &[Address],
    block: Option<u64>,
) -> Result<Vec<StakerAmount>> {
    let seig = ISeigManager::new(seig_manager, provider);
    let mut stakers = Vec::with_capacity(accounts.len());

    // Process in chunks to avoid hitting multicall limits
    const CHUNK_SIZE: usize = 100;
    for (chunk_idx, chunk) in accounts.chunks(CHUNK_SIZE).enumerate() {
        let mut multicall = provider.multicall().dynamic::<ISeigManager::stakeOfCall>();
        if let Some(block) = block {
            multicall = multicall.block(BlockId::number(block));
        }
        for &account in chunk {
            multicall = multicall.add_dynamic(seig.stakeOf(account));
        }

        let amounts: Vec<U256> = multicall
            .aggregate()
            .await
            .with_context(|| format!("failed to read stakes for chunk {chunk_idx}"))?;
        tracing::debug!(
            "Read stakes for {}/{} stakers",
            chunk_idx * CHUNK_SIZE + chunk.len(),
            accounts.len()
        );

        stakers.extend(
            chunk.iter().zip(amounts).map(|(&address, amount)| StakerAmount { address, amount }),
        );
    }

    Ok(rank(stakers))
}

/// Balances of the phase-1 StakeTON vaults at `snapshot_block`, summed per account.
///
/// Accounts are discovered from `Staked` events between `from_block` and `snapshot_block`.
pub async fn fetch_phase1_stakes<P: Provider>(
    provider: &P,
    contracts: &[Address],
    from_block: u64,
    snapshot_block: u64,
    chunk_size: u64,
) -> Result<Vec<StakerAmount>> {
    let mut balances: HashMap<Address, U256> = HashMap::new();

    for &contract in contracts {
        let filter =
            Filter::new().address(contract).event_signature(IStakeTON::Staked::SIGNATURE_HASH);
        let logs = query_logs_chunked(provider, filter, from_block, snapshot_block, chunk_size)
            .await
            .with_context(|| format!("failed to get Staked logs of {contract}"))?;

        let mut accounts: Vec<Address> = decode_logs::<IStakeTON::Staked>(&logs)?
            .into_iter()
            .map(|log| log.inner.data.to)
            .collect();
        accounts.sort();
        accounts.dedup();

        let vault = IStakeTON::new(contract, provider);
        let end_block = vault.endBlock().call().await?;
        tracing::info!(
            "StakeTON {contract}: {} stakers, end block {end_block}",
            accounts.len()
        );

        for account in accounts {
            let staked = vault
                .getUserStaked(account)
                .block(BlockId::number(snapshot_block))
                .call()
                .await
                .with_context(|| format!("failed to read stake of {account} in {contract}"))?;
            *balances.entry(account).or_default() += staked.amount;
        }
    }

    Ok(rank(
        balances.into_iter().map(|(address, amount)| StakerAmount { address, amount }).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, B256};

    use super::*;

    fn deposit(depositor: Address, block_number: u64) -> StakingEvent {
        StakingEvent {
            kind: StakingEventKind::Deposited,
            layer2: Address::ZERO,
            depositor,
            amount: U256::from(1),
            block_number,
            transaction_hash: B256::ZERO,
            log_index: 0,
        }
    }

    const ALICE: Address = address!("0x00000000000000000000000000000000000000a1");
    const BOB: Address = address!("0x00000000000000000000000000000000000000b0");
    const CAROL: Address = address!("0x00000000000000000000000000000000000000c0");

    #[test]
    fn first_deposits_keeps_earliest_block() {
        let mut withdrawal = deposit(BOB, 1);
        withdrawal.kind = StakingEventKind::WithdrawalRequested;
        let events = [deposit(ALICE, 30), deposit(ALICE, 10), deposit(BOB, 20), withdrawal];

        let first = first_deposits(&events);
        assert_eq!(first.len(), 2);
        assert_eq!(first[&ALICE], 10);
        assert_eq!(first[&BOB], 20);
    }

    #[test]
    fn new_stakers_excludes_original_and_orders_by_block() {
        let original = first_deposits(&[deposit(ALICE, 5)]);
        let recent = first_deposits(&[deposit(ALICE, 50), deposit(CAROL, 70), deposit(BOB, 60)]);

        assert_eq!(new_stakers(&original, &recent), vec![(BOB, 60), (CAROL, 70)]);
    }

    #[test]
    fn rank_orders_by_amount_descending() {
        let ranked = rank(vec![
            StakerAmount { address: ALICE, amount: U256::from(5) },
            StakerAmount { address: CAROL, amount: U256::from(9) },
            StakerAmount { address: BOB, amount: U256::from(5) },
        ]);
        let order: Vec<_> = ranked.iter().map(|s| s.address).collect();
        assert_eq!(order, vec![CAROL, ALICE, BOB]);
        assert_eq!(total_staked(&ranked), U256::from(19));
    }
}
