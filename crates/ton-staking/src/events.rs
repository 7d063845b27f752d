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

//! Event fetching and log querying utilities.

use std::collections::{HashMap, HashSet};

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::{BlockNumberOrTag, Filter, Log},
    sol_types::SolEvent,
};
use anyhow::{Context, Result};
use futures_util::future::try_join_all;

use crate::contracts::IDepositManager;

/// Query logs in chunks of at most `chunk_size` blocks to avoid hitting provider limits.
pub async fn query_logs_chunked<P: Provider>(
    provider: &P,
    filter: Filter,
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> Result<Vec<Log>> {
    anyhow::ensure!(chunk_size > 0, "chunk size must be positive");
    let total_chunks = to_block.saturating_sub(from_block).saturating_add(1).div_ceil(chunk_size);
    let mut all_logs = Vec::new();

    let mut current_from = from_block;
    let mut chunk_idx = 0;
    while current_from <= to_block {
        let current_to = current_from.saturating_add(chunk_size - 1).min(to_block);
        chunk_idx += 1;

        let chunk_filter = filter
            .clone()
            .from_block(BlockNumberOrTag::Number(current_from))
            .to_block(BlockNumberOrTag::Number(current_to));

        let logs = provider.get_logs(&chunk_filter).await.with_context(|| {
            format!("failed to query logs in blocks {current_from}..={current_to}")
        })?;
        tracing::debug!(
            "Chunk {chunk_idx}/{total_chunks}: blocks {current_from}..={current_to}, {} logs",
            logs.len()
        );
        all_logs.extend(logs);

        if current_to == u64::MAX {
            break;
        }
        current_from = current_to + 1;
    }

    Ok(all_logs)
}

/// Kind of a DepositManager event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StakingEventKind {
    Deposited,
    WithdrawalRequested,
    WithdrawalProcessed,
}

impl StakingEventKind {
    pub const ALL: [StakingEventKind; 3] = [
        StakingEventKind::Deposited,
        StakingEventKind::WithdrawalRequested,
        StakingEventKind::WithdrawalProcessed,
    ];

    pub fn signature_hash(&self) -> B256 {
        match self {
            Self::Deposited => IDepositManager::Deposited::SIGNATURE_HASH,
            Self::WithdrawalRequested => IDepositManager::WithdrawalRequested::SIGNATURE_HASH,
            Self::WithdrawalProcessed => IDepositManager::WithdrawalProcessed::SIGNATURE_HASH,
        }
    }

    pub fn from_topic(topic: &B256) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.signature_hash() == *topic)
    }

    /// Label used in exported tables.
    pub fn export_label(&self) -> &'static str {
        match self {
            Self::Deposited => "Deposited",
            Self::WithdrawalRequested => "Unstaking",
            Self::WithdrawalProcessed => "Withdrawal",
        }
    }
}

/// A decoded DepositManager event with its position in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingEvent {
    pub kind: StakingEventKind,
    pub layer2: Address,
    pub depositor: Address,
    pub amount: U256,
    pub block_number: u64,
    pub transaction_hash: B256,
    pub log_index: u64,
}

impl StakingEvent {
    /// Decode a DepositManager log. Returns `Ok(None)` for logs of other events.
    pub fn from_log(log: &Log) -> Result<Option<Self>> {
        let Some(kind) = log.topic0().and_then(StakingEventKind::from_topic) else {
            return Ok(None);
        };
        let (layer2, depositor, amount) = match kind {
            StakingEventKind::Deposited => {
                let event = log.log_decode::<IDepositManager::Deposited>()?.inner.data;
                (event.layer2, event.depositor, event.amount)
            }
            StakingEventKind::WithdrawalRequested => {
                let event = log.log_decode::<IDepositManager::WithdrawalRequested>()?.inner.data;
                (event.layer2, event.depositor, event.amount)
            }
            StakingEventKind::WithdrawalProcessed => {
                let event = log.log_decode::<IDepositManager::WithdrawalProcessed>()?.inner.data;
                (event.layer2, event.depositor, event.amount)
            }
        };
        Ok(Some(Self {
            kind,
            layer2,
            depositor,
            amount,
            block_number: log.block_number.context("log is missing block number")?,
            transaction_hash: log.transaction_hash.context("log is missing transaction hash")?,
            log_index: log.log_index.unwrap_or_default(),
        }))
    }
}

/// Filter for the given DepositManager events.
pub fn staking_filter(deposit_manager: Address, kinds: &[StakingEventKind]) -> Filter {
    Filter::new()
        .address(deposit_manager)
        .event_signature(kinds.iter().map(StakingEventKind::signature_hash).collect::<Vec<_>>())
}

/// Fetch and decode DepositManager events of the given kinds, ordered by block and log index.
pub async fn fetch_staking_events<P: Provider>(
    provider: &P,
    deposit_manager: Address,
    kinds: &[StakingEventKind],
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> Result<Vec<StakingEvent>> {
    tracing::info!(
        "Querying {} DepositManager event kind(s) in blocks {from_block}..={to_block}",
        kinds.len()
    );
    let logs = query_logs_chunked(
        provider,
        staking_filter(deposit_manager, kinds),
        from_block,
        to_block,
        chunk_size,
    )
    .await
    .context("failed to get DepositManager logs")?;

    let mut events = logs
        .iter()
        .filter_map(|log| StakingEvent::from_log(log).transpose())
        .collect::<Result<Vec<_>>>()?;
    events.sort_by_key(|event| (event.block_number, event.log_index));
    tracing::info!("Found {} DepositManager events", events.len());
    Ok(events)
}

/// Fetch the timestamps of the given blocks.
pub async fn fetch_block_timestamps<P: Provider>(
    provider: &P,
    block_numbers: impl IntoIterator<Item = u64>,
) -> Result<HashMap<u64, u64>> {
    let block_numbers: Vec<u64> =
        block_numbers.into_iter().collect::<HashSet<_>>().into_iter().collect();
    let mut timestamps = HashMap::with_capacity(block_numbers.len());

    // Process in chunks to avoid overwhelming the RPC
    const CHUNK_SIZE: usize = 100;
    for chunk in block_numbers.chunks(CHUNK_SIZE) {
        let futures: Vec<_> = chunk
            .iter()
            .map(|&block_num| async move {
                let block =
                    provider.get_block_by_number(BlockNumberOrTag::Number(block_num)).await?;
                Ok::<_, anyhow::Error>((block_num, block))
            })
            .collect();

        for (block_num, block) in try_join_all(futures).await? {
            match block {
                Some(block) => {
                    timestamps.insert(block_num, block.header.timestamp);
                }
                None => anyhow::bail!("Block {} not found", block_num),
            }
        }
    }

    Ok(timestamps)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;

    fn log_with(data: alloy::primitives::LogData, block: u64, index: u64) -> Log {
        Log {
            inner: alloy::primitives::Log { address: Address::ZERO, data },
            block_number: Some(block),
            transaction_hash: Some(b256!(
                "0x2222222222222222222222222222222222222222222222222222222222222222"
            )),
            log_index: Some(index),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_each_kind() {
        let layer2 = address!("0xf3B17FDB808c7d0Df9ACd24dA34700ce069007DF");
        let depositor = address!("0x00000000000000000000000000000000000000bb");
        let amount = U256::from(42);

        let logs = [
            log_with(
                IDepositManager::Deposited { layer2, depositor, amount }.encode_log_data(),
                10,
                0,
            ),
            log_with(
                IDepositManager::WithdrawalRequested { layer2, depositor, amount }
                    .encode_log_data(),
                11,
                1,
            ),
            log_with(
                IDepositManager::WithdrawalProcessed { layer2, depositor, amount }
                    .encode_log_data(),
                12,
                2,
            ),
        ];

        let kinds: Vec<_> = logs
            .iter()
            .map(|log| StakingEvent::from_log(log).unwrap().unwrap().kind)
            .collect();
        assert_eq!(kinds, StakingEventKind::ALL.to_vec());

        let event = StakingEvent::from_log(&logs[1]).unwrap().unwrap();
        assert_eq!(event.layer2, layer2);
        assert_eq!(event.depositor, depositor);
        assert_eq!(event.amount, amount);
        assert_eq!(event.block_number, 11);
        assert_eq!(event.kind.export_label(), "Unstaking");
    }

    #[test]
    fn ignores_unrelated_logs() {
        let log = log_with(
            alloy::primitives::LogData::new_unchecked(vec![B256::ZERO], Default::default()),
            1,
            0,
        );
        assert_eq!(StakingEvent::from_log(&log).unwrap(), None);
    }
}
