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

//! In-memory collaborators for watcher tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use alloy::{
    primitives::{Address, LogData, B256, U256},
    rpc::types::Log,
    sol_types::SolEvent,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use ton_monitor::{
    format::{PositionRead, PositionReader},
    ChainSource, CheckpointError, CheckpointStore, Delivery, NotificationSink, TxReceipt,
};
use ton_staking::contracts::{IDepositManager, INonfungiblePositionManager};

/// DepositManager address used by the staking tests.
pub const DEPOSIT_MANAGER: Address =
    alloy::primitives::address!("0x56E465f654393fa48f007Ed7346105c7195CEe43");

/// Timestamp used for every block: 2021-01-01T00:00:00Z.
pub const BLOCK_TIMESTAMP: u64 = 1609459200;

#[derive(Default)]
struct ChainState {
    head: u64,
    logs: Vec<Log>,
    receipts: HashMap<B256, TxReceipt>,
    failing_log_queries: usize,
    log_queries: Vec<(u64, u64)>,
    receipt_fetches: Vec<B256>,
}

/// Chain with a fixed set of transactions, recording every query.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new(head: u64) -> Arc<Self> {
        let chain = Self::default();
        chain.set_head(head);
        Arc::new(chain)
    }

    pub fn set_head(&self, head: u64) {
        self.state.lock().unwrap().head = head;
    }

    /// Add a mined transaction emitting `logs`. Block number, transaction hash and log index are
    /// filled in.
    pub fn add_tx(&self, tx_hash: B256, from: Address, block_number: u64, logs: Vec<Log>) {
        let logs: Vec<Log> = logs
            .into_iter()
            .enumerate()
            .map(|(i, mut log)| {
                log.block_number = Some(block_number);
                log.transaction_hash = Some(tx_hash);
                log.log_index = Some(i as u64);
                log
            })
            .collect();
        let mut state = self.state.lock().unwrap();
        state.logs.extend(logs.iter().cloned());
        state
            .receipts
            .insert(tx_hash, TxReceipt { transaction_hash: tx_hash, from, block_number, logs });
    }

    /// Make the next `count` log queries fail.
    pub fn fail_log_queries(&self, count: usize) {
        self.state.lock().unwrap().failing_log_queries = count;
    }

    pub fn log_queries(&self) -> Vec<(u64, u64)> {
        self.state.lock().unwrap().log_queries.clone()
    }

    pub fn receipt_fetches(&self) -> Vec<B256> {
        self.state.lock().unwrap().receipt_fetches.clone()
    }
}

#[async_trait]
impl ChainSource for MockChain {
    async fn head(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().head)
    }

    async fn logs(
        &self,
        address: Address,
        _topics: &[B256],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>> {
        let mut state = self.state.lock().unwrap();
        state.log_queries.push((from_block, to_block));
        if state.failing_log_queries > 0 {
            state.failing_log_queries -= 1;
            bail!("connection reset");
        }
        let mut logs: Vec<Log> = state
            .logs
            .iter()
            .filter(|log| log.address() == address)
            .filter(|log| {
                log.block_number.is_some_and(|block| block >= from_block && block <= to_block)
            })
            .cloned()
            .collect();
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    async fn receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        state.receipt_fetches.push(tx_hash);
        state.receipts.get(&tx_hash).cloned().context("receipt not found")
    }

    async fn block_timestamp(&self, _block_number: u64) -> Result<u64> {
        Ok(BLOCK_TIMESTAMP)
    }
}

#[derive(Default)]
struct SinkState {
    messages: Vec<String>,
    attempts: usize,
    unreachable: bool,
    reject_all: bool,
}

/// Sink recording delivered messages.
#[derive(Default)]
pub struct RecordingSink {
    state: Mutex<SinkState>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    pub fn set_reject_all(&self, reject_all: bool) {
        self.state.lock().unwrap().reject_all = reject_all;
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<Delivery> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if state.unreachable {
            bail!("webhook unreachable");
        }
        if state.reject_all {
            return Ok(Delivery::Rejected("HTTP 500".to_string()));
        }
        state.messages.push(message.to_string());
        Ok(Delivery::Delivered)
    }
}

#[derive(Default)]
struct CheckpointState {
    stored: Option<String>,
    saves: Vec<u64>,
}

/// Checkpoint store kept in memory. Contents are kept as text so corruption can be simulated.
#[derive(Default)]
pub struct MemoryCheckpoint {
    state: Mutex<CheckpointState>,
}

impl MemoryCheckpoint {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn at(block: u64) -> Arc<Self> {
        Self::with_contents(&block.to_string())
    }

    pub fn with_contents(contents: &str) -> Arc<Self> {
        let store = Self::default();
        store.state.lock().unwrap().stored = Some(contents.to_string());
        Arc::new(store)
    }

    pub fn saves(&self) -> Vec<u64> {
        self.state.lock().unwrap().saves.clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn load(&self) -> Result<Option<u64>, CheckpointError> {
        match &self.state.lock().unwrap().stored {
            None => Ok(None),
            Some(contents) => contents
                .parse()
                .map(Some)
                .map_err(|_| CheckpointError::BadCheckpoint(contents.clone())),
        }
    }

    async fn save(&self, block: u64) -> Result<(), CheckpointError> {
        let mut state = self.state.lock().unwrap();
        state.stored = Some(block.to_string());
        state.saves.push(block);
        Ok(())
    }
}

/// Position reader answering from a fixed table. Unknown token ids fail like an unreachable node.
#[derive(Default)]
pub struct StaticPositions {
    positions: HashMap<U256, PositionRead>,
}

impl StaticPositions {
    pub fn new(positions: impl IntoIterator<Item = (u64, PositionRead)>) -> Arc<Self> {
        Arc::new(Self {
            positions: positions.into_iter().map(|(id, read)| (U256::from(id), read)).collect(),
        })
    }
}

#[async_trait]
impl PositionReader for StaticPositions {
    async fn position(&self, token_id: U256, _block_number: u64) -> Result<PositionRead> {
        self.positions.get(&token_id).cloned().context("position read failed")
    }
}

pub fn raw_log(address: Address, data: LogData) -> Log {
    Log { inner: alloy::primitives::Log { address, data }, ..Default::default() }
}

pub fn deposited(layer2: Address, depositor: Address, amount: U256) -> Log {
    raw_log(
        DEPOSIT_MANAGER,
        IDepositManager::Deposited { layer2, depositor, amount }.encode_log_data(),
    )
}

pub fn withdrawal_requested(layer2: Address, depositor: Address, amount: U256) -> Log {
    raw_log(
        DEPOSIT_MANAGER,
        IDepositManager::WithdrawalRequested { layer2, depositor, amount }.encode_log_data(),
    )
}

pub fn increase_liquidity(manager: Address, token_id: u64, liquidity: u128) -> Log {
    raw_log(
        manager,
        INonfungiblePositionManager::IncreaseLiquidity {
            tokenId: U256::from(token_id),
            liquidity,
            amount0: U256::ZERO,
            amount1: U256::ZERO,
        }
        .encode_log_data(),
    )
}

/// `value` TON in RAY units.
pub fn ton(value: u64) -> U256 {
    U256::from(value) * U256::from(10u64).pow(U256::from(27))
}

pub fn tx(n: u8) -> B256 {
    B256::repeat_byte(n)
}
