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

//! Incremental event watcher.
//!
//! Each iteration resolves a bounded block window after the checkpoint, collects the monitored
//! logs in it, renders one message per transaction, hands the messages to the sink and only then
//! advances the checkpoint. Any failure leaves the checkpoint untouched so the same window is
//! retried after the cooldown. Delivery is therefore at-least-once.

use std::{collections::HashMap, time::Duration};

use alloy::{
    primitives::{Address, B256},
    rpc::types::Log,
};
use anyhow::{ensure, Context, Result};

use crate::{
    chain::{ChainSourceObj, TxReceipt},
    checkpoint::{CheckpointError, CheckpointStoreObj},
    format::{message_prefix, EventFormatter},
    notify::{Delivery, NotificationSinkObj},
};

pub type EventFormatterObj = Box<dyn EventFormatter + Send + Sync>;

/// Default pause after a failed or idle iteration.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// The logs a watcher is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub address: Address,
    pub topics: Vec<B256>,
    /// Maximum number of blocks queried per iteration.
    pub window: u64,
}

impl EventFilter {
    pub fn matches(&self, log: &Log) -> bool {
        log.address() == self.address
            && log.topic0().map(|topic| self.topics.contains(topic)).unwrap_or(false)
    }
}

#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// Contract whose events are watched.
    pub address: Address,
    /// Maximum number of blocks queried per iteration.
    pub window: u64,
    /// Pause after a failed or idle iteration.
    pub cooldown: Duration,
    /// First block to process when no checkpoint is stored. Defaults to the blocks after the
    /// current head.
    pub start_block: Option<u64>,
}

/// Outcome of a single iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// No new block after the checkpoint.
    Idle,
    /// The window `from_block..=to_block` was processed and checkpointed.
    Advanced { from_block: u64, to_block: u64, messages: usize },
}

pub struct EventWatcher {
    chain: ChainSourceObj,
    checkpoint_store: CheckpointStoreObj,
    sink: NotificationSinkObj,
    formatter: EventFormatterObj,
    filter: EventFilter,
    config: WatcherConfig,
    checkpoint: Option<u64>,
}

impl EventWatcher {
    pub fn new(
        config: WatcherConfig,
        chain: ChainSourceObj,
        checkpoint_store: CheckpointStoreObj,
        sink: NotificationSinkObj,
        formatter: EventFormatterObj,
    ) -> Result<Self> {
        ensure!(config.window > 0, "block window must be positive");
        let topics = formatter.topics();
        ensure!(!topics.is_empty(), "formatter monitors no events");
        let filter = EventFilter { address: config.address, topics, window: config.window };
        Ok(Self { chain, checkpoint_store, sink, formatter, filter, config, checkpoint: None })
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Last fully processed block, if already resolved.
    pub fn checkpoint(&self) -> Option<u64> {
        self.checkpoint
    }

    /// Run iterations forever. Failed iterations are logged and retried after the cooldown.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            "Watching {} for {} event(s), window {} blocks",
            self.filter.address,
            self.filter.topics.len(),
            self.filter.window
        );
        loop {
            match self.step().await {
                Ok(Step::Advanced { .. }) => {}
                Ok(Step::Idle) => {
                    tracing::debug!(
                        "No new blocks, sleeping for {} seconds",
                        self.config.cooldown.as_secs()
                    );
                    tokio::time::sleep(self.config.cooldown).await;
                }
                Err(e) => {
                    tracing::error!("Error processing events: {:?}", e);
                    tracing::info!("Retrying in {} seconds", self.config.cooldown.as_secs());
                    tokio::time::sleep(self.config.cooldown).await;
                }
            }
        }
    }

    /// Process the next window after the checkpoint.
    pub async fn step(&mut self) -> Result<Step> {
        let checkpoint = self.resolve_checkpoint().await?;
        let from_block = checkpoint.saturating_add(1);
        let head = self.chain.head().await?;
        let to_block = head.min(from_block.saturating_add(self.filter.window - 1));
        if to_block < from_block {
            return Ok(Step::Idle);
        }
        tracing::info!("Processing blocks {from_block}..={to_block}");

        let logs = self
            .chain
            .logs(self.filter.address, &self.filter.topics, from_block, to_block)
            .await?;
        let groups = group_by_transaction(&logs, &self.filter);
        tracing::debug!("Found {} logs in {} transactions", logs.len(), groups.len());

        let mut messages = Vec::with_capacity(groups.len());
        for (tx_hash, _) in &groups {
            if let Some(message) = self.build_message(*tx_hash).await? {
                messages.push(message);
            }
        }

        for message in &messages {
            match self.sink.send(message).await? {
                Delivery::Delivered => tracing::debug!("Delivered message:\n{message}"),
                Delivery::Rejected(reason) => {
                    tracing::warn!("Notification rejected: {reason}\n{message}")
                }
            }
        }

        self.checkpoint_store
            .save(to_block)
            .await
            .with_context(|| format!("failed to save checkpoint {to_block}"))?;
        self.checkpoint = Some(to_block);
        tracing::info!(
            "Processed blocks {from_block}..={to_block}, sent {} messages",
            messages.len()
        );

        Ok(Step::Advanced { from_block, to_block, messages: messages.len() })
    }

    async fn resolve_checkpoint(&mut self) -> Result<u64> {
        if let Some(checkpoint) = self.checkpoint {
            return Ok(checkpoint);
        }
        let stored = match self.checkpoint_store.load().await {
            Ok(stored) => stored,
            Err(CheckpointError::BadCheckpoint(contents)) => {
                tracing::warn!("Ignoring corrupt checkpoint {contents}");
                None
            }
            Err(e) => return Err(e).context("failed to load checkpoint"),
        };
        let checkpoint = match (stored, self.config.start_block) {
            (Some(block), _) => block,
            (None, Some(start_block)) => start_block.saturating_sub(1),
            (None, None) => self.chain.head().await?,
        };
        tracing::info!("Starting after block {checkpoint}");
        self.checkpoint = Some(checkpoint);
        Ok(checkpoint)
    }

    /// Render the message of one transaction. `None` when no event of it renders a line.
    async fn build_message(&self, tx_hash: B256) -> Result<Option<String>> {
        let receipt: TxReceipt = self.chain.receipt(tx_hash).await?;

        let mut lines = Vec::new();
        for log in receipt.logs.iter().filter(|log| self.filter.matches(log)) {
            if let Some(line) = self.formatter.format_event(&receipt, log).await? {
                lines.push(line);
            }
        }
        if lines.is_empty() {
            tracing::debug!("No notification for tx 0x{tx_hash:x}");
            return Ok(None);
        }

        let timestamp = self.chain.block_timestamp(receipt.block_number).await?;
        Ok(Some(format!("{}{}", message_prefix(timestamp)?, lines.join("\n"))))
    }
}

/// Group the logs matching `filter` by transaction, in order of first appearance.
pub fn group_by_transaction<'a>(
    logs: &'a [Log],
    filter: &EventFilter,
) -> Vec<(B256, Vec<&'a Log>)> {
    let mut groups: Vec<(B256, Vec<&Log>)> = Vec::new();
    let mut index: HashMap<B256, usize> = HashMap::new();
    for log in logs.iter().filter(|log| filter.matches(log)) {
        let Some(tx_hash) = log.transaction_hash else {
            tracing::warn!("Skipping log without transaction hash: {log:?}");
            continue;
        };
        match index.get(&tx_hash) {
            Some(&i) => groups[i].1.push(log),
            None => {
                index.insert(tx_hash, groups.len());
                groups.push((tx_hash, vec![log]));
            }
        }
    }
    groups
}
