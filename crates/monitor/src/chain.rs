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

use std::sync::Arc;

use alloy::{
    primitives::{Address, B256},
    providers::Provider,
    rpc::types::{BlockNumberOrTag, Filter, Log},
};
use anyhow::{Context, Result};
use async_trait::async_trait;

pub use ton_staking::provider::{build_provider, ProviderType};

pub type ChainSourceObj = Arc<dyn ChainSource + Send + Sync>;

/// Receipt of a transaction, reduced to what the watcher needs.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    /// Sender of the transaction.
    pub from: Address,
    pub block_number: u64,
    /// Every log emitted by the transaction, in log order.
    pub logs: Vec<Log>,
}

/// Read access to the chain.
#[async_trait]
pub trait ChainSource {
    /// Current head block number.
    async fn head(&self) -> Result<u64>;

    /// Logs emitted by `address` with one of `topics` as first topic, in `[from_block, to_block]`.
    async fn logs(
        &self,
        address: Address,
        topics: &[B256],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>>;

    async fn receipt(&self, tx_hash: B256) -> Result<TxReceipt>;

    /// Unix timestamp of a block.
    async fn block_timestamp(&self, block_number: u64) -> Result<u64>;
}

/// [ChainSource] backed by an alloy [Provider].
#[derive(Clone)]
pub struct ProviderChain<P> {
    provider: P,
}

impl<P: Provider> ProviderChain<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> ChainSource for ProviderChain<P>
where
    P: Provider + Send + Sync,
{
    async fn head(&self) -> Result<u64> {
        self.provider.get_block_number().await.context("failed to get head block number")
    }

    async fn logs(
        &self,
        address: Address,
        topics: &[B256],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>> {
        let filter = Filter::new()
            .address(address)
            .event_signature(topics.to_vec())
            .from_block(BlockNumberOrTag::Number(from_block))
            .to_block(BlockNumberOrTag::Number(to_block));
        self.provider
            .get_logs(&filter)
            .await
            .with_context(|| format!("failed to get logs in blocks {from_block}..={to_block}"))
    }

    async fn receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .with_context(|| format!("failed to get receipt of 0x{tx_hash:x}"))?
            .with_context(|| format!("receipt of 0x{tx_hash:x} not found"))?;
        Ok(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            from: receipt.from,
            block_number: receipt
                .block_number
                .with_context(|| format!("receipt of 0x{tx_hash:x} is pending"))?,
            logs: receipt.inner.logs().to_vec(),
        })
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
            .with_context(|| format!("failed to get block {block_number}"))?
            .with_context(|| format!("block {block_number} not found"))?;
        Ok(block.header.timestamp)
    }
}
