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

//! Rendering of decoded events into notification lines.

pub mod liquidity;
pub mod staking;

use alloy::{primitives::B256, rpc::types::Log};
use anyhow::Result;
use async_trait::async_trait;
use ton_staking::units::{format_block_time, DISPLAY_TZ_LABEL};

use crate::chain::TxReceipt;

pub use liquidity::{
    LiquidityFormatter, Position, PositionRead, PositionReader, PositionReaderObj,
    ProviderPositions,
};
pub use staking::StakingFormatter;

/// Default block explorer used in transaction links.
pub const DEFAULT_EXPLORER_URL: &str = "https://etherscan.io";

/// Turns monitored logs into notification lines.
#[async_trait]
pub trait EventFormatter {
    /// Topic hashes of the events this formatter renders.
    fn topics(&self) -> Vec<B256>;

    /// Render one monitored log of `receipt`.
    ///
    /// `Ok(None)` suppresses the event, for logs that fail to decode or are not of interest. An
    /// error aborts the whole iteration and is reserved for failed chain reads.
    async fn format_event(&self, receipt: &TxReceipt, log: &Log) -> Result<Option<String>>;
}

/// Timestamp prefix of a message, e.g. `2021-01-01 09:00:00+09:00(KST) `.
pub fn message_prefix(block_timestamp: u64) -> Result<String> {
    Ok(format!("{}({DISPLAY_TZ_LABEL}) ", format_block_time(block_timestamp)?))
}

/// Slack link to a transaction on the explorer, e.g. `<https://etherscan.io/tx/0x..|Deposited tx>`.
pub fn tx_link(explorer_url: &str, tx_hash: &B256, label: &str) -> String {
    format!("<{}/tx/{tx_hash:#x}|{label} tx>", explorer_url.trim_end_matches('/'))
}
