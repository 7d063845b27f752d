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

use std::collections::HashMap;

use alloy::{primitives::B256, rpc::types::Log};
use anyhow::Result;
use async_trait::async_trait;
use ton_staking::{
    events::{StakingEvent, StakingEventKind},
    format_amount, NameTable, TON_DECIMALS,
};

use super::{tx_link, EventFormatter};
use crate::chain::TxReceipt;

/// Renders DepositManager deposits and withdrawals.
pub struct StakingFormatter {
    labels: HashMap<B256, &'static str>,
    layer2_names: NameTable,
    explorer_url: String,
}

impl StakingFormatter {
    pub fn new(layer2_names: NameTable, explorer_url: impl Into<String>) -> Self {
        let labels = StakingEventKind::ALL
            .into_iter()
            .map(|kind| (kind.signature_hash(), notification_label(kind)))
            .collect();
        Self { labels, layer2_names, explorer_url: explorer_url.into() }
    }

    fn render(&self, label: &str, event: &StakingEvent) -> String {
        format!(
            "{} - depositor: `{}`, {}, `{}` TON",
            tx_link(&self.explorer_url, &event.transaction_hash, label),
            event.depositor,
            self.layer2_names.display(&event.layer2),
            format_amount(event.amount, TON_DECIMALS),
        )
    }
}

fn notification_label(kind: StakingEventKind) -> &'static str {
    match kind {
        StakingEventKind::Deposited => "Deposited",
        StakingEventKind::WithdrawalRequested => "Withdrawal Requested",
        StakingEventKind::WithdrawalProcessed => "Withdrawal Processed",
    }
}

#[async_trait]
impl EventFormatter for StakingFormatter {
    fn topics(&self) -> Vec<B256> {
        StakingEventKind::ALL.iter().map(StakingEventKind::signature_hash).collect()
    }

    async fn format_event(&self, receipt: &TxReceipt, log: &Log) -> Result<Option<String>> {
        let Some(label) = log.topic0().and_then(|topic| self.labels.get(topic)) else {
            return Ok(None);
        };
        match StakingEvent::from_log(log) {
            Ok(Some(event)) => Ok(Some(self.render(label, &event))),
            Ok(None) => Ok(None),
            Err(err) => {
                tracing::warn!(
                    "Skipping undecodable {label} log in tx 0x{:x}: {err:?}",
                    receipt.transaction_hash
                );
                Ok(None)
            }
        }
    }
}
