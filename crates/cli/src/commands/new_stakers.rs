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

use std::path::PathBuf;

use alloy::providers::Provider;
use anyhow::{ensure, Context};
use clap::Args;
use ton_staking::{
    fetch_block_timestamps, fetch_staking_events, first_deposits, format_block_time, new_stakers,
    StakingEvent, StakingEventKind,
};

use crate::{
    config::GlobalConfig,
    export::{create_report, file_timestamp, write_csv, NewStakerRow},
};

/// Command to list stakers that joined after an event started.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct NewStakers {
    /// First block of the pre-event history. Defaults to the DepositManager deployment block.
    #[clap(long)]
    pub created_block: Option<u64>,
    /// First block of the event.
    #[clap(long)]
    pub event_start_block: u64,
    /// Last block to scan. Defaults to the current head.
    #[clap(long)]
    pub to_block: Option<u64>,
    /// Directory for the CSV file.
    #[clap(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl NewStakers {
    /// Run the [NewStakers] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.provider()?;
        let deployment = global_config.resolve_deployment(&provider).await?;
        let created_block = self
            .created_block
            .or(deployment.deployment_block)
            .context("--created-block is required when the deployment block is unknown")?;
        let to_block = match self.to_block {
            Some(block) => block,
            None => provider.get_block_number().await.context("failed to get head block")?,
        };
        ensure!(
            created_block <= self.event_start_block && self.event_start_block <= to_block,
            "expected --created-block <= --event-start-block <= --to-block"
        );

        // Both ranges are served by a single scan.
        let events = fetch_staking_events(
            &provider,
            deployment.deposit_manager_address,
            &[StakingEventKind::Deposited],
            created_block,
            to_block,
            global_config.chunk_size,
        )
        .await?;
        let (before, since) = split_at_event_start(&events, self.event_start_block);
        let joined = new_stakers(&first_deposits(&before), &first_deposits(&since));
        tracing::info!("Found {} new stakers", joined.len());

        let timestamps =
            fetch_block_timestamps(&provider, joined.iter().map(|(_, block)| *block)).await?;
        let mut rows = Vec::with_capacity(joined.len());
        for (address, block) in joined {
            let timestamp = timestamps
                .get(&block)
                .with_context(|| format!("missing timestamp of block {block}"))?;
            let date = format_block_time(*timestamp)?;
            tracing::info!("{address}: {block}, {date}");
            rows.push(NewStakerRow {
                address: address.to_string(),
                first_deposit_block: block,
                date,
            });
        }
        tracing::info!("Current block: {to_block}");

        let (path, file) =
            create_report(&self.out_dir, &format!("new_stakers_{}.csv", file_timestamp()))?;
        write_csv(file, &rows)?;
        tracing::info!("CSV file saved: {}", path.display());

        Ok(())
    }
}

/// Split deposits into the pre-event range `[.., event_start]` and the event range
/// `[event_start - 1, ..]`. The two ranges overlap by two blocks.
fn split_at_event_start(
    events: &[StakingEvent],
    event_start: u64,
) -> (Vec<StakingEvent>, Vec<StakingEvent>) {
    let before = events.iter().filter(|e| e.block_number <= event_start).cloned().collect();
    let since = events
        .iter()
        .filter(|e| e.block_number >= event_start.saturating_sub(1))
        .cloned()
        .collect();
    (before, since)
}
