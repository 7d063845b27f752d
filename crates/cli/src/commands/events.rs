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
use anyhow::Context;
use clap::Args;
use ton_staking::{
    deployments::MAINNET_SEIGNIORAGE_PATCH_BLOCK, fetch_block_timestamps, fetch_staking_events,
    StakingEventKind, MAINNET,
};

use crate::{
    config::GlobalConfig,
    export::{create_report, event_rows, write_csv},
};

/// Command to export deposit and withdrawal events.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct ExportEvents {
    /// First block to scan. Defaults to the deployment block, or the seigniorage patch block on
    /// mainnet.
    #[clap(long)]
    pub from_block: Option<u64>,
    /// Last block to scan. Defaults to the current head.
    #[clap(long)]
    pub to_block: Option<u64>,
    /// Directory for the CSV file.
    #[clap(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl ExportEvents {
    /// Run the [ExportEvents] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.provider()?;
        let deployment = global_config.resolve_deployment(&provider).await?;
        let names = global_config.layer2_names()?;

        let is_mainnet = deployment.deposit_manager_address == MAINNET.deposit_manager_address;
        let default_from = if is_mainnet {
            Some(MAINNET_SEIGNIORAGE_PATCH_BLOCK)
        } else {
            deployment.deployment_block
        };
        let from_block = self
            .from_block
            .or(default_from)
            .context("--from-block is required when the deployment block is unknown")?;
        let to_block = match self.to_block {
            Some(block) => block,
            None => provider.get_block_number().await.context("failed to get head block")?,
        };

        let events = fetch_staking_events(
            &provider,
            deployment.deposit_manager_address,
            &StakingEventKind::ALL,
            from_block,
            to_block,
            global_config.chunk_size,
        )
        .await?;
        let timestamps =
            fetch_block_timestamps(&provider, events.iter().map(|e| e.block_number)).await?;
        let rows = event_rows(&events, &timestamps, &names)?;
        for row in &rows {
            tracing::debug!(
                "Block {} | {} | {} | {} | {} | {}",
                row.block_number,
                row.timestamp,
                row.event_type,
                row.layer2_name,
                row.depositor,
                row.amount_wton
            );
        }

        let (path, file) =
            create_report(&self.out_dir, &format!("events_{from_block}_{to_block}.csv"))?;
        write_csv(file, &rows)?;
        tracing::info!("Exported {} events to {}", rows.len(), path.display());

        Ok(())
    }
}
