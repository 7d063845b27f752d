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
    fetch_stakes, fetch_staking_events, first_deposits, rank, StakingEventKind, TON_DECIMALS,
};

use crate::{
    config::GlobalConfig,
    export::{
        create_report, file_timestamp, ranking_lines, staker_rows, write_csv,
        write_stakers_summary, StakersSummary,
    },
};

/// Command to rank every depositor by current stake.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Stakers {
    /// First block to scan. Defaults to the DepositManager deployment block.
    #[clap(long)]
    pub from_block: Option<u64>,
    /// Last block to scan, also the block stakes are read at. Defaults to the current head.
    #[clap(long)]
    pub to_block: Option<u64>,
    /// Directory for the CSV and summary files.
    #[clap(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl Stakers {
    /// Run the [Stakers] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.provider()?;
        let deployment = global_config.resolve_deployment(&provider).await?;
        let from_block = self
            .from_block
            .or(deployment.deployment_block)
            .context("--from-block is required when the deployment block is unknown")?;
        let to_block = match self.to_block {
            Some(block) => block,
            None => provider.get_block_number().await.context("failed to get head block")?,
        };

        let events = fetch_staking_events(
            &provider,
            deployment.deposit_manager_address,
            &[StakingEventKind::Deposited],
            from_block,
            to_block,
            global_config.chunk_size,
        )
        .await?;
        let depositors: Vec<_> = first_deposits(&events).into_keys().collect();
        tracing::info!("Found {} unique stakers", depositors.len());

        let stakes =
            fetch_stakes(&provider, deployment.seig_manager_address, &depositors, Some(to_block))
                .await?;
        let ranking = rank(stakes);
        for line in ranking_lines(&ranking, TON_DECIMALS, "TON") {
            tracing::info!("{line}");
        }

        let timestamp = file_timestamp();
        let (csv_path, csv_file) =
            create_report(&self.out_dir, &format!("stakers_results_{timestamp}.csv"))?;
        write_csv(csv_file, &staker_rows(&ranking, TON_DECIMALS))?;
        tracing::info!("CSV file saved: {}", csv_path.display());

        let summary = StakersSummary {
            from_block,
            to_block,
            deposited_events: events.len(),
            ranking,
        };
        let (summary_path, summary_file) =
            create_report(&self.out_dir, &format!("stakers_summary_{timestamp}.txt"))?;
        write_stakers_summary(summary_file, &summary)?;
        tracing::info!("Summary file saved: {}", summary_path.display());

        Ok(())
    }
}
