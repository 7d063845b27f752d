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

use alloy::primitives::Address;
use clap::Args;
use ton_staking::{
    deployments::{PHASE1_FROM_BLOCK, PHASE1_SNAPSHOT_BLOCK, PHASE1_STAKE_TON_CONTRACTS},
    fetch_phase1_stakes, format_amount_fixed, rank, total_staked, POOL_DECIMALS,
};

use crate::{
    config::GlobalConfig,
    export::{
        create_report, file_timestamp, phase1_rows, ranking_lines, write_csv, REPORT_DECIMALS,
    },
};

/// Command to rank phase-1 StakeTON stakers at a snapshot block.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct Phase1Stakers {
    /// StakeTON contracts to scan. Defaults to the mainnet phase-1 vaults.
    #[clap(long = "contract")]
    pub contracts: Vec<Address>,
    /// First block to scan for `Staked` events.
    #[clap(long, default_value_t = PHASE1_FROM_BLOCK)]
    pub from_block: u64,
    /// Block the staked amounts are read at.
    #[clap(long, default_value_t = PHASE1_SNAPSHOT_BLOCK)]
    pub snapshot_block: u64,
    /// Directory for the CSV file.
    #[clap(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl Phase1Stakers {
    /// Run the [Phase1Stakers] command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        let provider = global_config.provider()?;
        let contracts = if self.contracts.is_empty() {
            PHASE1_STAKE_TON_CONTRACTS.to_vec()
        } else {
            self.contracts.clone()
        };

        let stakes = fetch_phase1_stakes(
            &provider,
            &contracts,
            self.from_block,
            self.snapshot_block,
            global_config.chunk_size,
        )
        .await?;
        let ranking = rank(stakes);
        for line in ranking_lines(&ranking, POOL_DECIMALS, "TON") {
            tracing::info!("{line}");
        }
        tracing::info!(
            "{} stakers, {} TON staked at block {}",
            ranking.len(),
            format_amount_fixed(total_staked(&ranking), POOL_DECIMALS, REPORT_DECIMALS),
            self.snapshot_block
        );

        let (path, file) =
            create_report(&self.out_dir, &format!("phase1_stakers_{}.csv", file_timestamp()))?;
        write_csv(file, &phase1_rows(&ranking))?;
        tracing::info!("CSV file saved: {}", path.display());

        Ok(())
    }
}
