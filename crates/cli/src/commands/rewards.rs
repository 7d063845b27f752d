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

use alloy::{primitives::Address, providers::Provider};
use anyhow::Context;
use clap::Args;
use ton_staking::{compute_reward_history, format_amount, TON_DECIMALS};

use crate::{
    config::GlobalConfig,
    export::{create_report, file_timestamp, format_signed_amount, reward_rows, write_csv},
};

/// Command to compute the seigniorage received by a staker on one layer2.
///
/// Reads historical balances, so the RPC endpoint must be an archive node.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct StakingRewards {
    /// Address of the staker.
    #[clap(long)]
    pub staker: Address,
    /// Address of the layer2 (operator) contract.
    #[clap(long)]
    pub layer2: Address,
    /// First block to scan for the staker's deposit. Defaults to the deployment block.
    #[clap(long)]
    pub from_block: Option<u64>,
    /// Last block to scan. Defaults to the current head.
    #[clap(long)]
    pub to_block: Option<u64>,
    /// Also write the per-commit rewards to a CSV file in this directory.
    #[clap(long)]
    pub out_dir: Option<PathBuf>,
}

impl StakingRewards {
    /// Run the [StakingRewards] command.
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

        let Some(history) = compute_reward_history(
            &provider,
            deployment.deposit_manager_address,
            deployment.seig_manager_address,
            self.staker,
            self.layer2,
            from_block,
            to_block,
            global_config.chunk_size,
        )
        .await?
        else {
            tracing::info!(
                "No deposit of {} on layer2 {} in blocks {from_block}..={to_block}",
                self.staker,
                self.layer2
            );
            return Ok(());
        };

        tracing::info!(
            "First deposit at block {}, coinage {}",
            history.first_deposit_block,
            history.coinage
        );
        for reward in &history.rewards {
            tracing::info!(
                "block: {}, reward: {} TON (balance {} TON)",
                reward.block_number,
                format_signed_amount(reward.delta(), TON_DECIMALS),
                format_amount(reward.balance_after, TON_DECIMALS)
            );
        }
        tracing::info!(
            "total reward: {} TON over {} commits",
            format_signed_amount(history.total(), TON_DECIMALS),
            history.rewards.len()
        );

        if let Some(out_dir) = &self.out_dir {
            let name = format!("rewards_{}_{}.csv", self.staker, file_timestamp());
            let (path, file) = create_report(out_dir, &name)?;
            write_csv(file, &reward_rows(&history))?;
            tracing::info!("CSV file saved: {}", path.display());
        }

        Ok(())
    }
}
