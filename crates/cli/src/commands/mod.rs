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

//! Historical scan commands of the TON staking CLI.

mod events;
mod new_stakers;
mod phase1;
mod rewards;
mod stakers;

pub use events::ExportEvents;
pub use new_stakers::NewStakers;
pub use phase1::Phase1Stakers;
pub use rewards::StakingRewards;
pub use stakers::Stakers;

use clap::Subcommand;

use crate::config::GlobalConfig;

/// Historical scans of the staking contracts.
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Rank every depositor in a block range by current stake.
    Stakers(Stakers),
    /// Export deposit and withdrawal events in a block range to CSV.
    Events(ExportEvents),
    /// List depositors whose first deposit happened after an event start block.
    NewStakers(NewStakers),
    /// Compute the seigniorage received by a staker on one layer2.
    Rewards(StakingRewards),
    /// Rank phase-1 StakeTON stakers at a snapshot block.
    Phase1Stakers(Phase1Stakers),
}

impl Command {
    /// Run the command.
    pub async fn run(&self, global_config: &GlobalConfig) -> anyhow::Result<()> {
        match self {
            Self::Stakers(cmd) => cmd.run(global_config).await,
            Self::Events(cmd) => cmd.run(global_config).await,
            Self::NewStakers(cmd) => cmd.run(global_config).await,
            Self::Rewards(cmd) => cmd.run(global_config).await,
            Self::Phase1Stakers(cmd) => cmd.run(global_config).await,
        }
    }
}
