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

use alloy::primitives::Address;
use anyhow::Result;
use clap::Parser;
use ton_monitor::{
    build_provider,
    config::{init_tracing, MonitorArgs},
    format::{LiquidityFormatter, ProviderPositions},
    EventWatcher, FileCheckpoint, ProviderChain,
};
use ton_staking::{deployments::UNISWAP_V3_POSITION_MANAGER, tracked_tokens};

/// Number of blocks queried per iteration.
const DEFAULT_WINDOW: u64 = 1000;

/// Posts Uniswap V3 liquidity changes of TON ecosystem pairs to a Slack webhook.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct LiquidityMonitorArgs {
    /// Address of the Uniswap V3 NonfungiblePositionManager contract.
    #[clap(long, env, default_value_t = UNISWAP_V3_POSITION_MANAGER)]
    position_manager_address: Address,

    #[clap(flatten)]
    monitor: MonitorArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = LiquidityMonitorArgs::parse();
    init_tracing(args.monitor.log_json);

    // The names file only labels tokens, the tracked set stays fixed.
    let mut names = tracked_tokens();
    if let Some(path) = &args.monitor.names_file {
        names.extend_from_json_file(path)?;
    }

    let provider = build_provider(args.monitor.rpc_url()?);
    let positions = ProviderPositions::new(provider.clone(), args.position_manager_address);
    let mut watcher = EventWatcher::new(
        args.monitor.watcher_config(args.position_manager_address, DEFAULT_WINDOW),
        Arc::new(ProviderChain::new(provider)),
        Arc::new(FileCheckpoint::new(&args.monitor.checkpoint_file)),
        args.monitor.sink()?,
        Box::new(
            LiquidityFormatter::new(
                Arc::new(positions),
                tracked_tokens(),
                &args.monitor.explorer_url,
            )
            .with_names(names),
        ),
    )?;

    watcher.run().await
}
