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
    format::StakingFormatter,
    EventWatcher, FileCheckpoint, ProviderChain,
};
use ton_staking::{layer2_names, MAINNET_V1};

/// Number of blocks queried per iteration.
const DEFAULT_WINDOW: u64 = 100;

/// Posts TON staking deposits and withdrawals to a Slack webhook.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct StakingMonitorArgs {
    /// Address of the DepositManager contract.
    #[clap(long, env, default_value_t = MAINNET_V1.deposit_manager_address)]
    deposit_manager_address: Address,

    #[clap(flatten)]
    monitor: MonitorArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = StakingMonitorArgs::parse();
    init_tracing(args.monitor.log_json);

    let mut names = layer2_names();
    if let Some(path) = &args.monitor.names_file {
        names.extend_from_json_file(path)?;
    }

    let provider = build_provider(args.monitor.rpc_url()?);
    let mut watcher = EventWatcher::new(
        args.monitor.watcher_config(args.deposit_manager_address, DEFAULT_WINDOW),
        Arc::new(ProviderChain::new(provider)),
        Arc::new(FileCheckpoint::new(&args.monitor.checkpoint_file)),
        args.monitor.sink()?,
        Box::new(StakingFormatter::new(names, &args.monitor.explorer_url)),
    )?;

    watcher.run().await
}
