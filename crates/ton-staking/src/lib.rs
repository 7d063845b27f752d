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

//! Contract bindings, name tables and history reconstruction for Tokamak TON staking.

pub mod contracts;
pub mod deployments;
pub mod events;
pub mod names;
pub mod provider;
pub mod rewards;
pub mod stakers;
pub mod units;

// Re-export commonly used types
pub use deployments::{Deployment, NamedChain, MAINNET, MAINNET_V1};

pub use events::{
    fetch_block_timestamps, fetch_staking_events, query_logs_chunked, staking_filter,
    StakingEvent, StakingEventKind,
};

pub use names::{layer2_names, tracked_tokens, Fallback, NameTable};

pub use provider::{build_provider, ProviderType};

pub use rewards::{compute_reward_history, CommitReward, RewardHistory};

pub use stakers::{
    fetch_phase1_stakes, fetch_stakes, first_deposits, new_stakers, rank, total_staked,
    StakerAmount,
};

pub use units::{
    format_amount, format_amount_fixed, format_block_time, POOL_DECIMALS, TON_DECIMALS,
};

/// Chunk size for log queries to avoid rate limiting
pub const LOG_QUERY_CHUNK_SIZE: u64 = 9990;
