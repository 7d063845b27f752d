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

//! Common configuration options for commands in the TON staking CLI.

use std::path::PathBuf;

use alloy::providers::Provider;
use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::level_filters::LevelFilter;
use ton_staking::{
    build_provider, layer2_names, Deployment, NameTable, ProviderType, LOG_QUERY_CHUNK_SIZE,
    MAINNET_V1,
};
use url::Url;

/// Common configuration options for all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalConfig {
    /// URL of the Ethereum RPC endpoint
    #[clap(short, long, env = "RPC_URL", global = true, hide_env_values = true)]
    pub rpc_url: Option<Url>,

    /// File containing the URL of the Ethereum RPC endpoint. Used when --rpc-url is not set.
    #[clap(long, env, global = true)]
    pub rpc_url_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long, env = "LOG_LEVEL", global = true, default_value = "info")]
    pub log_level: LevelFilter,

    /// Maximum number of blocks per log query.
    #[clap(
        long,
        env,
        global = true,
        default_value_t = LOG_QUERY_CHUNK_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub chunk_size: u64,

    /// Use the V1 mainnet deployment instead of the one matching the chain ID.
    #[clap(long, global = true, default_value_t = false)]
    pub v1: bool,

    /// JSON file of additional `{"<address>": "<name>"}` layer2 names.
    #[clap(long, env, global = true)]
    pub names_file: Option<PathBuf>,

    /// Configuration for the staking deployment to use.
    #[clap(flatten, next_help_heading = "Staking Deployment")]
    pub deployment: Option<Deployment>,
}

impl GlobalConfig {
    /// Access [Self::rpc_url], falling back to [Self::rpc_url_file], or return an error that can
    /// be shown to the user.
    pub fn require_rpc_url(&self) -> Result<Url> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        let Some(path) = &self.rpc_url_file else {
            bail!(
                "Blockchain RPC URL not provided; please set --rpc-url, the RPC_URL env var or \
                 --rpc-url-file"
            );
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Url::parse(contents.trim()).with_context(|| format!("invalid URL in {}", path.display()))
    }

    /// Build a read-only provider for [Self::require_rpc_url].
    pub fn provider(&self) -> Result<ProviderType> {
        Ok(build_provider(self.require_rpc_url()?))
    }

    /// Resolve the staking deployment: explicit flags first, then `--v1`, then the chain ID.
    pub async fn resolve_deployment(&self, provider: &impl Provider) -> Result<Deployment> {
        if let Some(deployment) = &self.deployment {
            return Ok(deployment.clone());
        }
        if self.v1 {
            return Ok(MAINNET_V1);
        }
        let chain_id = provider.get_chain_id().await.context("failed to get chain ID")?;
        Deployment::from_chain_id(chain_id).with_context(|| {
            format!(
                "could not determine staking deployment from chain ID {chain_id}; please specify \
                 deployment explicitly"
            )
        })
    }

    /// Built-in layer2 names, extended with [Self::names_file].
    pub fn layer2_names(&self) -> Result<NameTable> {
        let mut names = layer2_names();
        if let Some(path) = &self.names_file {
            names.extend_from_json_file(path)?;
        }
        Ok(names)
    }
}
