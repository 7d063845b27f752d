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

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;

use crate::{
    format::DEFAULT_EXPLORER_URL,
    notify::{NotificationSinkObj, SlackWebhook, TracingSink},
    watcher::WatcherConfig,
};

/// Arguments shared by the monitors.
#[derive(Args, Debug, Clone)]
pub struct MonitorArgs {
    /// URL of the Ethereum RPC endpoint.
    #[clap(long, env = "RPC_URL", hide_env_values = true)]
    pub rpc_url: Option<Url>,

    /// File containing the URL of the Ethereum RPC endpoint. Used when --rpc-url is not set.
    #[clap(long, env)]
    pub rpc_url_file: Option<PathBuf>,

    /// URL of the Slack incoming webhook.
    #[clap(long, env = "WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<Url>,

    /// File containing the URL of the Slack incoming webhook. Used when --webhook-url is not set.
    #[clap(long, env)]
    pub webhook_url_file: Option<PathBuf>,

    /// Log notifications instead of posting them.
    #[clap(long, default_value_t = false)]
    pub dry_run: bool,

    /// File holding the last processed block.
    #[clap(long, env, default_value = "latest_block")]
    pub checkpoint_file: PathBuf,

    /// First block to process when no checkpoint is stored. Defaults to the block after the
    /// current head. Must be positive.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub start_block: Option<u64>,

    /// Maximum number of blocks queried per iteration.
    #[clap(long)]
    pub window: Option<u64>,

    /// Seconds to wait after a failed or idle iteration.
    #[clap(long, default_value = "60")]
    pub cooldown: u64,

    /// Base URL of the block explorer used in transaction links.
    #[clap(long, env, default_value = DEFAULT_EXPLORER_URL)]
    pub explorer_url: String,

    /// JSON file of additional `{"<address>": "<name>"}` display names. Does not change which
    /// tokens are tracked.
    #[clap(long, env)]
    pub names_file: Option<PathBuf>,

    /// Whether to log in JSON format.
    #[clap(long, env, default_value_t = false)]
    pub log_json: bool,
}

impl MonitorArgs {
    pub fn rpc_url(&self) -> Result<Url> {
        resolve_url(self.rpc_url.as_ref(), self.rpc_url_file.as_deref())?
            .context("no RPC URL provided; set --rpc-url, RPC_URL or --rpc-url-file")
    }

    /// Build the notification sink: the webhook, or a logging sink for dry runs.
    pub fn sink(&self) -> Result<NotificationSinkObj> {
        if self.dry_run {
            tracing::info!("Dry run, notifications are only logged");
            return Ok(Arc::new(TracingSink));
        }
        let url = resolve_url(self.webhook_url.as_ref(), self.webhook_url_file.as_deref())?
            .context("no webhook URL provided; set --webhook-url, WEBHOOK_URL, --webhook-url-file or --dry-run")?;
        Ok(Arc::new(SlackWebhook::new(url)?))
    }

    pub fn watcher_config(&self, address: Address, default_window: u64) -> WatcherConfig {
        WatcherConfig {
            address,
            window: self.window.unwrap_or(default_window),
            cooldown: Duration::from_secs(self.cooldown),
            start_block: self.start_block,
        }
    }
}

fn resolve_url(value: Option<&Url>, file: Option<&Path>) -> Result<Option<Url>> {
    match (value, file) {
        (Some(url), _) => Ok(Some(url.clone())),
        (None, Some(path)) => {
            let contents = read_credential_file(path)?;
            let url = Url::parse(&contents)
                .with_context(|| format!("invalid URL in {}", path.display()))?;
            Ok(Some(url))
        }
        (None, None) => Ok(None),
    }
}

/// Read a single-value credential file, ignoring surrounding whitespace.
pub fn read_credential_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = contents.trim();
    if value.is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(value.to_string())
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(log_json: bool) {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    if log_json {
        tracing_subscriber::fmt().with_ansi(false).json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_ansi(false).with_env_filter(filter).init();
    }
}
