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

//! CSV and text report writers for the scan commands.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use alloy::primitives::I256;
use anyhow::{Context, Result};
use serde::Serialize;
use ton_staking::{
    format_amount, format_amount_fixed, format_block_time, NameTable, RewardHistory,
    StakerAmount, StakingEvent, POOL_DECIMALS, TON_DECIMALS,
};

/// Decimal places of amounts in reports.
pub const REPORT_DECIMALS: u8 = 4;

/// Local time suffix for report file names, e.g. `20240301_183000`.
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Create `dir/name` for writing, creating `dir` if needed.
pub fn create_report(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    let path = dir.join(name);
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok((path, BufWriter::new(file)))
}

/// Write `rows` as CSV, with a header derived from the row type.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row).context("failed to write CSV row")?;
    }
    writer.flush().context("failed to flush CSV writer")?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct StakerRow {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Staking_Amount_TON")]
    pub amount: String,
}

/// Rows of a ranking, amounts in `decimals` scale rounded to [REPORT_DECIMALS].
pub fn staker_rows(ranking: &[StakerAmount], decimals: u8) -> Vec<StakerRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(i, staker)| StakerRow {
            rank: i + 1,
            address: staker.address.to_string(),
            amount: format_amount_fixed(staker.amount, decimals, REPORT_DECIMALS),
        })
        .collect()
}

/// Summary of a `stakers` scan.
#[derive(Debug, Clone)]
pub struct StakersSummary {
    pub from_block: u64,
    pub to_block: u64,
    pub deposited_events: usize,
    pub ranking: Vec<StakerAmount>,
}

/// Write the human-readable report of a `stakers` scan.
pub fn write_stakers_summary<W: Write>(mut writer: W, summary: &StakersSummary) -> Result<()> {
    let rule = "=".repeat(60);
    let total = ton_staking::total_staked(&summary.ranking);

    writeln!(writer, "{rule}")?;
    writeln!(writer, "TOKAMAK NETWORK STAKERS REPORT")?;
    writeln!(writer, "{rule}")?;
    writeln!(writer)?;
    writeln!(writer, "Query time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(writer, "Block range: {} ~ {}", summary.from_block, summary.to_block)?;
    writeln!(writer, "Total Deposited events: {}", summary.deposited_events)?;
    writeln!(writer, "Unique stakers: {}", summary.ranking.len())?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Total staking amount: {} TON",
        format_amount_fixed(total, TON_DECIMALS, REPORT_DECIMALS)
    )?;
    writeln!(writer)?;
    writeln!(writer, "{rule}")?;
    writeln!(writer, "Stakers ranking (sorted by staking amount)")?;
    writeln!(writer, "{rule}")?;
    writeln!(writer)?;
    for line in ranking_lines(&summary.ranking, TON_DECIMALS, "TON") {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

/// `  1. 0x..: 12.3456 TON` lines of a ranking.
pub fn ranking_lines(ranking: &[StakerAmount], decimals: u8, unit: &str) -> Vec<String> {
    ranking
        .iter()
        .enumerate()
        .map(|(i, staker)| {
            format!(
                "{:3}. {}: {} {unit}",
                i + 1,
                staker.address,
                format_amount_fixed(staker.amount, decimals, REPORT_DECIMALS)
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRow {
    pub block_number: u64,
    pub timestamp: String,
    pub tx_hash: String,
    pub event_type: &'static str,
    pub layer2_name: String,
    pub layer2_address: String,
    pub depositor: String,
    pub amount: String,
    #[serde(rename = "AmountWTON")]
    pub amount_wton: String,
}

/// Rows of the `events` export. Every event block must have an entry in `timestamps`.
pub fn event_rows(
    events: &[StakingEvent],
    timestamps: &HashMap<u64, u64>,
    names: &NameTable,
) -> Result<Vec<EventRow>> {
    events
        .iter()
        .map(|event| {
            let timestamp = timestamps
                .get(&event.block_number)
                .with_context(|| format!("missing timestamp of block {}", event.block_number))?;
            Ok(EventRow {
                block_number: event.block_number,
                timestamp: format_block_time(*timestamp)?,
                tx_hash: format!("{:#x}", event.transaction_hash),
                event_type: event.kind.export_label(),
                layer2_name: names.display(&event.layer2),
                layer2_address: event.layer2.to_string(),
                depositor: event.depositor.to_string(),
                amount: event.amount.to_string(),
                amount_wton: format_amount(event.amount, TON_DECIMALS),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewStakerRow {
    pub address: String,
    pub first_deposit_block: u64,
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RewardRow {
    pub block_number: u64,
    #[serde(rename = "BalanceBefore_TON")]
    pub balance_before: String,
    #[serde(rename = "BalanceAfter_TON")]
    pub balance_after: String,
    #[serde(rename = "Reward_TON")]
    pub reward: String,
}

/// One row per commit of a reward history.
pub fn reward_rows(history: &RewardHistory) -> Vec<RewardRow> {
    history
        .rewards
        .iter()
        .map(|reward| RewardRow {
            block_number: reward.block_number,
            balance_before: format_amount(reward.balance_before, TON_DECIMALS),
            balance_after: format_amount(reward.balance_after, TON_DECIMALS),
            reward: format_signed_amount(reward.delta(), TON_DECIMALS),
        })
        .collect()
}

/// [format_amount] for signed values.
pub fn format_signed_amount(value: I256, decimals: u8) -> String {
    let magnitude = format_amount(value.unsigned_abs(), decimals);
    if value.is_negative() {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Rows of the phase-1 ranking. Phase-1 stakes use the pool token scale.
pub fn phase1_rows(ranking: &[StakerAmount]) -> Vec<StakerRow> {
    staker_rows(ranking, POOL_DECIMALS)
}
