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

//! Fixed-point amount and block time rendering.

use alloy::primitives::U256;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

/// Decimals of TON stake amounts (RAY).
pub const TON_DECIMALS: u8 = 27;

/// Decimals of ERC-20 pool amounts and liquidity.
pub const POOL_DECIMALS: u8 = 18;

/// Display timezone offset (KST, UTC+9).
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Label appended to rendered times.
pub const DISPLAY_TZ_LABEL: &str = "KST";

fn scale(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Render `value / 10^decimals` exactly. Integers render without a fractional part, other
/// values render with trailing zeros trimmed.
pub fn format_amount(value: U256, decimals: u8) -> String {
    let scale = scale(decimals);
    let whole = value / scale;
    let frac = value % scale;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Render `value / 10^decimals` rounded half-up to exactly `places` fractional digits.
pub fn format_amount_fixed(value: U256, decimals: u8, places: u8) -> String {
    let rounded = if places >= decimals {
        value * scale(places - decimals)
    } else {
        let divisor = scale(decimals - places);
        (value + divisor / U256::from(2)) / divisor
    };
    if places == 0 {
        return rounded.to_string();
    }
    let places_scale = scale(places);
    let whole = rounded / places_scale;
    let frac = rounded % places_scale;
    format!("{whole}.{:0>width$}", frac.to_string(), width = places as usize)
}

/// Render a unix timestamp in the display timezone, e.g. `2024-03-01 18:30:00+09:00`.
pub fn format_block_time(timestamp: u64) -> Result<String> {
    let offset =
        FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).context("invalid display offset")?;
    let datetime = DateTime::from_timestamp(
        i64::try_from(timestamp).context("timestamp out of range")?,
        0,
    )
    .with_context(|| format!("failed to create DateTime from {timestamp}"))?;
    Ok(datetime.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S%:z").to_string())
}
