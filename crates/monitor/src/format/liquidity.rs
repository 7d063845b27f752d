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

use std::{collections::HashSet, sync::Arc};

use alloy::{
    eips::BlockId,
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::Log,
    sol_types::SolEvent,
    transports::RpcError,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ton_staking::{contracts::INonfungiblePositionManager, format_amount, NameTable, POOL_DECIMALS};

use super::{tx_link, EventFormatter};
use crate::chain::TxReceipt;

pub type PositionReaderObj = Arc<dyn PositionReader + Send + Sync>;

/// The fields of a Uniswap V3 position that notifications show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub token0: Address,
    pub token1: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Result of reading a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionRead {
    Found(Position),
    /// The call reverted, e.g. because the token id was burned in the same block.
    Reverted(String),
}

/// Historical reads of Uniswap V3 positions.
#[async_trait]
pub trait PositionReader {
    /// Read position `token_id` as of `block_number`. Errors are reserved for failures to reach
    /// the chain.
    async fn position(&self, token_id: U256, block_number: u64) -> Result<PositionRead>;
}

/// [PositionReader] calling `positions(tokenId)` on a NonfungiblePositionManager.
#[derive(Clone)]
pub struct ProviderPositions<P> {
    provider: P,
    manager: Address,
}

impl<P> ProviderPositions<P> {
    pub fn new(provider: P, manager: Address) -> Self {
        Self { provider, manager }
    }
}

/// Whether a contract call failed because the call itself reverted.
pub fn is_revert(err: &alloy::contract::Error) -> bool {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            payload.as_revert_data().is_some() || payload.message.contains("execution reverted")
        }
        _ => false,
    }
}

#[async_trait]
impl<P> PositionReader for ProviderPositions<P>
where
    P: Provider + Send + Sync,
{
    async fn position(&self, token_id: U256, block_number: u64) -> Result<PositionRead> {
        let manager = INonfungiblePositionManager::new(self.manager, &self.provider);
        let position =
            match manager.positions(token_id).block(BlockId::number(block_number)).call().await {
                Ok(position) => position,
                Err(err) if is_revert(&err) => return Ok(PositionRead::Reverted(err.to_string())),
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("failed to read position {token_id} at block {block_number}")
                    })
                }
            };
        Ok(PositionRead::Found(Position {
            token0: position.token0,
            token1: position.token1,
            tick_lower: i32::try_from(position.tickLower).context("tickLower out of range")?,
            tick_upper: i32::try_from(position.tickUpper).context("tickUpper out of range")?,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiquidityChange {
    Increased,
    Decreased,
}

impl LiquidityChange {
    fn from_topic(topic: &B256) -> Option<Self> {
        if *topic == INonfungiblePositionManager::IncreaseLiquidity::SIGNATURE_HASH {
            Some(Self::Increased)
        } else if *topic == INonfungiblePositionManager::DecreaseLiquidity::SIGNATURE_HASH {
            Some(Self::Decreased)
        } else {
            None
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Increased => "IncreasedLiquidity",
            Self::Decreased => "DecreasedLiquidity",
        }
    }
}

struct LiquidityEvent {
    token_id: U256,
    liquidity: u128,
    amount0: U256,
    amount1: U256,
}

impl LiquidityEvent {
    fn decode(change: LiquidityChange, log: &Log) -> Result<Self> {
        Ok(match change {
            LiquidityChange::Increased => {
                let event =
                    log.log_decode::<INonfungiblePositionManager::IncreaseLiquidity>()?.inner.data;
                Self {
                    token_id: event.tokenId,
                    liquidity: event.liquidity,
                    amount0: event.amount0,
                    amount1: event.amount1,
                }
            }
            LiquidityChange::Decreased => {
                let event =
                    log.log_decode::<INonfungiblePositionManager::DecreaseLiquidity>()?.inner.data;
                Self {
                    token_id: event.tokenId,
                    liquidity: event.liquidity,
                    amount0: event.amount0,
                    amount1: event.amount1,
                }
            }
        })
    }
}

/// Renders liquidity changes of Uniswap V3 positions that involve a tracked token.
pub struct LiquidityFormatter {
    positions: PositionReaderObj,
    /// Pairs with neither token in this set are not reported.
    tracked: HashSet<Address>,
    names: NameTable,
    explorer_url: String,
}

impl LiquidityFormatter {
    /// Report positions involving one of `tracked`, whose names are also used for display.
    pub fn new(
        positions: PositionReaderObj,
        tracked: NameTable,
        explorer_url: impl Into<String>,
    ) -> Self {
        Self {
            positions,
            tracked: tracked.addresses().copied().collect(),
            names: tracked,
            explorer_url: explorer_url.into(),
        }
    }

    /// Replace the display names of tokens. The tracked set is unchanged.
    pub fn with_names(self, names: NameTable) -> Self {
        Self { names, ..self }
    }

    fn pair(&self, position: &Position) -> String {
        let token0 = self.names.display(&position.token0);
        let token1 = self.names.display(&position.token1);
        format!("{token0}/{token1}")
    }
}

#[async_trait]
impl EventFormatter for LiquidityFormatter {
    fn topics(&self) -> Vec<B256> {
        vec![
            INonfungiblePositionManager::IncreaseLiquidity::SIGNATURE_HASH,
            INonfungiblePositionManager::DecreaseLiquidity::SIGNATURE_HASH,
        ]
    }

    async fn format_event(&self, receipt: &TxReceipt, log: &Log) -> Result<Option<String>> {
        let Some(change) = log.topic0().and_then(LiquidityChange::from_topic) else {
            return Ok(None);
        };
        let event = match LiquidityEvent::decode(change, log) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    "Skipping undecodable {} log in tx 0x{:x}: {err:?}",
                    change.label(),
                    receipt.transaction_hash
                );
                return Ok(None);
            }
        };

        let block_number = log.block_number.unwrap_or(receipt.block_number);
        let position = match self.positions.position(event.token_id, block_number).await? {
            PositionRead::Found(position) => position,
            PositionRead::Reverted(reason) => {
                tracing::debug!(
                    "Skipping position {} in tx 0x{:x}, read reverted: {reason}",
                    event.token_id,
                    receipt.transaction_hash
                );
                return Ok(None);
            }
        };
        if !self.tracked.contains(&position.token0) && !self.tracked.contains(&position.token1) {
            tracing::debug!(
                "Skipping position {} of untracked pair {}/{}",
                event.token_id,
                position.token0,
                position.token1
            );
            return Ok(None);
        }

        Ok(Some(format!(
            "{} - {} - from: `{}`, liquidity: `{}({}/{})`, tickLower: `{}`, tickUpper: `{}`",
            tx_link(&self.explorer_url, &receipt.transaction_hash, change.label()),
            self.pair(&position),
            receipt.from,
            format_amount(U256::from(event.liquidity), POOL_DECIMALS),
            format_amount(event.amount0, POOL_DECIMALS),
            format_amount(event.amount1, POOL_DECIMALS),
            position.tick_lower,
            position.tick_upper,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write, str::FromStr};

    use alloy::primitives::{address, b256};
    use ton_staking::tracked_tokens;

    use super::*;

    const TX: B256 = b256!("0x0101010101010101010101010101010101010101010101010101010101010101");
    const SENDER: Address = address!("0x00000000000000000000000000000000000000e1");
    const WTON: Address = address!("0xc4A11aaf6ea915Ed7Ac194161d2fC9384F15bff2");
    const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

    struct StaticPositions(HashMap<U256, PositionRead>);

    #[async_trait]
    impl PositionReader for StaticPositions {
        async fn position(&self, token_id: U256, _block_number: u64) -> Result<PositionRead> {
            self.0.get(&token_id).cloned().context("chain unreachable")
        }
    }

    fn formatter(positions: Vec<(u64, PositionRead)>) -> LiquidityFormatter {
        let positions = positions.into_iter().map(|(id, read)| (U256::from(id), read)).collect();
        LiquidityFormatter::new(
            Arc::new(StaticPositions(positions)),
            tracked_tokens(),
            "https://etherscan.io",
        )
    }

    fn increase(token_id: u64) -> (TxReceipt, Log) {
        let data = INonfungiblePositionManager::IncreaseLiquidity {
            tokenId: U256::from(token_id),
            liquidity: 2_500_000_000_000_000_000,
            amount0: U256::from_str("1000000000000000000").unwrap(),
            amount1: U256::from_str("3000000000000000000").unwrap(),
        }
        .encode_log_data();
        let log = Log {
            inner: alloy::primitives::Log { address: Address::ZERO, data },
            block_number: Some(500),
            transaction_hash: Some(TX),
            log_index: Some(3),
            ..Default::default()
        };
        let receipt = TxReceipt {
            transaction_hash: TX,
            from: SENDER,
            block_number: 500,
            logs: vec![log.clone()],
        };
        (receipt, log)
    }

    fn names_file(entries: &[(Address, &str)]) -> tempfile::TempPath {
        let entries: HashMap<String, &str> =
            entries.iter().map(|(addr, name)| (addr.to_string(), *name)).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&entries).unwrap()).unwrap();
        file.into_temp_path()
    }

    fn position(token0: Address, token1: Address) -> PositionRead {
        PositionRead::Found(Position { token0, token1, tick_lower: -887220, tick_upper: 887220 })
    }

    #[tokio::test]
    async fn renders_tracked_pair() {
        let (receipt, log) = increase(7);
        let line = formatter(vec![(7, position(WTON, WETH))])
            .format_event(&receipt, &log)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            line,
            format!(
                "<https://etherscan.io/tx/{TX:#x}|IncreasedLiquidity tx> - WTON/{WETH} - \
                 from: `{SENDER}`, liquidity: `2.5(1/3)`, tickLower: `-887220`, \
                 tickUpper: `887220`"
            )
        );
    }

    #[tokio::test]
    async fn untracked_pair_is_suppressed() {
        let (receipt, log) = increase(8);
        let line =
            formatter(vec![(8, position(WETH, USDC))]).format_event(&receipt, &log).await.unwrap();
        assert!(line.is_none());
    }

    #[tokio::test]
    async fn display_names_do_not_extend_tracked_pairs() {
        let mut names = tracked_tokens();
        names.extend_from_json_file(names_file(&[(WETH, "WETH"), (USDC, "USDC")])).unwrap();
        let formatter = formatter(vec![(8, position(WETH, USDC)), (7, position(WTON, WETH))])
            .with_names(names);

        let (receipt, log) = increase(8);
        assert!(formatter.format_event(&receipt, &log).await.unwrap().is_none());

        let (receipt, log) = increase(7);
        let line = formatter.format_event(&receipt, &log).await.unwrap().unwrap();
        assert!(line.contains(" - WTON/WETH - "));
    }

    #[tokio::test]
    async fn reverted_read_is_suppressed() {
        let (receipt, log) = increase(9);
        let line = formatter(vec![(9, PositionRead::Reverted("Invalid token ID".into()))])
            .format_event(&receipt, &log)
            .await
            .unwrap();
        assert!(line.is_none());
    }

    #[tokio::test]
    async fn failed_read_is_an_error() {
        let (receipt, log) = increase(10);
        assert!(formatter(vec![]).format_event(&receipt, &log).await.is_err());
    }

    fn error_response(json: &str) -> alloy::contract::Error {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(
            serde_json::from_str(json).unwrap(),
        ))
    }

    #[test]
    fn reverted_calls_are_told_apart_from_node_errors() {
        let reverted = error_response(
            r#"{"code":3,"message":"execution reverted: Invalid token ID","data":"0x08c379a0"}"#,
        );
        assert!(is_revert(&reverted));

        let reverted_without_data =
            error_response(r#"{"code":-32000,"message":"execution reverted"}"#);
        assert!(is_revert(&reverted_without_data));

        let node_error = error_response(r#"{"code":-32000,"message":"header not found"}"#);
        assert!(!is_revert(&node_error));

        let transport = alloy::contract::Error::TransportError(RpcError::NullResp);
        assert!(!is_revert(&transport));
    }

    #[test]
    fn decrease_label() {
        let topic = INonfungiblePositionManager::DecreaseLiquidity::SIGNATURE_HASH;
        assert_eq!(LiquidityChange::from_topic(&topic).unwrap().label(), "DecreasedLiquidity");
        assert!(LiquidityChange::from_topic(&B256::ZERO).is_none());
    }
}
