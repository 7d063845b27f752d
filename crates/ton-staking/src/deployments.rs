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

use alloy::primitives::{address, Address};
use clap::Args;
use derive_builder::Builder;

pub use alloy_chains::NamedChain;

/// Configuration for a deployment of the TON staking contracts.
// NOTE: See https://github.com/clap-rs/clap/issues/5092#issuecomment-1703980717 about clap usage.
#[non_exhaustive]
#[derive(Clone, Debug, Builder, Args)]
#[group(requires = "deposit_manager_address", requires = "seig_manager_address")]
pub struct Deployment {
    /// EIP-155 chain ID of the network.
    #[clap(long, env)]
    #[builder(setter(into, strip_option), default)]
    pub chain_id: Option<u64>,

    /// Address of the [IDepositManager] contract.
    ///
    /// [IDepositManager]: crate::contracts::IDepositManager
    #[clap(long, env, required = false, long_help = "Address of the DepositManager contract")]
    #[builder(setter(into))]
    pub deposit_manager_address: Address,

    /// Address of the [ISeigManager] contract.
    ///
    /// [ISeigManager]: crate::contracts::ISeigManager
    #[clap(long, env, required = false, long_help = "Address of the SeigManager contract")]
    #[builder(setter(into))]
    pub seig_manager_address: Address,

    /// Block at which the DepositManager was created. Scans default to starting here.
    #[clap(long, env)]
    #[builder(setter(into, strip_option), default)]
    pub deployment_block: Option<u64>,
}

impl Deployment {
    /// Create a new [DeploymentBuilder].
    pub fn builder() -> DeploymentBuilder {
        Default::default()
    }

    /// Lookup the current [Deployment] for a named chain.
    pub const fn from_chain(chain: NamedChain) -> Option<Deployment> {
        match chain {
            NamedChain::Mainnet => Some(MAINNET),
            _ => None,
        }
    }

    /// Lookup the current [Deployment] by chain ID.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Option<Deployment> {
        let chain = NamedChain::try_from(chain_id.into()).ok()?;
        Self::from_chain(chain)
    }
}

/// [Deployment] of the staking contracts on Ethereum mainnet after the V2 upgrade.
pub const MAINNET: Deployment = Deployment {
    chain_id: Some(NamedChain::Mainnet as u64),
    deposit_manager_address: address!("0x0b58ca72b12F01FC05F8f252e226f3E2089BD00E"),
    seig_manager_address: address!("0x0b55a0f463b6DEFb81c6063973763951712D0E5F"),
    deployment_block: Some(18416838),
};

/// [Deployment] of the original (V1) staking contracts on Ethereum mainnet.
pub const MAINNET_V1: Deployment = Deployment {
    chain_id: Some(NamedChain::Mainnet as u64),
    deposit_manager_address: address!("0x56E465f654393fa48f007Ed7346105c7195CEe43"),
    seig_manager_address: address!("0x710936500aC59e8551331871Cbad3D33d5e0D909"),
    deployment_block: Some(10837675),
};

/// Block of the first seigniorage update after the V2 patch. Event exports start here.
pub const MAINNET_SEIGNIORAGE_PATCH_BLOCK: u64 = 18417896;

/// Block at which the V1 "new stakers" campaign started.
pub const MAINNET_V1_EVENT_START_BLOCK: u64 = 12223496;

/// Uniswap V3 NonfungiblePositionManager on Ethereum mainnet.
pub const UNISWAP_V3_POSITION_MANAGER: Address =
    address!("0xC36442b4a4522E871399CD717aBDD847Ab11FE88");

/// Phase-1 StakeTON vault contracts on Ethereum mainnet.
pub const PHASE1_STAKE_TON_CONTRACTS: [Address; 1] =
    [address!("0x9a8294566960Ab244d78D266FFe0f284cDf728F1")];

/// First block of the phase-1 StakeTON vaults.
pub const PHASE1_FROM_BLOCK: u64 = 12880649;

/// Snapshot block used for the phase-1 balances.
pub const PHASE1_SNAPSHOT_BLOCK: u64 = 14995351;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_chain_id() {
        let deployment = Deployment::from_chain_id(1u64).unwrap();
        assert_eq!(deployment.deposit_manager_address, MAINNET.deposit_manager_address);
        assert!(Deployment::from_chain_id(11155111u64).is_none());
    }

    #[test]
    fn builder_defaults_deployment_block() {
        let deployment = Deployment::builder()
            .deposit_manager_address(MAINNET_V1.deposit_manager_address)
            .seig_manager_address(MAINNET_V1.seig_manager_address)
            .build()
            .unwrap();
        assert_eq!(deployment.chain_id, None);
        assert_eq!(deployment.deployment_block, None);
    }
}
