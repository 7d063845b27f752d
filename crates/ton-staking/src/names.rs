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

//! Static address to display-name tables.

use std::{collections::HashMap, path::Path};

use alloy::primitives::{address, Address};
use anyhow::{Context, Result};

/// What to render for an address that is not in a [NameTable].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Render a fixed label, e.g. `Unknown`.
    Label(String),
    /// Render the checksummed address itself.
    Address,
}

/// Read-only, exact-match mapping from address to display name.
#[derive(Debug, Clone)]
pub struct NameTable {
    names: HashMap<Address, String>,
    fallback: Fallback,
}

impl NameTable {
    pub fn new(
        entries: impl IntoIterator<Item = (Address, impl Into<String>)>,
        fallback: Fallback,
    ) -> Self {
        let names = entries.into_iter().map(|(addr, name)| (addr, name.into())).collect();
        Self { names, fallback }
    }

    /// Return the name of `address`, if it is in the table.
    pub fn get(&self, address: &Address) -> Option<&str> {
        self.names.get(address).map(String::as_str)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.names.contains_key(address)
    }

    /// Return the name of `address`, or the fallback rendering.
    pub fn display(&self, address: &Address) -> String {
        match (self.get(address), &self.fallback) {
            (Some(name), _) => name.to_string(),
            (None, Fallback::Label(label)) => label.clone(),
            (None, Fallback::Address) => address.to_string(),
        }
    }

    /// Addresses with a name.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.names.keys()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Add the entries of a JSON object (`{"0x..": "name"}`) to the table. Entries in the file
    /// replace built-in entries for the same address.
    pub fn extend_from_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read names file {}", path.display()))?;
        let entries: HashMap<Address, String> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse names file {}", path.display()))?;
        tracing::debug!("Loaded {} names from {}", entries.len(), path.display());
        self.names.extend(entries);
        Ok(())
    }
}

/// Operator (layer2) contracts known to the V1 and V2 staking deployments.
pub fn layer2_names() -> NameTable {
    NameTable::new(
        [
            // V1 deployment
            (address!("0x39A13a796A3Cd9f480C28259230D2EF0a7026033"), "Tokamak1"),
            (address!("0x42CCF0769e87CB2952634F607DF1C7d62e0bBC52"), "Level 19"),
            (address!("0xBC8896Ebb2E3939B1849298Ef8da59E09946cF66"), "DSRV"),
            (address!("0xCc38C7aaf2507da52A875e93F57451e58E8c6372"), "staked"),
            (address!("0xB9D336596Ea2662488641c4AC87960BFdCb94c6e"), "Talken"),
            (address!("0x17602823b5fE43a65aD7122946A73B019e77fD33"), "decipher"),
            (address!("0x41fb4bAD6fbA9e9b6E45F3f96bA3ad7Ec2fF5b3C"), "DXM Corp"),
            (address!("0x2000fC16911FC044130c29C1Aa49D3E0B101716a"), "DeSpread"),
            (address!("0x97d0a5880542ab0e699c67e7f4ff61f2e5200484"), "Danal Fintech"),
            (address!("0x5d9a0646c46245A8a3B4775aFB3c54d07BCB1764"), "Hammer DAO"),
            // V2 deployment
            (address!("0x0F42D1C40b95DF7A1478639918fc358B4aF5298D"), "level19"),
            (address!("0xf3B17FDB808c7d0Df9ACd24dA34700ce069007DF"), "tokamak1"),
            (address!("0x2B67D8D4E61b68744885E243EfAF988f1Fc66E2D"), "DSRV"),
            (address!("0x2c25A6be0e6f9017b5bf77879c487eed466F2194"), "staked"),
            (address!("0x36101b31e74c5E8f9a9cec378407Bbb776287761"), "Talken"),
            (address!("0xbc602C1D9f3aE99dB4e9fD3662CE3D02e593ec5d"), "decipher"),
            (address!("0xC42cCb12515b52B59c02eEc303c887C8658f5854"), "DeSpread"),
            (address!("0xf3CF23D896Ba09d8EcdcD4655d918f71925E3FE5"), "Danal Fintech"),
            (address!("0x44e3605d0ed58FD125E9C47D1bf25a4406c13b57"), "DXM Corp"),
            (address!("0x06D34f65869Ec94B3BA8c0E08BCEb532f65005E2"), "Hammer DAO"),
        ],
        Fallback::Label("Unknown".to_string()),
    )
}

/// Tokens whose Uniswap V3 positions are tracked. Pairs without any of these are ignored.
pub fn tracked_tokens() -> NameTable {
    NameTable::new(
        [
            (address!("0xc4A11aaf6ea915Ed7Ac194161d2fC9384F15bff2"), "WTON"),
            (address!("0x409c4D8cd5d2924b9bc5509230d16a61289c8153"), "TOS"),
            (address!("0x0e498afce58dE8651B983F136256fA3b8d9703bc"), "DOC"),
        ],
        Fallback::Address,
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn unknown_layer2_uses_label() {
        let names = layer2_names();
        assert_eq!(names.display(&address!("0x39A13a796A3Cd9f480C28259230D2EF0a7026033")), "Tokamak1");
        assert_eq!(names.display(&Address::ZERO), "Unknown");
    }

    #[test]
    fn unknown_token_uses_address() {
        let tokens = tracked_tokens();
        let weth = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        assert_eq!(tokens.display(&weth), "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        assert!(!tokens.contains(&weth));
        assert!(tokens.contains(&address!("0x409c4D8cd5d2924b9bc5509230d16a61289c8153")));
    }

    #[test]
    fn names_file_overrides_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"0x39a13a796a3cd9f480c28259230d2ef0a7026033": "Tokamak One",
                "0x00000000000000000000000000000000000000a1": "Newcomer"}}"#
        )
        .unwrap();

        let mut names = layer2_names();
        let before = names.len();
        names.extend_from_json_file(file.path()).unwrap();

        assert_eq!(names.len(), before + 1);
        assert_eq!(
            names.display(&address!("0x39A13a796A3Cd9f480C28259230D2EF0a7026033")),
            "Tokamak One"
        );
        assert_eq!(
            names.display(&address!("0x00000000000000000000000000000000000000a1")),
            "Newcomer"
        );
    }
}
