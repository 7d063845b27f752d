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

use alloy::{
    providers::{
        fillers::{ChainIdFiller, FillProvider, JoinFill},
        Identity, ProviderBuilder, RootProvider,
    },
    rpc::client::RpcClient,
    transports::layers::RetryBackoffLayer,
};
use url::Url;

/// Read-only HTTP provider.
pub type ProviderType = FillProvider<JoinFill<Identity, ChainIdFiller>, RootProvider>;

/// Build an HTTP provider that retries rate-limited and failed requests.
pub fn build_provider(rpc_url: Url) -> ProviderType {
    ProviderBuilder::new()
        .disable_recommended_fillers()
        .filler(ChainIdFiller::default())
        .connect_client(
            RpcClient::builder().layer(RetryBackoffLayer::new(3, 1000, 200)).http(rpc_url),
        )
}
