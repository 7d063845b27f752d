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

pub mod chain;
pub mod checkpoint;
pub mod config;
pub mod format;
pub mod notify;
pub mod watcher;

pub use chain::{build_provider, ChainSource, ChainSourceObj, ProviderChain, TxReceipt};
pub use checkpoint::{CheckpointError, CheckpointStore, CheckpointStoreObj, FileCheckpoint};
pub use notify::{Delivery, NotificationSink, NotificationSinkObj, SlackWebhook, TracingSink};
pub use watcher::{EventFilter, EventWatcher, Step, WatcherConfig};
