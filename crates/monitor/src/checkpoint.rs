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
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;

pub type CheckpointStoreObj = Arc<dyn CheckpointStore + Send + Sync>;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("IO error {0:?}")]
    IoErr(#[from] std::io::Error),

    #[error("Invalid checkpoint: {0}")]
    BadCheckpoint(String),

    #[error("Failed to persist checkpoint {0:?}")]
    PersistErr(#[from] tempfile::PersistError),
}

/// Durable storage of the last fully processed block.
#[async_trait]
pub trait CheckpointStore {
    /// Load the checkpoint. `Ok(None)` when nothing was saved yet.
    async fn load(&self) -> Result<Option<u64>, CheckpointError>;

    /// Replace the checkpoint.
    async fn save(&self, block: u64) -> Result<(), CheckpointError>;
}

/// Checkpoint kept as a decimal integer in a plain text file.
///
/// Writes go to a temporary file in the same directory which is then renamed over the
/// checkpoint, so a crash never leaves a partially written value.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpoint {
    async fn load(&self) -> Result<Option<u64>, CheckpointError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let trimmed = contents.trim();
        trimmed.parse::<u64>().map(Some).map_err(|_| {
            CheckpointError::BadCheckpoint(format!("{}: {trimmed:?}", self.path.display()))
        })
    }

    async fn save(&self, block: u64) -> Result<(), CheckpointError> {
        let dir = self.parent_dir().to_path_buf();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), CheckpointError> {
            let mut file = tempfile::NamedTempFile::new_in(&dir)?;
            write!(file, "{block}")?;
            file.as_file().sync_all()?;
            file.persist(&path)?;
            Ok(())
        })
        .await
        .map_err(|err| CheckpointError::IoErr(std::io::Error::other(err)))?
    }
}
