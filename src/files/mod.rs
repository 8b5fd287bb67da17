//! Serving directory access for the `/files/*` routes.
//!
//! # Responsibilities
//! - Resolve a request file name against the serving directory
//! - Read a whole file, or create/overwrite one with mode 0644
//! - Optionally serialize writers targeting the same name
//!
//! # Design Decisions
//! - Names are single path components; anything else is `InvalidName`
//!   unless traversal checks are switched off
//! - Per-path locks live in a `DashMap` and are never evicted; the key set is
//!   bounded by the names the directory has been written under

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::FilesConfig;

/// Error type for serving directory operations.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid file name `{0}`")]
    InvalidName(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Files stored directly under one directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    reject_traversal: bool,
    write_locks: Option<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, serialize_writes: bool, reject_traversal: bool) -> Self {
        Self {
            root: root.into(),
            reject_traversal,
            write_locks: serialize_writes.then(DashMap::new),
        }
    }

    /// Build a store from config. Returns `None` when no directory is configured.
    pub fn from_config(config: &FilesConfig) -> Option<Self> {
        config
            .serving_directory
            .as_ref()
            .map(|root| Self::new(root.clone(), config.serialize_writes, config.reject_traversal))
    }

    /// Read the whole file named `name`.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|source| FileError::Io { path, source })
    }

    /// Create or truncate `name` and write `contents` to it.
    pub async fn write(&self, name: &str, contents: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(name)?;

        let lock = self.write_locks.as_ref().map(|locks| {
            locks
                .entry(path.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        });
        let _guard = match &lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        write_file(&path, contents)
            .await
            .map_err(|source| FileError::Io { path, source })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        if self.reject_traversal && !is_plain_name(name) {
            return Err(FileError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

async fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o644);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.flush().await
}
