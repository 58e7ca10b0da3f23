//! JSON document store.
//!
//! # Responsibility
//! - Read and write the collection as one pretty-printed JSON array.
//! - Replace the document atomically so a crash never leaves it truncated.
//!
//! # Invariants
//! - Writes go to a temp file in the target directory, are fsynced, then
//!   renamed over the target.
//! - Emitted log events carry metadata only, never todo contents.

use super::{check_collection, StoreError, StoreResult, TodoStore};
use crate::model::todo::Todo;
use log::{debug, error, info};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// File-backed todo store at a configured path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StoreResult<Vec<Todo>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let todos: Vec<Todo> =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        check_collection(&todos)?;
        Ok(todos)
    }

    fn write_document(&self, todos: &[Todo]) -> StoreResult<()> {
        check_collection(todos)?;

        let mut document = serde_json::to_vec_pretty(todos).map_err(StoreError::Serialize)?;
        document.push(b'\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        temp.write_all(&document)
            .map_err(|source| self.io_error(source))?;
        temp.as_file()
            .sync_all()
            .map_err(|source| self.io_error(source))?;
        temp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TodoStore for JsonFileStore {
    fn load(&self) -> StoreResult<Vec<Todo>> {
        let started_at = Instant::now();
        match self.read_document() {
            Ok(todos) => {
                debug!(
                    "event=store_load module=store status=ok count={} duration_ms={}",
                    todos.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(todos)
            }
            Err(err @ StoreError::Missing(_)) => {
                info!(
                    "event=store_load module=store status=missing path={}",
                    self.path.display()
                );
                Err(err)
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, todos: &[Todo]) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.write_document(todos) {
            Ok(()) => {
                debug!(
                    "event=store_save module=store status=ok count={} duration_ms={}",
                    todos.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}
