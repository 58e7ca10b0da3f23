//! Persistence layer for the todo collection.
//!
//! # Responsibility
//! - Define the load/save contract over the whole collection.
//! - Isolate file format and I/O details from service orchestration.
//!
//! # Invariants
//! - `save` replaces the whole document; there are no partial writes.
//! - `load` preserves document order and rejects invalid persisted state
//!   instead of masking it.

use crate::model::todo::{Todo, TodoValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod json_store;
mod memory_store;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryTodoStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading or writing the persisted collection.
#[derive(Debug)]
pub enum StoreError {
    /// The backing document does not exist yet.
    Missing(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The document is not a valid JSON array of todos.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
    /// The document parsed but violates collection invariants.
    InvalidData(String),
}

impl StoreError {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "todo store not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "todo store I/O failed at `{}`: {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "todo store `{}` is malformed: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize todos: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Missing(_) | Self::InvalidData(_) => None,
        }
    }
}

/// Durable storage for the full todo collection.
///
/// Implementations must be usable from several threads; the service
/// serializes load/mutate/save cycles itself.
pub trait TodoStore: Send + Sync {
    /// Reads the full collection in stored order.
    fn load(&self) -> StoreResult<Vec<Todo>>;

    /// Replaces the full collection.
    fn save(&self, todos: &[Todo]) -> StoreResult<()>;

    /// Reads the collection, treating a missing document as empty (first run).
    fn load_or_empty(&self) -> StoreResult<Vec<Todo>> {
        match self.load() {
            Ok(todos) => Ok(todos),
            Err(StoreError::Missing(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}

/// Checks whole-collection invariants: valid records and unique ids.
pub(crate) fn check_collection(todos: &[Todo]) -> StoreResult<()> {
    let mut seen = std::collections::HashSet::with_capacity(todos.len());
    for todo in todos {
        todo.validate()
            .map_err(|err| invalid_record(todo.id.as_str(), &err))?;
        if !seen.insert(todo.id.as_str()) {
            return Err(StoreError::InvalidData(format!(
                "duplicate todo id `{}`",
                todo.id
            )));
        }
    }
    Ok(())
}

fn invalid_record(id: &str, err: &TodoValidationError) -> StoreError {
    StoreError::InvalidData(format!("todo `{id}`: {err}"))
}
