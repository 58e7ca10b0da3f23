//! In-memory store for tests and ephemeral runs.

use super::{check_collection, StoreError, StoreResult, TodoStore};
use crate::model::todo::Todo;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Todo store that keeps the collection in process memory.
///
/// A store built with `new()` behaves like a file that does not exist yet:
/// `load` reports `StoreError::Missing` until the first `save`.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Option<Vec<Todo>>>,
    save_count: Mutex<usize>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `todos`.
    pub fn seeded(todos: Vec<Todo>) -> Self {
        Self {
            todos: Mutex::new(Some(todos)),
            save_count: Mutex::new(0),
        }
    }

    /// Returns the currently stored collection, if any.
    pub fn snapshot(&self) -> Option<Vec<Todo>> {
        self.todos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        *self
            .save_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TodoStore for MemoryTodoStore {
    fn load(&self) -> StoreResult<Vec<Todo>> {
        let todos = self
            .todos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| StoreError::Missing(PathBuf::from(":memory:")))?;
        check_collection(&todos)?;
        Ok(todos)
    }

    fn save(&self, todos: &[Todo]) -> StoreResult<()> {
        check_collection(todos)?;
        *self.todos.lock().unwrap_or_else(PoisonError::into_inner) = Some(todos.to_vec());
        *self
            .save_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
