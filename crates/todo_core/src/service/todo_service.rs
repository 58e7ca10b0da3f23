//! Todo collection use-case service.
//!
//! # Responsibility
//! - Provide list/filter/create/update/complete/undo/delete entry points.
//! - Run every mutation as one load -> mutate -> save cycle on the store.
//!
//! # Invariants
//! - Mutations validate before touching the collection; a failed operation
//!   persists nothing.
//! - Load/mutate/save cycles are serialized by a process-wide lock, so
//!   concurrent callers cannot lose each other's updates.
//! - List views preserve stored order.
//! - Unknown and malformed ids are both reported as `NotFound`.

use crate::model::todo::{Todo, TodoInput, TodoPatch, TodoValidationError};
use crate::store::{StoreError, TodoStore};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type TodoServiceResult<T> = Result<T, TodoServiceError>;

/// Service error for todo use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Client input failed validation.
    Validation(TodoValidationError),
    /// No todo with this id exists.
    NotFound(String),
    /// Persistence failure; the only server-side fault.
    Store(StoreError),
}

impl TodoServiceError {
    /// Returns whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TodoServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Todo service facade over an injected store.
pub struct TodoService<S: TodoStore> {
    store: S,
    cycle: Mutex<()>,
}

impl<S: TodoStore> TodoService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cycle: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists all todos in stored order.
    pub fn list_all(&self) -> TodoServiceResult<Vec<Todo>> {
        let _guard = self.lock_cycle();
        Ok(self.store.load_or_empty()?)
    }

    /// Lists incomplete todos whose due date has passed.
    pub fn list_overdue(&self) -> TodoServiceResult<Vec<Todo>> {
        self.list_overdue_at(Utc::now())
    }

    /// Same as `list_overdue`, evaluated against an explicit clock.
    pub fn list_overdue_at(&self, now: DateTime<Utc>) -> TodoServiceResult<Vec<Todo>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|todo| todo.is_overdue_at(now))
            .collect())
    }

    /// Lists completed todos.
    pub fn list_completed(&self) -> TodoServiceResult<Vec<Todo>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(Todo::is_completed)
            .collect())
    }

    /// Gets one todo by id.
    pub fn get(&self, id: &str) -> TodoServiceResult<Todo> {
        self.list_all()?
            .into_iter()
            .find(|todo| todo.id.as_str() == id)
            .ok_or_else(|| TodoServiceError::NotFound(id.to_string()))
    }

    /// Validates input, appends the new todo and persists the collection.
    ///
    /// # Contract
    /// - `id` and `created` are assigned here, never taken from input.
    /// - On validation failure the stored collection is unchanged.
    pub fn create(&self, input: &TodoInput) -> TodoServiceResult<Todo> {
        let todo = match Todo::create(input, Utc::now()) {
            Ok(todo) => todo,
            Err(err) => {
                warn!("event=todo_create module=service status=rejected reason={err}");
                return Err(err.into());
            }
        };

        let _guard = self.lock_cycle();
        let mut todos = self.store.load_or_empty()?;
        todos.push(todo.clone());
        self.store.save(&todos)?;
        info!(
            "event=todo_create module=service status=ok id={} count={}",
            todo.id,
            todos.len()
        );
        Ok(todo)
    }

    /// Merges `name`/`due` from `patch` into an existing todo.
    ///
    /// Returns `NotFound` before validating the patch, so an unknown id wins
    /// over bad input.
    pub fn update(&self, id: &str, patch: &TodoPatch) -> TodoServiceResult<Todo> {
        self.mutate("todo_update", id, |todo| {
            let changes = patch.validate()?;
            todo.apply(changes);
            Ok(())
        })
    }

    /// Marks a todo completed. Idempotent.
    pub fn complete(&self, id: &str) -> TodoServiceResult<Todo> {
        self.mutate("todo_complete", id, |todo| {
            todo.complete();
            Ok(())
        })
    }

    /// Marks a todo incomplete again. Idempotent.
    pub fn undo(&self, id: &str) -> TodoServiceResult<Todo> {
        self.mutate("todo_undo", id, |todo| {
            todo.undo();
            Ok(())
        })
    }

    /// Removes a todo and persists the remaining collection.
    pub fn delete(&self, id: &str) -> TodoServiceResult<()> {
        let _guard = self.lock_cycle();
        let mut todos = self.store.load_or_empty()?;
        let index = find_index(&todos, id)?;
        let removed = todos.remove(index);
        self.store.save(&todos)?;
        info!(
            "event=todo_delete module=service status=ok id={} count={}",
            removed.id,
            todos.len()
        );
        Ok(())
    }

    fn mutate<F>(&self, event: &str, id: &str, change: F) -> TodoServiceResult<Todo>
    where
        F: FnOnce(&mut Todo) -> TodoServiceResult<()>,
    {
        let _guard = self.lock_cycle();
        let mut todos = self.store.load_or_empty()?;
        let index = match find_index(&todos, id) {
            Ok(index) => index,
            Err(err) => {
                warn!("event={event} module=service status=not_found");
                return Err(err);
            }
        };

        let todo = &mut todos[index];
        if let Err(err) = change(todo) {
            warn!("event={event} module=service status=rejected id={id} reason={err}");
            return Err(err);
        }
        let updated = todo.clone();

        self.store.save(&todos)?;
        info!("event={event} module=service status=ok id={}", updated.id);
        Ok(updated)
    }

    fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn find_index(todos: &[Todo], id: &str) -> TodoServiceResult<usize> {
    todos
        .iter()
        .position(|todo| todo.id.as_str() == id)
        .ok_or_else(|| TodoServiceError::NotFound(id.to_string()))
}
