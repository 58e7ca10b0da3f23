//! Core domain logic for the todo service.
//! This crate is the single source of truth for todo invariants.

pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{
    parse_timestamp, Todo, TodoChanges, TodoId, TodoInput, TodoPatch, TodoValidationError,
};
pub use service::todo_service::{TodoService, TodoServiceError, TodoServiceResult};
pub use store::{JsonFileStore, MemoryTodoStore, StoreError, StoreResult, TodoStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
