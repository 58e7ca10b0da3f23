//! HTTP adapter for the todo service.
//!
//! # Responsibility
//! - Expose `todo_core` collection operations as JSON endpoints.
//! - Serve the static front page and assets.

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use todo_core::{TodoService, TodoStore};
use tower_http::services::{ServeDir, ServeFile};

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;

/// Shared handler state.
pub struct AppState<S: TodoStore> {
    pub service: Arc<TodoService<S>>,
}

impl<S: TodoStore> AppState<S> {
    pub fn new(service: TodoService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S: TodoStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

/// Builds the full application router.
///
/// `static_dir` must contain `index.html`; other files are served under
/// `/content`.
pub fn build_router<S: TodoStore + 'static>(state: AppState<S>, static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/content", ServeDir::new(static_dir))
        .merge(todo_routes(state))
}

/// Builds only the `/todos` API routes.
pub fn todo_routes<S: TodoStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/todos",
            get(routes::list_all::<S>).post(routes::create::<S>),
        )
        .route("/todos/overdue", get(routes::list_overdue::<S>))
        .route("/todos/completed", get(routes::list_completed::<S>))
        .route(
            "/todos/:id",
            get(routes::get_one::<S>)
                .patch(routes::update::<S>)
                .delete(routes::delete::<S>),
        )
        .route("/todos/:id/complete", post(routes::complete::<S>))
        .route("/todos/:id/undo", post(routes::undo::<S>))
        .with_state(state)
}
