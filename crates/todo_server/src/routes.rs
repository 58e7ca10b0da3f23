//! Todo HTTP handlers.
//!
//! # Responsibility
//! - Translate requests into `TodoService` calls and results into JSON.
//! - Run blocking store I/O off the async executor.
//!
//! # Invariants
//! - Handlers hold no business logic; validation lives in `todo_core`.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use todo_core::{Todo, TodoInput, TodoPatch, TodoService, TodoServiceResult, TodoStore};

pub async fn list_all<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    run(&state, |service| service.list_all()).await.map(Json)
}

pub async fn list_overdue<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    run(&state, |service| service.list_overdue()).await.map(Json)
}

pub async fn list_completed<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    run(&state, |service| service.list_completed()).await.map(Json)
}

pub async fn get_one<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    run(&state, move |service| service.get(&id)).await.map(Json)
}

pub async fn create<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<TodoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = body?;
    let todo = run(&state, move |service| service.create(&input)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(patch) = body?;
    run(&state, move |service| service.update(&id, &patch))
        .await
        .map(Json)
}

pub async fn complete<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    run(&state, move |service| service.complete(&id))
        .await
        .map(Json)
}

pub async fn undo<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    run(&state, move |service| service.undo(&id)).await.map(Json)
}

pub async fn delete<S: TodoStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    run(&state, move |service| service.delete(&id)).await?;
    Ok(StatusCode::OK)
}

async fn run<S, T, F>(state: &AppState<S>, op: F) -> Result<T, ApiError>
where
    S: TodoStore + 'static,
    T: Send + 'static,
    F: FnOnce(&TodoService<S>) -> TodoServiceResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|err| ApiError::internal(format!("todo operation aborted: {err}")))?
        .map_err(ApiError::from)
}
